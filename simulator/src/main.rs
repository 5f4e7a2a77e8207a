use anyhow::Context;
use clap::Parser;
use tracing::info;
use updown_simulator::{run, SimulationConfig};
use updown_types::{Chips, RoundConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of rounds to play.
    #[arg(short, long, default_value_t = 100)]
    rounds: u64,

    /// Starting balance in whole chips.
    #[arg(short, long, default_value_t = 1_000)]
    balance: i64,

    /// Seed for reproducible runs; omit for OS entropy.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Bet window length in milliseconds.
    #[arg(long, default_value_t = 50)]
    bet_ms: u64,

    /// Inject a settlement failure after this many settled rounds.
    #[arg(long)]
    fail_after: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse args
    let args = Args::parse();

    // Create logger
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let round = RoundConfig {
        bet_millis: args.bet_ms,
        preroll_min_millis: 5,
        preroll_max_millis: 10,
        roll_millis: 5,
        ..RoundConfig::default()
    };
    info!(rounds = args.rounds, balance = args.balance, "starting simulation");

    let report = run(SimulationConfig {
        rounds: args.rounds,
        starting_balance: Chips::from_whole(args.balance),
        seed: args.seed,
        round,
        fail_after: args.fail_after,
    })
    .await
    .context("simulation failed")?;

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("failed to serialize report")?
    );
    Ok(())
}
