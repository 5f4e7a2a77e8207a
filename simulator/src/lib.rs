//! Headless simulator for the updown round engine.
//!
//! Runs a [`RoundDriver`] against an in-memory balance and a betting bot
//! for a fixed number of rounds, then reports aggregate results. Useful
//! for sanity-checking payout behavior and for reproducing round
//! sequences from a seed.

use anyhow::Context;
use serde::Serialize;
use tracing::debug;
use updown_engine::rng::RoundRng;
use updown_engine::{
    BalanceService, Error, Mailbox, RoundDriver, RoundEvent, SettlementError,
};
use updown_types::{BetKey, Chips, RoundConfig};

/// In-memory stand-in for the balance collaborator. Can inject a
/// settlement failure after a given number of successful rounds to
/// exercise the stall path.
pub struct SimulatedBalance {
    balance: Chips,
    settled: u64,
    fail_after: Option<u64>,
}

impl SimulatedBalance {
    pub fn new(balance: Chips, fail_after: Option<u64>) -> Self {
        Self {
            balance,
            settled: 0,
            fail_after,
        }
    }
}

impl BalanceService for SimulatedBalance {
    async fn fetch_balance(&mut self) -> Result<Chips, SettlementError> {
        Ok(self.balance)
    }

    async fn submit_settlement(&mut self, net: Chips, tag: &str) -> Result<Chips, SettlementError> {
        if self.fail_after.is_some_and(|n| self.settled >= n) {
            return Err(SettlementError::Transport(
                "injected settlement failure".to_string(),
            ));
        }
        self.settled += 1;
        self.balance += net;
        debug!(%net, tag, balance = %self.balance, "settlement applied");
        Ok(self.balance)
    }
}

/// Random bettor. Each bet window it places a handful of wagers across
/// the board and occasionally doubles or repeats, tolerating the same
/// rejections a real player would see.
pub struct Bot {
    mailbox: Mailbox,
    rng: RoundRng,
    min_bet: Chips,
}

impl Bot {
    pub fn new(mailbox: Mailbox, rng: RoundRng, min_bet: Chips) -> Self {
        Self {
            mailbox,
            rng,
            min_bet,
        }
    }

    /// Place this round's wagers. Rejections are part of normal play
    /// (range conflicts, running out of balance) and are ignored.
    pub async fn act(&mut self) -> anyhow::Result<()> {
        let placements = 1 + self.rng.next_bounded(3);
        for _ in 0..placements {
            let key = *self.rng.pick(&BetKey::ALL);
            let amount = self.min_bet.saturating_mul(1 + self.rng.next_bounded(20));
            match self.mailbox.place_bet(key, amount).await {
                Ok(balance) => debug!(%key, %amount, %balance, "bot bet placed"),
                Err(
                    Error::RangeConflict | Error::InsufficientBalance | Error::RoundInProgress,
                ) => {}
                Err(err) => return Err(err).context("bot placement failed"),
            }
        }

        if self.rng.next_bounded(6) == 0 {
            match self.mailbox.double_all_bets().await {
                Ok(_)
                | Err(
                    Error::NoBetsPlaced | Error::InsufficientBalance | Error::RoundInProgress,
                ) => {}
                Err(err) => return Err(err).context("bot double failed"),
            }
        }
        if self.rng.next_bounded(8) == 0 {
            match self.mailbox.repeat_last_bet().await {
                Ok(_)
                | Err(Error::NoLastBet | Error::InsufficientBalance | Error::RoundInProgress) => {}
                Err(err) => return Err(err).context("bot repeat failed"),
            }
        }
        if self.rng.next_bounded(12) == 0 {
            match self.mailbox.clear_all_bets().await {
                Ok(_) | Err(Error::RoundInProgress) => {}
                Err(err) => return Err(err).context("bot clear failed"),
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct SimulationConfig {
    pub rounds: u64,
    pub starting_balance: Chips,
    /// Seeds both the engine and the bot; `None` uses OS entropy.
    pub seed: Option<u64>,
    pub round: RoundConfig,
    /// Inject a settlement failure after this many settled rounds.
    pub fail_after: Option<u64>,
}

/// Aggregate results of one simulation run.
#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub rounds_played: u64,
    pub wins: u64,
    pub losses: u64,
    pub pushes: u64,
    /// Total staked across all rounds, in cents.
    pub total_wagered: Chips,
    /// Sum of settlement nets, in cents.
    pub net: Chips,
    pub final_balance: Chips,
    pub stalled: bool,
}

/// Drive the engine for `config.rounds` rounds and collect a report.
pub async fn run(config: SimulationConfig) -> anyhow::Result<Report> {
    let service = SimulatedBalance::new(config.starting_balance, config.fail_after);
    let engine_rng = match config.seed {
        Some(seed) => RoundRng::from_seed(seed),
        None => RoundRng::from_entropy(),
    };
    let bot_rng = match config.seed {
        Some(seed) => RoundRng::from_seed(seed.wrapping_add(1)),
        None => RoundRng::from_entropy(),
    };

    let min_bet = config.round.min_bet;
    let (driver, mailbox, mut events, shutdown) =
        RoundDriver::new(config.round, service, engine_rng);
    let handle = tokio::spawn(driver.run());
    let mut bot = Bot::new(mailbox, bot_rng, min_bet);

    let mut report = Report {
        final_balance: config.starting_balance,
        ..Report::default()
    };
    while let Some(event) = events.recv().await {
        match event {
            RoundEvent::BetOpened { round, .. } => {
                if round >= config.rounds {
                    shutdown.trigger();
                } else {
                    bot.act().await?;
                }
            }
            RoundEvent::Settled {
                settlement,
                balance,
                ..
            } => {
                report.rounds_played += 1;
                report.total_wagered += settlement.total_bet;
                report.net += settlement.net;
                report.final_balance = balance;
                if settlement.net.is_positive() {
                    report.wins += 1;
                } else if settlement.net.is_zero() {
                    report.pushes += 1;
                } else {
                    report.losses += 1;
                }
            }
            RoundEvent::Stalled => report.stalled = true,
            RoundEvent::PreRoll { .. } | RoundEvent::Rolled { .. } => {}
        }
    }

    let (_session, result) = handle.await.context("driver task panicked")?;
    if result.is_err() && !report.stalled {
        result.context("driver failed")?;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_round() -> RoundConfig {
        RoundConfig {
            bet_millis: 20,
            preroll_min_millis: 5,
            preroll_max_millis: 10,
            roll_millis: 5,
            ..RoundConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_seeded_run_is_accounted() {
        let starting = Chips::from_whole(1_000);
        let report = run(SimulationConfig {
            rounds: 25,
            starting_balance: starting,
            seed: Some(42),
            round: fast_round(),
            fail_after: None,
        })
        .await
        .expect("simulation runs");

        assert_eq!(report.rounds_played, 25);
        assert_eq!(report.wins + report.losses + report.pushes, 25);
        assert!(!report.stalled);
        // Every staked cent flowed through the settlement nets.
        assert_eq!(report.final_balance, starting + report.net);
    }

    #[tokio::test(start_paused = true)]
    async fn test_injected_failure_stalls() {
        let report = run(SimulationConfig {
            rounds: 25,
            starting_balance: Chips::from_whole(100),
            seed: Some(7),
            round: fast_round(),
            fail_after: Some(3),
        })
        .await
        .expect("simulation reports the stall");

        assert!(report.stalled);
        assert_eq!(report.rounds_played, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_seed_reproducibility() {
        let config = SimulationConfig {
            rounds: 10,
            starting_balance: Chips::from_whole(500),
            seed: Some(99),
            round: fast_round(),
            fail_after: None,
        };
        let a = run(config.clone()).await.expect("first run");
        let b = run(config).await.expect("second run");

        assert_eq!(a.final_balance, b.final_balance);
        assert_eq!(a.total_wagered, b.total_wagered);
        assert_eq!(a.wins, b.wins);
    }
}
