//! Async round driver.
//!
//! The driver owns a [`Session`] and runs the phase cycle on a single
//! task: an open bet window, a short pre-roll pause with jitter, the
//! roll animation pause, then settlement against the balance
//! collaborator. Player commands arrive through a [`Mailbox`] and are
//! answered with a oneshot reply; the session's phase gate decides
//! whether a command landing mid-cycle is accepted. Phase timers race
//! against commands and the shutdown signal in one `select!`, so a
//! shutdown never waits for a timer to elapse.

use crate::rng::RoundRng;
use crate::session::Session;
use crate::settle::{Settlement, SettlementError};
use crate::{Error, Result};
use std::time::Duration;
use thiserror::Error as ThisError;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{self, Instant};
use tracing::warn;
use updown_types::{BetKey, Chips, Phase, RoundConfig, RoundOutcome};

use crate::lottery::MultiplierSet;

const MAILBOX_SIZE: usize = 64;

/// External owner of the player's balance. One initial read seeds the
/// session mirror; thereafter only signed settlement deltas are sent.
pub trait BalanceService: Send + 'static {
    /// Read the authoritative balance.
    fn fetch_balance(
        &mut self,
    ) -> impl std::future::Future<Output = std::result::Result<Chips, SettlementError>> + Send;

    /// Apply one round's signed net and return the resulting balance.
    fn submit_settlement(
        &mut self,
        net: Chips,
        tag: &str,
    ) -> impl std::future::Future<Output = std::result::Result<Chips, SettlementError>> + Send;
}

/// Player commands, each answered with the mirrored balance after the
/// operation.
pub enum Command {
    PlaceBet {
        key: BetKey,
        amount: Chips,
        response: oneshot::Sender<Result<Chips>>,
    },
    RepeatLastBet {
        response: oneshot::Sender<Result<Chips>>,
    },
    DoubleAllBets {
        response: oneshot::Sender<Result<Chips>>,
    },
    ClearAllBets {
        response: oneshot::Sender<Result<Chips>>,
    },
    Snapshot {
        response: oneshot::Sender<SessionView>,
    },
}

/// Point-in-time view of the session, served in any phase.
#[derive(Clone, Debug)]
pub struct SessionView {
    pub phase: Phase,
    pub round: u64,
    pub balance: Option<Chips>,
    pub exposure: Chips,
    pub multipliers: MultiplierSet,
    /// Rolled sums, newest first.
    pub history: Vec<u8>,
    pub stalled: bool,
}

/// Handle for issuing player commands to a running driver.
#[derive(Clone)]
pub struct Mailbox {
    sender: mpsc::Sender<Command>,
}

impl Mailbox {
    async fn request(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<Chips>>) -> Command,
    ) -> Result<Chips> {
        let (response, receiver) = oneshot::channel();
        self.sender
            .send(build(response))
            .await
            .map_err(|_| Error::SessionClosed)?;
        receiver.await.map_err(|_| Error::SessionClosed)?
    }

    pub async fn place_bet(&self, key: BetKey, amount: Chips) -> Result<Chips> {
        self.request(|response| Command::PlaceBet {
            key,
            amount,
            response,
        })
        .await
    }

    pub async fn repeat_last_bet(&self) -> Result<Chips> {
        self.request(|response| Command::RepeatLastBet { response })
            .await
    }

    pub async fn double_all_bets(&self) -> Result<Chips> {
        self.request(|response| Command::DoubleAllBets { response })
            .await
    }

    pub async fn clear_all_bets(&self) -> Result<Chips> {
        self.request(|response| Command::ClearAllBets { response })
            .await
    }

    pub async fn snapshot(&self) -> Result<SessionView> {
        let (response, receiver) = oneshot::channel();
        self.sender
            .send(Command::Snapshot { response })
            .await
            .map_err(|_| Error::SessionClosed)?;
        receiver.await.map_err(|_| Error::SessionClosed)
    }
}

/// Requests a clean stop. Triggering mid-phase interrupts the pending
/// timer instead of letting it run out.
pub struct Shutdown {
    sender: watch::Sender<bool>,
}

impl Shutdown {
    pub fn trigger(&self) {
        let _ = self.sender.send(true);
    }
}

/// Phase transitions observed by the presentation layer.
#[derive(Clone, Debug)]
pub enum RoundEvent {
    BetOpened {
        round: u64,
        balance: Chips,
    },
    PreRoll {
        multipliers: MultiplierSet,
    },
    Rolled {
        outcome: RoundOutcome,
    },
    Settled {
        outcome: RoundOutcome,
        settlement: Settlement,
        balance: Chips,
    },
    Stalled,
}

/// Terminal driver failures. A clean shutdown or a dropped mailbox is
/// not an error.
#[derive(ThisError, Debug)]
pub enum DriverError {
    #[error("initial balance load failed: {0}")]
    BalanceLoad(#[source] SettlementError),
    #[error("settlement failed; session stalled: {0}")]
    Stalled(#[source] SettlementError),
}

enum Wait {
    Elapsed,
    Closed,
}

pub struct RoundDriver<B: BalanceService> {
    session: Session,
    rng: RoundRng,
    service: B,
    commands: mpsc::Receiver<Command>,
    events: mpsc::UnboundedSender<RoundEvent>,
    shutdown: watch::Receiver<bool>,
    shutdown_armed: bool,
}

impl<B: BalanceService> RoundDriver<B> {
    pub fn new(
        config: RoundConfig,
        service: B,
        rng: RoundRng,
    ) -> (
        Self,
        Mailbox,
        mpsc::UnboundedReceiver<RoundEvent>,
        Shutdown,
    ) {
        let (sender, commands) = mpsc::channel(MAILBOX_SIZE);
        let (events, event_receiver) = mpsc::unbounded_channel();
        let (shutdown_sender, shutdown) = watch::channel(false);

        (
            Self {
                session: Session::new(config),
                rng,
                service,
                commands,
                events,
                shutdown,
                shutdown_armed: true,
            },
            Mailbox { sender },
            event_receiver,
            Shutdown {
                sender: shutdown_sender,
            },
        )
    }

    fn emit(&self, event: RoundEvent) {
        // The presentation side may have gone away; that never stops
        // the round cycle.
        let _ = self.events.send(event);
    }

    fn mirrored_balance(&self) -> Result<Chips> {
        self.session.balance().ok_or(Error::BalanceNotReady)
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::PlaceBet {
                key,
                amount,
                response,
            } => {
                let result = self
                    .session
                    .place_bet(key, amount)
                    .and_then(|()| self.mirrored_balance());
                let _ = response.send(result);
            }
            Command::RepeatLastBet { response } => {
                let result = self
                    .session
                    .repeat_last_bet()
                    .and_then(|()| self.mirrored_balance());
                let _ = response.send(result);
            }
            Command::DoubleAllBets { response } => {
                let result = self
                    .session
                    .double_all_bets()
                    .and_then(|()| self.mirrored_balance());
                let _ = response.send(result);
            }
            Command::ClearAllBets { response } => {
                let result = self
                    .session
                    .clear_all_bets()
                    .and_then(|()| self.mirrored_balance());
                let _ = response.send(result);
            }
            Command::Snapshot { response } => {
                let _ = response.send(SessionView {
                    phase: self.session.phase(),
                    round: self.session.round(),
                    balance: self.session.balance(),
                    exposure: self.session.exposure(),
                    multipliers: self.session.multipliers().clone(),
                    history: self.session.history().collect(),
                    stalled: self.session.is_stalled(),
                });
            }
        }
    }

    /// Serve commands until the deadline, the shutdown signal, or the
    /// last mailbox handle going away.
    async fn wait_phase(&mut self, deadline: Instant) -> Wait {
        loop {
            tokio::select! {
                _ = time::sleep_until(deadline) => return Wait::Elapsed,
                changed = self.shutdown.changed(), if self.shutdown_armed => {
                    match changed {
                        Ok(()) if *self.shutdown.borrow() => return Wait::Closed,
                        Ok(()) => {}
                        // Shutdown handle dropped without triggering.
                        Err(_) => self.shutdown_armed = false,
                    }
                }
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => return Wait::Closed,
                },
            }
        }
    }

    /// Run the phase cycle until shutdown, mailbox closure, or a stall.
    /// The session is returned either way so callers can inspect its
    /// terminal state.
    pub async fn run(mut self) -> (Session, std::result::Result<(), DriverError>) {
        match self.service.fetch_balance().await {
            Ok(balance) => self.session.set_balance(balance),
            Err(err) => {
                warn!(%err, "initial balance load failed");
                return (self.session, Err(DriverError::BalanceLoad(err)));
            }
        }

        loop {
            self.emit(RoundEvent::BetOpened {
                round: self.session.round(),
                balance: self.session.balance().unwrap_or(Chips::ZERO),
            });
            let deadline =
                Instant::now() + Duration::from_millis(self.session.config().bet_millis);
            if matches!(self.wait_phase(deadline).await, Wait::Closed) {
                return (self.session, Ok(()));
            }

            let multipliers = self.session.begin_preroll(&mut self.rng).clone();
            self.emit(RoundEvent::PreRoll { multipliers });
            let (min, max) = {
                let config = self.session.config();
                (config.preroll_min_millis, config.preroll_max_millis)
            };
            let jitter = self.rng.next_bounded(max.saturating_sub(min) as u32 + 1) as u64;
            let deadline = Instant::now() + Duration::from_millis(min + jitter);
            if matches!(self.wait_phase(deadline).await, Wait::Closed) {
                return (self.session, Ok(()));
            }

            let outcome = self.session.begin_roll(&mut self.rng);
            self.emit(RoundEvent::Rolled { outcome });
            let deadline =
                Instant::now() + Duration::from_millis(self.session.config().roll_millis);
            if matches!(self.wait_phase(deadline).await, Wait::Closed) {
                return (self.session, Ok(()));
            }

            // Settlement is deliberately outside the select: once the
            // outcome has been shown, the collaborator must hear about
            // it even if a shutdown arrives meanwhile.
            let settlement = self.session.settlement(outcome);
            let tag = self.session.config().settlement_tag.clone();
            match self.service.submit_settlement(settlement.net, &tag).await {
                Ok(balance) => {
                    self.session.apply_settlement(Ok(balance));
                    self.emit(RoundEvent::Settled {
                        outcome,
                        settlement,
                        balance,
                    });
                }
                Err(err) => {
                    self.session.apply_settlement(Err(err.clone()));
                    self.emit(RoundEvent::Stalled);
                    return (self.session, Err(DriverError::Stalled(err)));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockBalanceService;
    use updown_types::constants::DEFAULT_SETTLEMENT_TAG;
    use updown_types::{RangeKey, SumKey};

    fn fast_config() -> RoundConfig {
        RoundConfig {
            bet_millis: 20,
            preroll_min_millis: 5,
            preroll_max_millis: 10,
            roll_millis: 5,
            ..RoundConfig::default()
        }
    }

    fn sum_key(n: u8) -> BetKey {
        BetKey::Sum(SumKey::new(n).expect("valid sum"))
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_settles_through_service() {
        let service = MockBalanceService::new(Chips::from_whole(10));
        let (driver, mailbox, mut events, _shutdown) =
            RoundDriver::new(fast_config(), service.clone(), RoundRng::from_seed(11));
        let handle = tokio::spawn(driver.run());

        match events.recv().await {
            Some(RoundEvent::BetOpened { round, balance }) => {
                assert_eq!(round, 0);
                assert_eq!(balance, Chips::from_whole(10));
            }
            other => panic!("expected bet window, got {other:?}"),
        }

        let balance = mailbox
            .place_bet(BetKey::Range(RangeKey::Down), Chips::from_whole(1))
            .await
            .expect("bet accepted");
        assert_eq!(balance, Chips::from_whole(9));

        let view = mailbox.snapshot().await.expect("snapshot served");
        assert_eq!(view.phase, Phase::Bet);
        assert_eq!(view.exposure, Chips::from_whole(1));
        assert_eq!(view.balance, Some(Chips::from_whole(9)));
        assert!(!view.stalled);

        loop {
            match events.recv().await.expect("driver alive") {
                RoundEvent::Settled {
                    settlement,
                    balance,
                    ..
                } => {
                    assert_eq!(settlement.total_bet, Chips::from_whole(1));
                    // Mirror after placement plus the gross win equals
                    // the collaborator's post-settlement balance.
                    assert_eq!(balance, Chips::from_whole(9) + settlement.win);
                    break;
                }
                RoundEvent::Stalled => panic!("unexpected stall"),
                _ => {}
            }
        }

        assert_eq!(service.submitted().len(), 1);
        assert_eq!(service.tags(), vec![DEFAULT_SETTLEMENT_TAG.to_string()]);

        drop(mailbox);
        let (session, result) = handle.await.expect("driver task");
        assert!(result.is_ok());
        assert_eq!(session.round(), 1);
        assert!(session.ledger().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_rejected_outside_bet_window() {
        let service = MockBalanceService::new(Chips::from_whole(10));
        let (driver, mailbox, mut events, _shutdown) =
            RoundDriver::new(fast_config(), service, RoundRng::from_seed(2));
        let handle = tokio::spawn(driver.run());

        loop {
            match events.recv().await.expect("driver alive") {
                RoundEvent::PreRoll { .. } => break,
                _ => {}
            }
        }

        let result = mailbox.place_bet(sum_key(7), Chips::from_whole(1)).await;
        assert_eq!(result, Err(Error::RoundInProgress));

        drop(mailbox);
        let (_, result) = handle.await.expect("driver task");
        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_settlement_failure_stalls_driver() {
        let service = MockBalanceService::new(Chips::from_whole(10)).fail_after(0);
        let (driver, mailbox, mut events, _shutdown) =
            RoundDriver::new(fast_config(), service.clone(), RoundRng::from_seed(3));
        let handle = tokio::spawn(driver.run());

        match events.recv().await {
            Some(RoundEvent::BetOpened { .. }) => {}
            other => panic!("expected bet window, got {other:?}"),
        }
        mailbox
            .place_bet(sum_key(7), Chips::from_whole(2))
            .await
            .expect("bet accepted");

        loop {
            match events.recv().await.expect("driver alive") {
                RoundEvent::Stalled => break,
                RoundEvent::Settled { .. } => panic!("settlement should fail"),
                _ => {}
            }
        }

        let (session, result) = handle.await.expect("driver task");
        assert!(matches!(result, Err(DriverError::Stalled(_))));
        // The round is left unresolved: wagers intact, phase frozen.
        assert!(session.is_stalled());
        assert_eq!(session.phase(), Phase::Rolling);
        assert_eq!(session.exposure(), Chips::from_whole(2));
        assert!(service.submitted().is_empty());

        // The driver is gone, so the mailbox reports closure.
        let result = mailbox.place_bet(sum_key(7), Chips::from_whole(1)).await;
        assert_eq!(result, Err(Error::SessionClosed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_bet_timer() {
        let service = MockBalanceService::new(Chips::from_whole(10));
        let (driver, _mailbox, mut events, shutdown) =
            RoundDriver::new(fast_config(), service.clone(), RoundRng::from_seed(4));
        let handle = tokio::spawn(driver.run());

        match events.recv().await {
            Some(RoundEvent::BetOpened { .. }) => {}
            other => panic!("expected bet window, got {other:?}"),
        }
        shutdown.trigger();

        let (session, result) = handle.await.expect("driver task");
        assert!(result.is_ok());
        // Stopped inside the first bet window: nothing rolled, nothing
        // submitted.
        assert_eq!(session.round(), 0);
        assert!(service.submitted().is_empty());
        assert!(events.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_balance_load_failure() {
        let service = MockBalanceService::new(Chips::from_whole(10)).failing_fetch();
        let (driver, _mailbox, _events, _shutdown) =
            RoundDriver::new(fast_config(), service, RoundRng::from_seed(5));

        let (session, result) = driver.run().await;
        assert!(matches!(result, Err(DriverError::BalanceLoad(_))));
        assert_eq!(session.balance(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_round_submits_zero_net() {
        let service = MockBalanceService::new(Chips::from_whole(5));
        let (driver, mailbox, mut events, _shutdown) =
            RoundDriver::new(fast_config(), service.clone(), RoundRng::from_seed(6));
        let handle = tokio::spawn(driver.run());

        loop {
            match events.recv().await.expect("driver alive") {
                RoundEvent::Settled {
                    settlement,
                    balance,
                    ..
                } => {
                    assert_eq!(settlement.net, Chips::ZERO);
                    assert_eq!(balance, Chips::from_whole(5));
                    break;
                }
                _ => {}
            }
        }

        // Idle rounds still submit their (zero) net.
        assert_eq!(service.submitted(), vec![Chips::ZERO]);

        drop(mailbox);
        let (_, result) = handle.await.expect("driver task");
        assert!(result.is_ok());
    }
}
