//! Test doubles for the balance collaborator.

use crate::driver::BalanceService;
use crate::settle::SettlementError;
use std::sync::{Arc, Mutex};
use updown_types::Chips;

struct State {
    balance: Chips,
    submitted: Vec<Chips>,
    tags: Vec<String>,
    attempts: usize,
    fail_after: Option<usize>,
    fetch_fails: bool,
}

/// In-memory balance collaborator. Clones share state, so tests can
/// hand one clone to the driver and inspect another afterwards.
#[derive(Clone)]
pub struct MockBalanceService {
    state: Arc<Mutex<State>>,
}

impl MockBalanceService {
    pub fn new(balance: Chips) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                balance,
                submitted: Vec::new(),
                tags: Vec::new(),
                attempts: 0,
                fail_after: None,
                fetch_fails: false,
            })),
        }
    }

    /// Fail every settlement submission starting with attempt `n`
    /// (zero-based).
    pub fn fail_after(self, n: usize) -> Self {
        self.state.lock().expect("mock state poisoned").fail_after = Some(n);
        self
    }

    /// Fail the initial balance read.
    pub fn failing_fetch(self) -> Self {
        self.state.lock().expect("mock state poisoned").fetch_fails = true;
        self
    }

    pub fn balance(&self) -> Chips {
        self.state.lock().expect("mock state poisoned").balance
    }

    /// Nets of every accepted settlement, in order.
    pub fn submitted(&self) -> Vec<Chips> {
        self.state
            .lock()
            .expect("mock state poisoned")
            .submitted
            .clone()
    }

    /// Tags seen on accepted settlements.
    pub fn tags(&self) -> Vec<String> {
        self.state.lock().expect("mock state poisoned").tags.clone()
    }
}

impl BalanceService for MockBalanceService {
    async fn fetch_balance(&mut self) -> Result<Chips, SettlementError> {
        let state = self.state.lock().expect("mock state poisoned");
        if state.fetch_fails {
            return Err(SettlementError::Transport(
                "injected fetch failure".to_string(),
            ));
        }
        Ok(state.balance)
    }

    async fn submit_settlement(&mut self, net: Chips, tag: &str) -> Result<Chips, SettlementError> {
        let mut state = self.state.lock().expect("mock state poisoned");
        let attempt = state.attempts;
        state.attempts += 1;
        if state.fail_after.is_some_and(|n| attempt >= n) {
            return Err(SettlementError::Transport(
                "injected settlement failure".to_string(),
            ));
        }
        state.balance += net;
        state.submitted.push(net);
        state.tags.push(tag.to_string());
        Ok(state.balance)
    }
}
