//! Circuit breaker for a repeatedly failing dependency.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: dependency assumed down, calls fail fast until the cooldown ends
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive_failures >= threshold
//! Open → Closed (effective): cooldown elapses; the failure count is NOT
//!     reset, so the next failure re-opens the circuit immediately.
//!     Only a success resets the count.
//! ```
//!
//! # Design Decisions
//! - Fail fast in Open state, reporting the remaining cooldown
//! - Uses the tokio clock so tests can pause and advance time

use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
struct BreakerState {
    consecutive_failures: u32,
    open_until: Option<Instant>,
}

/// Consecutive-failure circuit breaker.
#[derive(Debug)]
pub struct CircuitBreaker {
    threshold: u32,
    cooldown: Duration,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(threshold: u32, cooldown: Duration) -> Self {
        Self {
            threshold,
            cooldown,
            state: Mutex::new(BreakerState {
                consecutive_failures: 0,
                open_until: None,
            }),
        }
    }

    /// Remaining cooldown if the circuit is currently open.
    pub fn open_remaining(&self) -> Option<Duration> {
        let state = self.state.lock().expect("circuit breaker mutex poisoned");
        let until = state.open_until?;
        let now = Instant::now();
        if until > now {
            Some(until - now)
        } else {
            None
        }
    }

    /// Record a failed call. Returns true if this failure opened the circuit.
    pub fn record_failure(&self) -> bool {
        let mut state = self.state.lock().expect("circuit breaker mutex poisoned");
        state.consecutive_failures += 1;
        if state.consecutive_failures >= self.threshold {
            state.open_until = Some(Instant::now() + self.cooldown);
            true
        } else {
            false
        }
    }

    /// Record a successful call, closing the circuit.
    pub fn record_success(&self) {
        let mut state = self.state.lock().expect("circuit breaker mutex poisoned");
        state.consecutive_failures = 0;
        state.open_until = None;
    }

    /// Current consecutive-failure count.
    pub fn consecutive_failures(&self) -> u32 {
        let state = self.state.lock().expect("circuit breaker mutex poisoned");
        state.consecutive_failures
    }
}
