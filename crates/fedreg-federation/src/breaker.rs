//! # Circuit Breaker for Federation Calls
//!
//! Stops hammering unreachable peers: after a run of consecutive
//! transport failures the breaker opens and rejects calls without network
//! I/O for a cooldown period, then admits a single half-open trial call
//! whose outcome closes or re-opens it.
//!
//! State machine:
//!
//! ```text
//! Closed -(failures >= threshold)-> Open -(cooldown elapsed)-> HalfOpen
//! HalfOpen -(success)-> Closed
//! HalfOpen -(failure)-> Open (fresh cooldown)
//! ```
//!
//! One breaker instance guards all peer traffic of a resolver; see the
//! notes on [`crate::resolver::FederationResolver`].

use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Observable breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Calls flow; consecutive failures are counted.
    Closed,
    /// Calls are rejected until the cooldown elapses.
    Open,
    /// One trial call is in flight; further calls are rejected.
    HalfOpen,
}

#[derive(Debug)]
struct BreakerInner {
    state: BreakerState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

/// Shared-state circuit breaker. All transitions run under one mutex;
/// the critical sections only read the clock and flip counters, so
/// contention stays negligible next to the network calls it guards.
#[derive(Debug)]
pub struct CircuitBreaker {
    threshold: u32,
    cooldown: Duration,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    /// A breaker that opens after `threshold` consecutive failures and
    /// cools down for `cooldown` before the half-open trial.
    pub fn new(threshold: u32, cooldown: Duration) -> Self {
        Self {
            threshold,
            cooldown,
            inner: Mutex::new(BreakerInner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                opened_at: None,
            }),
        }
    }

    /// Whether a call may proceed right now.
    ///
    /// In `Open`, an elapsed cooldown transitions to `HalfOpen` and grants
    /// this caller the trial slot; other callers are rejected until the
    /// trial reports back via [`record_success`](Self::record_success) or
    /// [`record_failure`](Self::record_failure).
    pub fn try_acquire(&self) -> bool {
        let mut inner = self.inner.lock();
        match inner.state {
            BreakerState::Closed => true,
            BreakerState::HalfOpen => false,
            BreakerState::Open => {
                let elapsed = inner
                    .opened_at
                    .map(|at| at.elapsed() >= self.cooldown)
                    .unwrap_or(true);
                if elapsed {
                    inner.state = BreakerState::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Report a successful call: closes the breaker and resets the count.
    pub fn record_success(&self) {
        let mut inner = self.inner.lock();
        if inner.state != BreakerState::Closed {
            tracing::info!("federation circuit breaker closed");
        }
        inner.state = BreakerState::Closed;
        inner.consecutive_failures = 0;
        inner.opened_at = None;
    }

    /// Report a failed call. The half-open trial failing, or the failure
    /// count reaching the threshold, opens the breaker with a fresh
    /// cooldown.
    pub fn record_failure(&self) {
        let mut inner = self.inner.lock();
        match inner.state {
            BreakerState::HalfOpen => {
                inner.state = BreakerState::Open;
                inner.opened_at = Some(Instant::now());
                tracing::warn!("federation circuit breaker re-opened after failed trial");
            }
            _ => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.threshold {
                    inner.state = BreakerState::Open;
                    inner.opened_at = Some(Instant::now());
                    tracing::warn!(
                        failures = inner.consecutive_failures,
                        "federation circuit breaker opened"
                    );
                }
            }
        }
    }

    /// The current state, for observability.
    pub fn state(&self) -> BreakerState {
        self.inner.lock().state
    }
}
