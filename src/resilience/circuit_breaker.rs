//! Circuit breaker for store connection attempts.
//!
//! # States
//! - Closed: normal operation, attempts pass through
//! - Open: store assumed down, attempts are refused
//! - Half-Open: testing if the store recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive failures >= threshold
//! Open → Half-Open: after cooldown
//! Half-Open → Closed: trial succeeds
//! Half-Open → Open: trial fails
//! ```
//!
//! # Design Decisions
//! - Owned by the connection manager task, so no interior locking
//! - Single trial in Half-Open (prevents hammering a recovering store)
//! - Time is passed in explicitly by the `_at` variants for testing

use std::time::{Duration, Instant};

/// Observable breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    /// Gauge encoding: 0 closed, 1 open, 2 half-open.
    pub fn as_gauge(self) -> f64 {
        match self {
            CircuitState::Closed => 0.0,
            CircuitState::Open => 1.0,
            CircuitState::HalfOpen => 2.0,
        }
    }
}

#[derive(Debug)]
enum Inner {
    Closed { failures: u32 },
    Open { since: Instant },
    HalfOpen { probing: bool },
}

#[derive(Debug)]
pub struct CircuitBreaker {
    inner: Inner,
    failure_threshold: u32,
    cooldown: Duration,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            inner: Inner::Closed { failures: 0 },
            failure_threshold: failure_threshold.max(1),
            cooldown,
        }
    }

    pub fn state(&self) -> CircuitState {
        match self.inner {
            Inner::Closed { .. } => CircuitState::Closed,
            Inner::Open { .. } => CircuitState::Open,
            Inner::HalfOpen { .. } => CircuitState::HalfOpen,
        }
    }

    pub fn allow_request(&mut self) -> bool {
        self.allow_request_at(Instant::now())
    }

    /// Whether an attempt may be made at `now`. Moves Open → Half-Open once
    /// the cooldown has elapsed and hands out exactly one trial.
    pub fn allow_request_at(&mut self, now: Instant) -> bool {
        match self.inner {
            Inner::Closed { .. } => true,
            Inner::Open { since } => {
                if now.saturating_duration_since(since) >= self.cooldown {
                    tracing::info!("Circuit half-open, probing store");
                    self.inner = Inner::HalfOpen { probing: true };
                    true
                } else {
                    false
                }
            }
            Inner::HalfOpen { probing } => {
                if probing {
                    false
                } else {
                    self.inner = Inner::HalfOpen { probing: true };
                    true
                }
            }
        }
    }

    /// Time left before the breaker will allow a trial, if it is open.
    pub fn remaining_cooldown_at(&self, now: Instant) -> Option<Duration> {
        match self.inner {
            Inner::Open { since } => {
                Some(self.cooldown.saturating_sub(now.saturating_duration_since(since)))
            }
            _ => None,
        }
    }

    pub fn record_success(&mut self) {
        if !matches!(self.inner, Inner::Closed { failures: 0 }) {
            tracing::info!("Circuit closed");
        }
        self.inner = Inner::Closed { failures: 0 };
    }

    pub fn record_failure(&mut self) {
        self.record_failure_at(Instant::now())
    }

    pub fn record_failure_at(&mut self, now: Instant) {
        match self.inner {
            Inner::Closed { failures } => {
                let failures = failures + 1;
                if failures >= self.failure_threshold {
                    tracing::warn!(
                        failures,
                        cooldown = ?self.cooldown,
                        "Circuit opened after consecutive connection failures"
                    );
                    self.inner = Inner::Open { since: now };
                } else {
                    self.inner = Inner::Closed { failures };
                }
            }
            Inner::HalfOpen { .. } => {
                tracing::warn!("Half-open trial failed, circuit re-opened");
                self.inner = Inner::Open { since: now };
            }
            Inner::Open { .. } => {
                self.inner = Inner::Open { since: now };
            }
        }
    }
}
