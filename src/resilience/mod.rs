//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Connect attempt / statement:
//!     → timeouts.rs (every store call has a deadline)
//!     → On failure: circuit_breaker.rs (count failures, open after threshold)
//!     → backoff.rs (exponential delay with jitter before the next attempt)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Requests are never retried; only the connection manager retries
//! - Circuit breaker stops hammering a store that is persistently down

pub mod backoff;
pub mod circuit_breaker;
pub mod timeouts;

pub use backoff::{calculate_backoff, Backoff};
pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use timeouts::with_timeout;
