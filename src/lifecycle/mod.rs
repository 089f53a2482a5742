//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Args → load config → logging → metrics → store handle
//!     → connection manager + liveness monitor → bind → serve
//!
//! Shutdown (shutdown.rs):
//!     Trigger → broadcast to every task → server drains → tasks exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then core, then listeners
//! - The listener binds before the store is reachable; early requests get 503
//! - Background tasks get a bounded grace period after the server stops

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{run, Args, StartupError};
