//! Health subsystem.
//!
//! # Data Flow
//! ```text
//! Active checks (active.rs):
//!     Periodic timer
//!     → ping installed store
//!     → broken connection, or N failed pings in a row: StoreHandle::mark_lost
//!
//! Passive checks (passive.rs):
//!     Handler observes a store error
//!     → connection-level? mark handle lost
//!     → busy (pool wait, statement deadline)? keep it
//!
//! State machine (state.rs):
//!     Disconnected → Connecting → Connected → Disconnected
//! ```
//!
//! # Design Decisions
//! - Detection lives here, repair lives in the connection manager
//! - 4xx-style statement failures never trigger a reconnect

pub mod active;
pub mod passive;
pub mod state;

pub use active::{LivenessMonitor, Ping};
pub use passive::observe_failure;
pub use state::ConnectionState;
