//! Connection lifecycle subsystem.
//!
//! # Data Flow
//! ```text
//! startup
//!     → ConnectionManager::run (manager.rs)
//!         → Connector::connect (bounded by connect timeout)
//!         → success: StoreHandle::install (handle.rs)
//!         → failure: CircuitBreaker + Backoff, then retry
//!
//! handlers / liveness ping
//!     → StoreHandle::store()            (lock-free read)
//!     → StoreHandle::mark_lost()        (connection-level failure)
//!     → manager wakes, reconnects
//! ```
//!
//! # Design Decisions
//! - The handle is owned by the server and injected, never global
//! - Only the manager installs stores; handlers only read or report loss
//! - Reads are lock-free (arc-swap), so a reconnect never blocks requests

pub mod handle;
pub mod manager;

pub use handle::StoreHandle;
pub use manager::ConnectionManager;
