//! Movie catalogue and ratings HTTP API over MySQL.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ http (middleware) ──▶ api (route table) ──▶ StoreHandle ──▶ Store (MySQL)
//!                                                                ▲
//!                       connection manager (backoff + breaker) ──┘
//!                       health (liveness ping, passive checks) ─┘ mark lost
//! ```
//!
//! The HTTP side never waits for the store: it reads whatever the
//! [`StoreHandle`] holds and answers 503 when it holds nothing.

// Core subsystems
pub mod api;
pub mod config;
pub mod http;
pub mod store;

// Store lifecycle
pub mod connection;
pub mod health;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::AppConfig;
pub use connection::{ConnectionManager, StoreHandle};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use store::{Report, Store, StoreError};
