//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack, graceful shutdown)
//!     → request.rs (x-request-id assignment, request span, JSON/form bodies)
//!     → api/ route table → handler
//!     → response.rs (centralized error → status/body mapping)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{Payload, PayloadRejection, X_REQUEST_ID};
pub use response::{ApiError, ErrorPolicy};
pub use server::{AppState, HttpServer};
