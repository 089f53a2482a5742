//! Store subsystem: the relational backing store behind every endpoint.
//!
//! # Data Flow
//! ```text
//! handler
//!     → StoreHandle::store() (connection/handle.rs)
//!     → dyn Store method (one parameterized statement)
//!     → mysql.rs (sqlx, single-connection pool)
//!     → rows decoded into models.rs / reports.rs types
//! ```
//!
//! # Design Decisions
//! - One trait method per operation; the trait is the seam tests fake
//! - Aggregation happens in SQL, never in process
//! - No transactions: every write is one autocommitted statement

pub mod errors;
pub mod models;
pub mod mysql;
pub mod reports;

use async_trait::async_trait;

pub use errors::StoreError;
pub use models::{MovieSummary, NewMovie, NewRating, Param, User};
pub use mysql::{MySqlConnector, MySqlStore};
pub use reports::Report;

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Operations the HTTP layer can issue against the store.
///
/// Every method performs exactly one round trip.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Cheap reachability check (`SELECT 1`).
    async fn ping(&self) -> Result<()>;

    /// Number of tables in the schema, logged as a smoke test on connect.
    async fn table_count(&self) -> Result<usize>;

    /// Every movie with its average rating and rating count.
    async fn list_movies(&self) -> Result<Vec<MovieSummary>>;

    /// Insert a movie, returning the generated identifier.
    async fn create_movie(&self, movie: &NewMovie) -> Result<u64>;

    /// Insert a rating stamped with the server time, returning its identifier.
    async fn create_rating(&self, rating: &NewRating) -> Result<u64>;

    async fn list_users(&self) -> Result<Vec<User>>;

    /// Run one of the analytical reports, rows already shaped as JSON.
    async fn run_report(&self, report: Report) -> Result<Vec<serde_json::Value>>;
}

/// Opens new store handles for the connection manager.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Human-readable target for logs (never includes credentials).
    fn target(&self) -> String;

    async fn connect(&self) -> Result<std::sync::Arc<dyn Store>>;
}
