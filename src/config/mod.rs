//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! movieflix.toml (optional)
//!     → loader.rs (parse & deserialize, overlay DB_* / PORT env vars)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → shared by value / Arc with every subsystem
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults so an empty file (or no file) is valid
//! - Environment overrides the file, matching the container deployment
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AppConfig, DatabaseConfig, HealthConfig, LogFormat, ObservabilityConfig, ReconnectConfig,
    ServerConfig,
};
