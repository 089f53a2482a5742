//! Store error type.

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("row could not be shaped as JSON: {0}")]
    Encode(#[from] serde_json::Error),

    /// Raised by non-MySQL stores (tests, fakes).
    #[error("{0}")]
    Other(String),
}

impl StoreError {
    /// True when the failure says the connection itself is gone, as opposed
    /// to a bad statement or a constraint violation.
    ///
    /// Waiting on the single connection (`PoolTimedOut`, a statement
    /// deadline) means busy, not lost.
    pub fn is_connection_failure(&self) -> bool {
        match self {
            StoreError::Database(e) => matches!(
                e,
                sqlx::Error::Io(_)
                    | sqlx::Error::Tls(_)
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::WorkerCrashed
                    | sqlx::Error::Protocol(_)
            ),
            StoreError::Timeout(_) | StoreError::Encode(_) | StoreError::Other(_) => false,
        }
    }

    /// True when the store is alive but occupied.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            StoreError::Timeout(_) | StoreError::Database(sqlx::Error::PoolTimedOut)
        )
    }
}
