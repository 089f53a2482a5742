//! Passive failure detection.
//!
//! # Design Decisions
//! - Only connection-level failures count; a bad statement or a constraint
//!   violation says nothing about the connection
//! - Waiting for the single connection (pool wait, statement deadline) is
//!   load, not loss
//! - The handle is only cleared if it still holds the store that failed

use std::sync::Arc;

use crate::connection::StoreHandle;
use crate::store::{Store, StoreError};

/// Feed a store error observed while serving a request back into the
/// connection lifecycle. Returns true when the handle was marked lost.
pub fn observe_failure(handle: &StoreHandle, store: &Arc<dyn Store>, error: &StoreError) -> bool {
    if error.is_busy() {
        tracing::debug!(error = %error, "Store busy, keeping connection");
        return false;
    }
    if !error.is_connection_failure() {
        return false;
    }
    tracing::warn!(error = %error, "Store connection failure observed, scheduling reconnect");
    handle.mark_lost(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MovieSummary, NewMovie, NewRating, Report, Result, User};
    use async_trait::async_trait;
    use std::time::Duration;

    struct Null;

    #[async_trait]
    impl Store for Null {
        async fn ping(&self) -> Result<()> {
            Ok(())
        }
        async fn table_count(&self) -> Result<usize> {
            Ok(0)
        }
        async fn list_movies(&self) -> Result<Vec<MovieSummary>> {
            Ok(Vec::new())
        }
        async fn create_movie(&self, _: &NewMovie) -> Result<u64> {
            Ok(1)
        }
        async fn create_rating(&self, _: &NewRating) -> Result<u64> {
            Ok(1)
        }
        async fn list_users(&self) -> Result<Vec<User>> {
            Ok(Vec::new())
        }
        async fn run_report(&self, _: Report) -> Result<Vec<serde_json::Value>> {
            Ok(Vec::new())
        }
    }

    fn connected() -> (StoreHandle, Arc<dyn Store>) {
        let handle = StoreHandle::new();
        let store: Arc<dyn Store> = Arc::new(Null);
        handle.install(store.clone());
        (handle, store)
    }

    #[test]
    fn test_pool_wait_keeps_handle() {
        let (handle, store) = connected();

        let err = StoreError::Database(sqlx::Error::PoolTimedOut);
        assert!(!observe_failure(&handle, &store, &err));
        assert!(!observe_failure(&handle, &store, &StoreError::Timeout(Duration::from_secs(10))));
        assert!(handle.is_connected());
    }

    #[test]
    fn test_broken_connection_clears_handle() {
        let (handle, store) = connected();

        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "broken pipe");
        assert!(observe_failure(&handle, &store, &StoreError::Database(sqlx::Error::Io(io))));
        assert!(!handle.is_connected());
    }

    #[test]
    fn test_statement_error_keeps_handle() {
        let (handle, store) = connected();
        assert!(!observe_failure(&handle, &store, &StoreError::Other("syntax".into())));
        assert!(handle.is_connected());
    }
}
