//! Connection manager: connect, detect failure, back off, retry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::ReconnectConfig;
use crate::connection::StoreHandle;
use crate::health::ConnectionState;
use crate::observability::metrics;
use crate::resilience::{Backoff, CircuitBreaker};
use crate::store::{Connector, StoreError};

/// Owns the reconnect loop for one [`StoreHandle`].
pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    handle: StoreHandle,
    config: ReconnectConfig,
}

/// Why [`ConnectionManager::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerExit {
    Shutdown,
    AttemptsExhausted,
}

impl ConnectionManager {
    pub fn new(connector: Arc<dyn Connector>, handle: StoreHandle, config: ReconnectConfig) -> Self {
        Self {
            connector,
            handle,
            config,
        }
    }

    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<ManagerExit> {
        tokio::spawn(self.run(shutdown))
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> ManagerExit {
        let mut breaker = CircuitBreaker::new(
            self.config.failure_threshold,
            Duration::from_secs(self.config.open_cooldown_secs),
        );
        let mut backoff = Backoff::new(self.config.base_delay_ms, self.config.max_delay_ms);
        let mut attempts: u32 = 0;
        let target = self.connector.target();

        loop {
            if self.handle.is_connected() {
                tokio::select! {
                    _ = self.handle.lost() => {
                        tracing::warn!(store = %target, "Store connection lost, reconnecting");
                        continue;
                    }
                    _ = shutdown.recv() => return ManagerExit::Shutdown,
                }
            }

            if self.config.max_attempts > 0 && attempts >= self.config.max_attempts {
                tracing::error!(
                    store = %target,
                    attempts,
                    "Giving up on store connection; requests will keep receiving 503"
                );
                self.handle.set_state(ConnectionState::Disconnected);
                return ManagerExit::AttemptsExhausted;
            }

            if !breaker.allow_request() {
                let wait = breaker
                    .remaining_cooldown_at(Instant::now())
                    .unwrap_or_else(|| Duration::from_millis(self.config.base_delay_ms));
                tracing::debug!(wait = ?wait, "Circuit open, waiting before next attempt");
                tokio::select! {
                    _ = tokio::time::sleep(wait) => continue,
                    _ = shutdown.recv() => return ManagerExit::Shutdown,
                }
            }

            attempts = attempts.saturating_add(1);
            self.handle.set_state(ConnectionState::Connecting);
            tracing::info!(store = %target, attempt = attempts, "Connecting to store");

            match self.connector.connect().await {
                Ok(store) => {
                    breaker.record_success();
                    backoff.reset();
                    attempts = 0;
                    metrics::record_connect_attempt(true);
                    metrics::set_circuit_state(breaker.state());

                    match store.table_count().await {
                        Ok(tables) => {
                            tracing::info!(store = %target, tables, "Connected to store")
                        }
                        Err(e) => tracing::warn!(
                            store = %target,
                            error = %e,
                            "Connected to store, but table listing failed"
                        ),
                    }
                    self.handle.install(store);
                }
                Err(e) => {
                    breaker.record_failure();
                    metrics::record_connect_attempt(false);
                    metrics::set_circuit_state(breaker.state());
                    self.handle.set_state(ConnectionState::Disconnected);

                    let delay = backoff.next_delay();
                    log_connect_failure(&target, attempts, &e, delay);

                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = shutdown.recv() => return ManagerExit::Shutdown,
                    }
                }
            }
        }
    }
}

fn log_connect_failure(target: &str, attempt: u32, error: &StoreError, delay: Duration) {
    tracing::error!(
        store = %target,
        attempt,
        error = %error,
        retry_in = ?delay,
        "Store connection failed"
    );
}
