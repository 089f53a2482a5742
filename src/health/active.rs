//! Active liveness probing.
//!
//! # Responsibilities
//! - Periodically ping the installed store
//! - Mark the handle lost on a broken connection, or after
//!   `failure_threshold` consecutive failed pings of any kind
//!
//! # Design Decisions
//! - A single slow ping means the connection is busy; only a streak counts

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::config::HealthConfig;
use crate::connection::StoreHandle;
use crate::health::passive::observe_failure;
use crate::resilience::with_timeout;
use crate::store::Store;

/// Outcome of one liveness ping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ping {
    /// No store installed; nothing to check.
    Idle,
    Healthy,
    /// Ping failed; the streak is still below the threshold.
    Failing { consecutive: u32 },
    /// The handle was cleared and the manager woken.
    Lost,
}

pub struct LivenessMonitor {
    handle: StoreHandle,
    config: HealthConfig,
    failures: u32,
}

impl LivenessMonitor {
    pub fn new(handle: StoreHandle, config: HealthConfig) -> Self {
        Self {
            handle,
            config,
            failures: 0,
        }
    }

    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        if self.config.ping_interval_secs == 0 {
            tracing::info!("Store liveness probing disabled");
            return;
        }

        tracing::info!(
            interval = self.config.ping_interval_secs,
            threshold = self.config.failure_threshold,
            "Liveness monitor starting"
        );

        let mut ticker = time::interval(Duration::from_secs(self.config.ping_interval_secs));
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Liveness monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Ping the installed store once.
    pub async fn check(&mut self) -> Ping {
        let Some(store) = self.handle.store() else {
            self.failures = 0;
            return Ping::Idle;
        };

        let timeout = Duration::from_secs(self.config.timeout_secs);
        match with_timeout(timeout, store.ping()).await {
            Ok(()) => {
                if self.failures > 0 {
                    tracing::info!(after = self.failures, "Liveness ping recovered");
                }
                self.failures = 0;
                Ping::Healthy
            }
            Err(e) => {
                if observe_failure(&self.handle, &store, &e) {
                    self.failures = 0;
                    return Ping::Lost;
                }

                self.failures = self.failures.saturating_add(1);
                tracing::warn!(
                    error = %e,
                    consecutive = self.failures,
                    threshold = self.config.failure_threshold,
                    "Liveness ping failed"
                );
                if self.failures >= self.config.failure_threshold {
                    self.failures = 0;
                    return self.give_up(&store);
                }
                Ping::Failing {
                    consecutive: self.failures,
                }
            }
        }
    }

    fn give_up(&self, store: &Arc<dyn Store>) -> Ping {
        tracing::warn!("Store unresponsive across consecutive pings, scheduling reconnect");
        if self.handle.mark_lost(store) {
            Ping::Lost
        } else {
            Ping::Idle
        }
    }
}
