//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router from the api route table
//! - Wire up middleware (request ID, tracing, timeout, body limit, metrics)
//! - Serve the static landing page for everything the table does not match
//! - Bind server to listener and drain on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer, services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer,
};

use crate::api;
use crate::config::{AppConfig, DatabaseConfig, HealthConfig};
use crate::connection::StoreHandle;
use crate::health::observe_failure;
use crate::http::request::{propagate_request_id_layer, request_span, set_request_id_layer};
use crate::http::response::{ApiError, ErrorPolicy};
use crate::observability::metrics;
use crate::store::{Store, StoreError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub handle: StoreHandle,
    pub errors: ErrorPolicy,
    pub database: Arc<DatabaseConfig>,
    pub health: HealthConfig,
}

impl AppState {
    pub fn new(config: &AppConfig, handle: StoreHandle) -> Self {
        Self {
            handle,
            errors: ErrorPolicy::new(config.server.expose_internal_errors),
            database: Arc::new(config.database.clone()),
            health: config.health.clone(),
        }
    }

    /// The live store, or 503 when none is installed.
    pub fn store(&self) -> Result<Arc<dyn Store>, ApiError> {
        self.handle.store().ok_or(ApiError::StoreUnavailable)
    }

    /// Map a failed store call to a response, reporting connection loss.
    pub fn store_failed(&self, store: &Arc<dyn Store>, error: StoreError) -> ApiError {
        observe_failure(&self.handle, store, &error);
        self.errors.store_error(&error)
    }
}

/// HTTP server for the movieflix API.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new HTTP server reading the store from `handle`.
    pub fn new(config: AppConfig, handle: StoreHandle) -> Self {
        let state = AppState::new(&config, handle);
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        api::routes()
            .fallback_service(ServeDir::new(&config.server.static_dir))
            .with_state(state)
            .layer(middleware::from_fn(metrics::track_requests))
            .layer(RequestBodyLimitLayer::new(config.server.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(set_request_id_layer())
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            static_dir = %self.config.server.static_dir,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}
