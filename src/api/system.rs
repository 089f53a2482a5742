//! Liveness and connection introspection.
//!
//! Neither handler goes through [`ApiError`](crate::http::ApiError): their
//! failure bodies have their own shape (`status`/`database` for `/health`,
//! `connected` for the debug endpoint).

use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::health::observe_failure;
use crate::http::response::{MSG_INTERNAL, MSG_NOT_CONNECTED};
use crate::http::AppState;
use crate::resilience::with_timeout;
use crate::store::StoreError;

/// `GET /health`: ping the store within the health deadline.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let Some(store) = state.handle.store() else {
        return unhealthy(MSG_NOT_CONNECTED.to_string());
    };

    let timeout = Duration::from_secs(state.health.timeout_secs);
    match with_timeout(timeout, store.ping()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "OK",
                "database": "connected",
                "timestamp": chrono::Utc::now().to_rfc3339(),
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check ping failed");
            observe_failure(&state.handle, &store, &e);
            unhealthy(error_text(&state, &e))
        }
    }
}

fn unhealthy(error: String) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({
            "status": "ERROR",
            "database": "disconnected",
            "error": error,
        })),
    )
}

/// `GET /api/debug/db`: always 200, `connected` tells the story.
pub async fn debug_db(State(state): State<AppState>) -> Json<serde_json::Value> {
    let Some(store) = state.handle.store() else {
        return Json(json!({ "connected": false, "error": MSG_NOT_CONNECTED }));
    };

    match store.ping().await {
        Ok(()) => Json(json!({
            "connected": true,
            "test": [{ "test": 1 }],
            "config": {
                "host": state.database.host,
                "database": state.database.name,
                "user": state.database.user,
            },
        })),
        Err(e) => {
            tracing::warn!(error = %e, "Debug connection test failed");
            observe_failure(&state.handle, &store, &e);
            Json(json!({ "connected": false, "error": error_text(&state, &e) }))
        }
    }
}

fn error_text(state: &AppState, error: &StoreError) -> String {
    state
        .errors
        .detail(error)
        .unwrap_or_else(|| MSG_INTERNAL.to_string())
}
