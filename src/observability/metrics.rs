//! Metrics collection and exposition.
//!
//! # Metrics
//! - `movieflix_requests_total` (counter): requests by method, route, status
//! - `movieflix_request_duration_seconds` (histogram): latency by route
//! - `movieflix_db_connect_attempts_total` (counter): by outcome
//! - `movieflix_db_connected` (gauge): 1=connected, 0=not
//! - `movieflix_db_circuit_state` (gauge): 0 closed, 1 open, 2 half-open

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::resilience::CircuitState;

/// Install the Prometheus recorder and its HTTP listener.
/// Must be called from inside the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    metrics::counter!(
        "movieflix_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "movieflix_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_connect_attempt(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    metrics::counter!("movieflix_db_connect_attempts_total", "outcome" => outcome).increment(1);
}

pub fn set_db_connected(connected: bool) {
    metrics::gauge!("movieflix_db_connected").set(if connected { 1.0 } else { 0.0 });
}

pub fn set_circuit_state(state: CircuitState) {
    metrics::gauge!("movieflix_db_circuit_state").set(state.as_gauge());
}

/// Axum middleware recording count and latency per matched route.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    record_request(&method, &route, response.status().as_u16(), start);
    response
}
