//! Request dispatch table.
//!
//! Every (method, path) the service answers is listed in [`routes`]; each
//! entry resolves the store, runs one operation and shapes the result.
//! Entries are independent and their order does not matter.

pub mod analytics;
pub mod movies;
pub mod ratings;
pub mod system;
pub mod users;

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};

use crate::http::AppState;
use crate::store::Report;

pub const ANALYTICS_PREFIX: &str = "/api/analytics";

/// Build the flat route table. `GET /` and other static assets are served
/// by the server's fallback.
pub fn routes() -> Router<AppState> {
    let router = Router::new()
        .route("/health", get(system::health))
        .route("/api/debug/db", get(system::debug_db))
        .route("/api/movies", get(movies::list).post(movies::create))
        .route("/api/ratings", post(ratings::create))
        .route("/api/users", get(users::list));

    Report::ALL.into_iter().fold(router, |router, report| {
        router.route(
            &report_path(report),
            get(move |state: State<AppState>| analytics::run(state, report)),
        )
    })
}

pub fn report_path(report: Report) -> String {
    format!("{}/{}", ANALYTICS_PREFIX, report.slug())
}
