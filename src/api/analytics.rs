//! `GET /api/analytics/{slug}`: one handler shared by every report.

use axum::{extract::State, Json};

use crate::http::{ApiError, AppState};
use crate::store::Report;

pub async fn run(
    State(state): State<AppState>,
    report: Report,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    let store = state.store()?;
    let rows = store
        .run_report(report)
        .await
        .map_err(|e| state.store_failed(&store, e))?;

    tracing::debug!(report = %report, rows = rows.len(), "Report served");
    Ok(Json(rows))
}
