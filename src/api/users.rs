use axum::{extract::State, Json};

use crate::http::{ApiError, AppState};
use crate::store::User;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let store = state.store()?;
    let users = store
        .list_users()
        .await
        .map_err(|e| state.store_failed(&store, e))?;
    Ok(Json(users))
}
