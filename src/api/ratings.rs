//! `POST /api/ratings`.

use axum::{extract::State, Json};

use crate::api::movies::Created;
use crate::http::{ApiError, AppState, Payload, PayloadRejection};
use crate::store::NewRating;

pub const RATING_CREATED: &str = "Avaliação registrada com sucesso!";

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Payload<NewRating>, PayloadRejection>,
) -> Result<Json<Created>, ApiError> {
    let store = state.store()?;
    let Payload(rating) = payload.map_err(|e| state.errors.bad_request(&e))?;

    let id = store
        .create_rating(&rating)
        .await
        .map_err(|e| state.store_failed(&store, e))?;

    tracing::info!(
        id,
        movie_id = rating.movie_id.as_ref().map(tracing::field::display),
        "Rating recorded"
    );
    Ok(Json(Created {
        id,
        message: RATING_CREATED,
    }))
}
