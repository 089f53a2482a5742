//! `GET /api/movies` and `POST /api/movies`.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::{ApiError, AppState, Payload, PayloadRejection};
use crate::store::{MovieSummary, NewMovie};

pub const MOVIE_CREATED: &str = "Filme cadastrado com sucesso!";

/// Reply to a successful insert.
#[derive(Debug, Serialize)]
pub struct Created {
    pub id: u64,
    pub message: &'static str,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<MovieSummary>>, ApiError> {
    let store = state.store()?;
    let movies = store
        .list_movies()
        .await
        .map_err(|e| state.store_failed(&store, e))?;
    Ok(Json(movies))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Payload<NewMovie>, PayloadRejection>,
) -> Result<Json<Created>, ApiError> {
    let store = state.store()?;
    let Payload(movie) = payload.map_err(|e| state.errors.bad_request(&e))?;

    let id = store
        .create_movie(&movie)
        .await
        .map_err(|e| state.store_failed(&store, e))?;

    tracing::info!(
        id,
        title = movie.title.as_ref().map(tracing::field::display),
        "Movie created"
    );
    Ok(Json(Created {
        id,
        message: MOVIE_CREATED,
    }))
}
