//! Row and payload types.
//!
//! Payload fields are optional and bound verbatim: a missing field becomes
//! NULL and the schema decides whether that is acceptable.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A movie with its aggregated rating, as listed by `GET /api/movies`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MovieSummary {
    pub id: i64,
    pub title: Option<String>,
    /// Comma-separated genre list, e.g. "Action, Sci-Fi".
    pub genre: Option<String>,
    pub release_year: Option<i32>,
    pub director: Option<String>,
    pub country: Option<String>,
    /// Minutes.
    pub duration: Option<i32>,
    pub created_at: Option<NaiveDateTime>,
    /// NULL when the movie has no ratings yet.
    pub avg_rating: Option<f64>,
    pub rating_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
    pub country: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

/// One request field, kept as the client sent it.
///
/// JSON numbers stay numbers, everything from a form arrives as text; the
/// store coerces it to the column type on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Param {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl std::fmt::Display for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Param::Int(v) => write!(f, "{v}"),
            Param::Float(v) => write!(f, "{v}"),
            Param::Bool(v) => write!(f, "{v}"),
            Param::Text(v) => f.write_str(v),
        }
    }
}

/// Body of `POST /api/movies`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewMovie {
    pub title: Option<Param>,
    pub genre: Option<Param>,
    pub release_year: Option<Param>,
    pub director: Option<Param>,
    pub country: Option<Param>,
    #[serde(default)]
    pub duration: Option<Param>,
}

/// Body of `POST /api/ratings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewRating {
    pub movie_id: Option<Param>,
    pub user_id: Option<Param>,
    pub rating: Option<Param>,
    #[serde(default)]
    pub comment: Option<Param>,
}
