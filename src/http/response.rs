//! Error → response mapping.
//!
//! # Responsibilities
//! - Map every failure class to one status code and one JSON body shape
//! - Decide, in one place, whether raw error text reaches the client
//!
//! # Design Decisions
//! - Store absent → 503 before any statement runs (analytics included)
//! - Statement failure → 500, detail redacted unless explicitly enabled
//! - The full error is always logged server side

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::http::request::PayloadRejection;
use crate::store::StoreError;

pub const MSG_NOT_CONNECTED: &str = "Banco de dados não conectado";
pub const MSG_INTERNAL: &str = "Erro interno do servidor";
pub const MSG_BAD_REQUEST: &str = "Corpo da requisição inválido";

/// Client-facing failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("store not connected")]
    StoreUnavailable,

    #[error("internal error")]
    Internal { details: Option<String> },

    #[error("bad request")]
    BadRequest { details: Option<String> },
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn body(&self) -> ErrorBody {
        match self {
            ApiError::StoreUnavailable => ErrorBody {
                error: MSG_NOT_CONNECTED,
                details: None,
            },
            ApiError::Internal { details } => ErrorBody {
                error: MSG_INTERNAL,
                details: details.clone(),
            },
            ApiError::BadRequest { details } => ErrorBody {
                error: MSG_BAD_REQUEST,
                details: details.clone(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

/// Single redaction policy applied by every handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorPolicy {
    pub expose_internal_errors: bool,
}

impl ErrorPolicy {
    pub fn new(expose_internal_errors: bool) -> Self {
        Self {
            expose_internal_errors,
        }
    }

    /// Text that may be shown to a client for `error`, if any.
    pub fn detail(&self, error: &dyn std::fmt::Display) -> Option<String> {
        self.expose_internal_errors.then(|| error.to_string())
    }

    pub fn store_error(&self, error: &StoreError) -> ApiError {
        tracing::error!(error = %error, "Store operation failed");
        ApiError::Internal {
            details: self.detail(error),
        }
    }

    pub fn bad_request(&self, rejection: &PayloadRejection) -> ApiError {
        tracing::debug!(error = %rejection.body_text(), "Rejected request body");
        ApiError::BadRequest {
            details: self.detail(&rejection.body_text()),
        }
    }
}
