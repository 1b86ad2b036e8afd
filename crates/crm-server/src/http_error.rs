//! Uniform JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use crm_core::{CrmError, ValidationError};
use serde::Serialize;

/// Body returned for every failed request: `{"message", "code"}`.
#[derive(Debug, Serialize)]
pub struct HttpError {
    #[serde(skip)]
    pub status: StatusCode,
    pub message: String,
    pub code: &'static str,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>, code: &'static str) -> Self {
        Self {
            status,
            message: message.into(),
            code,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<ValidationError> for HttpError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::NoIdentifier => {
                HttpError::new(StatusCode::UNPROCESSABLE_ENTITY, err.to_string(), "NO_IDENTIFIER")
            }
            _ => HttpError::new(StatusCode::BAD_REQUEST, err.to_string(), "VALIDATION_ERROR"),
        }
    }
}

impl From<CrmError> for HttpError {
    fn from(err: CrmError) -> Self {
        match err {
            CrmError::Validation(e) => e.into(),
            CrmError::NotFound { .. } => {
                HttpError::new(StatusCode::NOT_FOUND, err.to_string(), "NOT_FOUND")
            }
            CrmError::Store(ref cause) => {
                tracing::error!(error = %cause, "Store failure");
                HttpError::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), "STORE_ERROR")
            }
            CrmError::Classification(ref cause) => {
                tracing::warn!(error = %cause, "Classification failure");
                HttpError::new(
                    StatusCode::BAD_GATEWAY,
                    "could not interpret query",
                    "CLASSIFICATION_ERROR",
                )
            }
        }
    }
}
