use thiserror::Error;

use crate::types::{EntityId, EntityKind};

/// Top-level error type for the CRM service.
#[derive(Error, Debug)]
pub enum CrmError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("{kind} with id {id} not found")]
    NotFound { kind: EntityKind, id: EntityId },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Classification error: {0}")]
    Classification(String),
}

/// Caller-side input problems. Each maps to a 4xx response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field `{field}`")]
    MissingField { field: String },

    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("unrecognized entity kind `{0}` (expected customer, opportunity or interaction)")]
    UnknownEntityKind(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("no identifiable entity in query")]
    NoIdentifier,
}

impl ValidationError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CrmError>;
