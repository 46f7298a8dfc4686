//! Adapter-level error and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use petstore_core::{PetErrorKind, PetStoreError, PetValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure surfaced to HTTP callers.
///
/// Not-found is folded into `InvalidInput`: callers only ever see 400 or 500.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Missing/invalid request data, unknown owner, or unknown pet. Maps to 400.
    InvalidInput(String),
    /// Storage or runtime failure. Maps to 500.
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidInput(message) | Self::Internal(message) => message,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl Error for ApiError {}

impl From<PetStoreError> for ApiError {
    fn from(value: PetStoreError) -> Self {
        match value.kind() {
            PetErrorKind::InvalidInput | PetErrorKind::NotFound => {
                Self::InvalidInput(value.to_string())
            }
            PetErrorKind::Store => Self::Internal(value.to_string()),
        }
    }
}

impl From<PetValidationError> for ApiError {
    fn from(value: PetValidationError) -> Self {
        Self::InvalidInput(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::InvalidInput(message) | Self::Internal(message) => {
                (status, message).into_response()
            }
        }
    }
}
