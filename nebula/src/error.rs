use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Json as ResponseJson;
use nebula_api::prelude::ErrorResponse;

use crate::store::StoreError;

/// Message returned for every store failure. The cause is only logged.
pub const STORE_UNAVAILABLE_MESSAGE: &str = "Database connection failed";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Conflict,
    StoreUnavailable,
    PayloadTooLarge,
    RateLimited,
}

impl ErrorKind {
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::StoreUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{error}: {message}")]
pub struct NebulaError {
    kind: ErrorKind,
    error: String,
    message: String,
}

impl NebulaError {
    fn new(kind: ErrorKind, error: &str, message: &str) -> Self {
        Self {
            kind,
            error: error.to_string(),
            message: message.to_string(),
        }
    }

    pub fn invalid_argument(error: &str, message: &str) -> Self {
        Self::new(ErrorKind::InvalidArgument, error, message)
    }

    pub fn not_found(error: &str, message: &str) -> Self {
        Self::new(ErrorKind::NotFound, error, message)
    }

    pub fn conflict(error: &str, message: &str) -> Self {
        Self::new(ErrorKind::Conflict, error, message)
    }

    pub fn store_unavailable() -> Self {
        Self::new(
            ErrorKind::StoreUnavailable,
            "Store unavailable",
            STORE_UNAVAILABLE_MESSAGE,
        )
    }

    pub fn payload_too_large() -> Self {
        Self::new(
            ErrorKind::PayloadTooLarge,
            "Payload too large",
            "Request body exceeds the configured limit",
        )
    }

    pub fn rate_limited() -> Self {
        Self::new(
            ErrorKind::RateLimited,
            "Too many requests",
            "Too many requests from this IP, please try again later",
        )
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<StoreError> for NebulaError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(key) => {
                Self::conflict("Already exists", &format!("'{key}' already exists"))
            }
            StoreError::Backend(cause) => {
                log::error!("store failure: {cause}");
                Self::store_unavailable()
            }
        }
    }
}

impl From<JsonRejection> for NebulaError {
    fn from(value: JsonRejection) -> Self {
        if value.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::payload_too_large();
        }
        Self::invalid_argument("Invalid request body", &value.body_text())
    }
}

impl IntoResponse for NebulaError {
    fn into_response(self) -> axum::response::Response {
        if self.kind == ErrorKind::InvalidArgument {
            log::debug!("rejected request: {self}");
        }
        (
            self.kind.status_code(),
            ResponseJson(ErrorResponse {
                success: false,
                error: self.error,
                message: self.message,
                available_endpoints: None,
            }),
        )
            .into_response()
    }
}
