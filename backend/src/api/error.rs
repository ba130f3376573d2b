//! HTTP error payloads and mapping from domain errors.
//!
//! Keeps the domain free of transport concerns by translating
//! [`LedgerError`] into Actix responses here. Storage failures are reported
//! as 503 with a redacted message so infrastructure details never reach
//! clients.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::LedgerError;

/// Stable machine-readable error codes for the HTTP surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorCode {
    InvalidRequest,
    NotFound,
    Conflict,
    StorageUnavailable,
}

/// Standard error envelope returned by HTTP handlers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    #[schema(example = "conflict")]
    code: ApiErrorCode,
    #[schema(example = "obligation already recorded")]
    message: String,
}

impl ApiError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> ApiErrorCode {
        self.code
    }

    /// Human readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    const fn to_status_code(&self) -> StatusCode {
        match self.code {
            ApiErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::Conflict => StatusCode::CONFLICT,
            ApiErrorCode::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(value: LedgerError) -> Self {
        match value {
            LedgerError::Validation { message } => Self {
                code: ApiErrorCode::InvalidRequest,
                message,
            },
            LedgerError::NotFound { message } => Self {
                code: ApiErrorCode::NotFound,
                message,
            },
            LedgerError::Conflict { message } => Self {
                code: ApiErrorCode::Conflict,
                message,
            },
            LedgerError::Storage { message } => {
                error!(message, "storage failure surfaced to the HTTP layer");
                Self {
                    code: ApiErrorCode::StorageUnavailable,
                    message: "storage temporarily unavailable".to_owned(),
                }
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.to_status_code()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

/// Convenience alias for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;
