//! Error handling for the irrigation weather service
//!
//! Domain failures keep their firmware error code all the way to the client.
//! Everything else is reported as `UnexpectedError` so upstream messages,
//! which can embed API keys, never leave the server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{DomainError, ErrorCode};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub err_code: u8,
    pub message: String,
}

impl AppError {
    /// The domain error to report to clients
    pub fn coded(&self) -> DomainError {
        match self {
            AppError::Domain(error) => error.clone(),
            _ => DomainError::UnexpectedError,
        }
    }

    /// HTTP status hint for this failure
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Domain(error) => domain_status(error),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn domain_status(error: &DomainError) -> StatusCode {
    match error {
        DomainError::InvalidAdjustmentMethod(_)
        | DomainError::MissingAdjustmentOption(_)
        | DomainError::MalformedAdjustmentOptions(_)
        | DomainError::InvalidLocationFormat
        | DomainError::OutOfBounds => StatusCode::BAD_REQUEST,
        DomainError::NoLocationFound(_) => StatusCode::NOT_FOUND,
        DomainError::MissingWeatherField(_)
        | DomainError::InsufficientWeatherData
        | DomainError::WeatherApiError(_)
        | DomainError::LocationServiceApiError(_) => StatusCode::BAD_GATEWAY,
        DomainError::DataUnavailable(_) | DomainError::NotInitialized => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        DomainError::UnsupportedFormat(_) | DomainError::UnexpectedError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn code_name(code: ErrorCode) -> String {
    format!("{:?}", code)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let coded = self.coded();

        if coded.code() == ErrorCode::UnexpectedError {
            tracing::error!("An unexpected error occurred: {}", self);
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code_name(coded.code()),
                err_code: coded.code().as_u8(),
                message: coded.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}
