//! Typed failures for the watering-scale pipeline
//!
//! Every variant carries a numeric [`ErrorCode`] that is forwarded verbatim to
//! controller firmware, so codes must never be renumbered.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Numeric error codes understood by controller firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ErrorCode {
    /// Included with every successful response
    NoError = 0,

    BadWeatherData = 1,
    InsufficientWeatherData = 10,
    MissingWeatherField = 11,
    WeatherApiError = 12,

    LocationError = 2,
    LocationServiceApiError = 20,
    NoLocationFound = 21,
    InvalidLocationFormat = 22,

    AdjustmentMethodError = 4,
    UnsupportedAdjustmentMethod = 40,
    InvalidAdjustmentMethod = 41,

    AdjustmentOptionsError = 5,
    MalformedAdjustmentOptions = 50,
    MissingAdjustmentOption = 51,

    UnexpectedError = 99,
}

impl ErrorCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Domain error taxonomy shared by the pure core and the service layer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    // Weather data errors
    #[error("A required field was missing from the weather data: {0}")]
    MissingWeatherField(String),

    #[error("Weather data for a full 24 hour period was not available")]
    InsufficientWeatherData,

    #[error("Weather API error: {0}")]
    WeatherApiError(String),

    // Adjustment method errors
    #[error("Invalid adjustment method: {0}")]
    InvalidAdjustmentMethod(u32),

    #[error("Missing required adjustment option: {0}")]
    MissingAdjustmentOption(String),

    #[error("Malformed adjustment options: {0}")]
    MalformedAdjustmentOptions(String),

    // Baseline ETo raster errors
    #[error("Baseline ETo data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Location is outside the baseline ETo raster")]
    OutOfBounds,

    #[error("Unsupported baseline ETo data file: {0}")]
    UnsupportedFormat(String),

    #[error("Baseline ETo data file header has not been read")]
    NotInitialized,

    // Location errors
    #[error("Invalid location format")]
    InvalidLocationFormat,

    #[error("No location found for {0}")]
    NoLocationFound(String),

    #[error("Location service error: {0}")]
    LocationServiceApiError(String),

    #[error("An unexpected error occurred")]
    UnexpectedError,
}

impl DomainError {
    /// Firmware error code for this failure
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::MissingWeatherField(_) => ErrorCode::MissingWeatherField,
            DomainError::InsufficientWeatherData => ErrorCode::InsufficientWeatherData,
            DomainError::WeatherApiError(_) => ErrorCode::WeatherApiError,
            DomainError::InvalidAdjustmentMethod(_) => ErrorCode::InvalidAdjustmentMethod,
            DomainError::MissingAdjustmentOption(_) => ErrorCode::MissingAdjustmentOption,
            DomainError::MalformedAdjustmentOptions(_) => ErrorCode::MalformedAdjustmentOptions,
            DomainError::DataUnavailable(_) | DomainError::NotInitialized => {
                ErrorCode::BadWeatherData
            }
            DomainError::OutOfBounds => ErrorCode::LocationError,
            DomainError::UnsupportedFormat(_) => ErrorCode::UnexpectedError,
            DomainError::InvalidLocationFormat => ErrorCode::InvalidLocationFormat,
            DomainError::NoLocationFound(_) => ErrorCode::NoLocationFound,
            DomainError::LocationServiceApiError(_) => ErrorCode::LocationServiceApiError,
            DomainError::UnexpectedError => ErrorCode::UnexpectedError,
        }
    }

    /// Whether a later request could succeed where this one failed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DomainError::MissingWeatherField(_)
                | DomainError::InsufficientWeatherData
                | DomainError::WeatherApiError(_)
                | DomainError::DataUnavailable(_)
                | DomainError::NotInitialized
                | DomainError::LocationServiceApiError(_)
        )
    }
}
