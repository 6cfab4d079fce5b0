//! Watering restrictions that force the scale to 0%

use shared::{DomainError, MethodByte};

/// More than 0.1" of rain over the past 48 hours suspends watering
pub const CALIFORNIA_PRECIPITATION_THRESHOLD_MM: f64 = 2.54;

/// Restrictions selected by the method byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WateringRestrictions {
    enabled: bool,
}

impl WateringRestrictions {
    pub fn from_method_byte(method: MethodByte) -> Self {
        Self {
            enabled: method.restrictions_enabled(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the observed precipitation (mm) requires watering to stop
    ///
    /// Fails with `InsufficientWeatherData` when restrictions are on but the
    /// precipitation total is unknown.
    pub fn check(&self, precipitation: Option<f64>) -> Result<bool, DomainError> {
        if !self.enabled {
            return Ok(false);
        }

        let precipitation = precipitation
            .filter(|p| p.is_finite())
            .ok_or(DomainError::InsufficientWeatherData)?;

        Ok(california_restriction(precipitation))
    }
}

fn california_restriction(precipitation_mm: f64) -> bool {
    precipitation_mm > CALIFORNIA_PRECIPITATION_THRESHOLD_MM
}

/// Evaluate every restriction enabled in `method` against observed precipitation
pub fn check_restriction(method: MethodByte, precipitation: Option<f64>) -> Result<bool, DomainError> {
    WateringRestrictions::from_method_byte(method).check(precipitation)
}
