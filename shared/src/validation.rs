//! Validation and parsing utilities for request parameters
//!
//! Location tokens, coordinate strings and the rounding helpers used for
//! values reported back to controller firmware.

use crate::error::DomainError;
use crate::types::GeoCoordinates;

// ============================================================================
// Location Parsing
// ============================================================================

/// Prefixes used by personal weather station identifiers, which are not locations
const PWS_PREFIXES: [&str; 3] = ["pws:", "icao:", "zmw:"];

/// A `loc` parameter after classification
#[derive(Debug, Clone, PartialEq)]
pub enum LocationToken {
    /// A literal "lat,lon" pair
    Coordinates(GeoCoordinates),
    /// Free text that must be geocoded
    Name(String),
}

/// Classify a `loc` parameter
///
/// Empty values and weather station identifiers are rejected outright.
pub fn parse_location(location: &str) -> Result<LocationToken, DomainError> {
    let location = location.trim();
    if location.is_empty() {
        return Err(DomainError::InvalidLocationFormat);
    }

    if PWS_PREFIXES.iter().any(|prefix| location.starts_with(prefix)) {
        return Err(DomainError::InvalidLocationFormat);
    }

    match parse_coordinates(location) {
        Some(coordinates) => Ok(LocationToken::Coordinates(coordinates)),
        None => Ok(LocationToken::Name(location.to_string())),
    }
}

/// Parse a "lat,lon" string with optional whitespace after the comma
///
/// Returns `None` for anything that is not a plain decimal pair inside the
/// valid latitude and longitude ranges.
pub fn parse_coordinates(value: &str) -> Option<GeoCoordinates> {
    let (lat, lon) = value.split_once(',')?;
    let latitude = parse_plain_decimal(lat)?;
    let longitude = parse_plain_decimal(lon.trim_start())?;

    let coordinates = GeoCoordinates::new(latitude, longitude);
    coordinates.is_valid().then_some(coordinates)
}

/// Signed decimal without exponent, `inf` or `nan`
fn parse_plain_decimal(value: &str) -> Option<f64> {
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits, None),
    };

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if let Some(fraction) = fraction {
        if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }

    value.parse().ok()
}

// ============================================================================
// Numeric Formatting
// ============================================================================

/// Round to a fixed number of decimal places
pub fn round_to_decimals(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Round to a number of significant digits
pub fn round_to_significant(value: f64, digits: u32) -> f64 {
    if value == 0.0 || !value.is_finite() || digits == 0 {
        return value;
    }

    let magnitude = value.abs().log10().floor() as i32;
    let factor = 10f64.powi(digits as i32 - 1 - magnitude);
    (value * factor).round() / factor
}

/// Clamp a raw scale to [0, 200] and truncate to a whole percent
pub fn clamp_scale(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.clamp(0.0, 200.0).floor() as u8
}
