//! Watering scale cache entries, key derivation and expiry policy

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::adjustment::{AdjustmentMethodResult, AdjustmentOptions, MethodByte, RawDiagnostics};
use crate::error::DomainError;
use crate::types::GeoCoordinates;

/// A previously computed watering scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedScaleEntry {
    pub scale: Option<u8>,
    pub rain_delay_hours: Option<f64>,
    pub raw_diagnostics: RawDiagnostics,
    pub timezone_offset_minutes: Option<i32>,
}

impl From<&AdjustmentMethodResult> for CachedScaleEntry {
    fn from(result: &AdjustmentMethodResult) -> Self {
        Self {
            scale: result.scale,
            rain_delay_hours: result.rain_delay_hours,
            raw_diagnostics: result.raw_diagnostics.clone(),
            timezone_offset_minutes: result.timezone_offset_minutes,
        }
    }
}

/// Cache key for a watering scale calculation
///
/// The method byte keeps its restriction bit so restricted and unrestricted
/// requests never share an entry.
pub fn watering_scale_cache_key(
    method: MethodByte,
    coordinates: &GeoCoordinates,
    options: &AdjustmentOptions,
) -> String {
    format!(
        "{}?loc={},{}&wto={}",
        method.0,
        coordinates.latitude,
        coordinates.longitude,
        options.canonical_json()
    )
}

/// Seconds from `now` until the next local midnight at a site with the given UTC offset
///
/// At 23:59:59 local time this is 1; at 00:00:00 it is a full day. Offsets
/// of a day or more are rejected.
pub fn seconds_until_local_midnight(
    now: DateTime<Utc>,
    utc_offset_minutes: i32,
) -> Result<i64, DomainError> {
    let offset = utc_offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| {
            DomainError::LocationServiceApiError(format!(
                "UTC offset of {} minutes is out of range",
                utc_offset_minutes
            ))
        })?;
    let local = now.with_timezone(&offset).naive_local();
    let next_midnight = (local.date() + Duration::days(1)).and_time(NaiveTime::MIN);

    // Sub-second remainders round up so an entry never outlives the local day.
    let remaining = next_midnight - local;
    let whole = remaining.num_seconds();
    if remaining > Duration::seconds(whole) {
        Ok(whole + 1)
    } else {
        Ok(whole)
    }
}
