//! UTC offset lookup for watering sites

use shared::{DomainError, GeoCoordinates};

/// Resolves the current UTC offset at a location
#[axum::async_trait]
pub trait TimeZoneLookup: Send + Sync {
    async fn utc_offset_minutes(&self, coordinates: &GeoCoordinates) -> Result<i32, DomainError>;
}

/// Every site shares one fixed offset
#[derive(Debug, Clone, Copy)]
pub struct StaticTimeZoneLookup {
    utc_offset_minutes: i32,
}

impl StaticTimeZoneLookup {
    pub fn new(utc_offset_minutes: i32) -> Self {
        Self { utc_offset_minutes }
    }
}

#[axum::async_trait]
impl TimeZoneLookup for StaticTimeZoneLookup {
    async fn utc_offset_minutes(&self, _coordinates: &GeoCoordinates) -> Result<i32, DomainError> {
        Ok(self.utc_offset_minutes)
    }
}

/// OpenSprinkler timezone encoding: quarter hours offset from UTC-12
///
/// Partial quarter hours are truncated toward zero, so UTC-05:30 is 26 and
/// UTC+05:45 is 71.
pub fn encode_timezone(utc_offset_minutes: i32) -> i32 {
    48 + utc_offset_minutes / 15
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_timezone() {
        assert_eq!(encode_timezone(0), 48);
        assert_eq!(encode_timezone(-420), 20);
        assert_eq!(encode_timezone(-330), 26);
        assert_eq!(encode_timezone(345), 71);
        assert_eq!(encode_timezone(-340), 26);
        assert_eq!(encode_timezone(-720), 0);
        assert_eq!(encode_timezone(840), 104);
    }

    #[tokio::test]
    async fn test_static_lookup() {
        let lookup = StaticTimeZoneLookup::new(-300);
        let offset = lookup
            .utc_offset_minutes(&GeoCoordinates::new(40.7, -74.0))
            .await
            .unwrap();
        assert_eq!(offset, -300);
    }
}
