//! Location resolution
//!
//! Literal coordinate pairs are used as-is; anything else is handed to the
//! configured geocoder.

use std::sync::Arc;

use moka::future::Cache;
use shared::{parse_location, DomainError, GeoCoordinates, LocationToken};

/// Resolves a place name to coordinates
#[axum::async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, location: &str) -> Result<GeoCoordinates, DomainError>;
}

/// Used when no geocoding provider is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NullGeocoder;

#[axum::async_trait]
impl Geocoder for NullGeocoder {
    async fn geocode(&self, location: &str) -> Result<GeoCoordinates, DomainError> {
        Err(DomainError::NoLocationFound(location.to_string()))
    }
}

/// Remembers successful lookups in front of another geocoder
///
/// Keys are lowercased so "Boston, MA" and "boston, ma" share an entry.
/// Failures are not cached.
#[derive(Clone)]
pub struct CachedGeocoder {
    inner: Arc<dyn Geocoder>,
    cache: Cache<String, GeoCoordinates>,
}

impl CachedGeocoder {
    pub fn new(inner: Arc<dyn Geocoder>, max_entries: u64) -> Self {
        Self {
            inner,
            cache: Cache::new(max_entries),
        }
    }
}

#[axum::async_trait]
impl Geocoder for CachedGeocoder {
    async fn geocode(&self, location: &str) -> Result<GeoCoordinates, DomainError> {
        let key = location.to_lowercase();
        if let Some(coordinates) = self.cache.get(&key).await {
            tracing::debug!(location = %key, "Geocoder cache hit");
            return Ok(coordinates);
        }

        let coordinates = self.inner.geocode(location).await?;
        self.cache.insert(key, coordinates).await;
        Ok(coordinates)
    }
}

/// Resolve a `loc` parameter to coordinates
pub async fn resolve_coordinates(
    location: &str,
    geocoder: &dyn Geocoder,
) -> Result<GeoCoordinates, DomainError> {
    match parse_location(location)? {
        LocationToken::Coordinates(coordinates) => Ok(coordinates),
        LocationToken::Name(name) => {
            tracing::debug!(location = %name, "Geocoding location");
            geocoder.geocode(&name).await
        }
    }
}
