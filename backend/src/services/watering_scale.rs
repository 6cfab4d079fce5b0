//! Watering scale orchestration
//!
//! Decodes the method byte, serves same-day results from the cache, and
//! otherwise runs the adjustment method and stores the outcome until local
//! midnight at the watering site.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use shared::{
    seconds_until_local_midnight, watering_scale_cache_key, AdjustmentOptions, CachedScaleEntry,
    DomainError, GeoCoordinates, MethodByte,
};

use super::adjustment::{AdjustmentContext, AdjustmentMethod};
use super::cache::ScaleCacheStore;
use super::timezone::TimeZoneLookup;
use super::weather::WeatherDataSource;

/// A computed or cached scale together with the site's UTC offset
#[derive(Debug, Clone, PartialEq)]
pub struct WateringScale {
    pub entry: CachedScaleEntry,
    pub timezone_offset_minutes: i32,
    pub from_cache: bool,
}

/// Computes watering scales with injected collaborators
#[derive(Clone)]
pub struct WateringScaleService {
    weather: Arc<dyn WeatherDataSource>,
    timezone: Arc<dyn TimeZoneLookup>,
    cache: Arc<dyn ScaleCacheStore>,
    default_elevation_meters: f64,
}

impl WateringScaleService {
    pub fn new(
        weather: Arc<dyn WeatherDataSource>,
        timezone: Arc<dyn TimeZoneLookup>,
        cache: Arc<dyn ScaleCacheStore>,
        default_elevation_meters: f64,
    ) -> Self {
        Self {
            weather,
            timezone,
            cache,
            default_elevation_meters,
        }
    }

    /// Watering scale for a method byte, options and site
    pub async fn calculate(
        &self,
        method: MethodByte,
        options: &AdjustmentOptions,
        coordinates: &GeoCoordinates,
    ) -> Result<WateringScale, DomainError> {
        self.calculate_at(method, options, coordinates, Utc::now())
            .await
    }

    /// As [`calculate`](Self::calculate), with an explicit clock for cache expiry
    pub async fn calculate_at(
        &self,
        method: MethodByte,
        options: &AdjustmentOptions,
        coordinates: &GeoCoordinates,
        now: DateTime<Utc>,
    ) -> Result<WateringScale, DomainError> {
        let adjustment_method = AdjustmentMethod::from_method_byte(method)?;
        let use_cache = self.weather.should_cache_watering_scale();
        let key = watering_scale_cache_key(method, coordinates, options);

        if use_cache {
            if let Some(entry) = self.cache.get(&key).await {
                tracing::debug!(%key, "Watering scale cache hit");
                let timezone_offset_minutes = match entry.timezone_offset_minutes {
                    Some(offset) => offset,
                    None => self.timezone.utc_offset_minutes(coordinates).await?,
                };
                return Ok(WateringScale {
                    entry,
                    timezone_offset_minutes,
                    from_cache: true,
                });
            }
            tracing::debug!(%key, "Watering scale cache miss");
        }

        let context = AdjustmentContext {
            weather: self.weather.as_ref(),
            default_elevation_meters: self.default_elevation_meters,
        };
        let mut result = adjustment_method
            .get_adjustment(options, coordinates, &context)
            .await?;

        let timezone_offset_minutes = self.timezone.utc_offset_minutes(coordinates).await?;
        result.timezone_offset_minutes = Some(timezone_offset_minutes);

        tracing::info!(
            method = %adjustment_method.id(),
            %coordinates,
            scale = ?result.scale,
            rain_delay = ?result.rain_delay_hours,
            "Calculated watering scale"
        );

        let entry = CachedScaleEntry::from(&result);
        if use_cache {
            let ttl = seconds_until_local_midnight(now, timezone_offset_minutes)?;
            self.cache
                .put(key, entry.clone(), Duration::from_secs(ttl.max(1) as u64))
                .await;
        }

        Ok(WateringScale {
            entry,
            timezone_offset_minutes,
            from_cache: false,
        })
    }
}
