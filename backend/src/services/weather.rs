//! Weather data sources consumed by the adjustment methods

use shared::{
    DailyForecast, DomainError, EToObservation, GeoCoordinates, WateringObservation,
    WeatherSummary,
};

use crate::config::StaticWeatherConfig;

/// Supplier of normalized weather observations
#[axum::async_trait]
pub trait WeatherDataSource: Send + Sync {
    /// Short identifier reported to firmware as `rawData.wp`
    fn id(&self) -> &'static str;

    /// Aggregate conditions over the past (or next) 24 hours
    async fn watering_observation(
        &self,
        coordinates: &GeoCoordinates,
    ) -> Result<WateringObservation, DomainError>;

    /// Data for a single 24 hour window used to calculate ETₒ
    async fn eto_observation(
        &self,
        coordinates: &GeoCoordinates,
    ) -> Result<EToObservation, DomainError>;

    /// Current conditions and daily forecast for the web app
    async fn weather_summary(
        &self,
        coordinates: &GeoCoordinates,
    ) -> Result<WeatherSummary, DomainError>;

    /// Whether computed scales from this source may be cached until local midnight
    fn should_cache_watering_scale(&self) -> bool {
        false
    }
}

const STATIC_ICON: &str = "01d";
const STATIC_DESCRIPTION: &str = "configured conditions";

/// Fixed observations from configuration, for offline deployments
#[derive(Debug, Clone)]
pub struct StaticWeatherSource {
    config: StaticWeatherConfig,
}

impl StaticWeatherSource {
    pub fn new(config: StaticWeatherConfig) -> Self {
        Self { config }
    }
}

#[axum::async_trait]
impl WeatherDataSource for StaticWeatherSource {
    fn id(&self) -> &'static str {
        "static"
    }

    async fn watering_observation(
        &self,
        _coordinates: &GeoCoordinates,
    ) -> Result<WateringObservation, DomainError> {
        Ok(WateringObservation {
            temperature: Some(self.config.temperature),
            humidity: Some(self.config.humidity),
            precipitation: Some(self.config.precipitation),
            is_raining: self.config.is_raining,
        })
    }

    async fn eto_observation(
        &self,
        _coordinates: &GeoCoordinates,
    ) -> Result<EToObservation, DomainError> {
        Ok(EToObservation {
            period_start: chrono::Utc::now().timestamp(),
            min_temp: self.config.min_temperature,
            max_temp: self.config.max_temperature,
            min_humidity: self.config.min_humidity,
            max_humidity: self.config.max_humidity,
            solar_radiation: self.config.solar_radiation,
            wind_speed: self.config.wind_speed,
            precipitation: self.config.precipitation,
        })
    }

    async fn weather_summary(
        &self,
        _coordinates: &GeoCoordinates,
    ) -> Result<WeatherSummary, DomainError> {
        Ok(WeatherSummary {
            temp: self.config.temperature.round(),
            icon: STATIC_ICON.to_string(),
            description: STATIC_DESCRIPTION.to_string(),
            forecast: vec![DailyForecast {
                date: chrono::Utc::now().timestamp(),
                icon: STATIC_ICON.to_string(),
                description: STATIC_DESCRIPTION.to_string(),
                temp_min: self.config.min_temperature,
                temp_max: self.config.max_temperature,
            }],
        })
    }
}
