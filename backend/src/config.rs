//! Configuration management for the irrigation weather service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with IRRIGATION_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

use crate::services::adjustment::DEFAULT_ELEVATION_METERS;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Weather provider configuration
    pub weather: WeatherConfig,

    /// Location name resolution
    pub geocoder: GeocoderConfig,

    /// UTC offset lookup
    pub timezone: TimezoneConfig,

    /// Baseline ETₒ raster location
    pub baseline_eto: BaselineEToConfig,

    /// Watering scale cache
    pub cache: CacheConfig,

    /// Adjustment method defaults
    pub adjustment: AdjustmentConfig,

    /// Log output
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WeatherProviderKind {
    OpenWeatherMap,
    Static,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    pub provider: WeatherProviderKind,

    /// OpenWeatherMap API key
    pub api_key: String,

    /// OneCall API base URL
    pub base_url: String,

    /// Observations served by the static provider
    #[serde(rename = "static")]
    pub static_data: StaticWeatherConfig,
}

/// Fixed observations in metric units
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StaticWeatherConfig {
    pub temperature: f64,
    pub humidity: f64,
    pub precipitation: f64,
    pub is_raining: bool,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub min_humidity: f64,
    pub max_humidity: f64,
    /// kWh/m²/day
    pub solar_radiation: f64,
    /// m/s at 2 m
    pub wind_speed: f64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GeocoderKind {
    OpenWeatherMap,
    None,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeocoderConfig {
    pub provider: GeocoderKind,

    /// Direct geocoding API base URL
    pub base_url: String,

    /// Upper bound on remembered place names; only used while `cache.enabled`
    pub cache_max_entries: u64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimezoneKind {
    OpenWeatherMap,
    Static,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TimezoneConfig {
    pub provider: TimezoneKind,

    /// Offset used by the static lookup
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BaselineEToConfig {
    /// Local path or http(s) URL of the raster file
    pub data_file: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    pub enabled: bool,

    /// Upper bound on cached scales
    pub max_entries: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdjustmentConfig {
    /// Elevation used by the ETₒ method when the controller sends none
    pub default_elevation_meters: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("IRRIGATION_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("weather.provider", "openweathermap")?
            .set_default("weather.api_key", "")?
            .set_default("weather.base_url", "https://api.openweathermap.org/data/3.0")?
            .set_default("weather.static.temperature", 21.0)?
            .set_default("weather.static.humidity", 30.0)?
            .set_default("weather.static.precipitation", 0.0)?
            .set_default("weather.static.is_raining", false)?
            .set_default("weather.static.min_temperature", 15.0)?
            .set_default("weather.static.max_temperature", 27.0)?
            .set_default("weather.static.min_humidity", 30.0)?
            .set_default("weather.static.max_humidity", 70.0)?
            .set_default("weather.static.solar_radiation", 6.0)?
            .set_default("weather.static.wind_speed", 2.0)?
            .set_default("geocoder.provider", "openweathermap")?
            .set_default("geocoder.base_url", "https://api.openweathermap.org/geo/1.0")?
            .set_default("geocoder.cache_max_entries", 10_000)?
            .set_default("timezone.provider", "openweathermap")?
            .set_default("timezone.utc_offset_minutes", 0)?
            .set_default("baseline_eto.data_file", "data/Baseline_ETo_Data.bin")?
            .set_default("cache.enabled", true)?
            .set_default("cache.max_entries", 100_000)?
            .set_default("adjustment.default_elevation_meters", DEFAULT_ELEVATION_METERS)?
            .set_default("logging.json", false)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (IRRIGATION_ prefix)
            .add_source(
                Environment::with_prefix("IRRIGATION")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for StaticWeatherConfig {
    fn default() -> Self {
        Self {
            temperature: 21.0,
            humidity: 30.0,
            precipitation: 0.0,
            is_raining: false,
            min_temperature: 15.0,
            max_temperature: 27.0,
            min_humidity: 30.0,
            max_humidity: 70.0,
            solar_radiation: 6.0,
            wind_speed: 2.0,
        }
    }
}
