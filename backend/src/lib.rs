//! Irrigation Weather Service - Backend Server
//!
//! Computes daily watering scales for irrigation controllers from weather
//! forecasts, and serves baseline ETₒ lookups from a global raster.

use std::sync::Arc;

use axum::{http::StatusCode, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;

pub use crate::config::Config;
pub use error::{AppError, AppResult};

use crate::config::{GeocoderKind, TimezoneKind, WeatherProviderKind};
use external::{GeocodingClient, WeatherClient};
use services::baseline_eto::{byte_source_for, BaselineEToByteSource};
use services::{
    CachedGeocoder, Geocoder, MokaScaleCache, NullGeocoder, NullScaleCache, ScaleCacheStore, StaticTimeZoneLookup,
    StaticWeatherSource, TimeZoneLookup, WateringScaleService, WeatherDataSource,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub watering: WateringScaleService,
    pub weather: Arc<dyn WeatherDataSource>,
    pub timezone: Arc<dyn TimeZoneLookup>,
    pub geocoder: Arc<dyn Geocoder>,
    pub baseline_eto: Arc<dyn BaselineEToByteSource>,
}

impl AppState {
    /// Wire providers selected in configuration
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let owm = || {
            WeatherClient::with_base_url(
                config.weather.api_key.clone(),
                config.weather.base_url.clone(),
            )
        };

        if config.weather.api_key.is_empty()
            && (config.weather.provider == WeatherProviderKind::OpenWeatherMap
                || config.timezone.provider == TimezoneKind::OpenWeatherMap
                || config.geocoder.provider == GeocoderKind::OpenWeatherMap)
        {
            return Err(AppError::Configuration(
                "weather.api_key is required for OpenWeatherMap providers".to_string(),
            ));
        }

        let weather: Arc<dyn WeatherDataSource> = match config.weather.provider {
            WeatherProviderKind::OpenWeatherMap => Arc::new(owm()),
            WeatherProviderKind::Static => {
                Arc::new(StaticWeatherSource::new(config.weather.static_data.clone()))
            }
        };

        let timezone: Arc<dyn TimeZoneLookup> = match config.timezone.provider {
            TimezoneKind::OpenWeatherMap => Arc::new(owm()),
            TimezoneKind::Static => {
                Arc::new(StaticTimeZoneLookup::new(config.timezone.utc_offset_minutes))
            }
        };

        let geocoder: Arc<dyn Geocoder> = match config.geocoder.provider {
            GeocoderKind::OpenWeatherMap => {
                let client = Arc::new(GeocodingClient::new(
                    config.weather.api_key.clone(),
                    config.geocoder.base_url.clone(),
                ));
                if config.cache.enabled {
                    Arc::new(CachedGeocoder::new(client, config.geocoder.cache_max_entries))
                } else {
                    client
                }
            }
            GeocoderKind::None => Arc::new(NullGeocoder),
        };

        let cache: Arc<dyn ScaleCacheStore> = if config.cache.enabled {
            Arc::new(MokaScaleCache::new(config.cache.max_entries))
        } else {
            Arc::new(NullScaleCache)
        };

        Ok(Self {
            watering: WateringScaleService::new(
                weather.clone(),
                timezone.clone(),
                cache,
                config.adjustment.default_elevation_meters,
            ),
            weather,
            timezone,
            geocoder,
            baseline_eto: byte_source_for(&config.baseline_eto.data_file),
        })
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint; firmware never calls it
async fn root() -> (StatusCode, &'static str) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        "Irrigation Weather Service API v1.0",
    )
}
