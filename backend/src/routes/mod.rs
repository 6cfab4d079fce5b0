//! Route definitions for the irrigation weather service

use axum::{routing::get, Router};

use crate::{handlers, AppState};

/// Firmware and web app routes
///
/// Static paths take precedence over the `/:method` catch-all.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/baselineETo", get(handlers::get_baseline_eto))
        .route("/weatherData", get(handlers::get_weather_data))
        .route("/:method", get(handlers::get_watering_data))
}
