//! Current conditions for the companion web app

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use shared::WeatherSummary;

use crate::error::AppResult;
use crate::handlers::baseline_eto::LocationQuery;
use crate::services::geocoder::resolve_coordinates;
use crate::services::solar::solar_times;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherDataResponse {
    /// UTC offset at the site, minutes
    pub timezone: i32,
    /// Local minutes after midnight
    pub sunrise: i32,
    pub sunset: i32,
    pub weather_provider: String,
    #[serde(flatten)]
    pub summary: WeatherSummary,
    /// `[latitude, longitude]`
    pub location: [f64; 2],
}

/// Weather summary at a location
pub async fn get_weather_data(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> AppResult<Json<WeatherDataResponse>> {
    let coordinates = resolve_coordinates(&query.loc, state.geocoder.as_ref()).await?;
    let timezone = state.timezone.utc_offset_minutes(&coordinates).await?;
    let times = solar_times(Utc::now(), &coordinates, timezone);
    let summary = state.weather.weather_summary(&coordinates).await?;

    Ok(Json(WeatherDataResponse {
        timezone,
        sunrise: times.sunrise,
        sunset: times.sunset,
        weather_provider: state.weather.id().to_string(),
        summary,
        location: [coordinates.latitude, coordinates.longitude],
    }))
}
