//! Rain delay: suspends watering while it rains without changing the scale

use serde_json::Value;
use shared::{
    AdjustmentMethodResult, AdjustmentOptions, DomainError, GeoCoordinates, SourceObservation,
};

use crate::services::weather::WeatherDataSource;

/// Hours of delay when the controller sends no `d` option
pub const DEFAULT_RAIN_DELAY_HOURS: f64 = 24.0;

pub(super) async fn calculate(
    options: &AdjustmentOptions,
    coordinates: &GeoCoordinates,
    weather: &dyn WeatherDataSource,
) -> Result<AdjustmentMethodResult, DomainError> {
    let observation = weather.watering_observation(coordinates).await?;
    let raining = observation.is_raining;

    let mut result = AdjustmentMethodResult::unchanged(weather.id());
    result
        .raw_diagnostics
        .insert("raining".into(), Value::from(raining as u8));

    if raining {
        result.rain_delay_hours = Some(options.number("d").unwrap_or(DEFAULT_RAIN_DELAY_HOURS));
    }

    result.source_observation = Some(SourceObservation::Watering(observation));
    Ok(result)
}
