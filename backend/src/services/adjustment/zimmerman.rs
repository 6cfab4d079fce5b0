//! Zimmerman method
//!
//! Scales watering by how far humidity, temperature and precipitation deviate
//! from user baselines. Each factor may be weighted by a percentage.

use serde_json::Value;
use shared::{
    clamp_scale, round_to_decimals, AdjustmentMethodResult, AdjustmentOptions, DomainError,
    GeoCoordinates, SourceObservation, WateringObservation,
};

use crate::services::weather::WeatherDataSource;

/// Baseline humidity, %
const DEFAULT_BASE_HUMIDITY: f64 = 30.0;
/// Baseline temperature, °C
const DEFAULT_BASE_TEMPERATURE: f64 = 21.0;
/// Baseline precipitation, mm
const DEFAULT_BASE_PRECIPITATION: f64 = 0.0;

pub(super) async fn calculate(
    options: &AdjustmentOptions,
    coordinates: &GeoCoordinates,
    weather: &dyn WeatherDataSource,
) -> Result<AdjustmentMethodResult, DomainError> {
    let observation = weather.watering_observation(coordinates).await?;
    let scale = zimmerman_scale(&observation, options)?;

    let mut result = AdjustmentMethodResult::unchanged(weather.id());
    let raw = &mut result.raw_diagnostics;
    raw.insert("h".into(), rounded(observation.humidity, 2));
    raw.insert("p".into(), rounded(observation.precipitation, 2));
    raw.insert("t".into(), rounded(observation.temperature, 1));
    raw.insert("raining".into(), Value::from(observation.is_raining as u8));

    result.scale = Some(scale);
    result.source_observation = Some(SourceObservation::Watering(observation));
    Ok(result)
}

/// Zimmerman scale for an observation
///
/// Temperature, humidity and precipitation must all be present.
pub fn zimmerman_scale(
    observation: &WateringObservation,
    options: &AdjustmentOptions,
) -> Result<u8, DomainError> {
    let humidity = required(observation.humidity, "humidity")?;
    let temperature = required(observation.temperature, "temperature")?;
    let precipitation = required(observation.precipitation, "precipitation")?;

    let humidity_base = options.number("bh").unwrap_or(DEFAULT_BASE_HUMIDITY);
    let temperature_base = options.number("bt").unwrap_or(DEFAULT_BASE_TEMPERATURE);
    let precipitation_base = options.number("br").unwrap_or(DEFAULT_BASE_PRECIPITATION);

    let humidity_factor = weighted(humidity_base - humidity, options.number("h"));
    let temperature_factor = weighted((temperature - temperature_base) * 4.0, options.number("t"));
    let precipitation_factor =
        weighted((precipitation_base - precipitation) * 200.0, options.number("r"));

    Ok(clamp_scale(
        100.0 + humidity_factor + temperature_factor + precipitation_factor,
    ))
}

fn required(value: Option<f64>, field: &str) -> Result<f64, DomainError> {
    value
        .filter(|v| v.is_finite())
        .ok_or_else(|| DomainError::MissingWeatherField(field.to_string()))
}

fn weighted(factor: f64, weight_percent: Option<f64>) -> f64 {
    match weight_percent {
        Some(weight) => factor * weight / 100.0,
        None => factor,
    }
}

fn rounded(value: Option<f64>, decimals: u32) -> Value {
    value
        .map(|v| Value::from(round_to_decimals(v, decimals)))
        .unwrap_or(Value::Null)
}
