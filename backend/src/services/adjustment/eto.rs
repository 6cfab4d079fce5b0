//! ETₒ scaling
//!
//! Compares the reference evapotranspiration expected over the next day,
//! minus rainfall, against the baseline ETₒ the watering program was designed
//! for.

use serde_json::Value;
use shared::{
    calculate_eto, clamp_scale, round_to_decimals, AdjustmentMethodResult, AdjustmentOptions,
    DomainError, EToObservation, GeoCoordinates, SourceObservation,
};

use super::AdjustmentContext;

/// Elevation assumed when neither the controller nor configuration supplies one
pub const DEFAULT_ELEVATION_METERS: f64 = 194.0;

pub(super) async fn calculate(
    options: &AdjustmentOptions,
    coordinates: &GeoCoordinates,
    context: &AdjustmentContext<'_>,
) -> Result<AdjustmentMethodResult, DomainError> {
    // Checked first so a missing option is reported even when weather is down.
    let base_eto = base_eto(options)?;
    let elevation = options
        .number("elevation")
        .filter(|e| *e != 0.0)
        .unwrap_or(context.default_elevation_meters);

    let observation = context.weather.eto_observation(coordinates).await?;
    if !observation.is_consistent() {
        return Err(DomainError::InsufficientWeatherData);
    }

    let eto = calculate_eto(&observation, elevation, coordinates);
    let scale = eto_scale(eto, observation.precipitation, base_eto);

    tracing::debug!(
        %coordinates,
        eto,
        base_eto,
        elevation,
        scale,
        "Calculated ETo scale"
    );

    let mut result = AdjustmentMethodResult::unchanged(context.weather.id());
    insert_diagnostics(&mut result, eto, &observation);
    result.scale = Some(scale);
    result.source_observation = Some(SourceObservation::Eto(observation));
    Ok(result)
}

/// Scale from predicted ETₒ, precipitation and baseline ETₒ (all mm/day)
pub fn eto_scale(eto: f64, precipitation: f64, base_eto: f64) -> u8 {
    clamp_scale((eto - precipitation) / base_eto * 100.0)
}

fn base_eto(options: &AdjustmentOptions) -> Result<f64, DomainError> {
    options
        .number("baseETo")
        .filter(|v| *v > 0.0)
        .ok_or_else(|| DomainError::MissingAdjustmentOption("baseETo".to_string()))
}

fn insert_diagnostics(result: &mut AdjustmentMethodResult, eto: f64, observation: &EToObservation) {
    let raw = &mut result.raw_diagnostics;
    raw.insert("eto".into(), Value::from(round_to_decimals(eto, 3)));
    raw.insert(
        "radiation".into(),
        Value::from(round_to_decimals(observation.solar_radiation, 2)),
    );
    raw.insert("minT".into(), Value::from(observation.min_temp.round() as i64));
    raw.insert("maxT".into(), Value::from(observation.max_temp.round() as i64));
    raw.insert("minH".into(), Value::from(observation.min_humidity.round() as i64));
    raw.insert("maxH".into(), Value::from(observation.max_humidity.round() as i64));
    raw.insert(
        "wind".into(),
        Value::from(round_to_decimals(observation.wind_speed, 1)),
    );
    raw.insert(
        "p".into(),
        Value::from(round_to_decimals(observation.precipitation, 2)),
    );
}
