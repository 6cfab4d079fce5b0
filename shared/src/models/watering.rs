//! Normalized weather observations consumed by the adjustment methods

use serde::{Deserialize, Serialize};

/// Aggregate weather over the past (or, failing that, next) 24 hours
///
/// Providers leave a field as `None` when they could not supply it; the
/// method that needs the field decides whether that is fatal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WateringObservation {
    /// Mean temperature, °C
    pub temperature: Option<f64>,
    /// Mean relative humidity, %
    pub humidity: Option<f64>,
    /// Total precipitation, mm
    pub precipitation: Option<f64>,
    pub is_raining: bool,
}

/// Data for a single 24 hour window used to calculate ETₒ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EToObservation {
    /// Unix epoch seconds of the start of the window
    pub period_start: i64,
    /// °C
    pub min_temp: f64,
    /// °C
    pub max_temp: f64,
    /// %
    pub min_humidity: f64,
    /// %
    pub max_humidity: f64,
    /// Solar radiation accounting for cloud cover, kWh/m²/day
    pub solar_radiation: f64,
    /// Mean wind speed standardized to 2 m, m/s
    pub wind_speed: f64,
    /// Total precipitation, mm
    pub precipitation: f64,
}

impl EToObservation {
    /// Min/max pairs are ordered and every field is a finite number
    pub fn is_consistent(&self) -> bool {
        let fields = [
            self.min_temp,
            self.max_temp,
            self.min_humidity,
            self.max_humidity,
            self.solar_radiation,
            self.wind_speed,
            self.precipitation,
        ];
        fields.iter().all(|v| v.is_finite())
            && self.min_temp <= self.max_temp
            && self.min_humidity <= self.max_humidity
    }
}

/// The observation an adjustment method used, kept so restrictions can reuse it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceObservation {
    Watering(WateringObservation),
    Eto(EToObservation),
}

impl SourceObservation {
    /// Precipitation in mm, if the observation carries it
    pub fn precipitation(&self) -> Option<f64> {
        match self {
            SourceObservation::Watering(obs) => obs.precipitation,
            SourceObservation::Eto(obs) => Some(obs.precipitation),
        }
    }
}

/// Convert wind speed measured at `height` meters to the 2 m reference height (FAO-56 eq. 47)
pub fn standardize_wind_speed(speed: f64, height: f64) -> f64 {
    speed * 4.87 / (67.8 * height - 5.42).ln()
}
