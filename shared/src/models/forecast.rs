//! Current conditions and daily forecast shown by the companion web app

use serde::{Deserialize, Serialize};

/// One forecast day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Unix epoch seconds (UTC)
    pub date: i64,
    /// OpenWeatherMap icon id
    pub icon: String,
    pub description: String,
    /// °C
    pub temp_min: f64,
    /// °C
    pub temp_max: f64,
}

/// Conditions reported by a weather provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSummary {
    /// Current temperature, °C, rounded
    pub temp: f64,
    pub icon: String,
    pub description: String,
    pub forecast: Vec<DailyForecast>,
}
