//! OpenWeatherMap OneCall 3.0 client
//!
//! Hourly forecasts are grouped into 3 hour periods and the first 24 hours
//! are aggregated into watering and ETₒ observations. The same endpoint also
//! reports the site's UTC offset.

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use shared::{
    standardize_wind_speed, DailyForecast, DomainError, EToObservation, GeoCoordinates,
    WateringObservation, WeatherSummary,
};

use crate::services::solar::{approximate_solar_radiation, CloudCoverWindow};
use crate::services::timezone::TimeZoneLookup;
use crate::services::weather::WeatherDataSource;

/// Hours per aggregated forecast period
const PERIOD_HOURS: usize = 3;

/// Periods covering 24 hours
const PERIODS_PER_DAY: usize = 8;

/// OpenWeatherMap reports wind speed at 10 m
const WIND_MEASUREMENT_HEIGHT_METERS: f64 = 10.0;

/// OpenWeatherMap API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// OneCall response, only the fields in use
#[derive(Debug, Deserialize)]
struct OneCallResponse {
    #[serde(default)]
    timezone_offset: i32,
    #[serde(default)]
    hourly: Option<Vec<OWMHourly>>,
    #[serde(default)]
    current: Option<OWMCurrent>,
    #[serde(default)]
    daily: Option<Vec<OWMDaily>>,
}

#[derive(Debug, Clone, Deserialize)]
struct OWMCondition {
    icon: String,
    description: String,
}

#[derive(Debug, Clone, Deserialize)]
struct OWMCurrent {
    temp: f64,
    #[serde(default)]
    weather: Vec<OWMCondition>,
}

#[derive(Debug, Clone, Deserialize)]
struct OWMDaily {
    dt: i64,
    temp: OWMDailyTemp,
    #[serde(default)]
    weather: Vec<OWMCondition>,
}

#[derive(Debug, Clone, Deserialize)]
struct OWMDailyTemp {
    min: f64,
    max: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct OWMHourly {
    dt: i64,
    temp: f64,
    humidity: f64,
    #[serde(default)]
    clouds: f64,
    #[serde(default)]
    wind_speed: f64,
    rain: Option<OWMRain>,
}

#[derive(Debug, Clone, Deserialize)]
struct OWMRain {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

/// Three consecutive hours merged into one forecast period
#[derive(Debug, Clone, PartialEq)]
struct ForecastPeriod {
    start: i64,
    temp: f64,
    humidity: f64,
    /// Percent
    clouds: f64,
    wind_speed: f64,
    /// mm over the period
    rain: f64,
}

impl WeatherClient {
    /// Create a new WeatherClient
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, "https://api.openweathermap.org/data/3.0".to_string())
    }

    /// Create a new WeatherClient with custom base URL (for testing)
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    async fn one_call(
        &self,
        coordinates: &GeoCoordinates,
        exclude: &str,
    ) -> Result<OneCallResponse, DomainError> {
        let url = format!("{}/onecall", self.base_url);

        // Errors drop the URL so the API key never reaches a response body.
        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", coordinates.latitude.to_string()),
                ("lon", coordinates.longitude.to_string()),
                ("exclude", exclude.to_string()),
                ("units", "metric".to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                tracing::error!("Weather API request failed: {}", e);
                DomainError::WeatherApiError(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!("Weather API error: {}", status);
            return Err(DomainError::WeatherApiError(format!("status {}", status)));
        }

        response.json().await.map_err(|e| {
            DomainError::WeatherApiError(format!(
                "Failed to parse weather response: {}",
                e.without_url()
            ))
        })
    }

    async fn forecast(&self, coordinates: &GeoCoordinates) -> Result<Vec<ForecastPeriod>, DomainError> {
        let data = self
            .one_call(coordinates, "current,minutely,daily,alerts")
            .await?;
        let hourly = data
            .hourly
            .ok_or_else(|| DomainError::MissingWeatherField("hourly".to_string()))?;
        Ok(three_hour_periods(&hourly, 24))
    }
}

/// Merge the first `hours` hourly entries into 3 hour periods; partial periods are dropped
fn three_hour_periods(hourly: &[OWMHourly], hours: usize) -> Vec<ForecastPeriod> {
    let hours = hours.min(hourly.len());
    hourly[..hours]
        .chunks_exact(PERIOD_HOURS)
        .map(|chunk| {
            let n = chunk.len() as f64;
            ForecastPeriod {
                start: chunk[0].dt,
                temp: chunk.iter().map(|h| h.temp).sum::<f64>() / n,
                humidity: chunk.iter().map(|h| h.humidity).sum::<f64>() / n,
                clouds: chunk.iter().map(|h| h.clouds).sum::<f64>() / n,
                wind_speed: chunk.iter().map(|h| h.wind_speed).sum::<f64>() / n,
                rain: chunk
                    .iter()
                    .filter_map(|h| h.rain.as_ref().and_then(|r| r.one_hour))
                    .sum(),
            }
        })
        .collect()
}

fn summary_from_one_call(data: OneCallResponse) -> Result<WeatherSummary, DomainError> {
    let missing = |field: &str| DomainError::MissingWeatherField(field.to_string());

    let current = data.current.ok_or_else(|| missing("current"))?;
    let daily = data.daily.ok_or_else(|| missing("daily"))?;
    let condition = current.weather.first().ok_or_else(|| missing("weather"))?;

    let forecast = daily
        .iter()
        .map(|day| {
            let condition = day.weather.first().ok_or_else(|| missing("weather"))?;
            Ok(DailyForecast {
                date: day.dt,
                icon: condition.icon.clone(),
                description: condition.description.clone(),
                temp_min: day.temp.min,
                temp_max: day.temp.max,
            })
        })
        .collect::<Result<Vec<_>, DomainError>>()?;

    Ok(WeatherSummary {
        temp: current.temp.round(),
        icon: condition.icon.clone(),
        description: condition.description.clone(),
        forecast,
    })
}

fn watering_from_periods(periods: &[ForecastPeriod]) -> Result<WateringObservation, DomainError> {
    let periods = &periods[..periods.len().min(PERIODS_PER_DAY)];
    let first = periods
        .first()
        .ok_or_else(|| DomainError::MissingWeatherField("hourly".to_string()))?;
    let n = periods.len() as f64;

    Ok(WateringObservation {
        temperature: Some(periods.iter().map(|p| p.temp).sum::<f64>() / n),
        humidity: Some(periods.iter().map(|p| p.humidity).sum::<f64>() / n),
        precipitation: Some(periods.iter().map(|p| p.rain).sum()),
        is_raining: first.rain > 0.0,
    })
}

fn eto_from_periods(
    periods: &[ForecastPeriod],
    coordinates: &GeoCoordinates,
) -> Result<EToObservation, DomainError> {
    if periods.len() < PERIODS_PER_DAY {
        return Err(DomainError::InsufficientWeatherData);
    }
    let samples = &periods[..PERIODS_PER_DAY];

    let windows: Vec<CloudCoverWindow> = samples
        .iter()
        .filter_map(|p| {
            let start = DateTime::<Utc>::from_timestamp(p.start, 0)?;
            Some(CloudCoverWindow {
                start,
                end: start + Duration::hours(PERIOD_HOURS as i64),
                cloud_cover: p.clouds / 100.0,
            })
        })
        .collect();

    let fold = |f: fn(&ForecastPeriod) -> f64| {
        samples.iter().map(f).fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        })
    };
    let (min_temp, max_temp) = fold(|p| p.temp);
    let (min_humidity, max_humidity) = fold(|p| p.humidity);
    let mean_wind = samples.iter().map(|p| p.wind_speed).sum::<f64>() / samples.len() as f64;

    Ok(EToObservation {
        period_start: samples[0].start,
        min_temp,
        max_temp,
        min_humidity,
        max_humidity,
        solar_radiation: approximate_solar_radiation(&windows, coordinates),
        wind_speed: standardize_wind_speed(mean_wind, WIND_MEASUREMENT_HEIGHT_METERS),
        precipitation: samples.iter().map(|p| p.rain).sum(),
    })
}

#[axum::async_trait]
impl WeatherDataSource for WeatherClient {
    fn id(&self) -> &'static str {
        "OWM"
    }

    async fn watering_observation(
        &self,
        coordinates: &GeoCoordinates,
    ) -> Result<WateringObservation, DomainError> {
        watering_from_periods(&self.forecast(coordinates).await?)
    }

    async fn eto_observation(
        &self,
        coordinates: &GeoCoordinates,
    ) -> Result<EToObservation, DomainError> {
        eto_from_periods(&self.forecast(coordinates).await?, coordinates)
    }

    async fn weather_summary(
        &self,
        coordinates: &GeoCoordinates,
    ) -> Result<WeatherSummary, DomainError> {
        let data = self.one_call(coordinates, "minutely,hourly,alerts").await?;
        summary_from_one_call(data)
    }

    fn should_cache_watering_scale(&self) -> bool {
        true
    }
}

#[axum::async_trait]
impl TimeZoneLookup for WeatherClient {
    async fn utc_offset_minutes(&self, coordinates: &GeoCoordinates) -> Result<i32, DomainError> {
        let data = self
            .one_call(coordinates, "current,minutely,hourly,daily,alerts")
            .await
            .map_err(|e| DomainError::LocationServiceApiError(e.to_string()))?;
        Ok(data.timezone_offset / 60)
    }
}
