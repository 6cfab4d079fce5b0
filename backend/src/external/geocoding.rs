//! OpenWeatherMap direct geocoding client

use reqwest::Client;
use serde::Deserialize;
use shared::{DomainError, GeoCoordinates};

use crate::services::geocoder::Geocoder;

/// Candidates requested per lookup; the first is used
const RESULT_LIMIT: u8 = 5;

/// Geocoding API client
#[derive(Clone)]
pub struct GeocodingClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct OWMGeocodingResult {
    lat: f64,
    lon: f64,
}

impl GeocodingClient {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
        }
    }
}

#[axum::async_trait]
impl Geocoder for GeocodingClient {
    async fn geocode(&self, location: &str) -> Result<GeoCoordinates, DomainError> {
        let url = format!("{}/direct", self.base_url);
        let api_error = |e: reqwest::Error| {
            let e = e.without_url();
            tracing::warn!("Geocoding request failed: {}", e);
            DomainError::LocationServiceApiError(e.to_string())
        };

        let results: Vec<OWMGeocodingResult> = self
            .client
            .get(&url)
            .query(&[
                ("q", location.to_string()),
                ("limit", RESULT_LIMIT.to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(api_error)?
            .json()
            .await
            .map_err(api_error)?;

        results
            .first()
            .map(|result| GeoCoordinates::new(result.lat, result.lon))
            .ok_or_else(|| DomainError::NoLocationFound(location.to_string()))
    }
}
