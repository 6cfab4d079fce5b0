//! HTTP API tests
//!
//! Drives the router with in-memory collaborators and checks both the
//! legacy query-string and JSON response formats.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use common::*;
use std::sync::Arc;

use irrigation_server::create_app;
use irrigation_server::services::CachedGeocoder;
use serde_json::Value;
use shared::DomainError;
use tower::ServiceExt;

fn dry_day() -> FakeWeather {
    FakeWeather::new(observation(21.0, 30.0, 0.0, false))
}

fn raster() -> MemoryRaster {
    MemoryRaster::new(2, 2, 0.0, 0.1, &[0, 0, 0, 100])
}

fn app(weather: FakeWeather) -> Router {
    create_app(app_state(weather, raster()))
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

/// Parse `&key=value` pairs
fn fields(body: &str) -> Vec<(String, String)> {
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn field<'a>(fields: &'a [(String, String)], key: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

#[tokio::test]
async fn test_root_is_unavailable() {
    let (status, _) = get(app(dry_day()), "/").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(app(dry_day()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_zimmerman_query_string_response() {
    let (status, body) = get(
        app(dry_day()),
        "/1?loc=42.36,-71.06&wto=%22bh%22:30,%22bt%22:21,%22br%22:0",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let fields = fields(&body);
    assert_eq!(fields[0], ("errCode".to_string(), "0".to_string()));
    assert_eq!(field(&fields, "scale"), Some("100"));
    // UTC-4 encodes as 48 - 16
    assert_eq!(field(&fields, "tz"), Some("32"));
    assert!(field(&fields, "sunrise").is_some());
    assert!(field(&fields, "sunset").is_some());
    assert!(field(&fields, "rawData").unwrap().contains(r#""wp":"fake""#));
    assert_eq!(field(&fields, "rd"), None);
}

#[tokio::test]
async fn test_json_response() {
    let (status, body) = get(app(dry_day()), "/1?loc=42.36,-71.06&format=json").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["errCode"], 0);
    assert_eq!(json["scale"], 100);
    assert_eq!(json["tz"], 32);
    assert_eq!(json["rawData"]["wp"], "fake");
    assert!(json.get("rd").is_none());
}

#[tokio::test]
async fn test_client_ip_is_echoed() {
    let request = Request::builder()
        .uri("/1?loc=42.36,-71.06")
        .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
        .body(Body::empty())
        .unwrap();
    let (_, body) = send(app(dry_day()), request).await;

    let fields = fields(&body);
    // 203.0.113.7 as a big-endian integer
    assert_eq!(field(&fields, "eip"), Some("3405803783"));

    let request = Request::builder()
        .uri("/1?loc=42.36,-71.06&format=json")
        .header("cf-connecting-ip", "1.2.3.4")
        .body(Body::empty())
        .unwrap();
    let (_, body) = send(app(dry_day()), request).await;
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["eip"], 0x0102_0304);
}

#[tokio::test]
async fn test_place_names_are_geocoded() {
    let (_, body) = get(app(dry_day()), "/1?loc=Boston,+MA&format=json").await;
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["errCode"], 0);

    let (_, body) = get(app(dry_day()), "/1?loc=Atlantis&format=json").await;
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["errCode"], 21);
    assert_eq!(json["scale"], 100);
}

#[tokio::test]
async fn test_rain_delay_response() {
    let weather = FakeWeather::new(observation(15.0, 90.0, 8.0, true));
    let (_, body) = get(app(weather), "/2?loc=42.36,-71.06").await;

    let fields = fields(&body);
    assert_eq!(field(&fields, "rd"), Some("24"));
    assert_eq!(field(&fields, "scale"), None);
}

#[tokio::test]
async fn test_invalid_method_resets_scale() {
    let (status, body) = get(app(dry_day()), "/9?loc=42.36,-71.06").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "&errCode=41&scale=100");

    let (_, body) = get(app(dry_day()), "/sprinkle?loc=42.36,-71.06").await;
    assert_eq!(body, "&errCode=41&scale=100");
}

#[tokio::test]
async fn test_manual_errors_carry_no_scale() {
    let (_, body) = get(app(dry_day()), "/0?loc=pws:KMABOSTO1").await;
    assert_eq!(body, "&errCode=22");
}

#[tokio::test]
async fn test_missing_base_eto() {
    let (_, body) = get(app(dry_day()), "/3?loc=42.36,-71.06&format=json").await;
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["errCode"], 51);
    assert_eq!(json["scale"], 100);
}

#[tokio::test]
async fn test_malformed_options() {
    let (_, body) = get(app(dry_day()), "/1?loc=42.36,-71.06&wto=bh:30").await;
    assert_eq!(body, "&errCode=50&scale=100");
}

#[tokio::test]
async fn test_weather_failure_is_reported() {
    let weather = FakeWeather::failing(DomainError::WeatherApiError("timeout".into()));
    let (_, body) = get(app(weather), "/1?loc=42.36,-71.06").await;
    assert_eq!(body, "&errCode=12&scale=100");
}

#[tokio::test]
async fn test_repeated_place_names_are_geocoded_once() {
    let geocoder = Arc::new(FakeGeocoder::default().with("Boston, MA", boston()));
    let cached = Arc::new(CachedGeocoder::new(geocoder.clone(), 100));
    let app = create_app(app_state_with_geocoder(dry_day(), raster(), cached));

    for uri in [
        "/1?loc=Boston,+MA&format=json",
        "/1?loc=boston,+ma&format=json",
        "/baselineETo?loc=BOSTON,+MA",
    ] {
        let (status, _) = get(app.clone(), uri).await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(geocoder.lookup_count(), 1);
}

// ============================================================================
// Weather data
// ============================================================================

#[tokio::test]
async fn test_weather_data() {
    let (status, body) = get(app(dry_day()), "/weatherData?loc=Boston,+MA").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["timezone"], -240);
    assert_eq!(json["weatherProvider"], "fake");
    assert_eq!(json["temp"], 21.0);
    assert_eq!(json["icon"], "01d");
    assert_eq!(json["forecast"][0]["temp_max"], 27.0);
    assert_eq!(json["location"][0], 42.36);
    assert_eq!(json["location"][1], -71.06);
    assert!(json["sunrise"].as_i64().unwrap() < json["sunset"].as_i64().unwrap());
}

#[tokio::test]
async fn test_weather_data_errors() {
    let (status, _) = get(app(dry_day()), "/weatherData?loc=Atlantis").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let weather = FakeWeather::failing(DomainError::WeatherApiError("timeout".into()));
    let (status, body) = get(app(weather), "/weatherData?loc=42.36,-71.06").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"]["err_code"], 12);
}

// ============================================================================
// Baseline ETo
// ============================================================================

#[tokio::test]
async fn test_baseline_eto_lookup() {
    let (status, body) = get(app(dry_day()), "/baselineETo?loc=0,0").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert!((json["eto"].as_f64().unwrap() - 0.0274).abs() < 1e-9);
}

#[tokio::test]
async fn test_baseline_eto_unknown_location() {
    let (status, body) = get(app(dry_day()), "/baselineETo?loc=Atlantis").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"]["err_code"], 21);
}

#[tokio::test]
async fn test_baseline_eto_no_data() {
    let state = app_state(dry_day(), MemoryRaster::new(2, 2, 0.0, 0.1, &[0, 0, 0, 255]));
    let (status, _) = get(create_app(state), "/baselineETo?loc=0,0").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_baseline_eto_bad_header() {
    let mut bytes = raster().0;
    bytes[9] = 16;
    let state = app_state(dry_day(), MemoryRaster(bytes));
    let (status, body) = get(create_app(state), "/baselineETo?loc=0,0").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(!body.contains("bit depth"));
}
