//! In-memory collaborators shared by the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use irrigation_server::services::{
    BaselineEToByteSource, Geocoder, MokaScaleCache, ScaleCacheStore, TimeZoneLookup,
    WateringScaleService, WeatherDataSource,
};
use irrigation_server::AppState;
use shared::{
    BaselineEToRasterMeta, DailyForecast, DomainError, EToObservation, GeoCoordinates,
    PixelOrigin, WateringObservation, WeatherSummary, HEADER_SIZE,
};

/// Weather source returning canned observations and counting fetches
pub struct FakeWeather {
    pub watering: Result<WateringObservation, DomainError>,
    pub eto: Result<EToObservation, DomainError>,
    pub cacheable: bool,
    pub fetches: AtomicUsize,
}

impl FakeWeather {
    pub fn new(watering: WateringObservation) -> Self {
        Self {
            watering: Ok(watering),
            eto: Ok(summer_day()),
            cacheable: false,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: DomainError) -> Self {
        Self {
            watering: Err(error.clone()),
            eto: Err(error),
            cacheable: false,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn cacheable(mut self) -> Self {
        self.cacheable = true;
        self
    }

    pub fn with_eto(mut self, eto: EToObservation) -> Self {
        self.eto = Ok(eto);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[axum::async_trait]
impl WeatherDataSource for FakeWeather {
    fn id(&self) -> &'static str {
        "fake"
    }

    async fn watering_observation(
        &self,
        _coordinates: &GeoCoordinates,
    ) -> Result<WateringObservation, DomainError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.watering.clone()
    }

    async fn eto_observation(
        &self,
        _coordinates: &GeoCoordinates,
    ) -> Result<EToObservation, DomainError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.eto.clone()
    }

    async fn weather_summary(
        &self,
        _coordinates: &GeoCoordinates,
    ) -> Result<WeatherSummary, DomainError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let observation = self.watering.clone()?;
        Ok(WeatherSummary {
            temp: observation.temperature.unwrap_or_default().round(),
            icon: "01d".to_string(),
            description: "clear sky".to_string(),
            forecast: vec![DailyForecast {
                date: 1_718_928_000,
                icon: "01d".to_string(),
                description: "clear sky".to_string(),
                temp_min: 15.0,
                temp_max: 27.0,
            }],
        })
    }

    fn should_cache_watering_scale(&self) -> bool {
        self.cacheable
    }
}

/// Fixed UTC offset, counting lookups
pub struct FakeTimeZone {
    pub offset_minutes: i32,
    pub lookups: AtomicUsize,
}

impl FakeTimeZone {
    pub fn new(offset_minutes: i32) -> Self {
        Self {
            offset_minutes,
            lookups: AtomicUsize::new(0),
        }
    }
}

#[axum::async_trait]
impl TimeZoneLookup for FakeTimeZone {
    async fn utc_offset_minutes(&self, _coordinates: &GeoCoordinates) -> Result<i32, DomainError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.offset_minutes)
    }
}

/// Geocoder backed by a fixed table of place names, matched case-insensitively
#[derive(Default)]
pub struct FakeGeocoder {
    pub places: HashMap<String, GeoCoordinates>,
    pub lookups: AtomicUsize,
}

impl FakeGeocoder {
    pub fn with(mut self, name: &str, coordinates: GeoCoordinates) -> Self {
        self.places.insert(name.to_lowercase(), coordinates);
        self
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[axum::async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, location: &str) -> Result<GeoCoordinates, DomainError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.places
            .get(&location.to_lowercase())
            .copied()
            .ok_or_else(|| DomainError::NoLocationFound(location.to_string()))
    }
}

/// Whole raster file held in memory
pub struct MemoryRaster(pub Vec<u8>);

impl MemoryRaster {
    /// Version 1, 8 bit raster with the given dimensions and pixels
    pub fn new(width: u32, height: u32, minimum_eto: f32, scaling_factor: f32, pixels: &[u8]) -> Self {
        let meta = BaselineEToRasterMeta {
            format_version: 1,
            width,
            height,
            bit_depth: 8,
            minimum_eto,
            scaling_factor,
            origin: PixelOrigin { x: 0.0, y: 0.0 },
        };
        let mut bytes = meta.to_header().to_vec();
        bytes.extend_from_slice(pixels);
        Self(bytes)
    }
}

#[axum::async_trait]
impl BaselineEToByteSource for MemoryRaster {
    async fn read_header_bytes(&self) -> Result<[u8; HEADER_SIZE], DomainError> {
        let slice = self
            .0
            .get(..HEADER_SIZE)
            .ok_or_else(|| DomainError::DataUnavailable("short file".into()))?;
        let mut header = [0u8; HEADER_SIZE];
        header.copy_from_slice(slice);
        Ok(header)
    }

    async fn read_byte(&self, offset: u64) -> Result<u8, DomainError> {
        self.0
            .get(offset as usize)
            .copied()
            .ok_or_else(|| DomainError::DataUnavailable("unexpected end of file".into()))
    }
}

pub fn observation(temperature: f64, humidity: f64, precipitation: f64, is_raining: bool) -> WateringObservation {
    WateringObservation {
        temperature: Some(temperature),
        humidity: Some(humidity),
        precipitation: Some(precipitation),
        is_raining,
    }
}

/// A warm, dry day near Boston starting 2024-06-21 04:00 UTC
pub fn summer_day() -> EToObservation {
    EToObservation {
        period_start: 1_718_942_400,
        min_temp: 17.0,
        max_temp: 29.0,
        min_humidity: 40.0,
        max_humidity: 80.0,
        solar_radiation: 7.0,
        wind_speed: 2.0,
        precipitation: 0.0,
    }
}

pub fn boston() -> GeoCoordinates {
    GeoCoordinates::new(42.36, -71.06)
}

pub fn service(
    weather: Arc<FakeWeather>,
    timezone: Arc<FakeTimeZone>,
    cache: Arc<dyn ScaleCacheStore>,
) -> WateringScaleService {
    WateringScaleService::new(weather, timezone, cache, 194.0)
}

pub fn app_state(weather: FakeWeather, raster: MemoryRaster) -> AppState {
    app_state_with_geocoder(
        weather,
        raster,
        Arc::new(FakeGeocoder::default().with("Boston, MA", boston())),
    )
}

pub fn app_state_with_geocoder(
    weather: FakeWeather,
    raster: MemoryRaster,
    geocoder: Arc<dyn Geocoder>,
) -> AppState {
    let weather = Arc::new(weather);
    let timezone = Arc::new(FakeTimeZone::new(-240));
    AppState {
        watering: service(
            weather.clone(),
            timezone.clone(),
            Arc::new(MokaScaleCache::new(100)),
        ),
        weather,
        timezone,
        geocoder,
        baseline_eto: Arc::new(raster),
    }
}
