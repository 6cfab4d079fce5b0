//! Baseline ETₒ raster tests
//!
//! Reads pixels through `BaselineEToReader` from in-memory rasters.

mod common;

use std::sync::Arc;

use common::MemoryRaster;
use irrigation_server::services::BaselineEToReader;
use proptest::prelude::*;
use shared::{BaselineEToRasterMeta, DomainError, GeoCoordinates};

#[tokio::test]
async fn test_two_by_two_raster() {
    let mut reader = BaselineEToReader::new(Arc::new(MemoryRaster::new(2, 2, 0.0, 0.1, &[0, 0, 0, 100])));
    let meta = reader.read_header().await.unwrap().clone();
    assert_eq!(meta.width, 2);
    assert_eq!(meta.height, 2);

    let eto = reader
        .average_daily_eto(&GeoCoordinates::new(0.0, 0.0), None)
        .await
        .unwrap();
    assert!((eto - 10.0 / 365.0).abs() < 1e-6);
    assert!((eto - 0.0274).abs() < 1e-4);
}

#[tokio::test]
async fn test_truncated_raster_is_unavailable() {
    let mut reader = BaselineEToReader::new(Arc::new(MemoryRaster::new(2, 2, 0.0, 0.1, &[0, 0])));
    reader.read_header().await.unwrap();
    let result = reader
        .average_daily_eto(&GeoCoordinates::new(0.0, 0.0), None)
        .await;
    assert!(matches!(result, Err(DomainError::DataUnavailable(_))));
}

#[tokio::test]
async fn test_unsupported_version() {
    let mut raster = MemoryRaster::new(2, 2, 0.0, 0.1, &[0, 0, 0, 0]);
    raster.0[0] = 2;
    let mut reader = BaselineEToReader::new(Arc::new(raster));
    assert!(matches!(
        reader.read_header().await,
        Err(DomainError::UnsupportedFormat(_))
    ));
}

#[tokio::test]
async fn test_far_south_is_out_of_bounds() {
    let mut reader = BaselineEToReader::new(Arc::new(MemoryRaster::new(4, 4, 0.0, 0.1, &[1; 16])));
    reader.read_header().await.unwrap();
    let result = reader
        .average_daily_eto(&GeoCoordinates::new(-75.0, 10.0), None)
        .await;
    assert_eq!(result, Err(DomainError::OutOfBounds));
}

/// A global raster at one pixel per degree
fn world_raster(pixel: u8, minimum_eto: f32, scaling_factor: f32) -> MemoryRaster {
    MemoryRaster::new(360, 140, minimum_eto, scaling_factor, &vec![pixel; 360 * 140])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_daily_eto_matches_formula(
        latitude in -59.9f64..80.0,
        longitude in -180.0f64..179.9,
        pixel in 0u8..255,
        minimum_eto in 0.0f32..500.0,
        scaling_factor in 0.1f32..20.0,
    ) {
        let coordinates = GeoCoordinates::new(latitude, longitude);
        let (first, second) = tokio_test::block_on(async {
            let mut reader = BaselineEToReader::new(Arc::new(world_raster(pixel, minimum_eto, scaling_factor)));
            reader.read_header().await.unwrap();
            (
                reader.average_daily_eto(&coordinates, None).await.unwrap(),
                reader.average_daily_eto(&coordinates, None).await.unwrap(),
            )
        });
        let expected = (pixel as f64 * scaling_factor as f64 + minimum_eto as f64) / 365.0;

        prop_assert!((first - expected).abs() < 1e-9);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_header_round_trips_dimensions(width in 1u32..10_000, height in 1u32..10_000) {
        let raster = MemoryRaster::new(width, height, 0.0, 1.0, &[]);
        let meta = BaselineEToRasterMeta::from_header(&raster.0).unwrap();
        prop_assert_eq!(meta.width, width);
        prop_assert_eq!(meta.height, height);
        prop_assert!(meta.origin.y < height as f64);
    }
}
