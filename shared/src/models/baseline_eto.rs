//! Baseline ETₒ raster file format
//!
//! The data file is a 32 byte header followed by `width * height` one-byte
//! pixels in row-major order. The raster excludes the northernmost 10 and the
//! southernmost 30 degrees of latitude. All offsets here are absolute file
//! offsets: the header occupies bytes 0-31 and pixel data starts at byte 32.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::types::GeoCoordinates;

/// Size of the file header in bytes
pub const HEADER_SIZE: usize = 32;

/// Newest file format version this reader understands
pub const MAX_SUPPORTED_VERSION: u8 = 1;

/// Only 8-bit rasters are produced
pub const SUPPORTED_BIT_DEPTH: u8 = 8;

/// Degrees of latitude cropped from the north edge
const CROPPED_NORTH_DEGREES: f64 = 10.0;

/// Degrees of latitude cropped from the south edge
const CROPPED_SOUTH_DEGREES: f64 = 30.0;

/// Degrees of latitude covered by the raster
const COVERED_LATITUDE_DEGREES: f64 = 180.0 - CROPPED_NORTH_DEGREES - CROPPED_SOUTH_DEGREES;

/// Pixel coordinates of latitude 0, longitude 0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelOrigin {
    pub x: f64,
    pub y: f64,
}

/// Metadata parsed from the file header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineEToRasterMeta {
    pub format_version: u8,
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    /// Annual ETₒ represented by a pixel value of 0
    pub minimum_eto: f32,
    /// Annual ETₒ increase per unit of pixel value
    pub scaling_factor: f32,
    pub origin: PixelOrigin,
}

impl BaselineEToRasterMeta {
    /// Decode the 32 byte header
    ///
    /// Layout: version (u8), width (u32 BE), height (u32 BE), bit depth (u8),
    /// minimum ETₒ (f32 BE), scaling factor (f32 BE), 14 reserved bytes.
    pub fn from_header(header: &[u8]) -> Result<Self, DomainError> {
        if header.len() < HEADER_SIZE {
            return Err(DomainError::DataUnavailable(format!(
                "header is {} bytes, expected {}",
                header.len(),
                HEADER_SIZE
            )));
        }

        let format_version = header[0];
        if format_version > MAX_SUPPORTED_VERSION {
            return Err(DomainError::UnsupportedFormat(format!(
                "version {} is newer than the supported version {}",
                format_version, MAX_SUPPORTED_VERSION
            )));
        }

        let width = u32::from_be_bytes([header[1], header[2], header[3], header[4]]);
        let height = u32::from_be_bytes([header[5], header[6], header[7], header[8]]);

        let bit_depth = header[9];
        if bit_depth != SUPPORTED_BIT_DEPTH {
            return Err(DomainError::UnsupportedFormat(format!(
                "bit depth {} is not supported",
                bit_depth
            )));
        }

        let minimum_eto = f32::from_be_bytes([header[10], header[11], header[12], header[13]]);
        let scaling_factor = f32::from_be_bytes([header[14], header[15], header[16], header[17]]);

        let origin = PixelOrigin {
            x: (width / 2) as f64,
            y: (height as f64 / COVERED_LATITUDE_DEGREES * (90.0 - CROPPED_NORTH_DEGREES)).floor(),
        };

        Ok(Self {
            format_version,
            width,
            height,
            bit_depth,
            minimum_eto,
            scaling_factor,
            origin,
        })
    }

    /// Encode a header, mainly for building fixtures
    pub fn to_header(&self) -> [u8; HEADER_SIZE] {
        let mut header = [0u8; HEADER_SIZE];
        header[0] = self.format_version;
        header[1..5].copy_from_slice(&self.width.to_be_bytes());
        header[5..9].copy_from_slice(&self.height.to_be_bytes());
        header[9] = self.bit_depth;
        header[10..14].copy_from_slice(&self.minimum_eto.to_be_bytes());
        header[14..18].copy_from_slice(&self.scaling_factor.to_be_bytes());
        header
    }

    /// Total number of pixels
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Index of the pixel covering `coordinates`, counted from the start of the pixel data
    pub fn pixel_index(&self, coordinates: &GeoCoordinates) -> Result<u64, DomainError> {
        // 180°E and 180°W are the same meridian and share the first column.
        let x = (self.origin.x + self.width as f64 * coordinates.longitude / 360.0)
            .floor()
            .rem_euclid(self.width as f64);
        let y = (self.origin.y - self.height as f64 * coordinates.latitude / COVERED_LATITUDE_DEGREES)
            .floor();

        if !x.is_finite() || !y.is_finite() {
            return Err(DomainError::OutOfBounds);
        }

        let index = y as i64 * self.width as i64 + x as i64;
        if index < 0 || index as u64 >= self.pixel_count() {
            return Err(DomainError::OutOfBounds);
        }

        Ok(index as u64)
    }

    /// Absolute file offset of the pixel covering `coordinates`
    pub fn file_offset(&self, coordinates: &GeoCoordinates) -> Result<u64, DomainError> {
        Ok(self.pixel_index(coordinates)? + HEADER_SIZE as u64)
    }

    /// Pixel value reserved for "no data"
    pub fn no_data_value(&self) -> u32 {
        (1u32 << self.bit_depth) - 1
    }

    /// Average daily ETₒ for a pixel value
    pub fn daily_eto(&self, pixel: u8) -> Result<f64, DomainError> {
        if pixel as u32 == self.no_data_value() {
            return Err(DomainError::DataUnavailable(
                "no baseline ETo data for this location".to_string(),
            ));
        }

        let annual = pixel as f64 * self.scaling_factor as f64 + self.minimum_eto as f64;
        Ok(annual / 365.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(width: u32, height: u32) -> BaselineEToRasterMeta {
        let mut header = [0u8; HEADER_SIZE];
        header[0] = 1;
        header[1..5].copy_from_slice(&width.to_be_bytes());
        header[5..9].copy_from_slice(&height.to_be_bytes());
        header[9] = 8;
        header[10..14].copy_from_slice(&0.0f32.to_be_bytes());
        header[14..18].copy_from_slice(&0.1f32.to_be_bytes());
        BaselineEToRasterMeta::from_header(&header).unwrap()
    }

    #[test]
    fn test_parse_header() {
        let meta = meta(43200, 16800);
        assert_eq!(meta.format_version, 1);
        assert_eq!(meta.width, 43200);
        assert_eq!(meta.height, 16800);
        assert_eq!(meta.bit_depth, 8);
        assert_eq!(meta.minimum_eto, 0.0);
        assert!((meta.scaling_factor - 0.1).abs() < 1e-6);
        assert_eq!(meta.origin.x, 21600.0);
        assert_eq!(meta.origin.y, 9600.0);
    }

    #[test]
    fn test_header_round_trips_through_encoder() {
        let original = meta(100, 50);
        let decoded = BaselineEToRasterMeta::from_header(&original.to_header()).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_rejects_newer_version() {
        let mut header = meta(2, 2).to_header();
        header[0] = 2;
        assert!(matches!(
            BaselineEToRasterMeta::from_header(&header),
            Err(DomainError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_rejects_other_bit_depths() {
        let mut header = meta(2, 2).to_header();
        header[9] = 16;
        assert!(matches!(
            BaselineEToRasterMeta::from_header(&header),
            Err(DomainError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_short_header_is_unavailable() {
        assert!(matches!(
            BaselineEToRasterMeta::from_header(&[1, 0, 0]),
            Err(DomainError::DataUnavailable(_))
        ));
    }

    #[test]
    fn test_origin_pixel_for_zero_coordinates() {
        let meta = meta(2, 2);
        assert_eq!(meta.origin.x, 1.0);
        assert_eq!(meta.origin.y, 1.0);
        let index = meta.pixel_index(&GeoCoordinates::new(0.0, 0.0)).unwrap();
        assert_eq!(index, 3);
        assert_eq!(meta.file_offset(&GeoCoordinates::new(0.0, 0.0)).unwrap(), 35);
    }

    #[test]
    fn test_cropped_latitudes_are_out_of_bounds() {
        let meta = meta(360, 140);
        assert!(meta.pixel_index(&GeoCoordinates::new(85.0, 0.0)).is_err());
        assert!(meta.pixel_index(&GeoCoordinates::new(-65.0, 0.0)).is_err());
        assert!(meta.pixel_index(&GeoCoordinates::new(45.0, 10.0)).is_ok());
    }

    #[test]
    fn test_antimeridian_stays_on_its_row() {
        let meta = meta(360, 140);
        let east = meta.pixel_index(&GeoCoordinates::new(0.0, 180.0)).unwrap();
        let west = meta.pixel_index(&GeoCoordinates::new(0.0, -180.0)).unwrap();
        assert_eq!(east, west);
        assert_eq!(east, 80 * 360);
        assert_eq!(
            meta.pixel_index(&GeoCoordinates::new(0.0, 179.5)).unwrap(),
            80 * 360 + 359
        );
    }

    #[test]
    fn test_daily_eto_from_pixel() {
        let meta = meta(2, 2);
        let eto = meta.daily_eto(100).unwrap();
        assert!((eto - 10.0 / 365.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_data_pixel() {
        let meta = meta(2, 2);
        assert!(matches!(meta.daily_eto(255), Err(DomainError::DataUnavailable(_))));
    }
}
