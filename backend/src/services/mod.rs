//! Business logic services for the irrigation weather service

pub mod adjustment;
pub mod baseline_eto;
pub mod cache;
pub mod geocoder;
pub mod restrictions;
pub mod solar;
pub mod timezone;
pub mod watering_scale;
pub mod weather;

pub use adjustment::{AdjustmentContext, AdjustmentMethod};
pub use baseline_eto::{BaselineEToByteSource, BaselineEToReader};
pub use cache::{MokaScaleCache, NullScaleCache, ScaleCacheStore};
pub use geocoder::{CachedGeocoder, Geocoder, NullGeocoder};
pub use restrictions::WateringRestrictions;
pub use timezone::{StaticTimeZoneLookup, TimeZoneLookup};
pub use watering_scale::{WateringScale, WateringScaleService};
pub use weather::{StaticWeatherSource, WeatherDataSource};
