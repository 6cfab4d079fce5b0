//! External API integrations

pub mod geocoding;
pub mod weather;

pub use geocoding::GeocodingClient;
pub use weather::WeatherClient;
