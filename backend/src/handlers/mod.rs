//! HTTP handlers for the irrigation weather service

pub mod baseline_eto;
pub mod health;
pub mod watering;
pub mod weather_data;

pub use baseline_eto::*;
pub use health::*;
pub use watering::*;
pub use weather_data::*;
