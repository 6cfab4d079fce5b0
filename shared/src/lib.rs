//! Shared types and pure domain logic for the irrigation weather service
//!
//! Nothing in this crate performs I/O. The backend supplies weather data,
//! raster bytes, timezones and cache storage through its own collaborators.

pub mod error;
pub mod evapotranspiration;
pub mod models;
pub mod types;
pub mod validation;

pub use error::*;
pub use evapotranspiration::*;
pub use models::*;
pub use types::*;
pub use validation::*;
