//! Domain models for the watering scale pipeline

mod adjustment;
mod baseline_eto;
mod cache;
mod forecast;
mod watering;

pub use adjustment::*;
pub use baseline_eto::*;
pub use cache::*;
pub use forecast::*;
pub use watering::*;
