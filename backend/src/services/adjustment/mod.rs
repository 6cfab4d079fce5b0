//! Watering adjustment methods
//!
//! Every method shares one pipeline: the method computes its scale, then the
//! restrictions encoded in the method byte may force that scale to 0%.

mod eto;
mod manual;
mod rain_delay;
mod zimmerman;

pub use eto::{eto_scale, DEFAULT_ELEVATION_METERS};
pub use rain_delay::DEFAULT_RAIN_DELAY_HOURS;
pub use zimmerman::zimmerman_scale;

use shared::{
    AdjustmentMethodId, AdjustmentMethodResult, AdjustmentOptions, DomainError, GeoCoordinates,
    MethodByte,
};

use super::restrictions::WateringRestrictions;
use super::weather::WeatherDataSource;

/// Collaborators and defaults available to every method
pub struct AdjustmentContext<'a> {
    pub weather: &'a dyn WeatherDataSource,
    pub default_elevation_meters: f64,
}

/// A decoded method byte ready to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjustmentMethod {
    id: AdjustmentMethodId,
    restrictions: WateringRestrictions,
}

impl AdjustmentMethod {
    /// Decode the method byte and select its algorithm
    pub fn from_method_byte(method: MethodByte) -> Result<Self, DomainError> {
        let decoded = method.decode();
        Ok(Self {
            id: AdjustmentMethodId::from_id(decoded.adjustment_method_id)?,
            restrictions: WateringRestrictions::from_method_byte(method),
        })
    }

    pub fn id(&self) -> AdjustmentMethodId {
        self.id
    }

    pub fn restrictions(&self) -> WateringRestrictions {
        self.restrictions
    }

    /// Compute the scale and apply any enabled restrictions
    pub async fn get_adjustment(
        &self,
        options: &AdjustmentOptions,
        coordinates: &GeoCoordinates,
        context: &AdjustmentContext<'_>,
    ) -> Result<AdjustmentMethodResult, DomainError> {
        let result = self
            .calculate_watering_scale(options, coordinates, context)
            .await?;
        self.apply_restrictions(coordinates, context, result).await
    }

    async fn calculate_watering_scale(
        &self,
        options: &AdjustmentOptions,
        coordinates: &GeoCoordinates,
        context: &AdjustmentContext<'_>,
    ) -> Result<AdjustmentMethodResult, DomainError> {
        match self.id {
            AdjustmentMethodId::Manual => Ok(manual::calculate()),
            AdjustmentMethodId::Zimmerman => {
                zimmerman::calculate(options, coordinates, context.weather).await
            }
            AdjustmentMethodId::RainDelay => {
                rain_delay::calculate(options, coordinates, context.weather).await
            }
            AdjustmentMethodId::EvapotranspirationScaling => {
                eto::calculate(options, coordinates, context).await
            }
        }
    }

    async fn apply_restrictions(
        &self,
        coordinates: &GeoCoordinates,
        context: &AdjustmentContext<'_>,
        mut result: AdjustmentMethodResult,
    ) -> Result<AdjustmentMethodResult, DomainError> {
        if !self.restrictions.enabled() {
            return Ok(result);
        }

        // Methods that fetched no weather (or none with precipitation) need a fresh observation.
        let precipitation = match result.source_observation.as_ref().and_then(|o| o.precipitation()) {
            Some(precipitation) => Some(precipitation),
            None => {
                context
                    .weather
                    .watering_observation(coordinates)
                    .await?
                    .precipitation
            }
        };

        if self.restrictions.check(precipitation)? {
            tracing::debug!(method = %self.id, "Watering restriction triggered");
            result.scale = Some(0);
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_maps_ids() {
        let method = AdjustmentMethod::from_method_byte(MethodByte(0x83)).unwrap();
        assert_eq!(method.id(), AdjustmentMethodId::EvapotranspirationScaling);
        assert!(method.restrictions().enabled());

        let method = AdjustmentMethod::from_method_byte(MethodByte(2)).unwrap();
        assert_eq!(method.id(), AdjustmentMethodId::RainDelay);
        assert!(!method.restrictions().enabled());
    }

    #[test]
    fn test_factory_rejects_unknown_ids() {
        assert_eq!(
            AdjustmentMethod::from_method_byte(MethodByte(0x84)),
            Err(DomainError::InvalidAdjustmentMethod(4))
        );
        assert_eq!(
            AdjustmentMethod::from_method_byte(MethodByte(127)),
            Err(DomainError::InvalidAdjustmentMethod(127))
        );
    }
}
