//! Reference evapotranspiration (ETₒ)
//!
//! Penman-Monteith (FAO-56) for the standard grass reference crop, broken into
//! the numbered steps of the FAO worksheet.

use std::f64::consts::PI;

use chrono::{DateTime, Datelike};

use crate::models::EToObservation;
use crate::types::GeoCoordinates;

/// kWh/m² to MJ/m²
const KWH_TO_MJ: f64 = 3.6;

/// Albedo of the hypothetical grass reference crop
const GRASS_ALBEDO: f64 = 0.23;

/// Stefan-Boltzmann constant, MJ K⁻⁴ m⁻² day⁻¹
const STEFAN_BOLTZMANN: f64 = 4.903e-9;

/// Solar constant, MJ m⁻² min⁻¹
const SOLAR_CONSTANT: f64 = 0.082;

/// Reference evapotranspiration in mm/day
///
/// Every field of `observation` must be present and finite; the ETₒ
/// adjustment method rejects incomplete data before calling this. The result
/// is not clamped.
pub fn calculate_eto(
    observation: &EToObservation,
    elevation_meters: f64,
    coordinates: &GeoCoordinates,
) -> f64 {
    let solar_radiation = observation.solar_radiation * KWH_TO_MJ;
    let u = observation.wind_speed;
    let mean_temp = mean_daily_temperature(observation.min_temp, observation.max_temp);

    let delta = slope_of_saturation_vapor_pressure_curve(mean_temp);
    let gamma = psychrometric_constant(atmospheric_pressure(elevation_meters));

    let e_tmin = saturation_vapor_pressure(observation.min_temp);
    let e_tmax = saturation_vapor_pressure(observation.max_temp);
    let ea = actual_vapor_pressure(
        e_tmin,
        e_tmax,
        observation.min_humidity,
        observation.max_humidity,
    );

    let wind = wind_term(
        psi_term(delta, gamma, u),
        temperature_term(mean_temp, u),
        e_tmin,
        e_tmax,
        ea,
    );

    let day = day_of_year(observation.period_start);
    let latitude = coordinates.latitude_radians();
    let declination = solar_declination(day);
    let ra = extraterrestrial_radiation(
        inverse_relative_distance_earth_sun(day),
        sunset_hour_angle(latitude, declination),
        latitude,
        declination,
    );
    let rso = clear_sky_solar_radiation(elevation_meters, ra);
    let rnl = net_outgoing_long_wave_radiation(
        observation.min_temp,
        observation.max_temp,
        ea,
        solar_radiation,
        rso,
    );
    let rn = net_radiation(net_short_wave_radiation(solar_radiation), rnl);

    wind + delta_term(delta, gamma, u) * rn
}

/// Day of the year (1-366) of a Unix timestamp, in UTC
pub fn day_of_year(epoch_seconds: i64) -> u32 {
    DateTime::from_timestamp(epoch_seconds, 0)
        .map(|dt| dt.ordinal())
        .unwrap_or(1)
}

// Step 1
fn mean_daily_temperature(t_min: f64, t_max: f64) -> f64 {
    (t_min + t_max) / 2.0
}

// Step 4
fn slope_of_saturation_vapor_pressure_curve(t_mean: f64) -> f64 {
    4098.0 * 0.6108 * (17.27 * t_mean / (t_mean + 237.3)).exp() / (t_mean + 237.3).powi(2)
}

// Step 5, kPa
fn atmospheric_pressure(z: f64) -> f64 {
    101.3 * ((293.0 - 0.0065 * z) / 293.0).powf(5.26)
}

// Step 6, kPa °C⁻¹
fn psychrometric_constant(p: f64) -> f64 {
    0.000665 * p
}

// Step 7
fn delta_term(delta: f64, gamma: f64, u: f64) -> f64 {
    delta / (delta + gamma * (1.0 + 0.34 * u))
}

// Step 8
fn psi_term(delta: f64, gamma: f64, u: f64) -> f64 {
    gamma / (delta + gamma * (1.0 + 0.34 * u))
}

// Step 9
fn temperature_term(t_mean: f64, u: f64) -> f64 {
    (900.0 / (t_mean + 273.0)) * u
}

/// Saturation vapor pressure at air temperature `t` (°C), kPa
pub fn saturation_vapor_pressure(t: f64) -> f64 {
    0.6108 * (17.27 * t / (t + 237.3)).exp()
}

// Step 11, kPa
fn actual_vapor_pressure(e_tmin: f64, e_tmax: f64, rh_min: f64, rh_max: f64) -> f64 {
    (e_tmin * rh_max / 100.0 + e_tmax * rh_min / 100.0) / 2.0
}

// Step 12a
fn inverse_relative_distance_earth_sun(day: u32) -> f64 {
    1.0 + 0.033 * (2.0 * PI / 365.0 * day as f64).cos()
}

// Step 12b, rad
fn solar_declination(day: u32) -> f64 {
    0.409 * (2.0 * PI / 365.0 * day as f64 - 1.39).sin()
}

// Step 14, rad. Clamped so polar day/night stays finite.
fn sunset_hour_angle(latitude: f64, declination: f64) -> f64 {
    (-latitude.tan() * declination.tan()).clamp(-1.0, 1.0).acos()
}

// Step 15, MJ m⁻² day⁻¹
fn extraterrestrial_radiation(dr: f64, ws: f64, latitude: f64, declination: f64) -> f64 {
    24.0 * 60.0 / PI
        * SOLAR_CONSTANT
        * dr
        * (ws * latitude.sin() * declination.sin()
            + latitude.cos() * declination.cos() * ws.sin())
}

// Step 16
fn clear_sky_solar_radiation(z: f64, ra: f64) -> f64 {
    (0.75 + 2e-5 * z) * ra
}

// Step 17
fn net_short_wave_radiation(rs: f64) -> f64 {
    (1.0 - GRASS_ALBEDO) * rs
}

// Step 18
fn net_outgoing_long_wave_radiation(t_min: f64, t_max: f64, ea: f64, rs: f64, rso: f64) -> f64 {
    STEFAN_BOLTZMANN * ((t_max + 273.16).powi(4) + (t_min + 273.16).powi(4)) / 2.0
        * (0.34 - 0.14 * ea.sqrt())
        * (1.35 * rs / rso - 0.35)
}

// Step 19, net radiation expressed as an evaporation equivalent (mm)
fn net_radiation(rns: f64, rnl: f64) -> f64 {
    0.408 * (rns - rnl)
}

// Step 20
fn wind_term(psi: f64, tt: f64, e_tmin: f64, e_tmax: f64, ea: f64) -> f64 {
    let es = (e_tmin + e_tmax) / 2.0;
    psi * tt * (es - ea)
}
