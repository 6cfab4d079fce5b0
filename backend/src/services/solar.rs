//! Solar geometry
//!
//! Sun position and sunrise/sunset after the NOAA/SunCalc low precision
//! formulas, plus a cloud-cover approximation of daily solar radiation.

use std::f64::consts::PI;

use chrono::{DateTime, Duration, Utc};
use shared::GeoCoordinates;

const RAD: f64 = PI / 180.0;
const DAY_MS: f64 = 86_400_000.0;
const J1970: f64 = 2_440_588.0;
const J2000: f64 = 2_451_545.0;
const J0: f64 = 0.0009;
/// Obliquity of the Earth
const OBLIQUITY: f64 = RAD * 23.4397;
/// Sun altitude at sunrise/sunset, accounting for refraction and disc size
const SUNRISE_ALTITUDE: f64 = -0.833 * RAD;

/// Step used when integrating radiation over a window
const INTEGRATION_STEP_MINUTES: i64 = 5;

/// Cloud cover over one period of time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudCoverWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Fraction of the sky covered, 0-1
    pub cloud_cover: f64,
}

/// Local sunrise and sunset, in minutes after local midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolarTimes {
    pub sunrise: i32,
    pub sunset: i32,
}

fn to_julian(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 / DAY_MS - 0.5 + J1970
}

fn from_julian(julian: f64) -> Option<DateTime<Utc>> {
    let millis = (julian + 0.5 - J1970) * DAY_MS;
    if !millis.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(millis.round() as i64)
}

fn to_days(time: DateTime<Utc>) -> f64 {
    to_julian(time) - J2000
}

fn solar_mean_anomaly(days: f64) -> f64 {
    RAD * (357.5291 + 0.985_600_28 * days)
}

fn ecliptic_longitude(mean_anomaly: f64) -> f64 {
    let center = RAD
        * (1.9148 * mean_anomaly.sin()
            + 0.02 * (2.0 * mean_anomaly).sin()
            + 0.0003 * (3.0 * mean_anomaly).sin());
    let perihelion = RAD * 102.9372;
    mean_anomaly + center + perihelion + PI
}

fn declination(longitude: f64) -> f64 {
    (OBLIQUITY.sin() * longitude.sin()).asin()
}

fn right_ascension(longitude: f64) -> f64 {
    (longitude.sin() * OBLIQUITY.cos()).atan2(longitude.cos())
}

fn sidereal_time(days: f64, lw: f64) -> f64 {
    RAD * (280.16 + 360.985_623_5 * days) - lw
}

/// Altitude of the sun above the horizon, radians
pub fn sun_altitude(time: DateTime<Utc>, coordinates: &GeoCoordinates) -> f64 {
    let lw = RAD * -coordinates.longitude;
    let phi = RAD * coordinates.latitude;
    let days = to_days(time);

    let longitude = ecliptic_longitude(solar_mean_anomaly(days));
    let dec = declination(longitude);
    let hour_angle = sidereal_time(days, lw) - right_ascension(longitude);

    (phi.sin() * dec.sin() + phi.cos() * dec.cos() * hour_angle.cos()).asin()
}

/// Sunrise and sunset in UTC for the solar day containing `date`
///
/// `None` during polar day or night.
pub fn sunrise_sunset(
    date: DateTime<Utc>,
    coordinates: &GeoCoordinates,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let lw = RAD * -coordinates.longitude;
    let phi = RAD * coordinates.latitude;
    let days = to_days(date);

    let cycle = (days - J0 - lw / (2.0 * PI)).round();
    let approx_noon = J0 + lw / (2.0 * PI) + cycle;
    let mean_anomaly = solar_mean_anomaly(approx_noon);
    let longitude = ecliptic_longitude(mean_anomaly);
    let dec = declination(longitude);

    let transit = |ds: f64| J2000 + ds + 0.0053 * mean_anomaly.sin() - 0.0069 * (2.0 * longitude).sin();
    let noon = transit(approx_noon);

    let cos_hour_angle =
        (SUNRISE_ALTITUDE.sin() - phi.sin() * dec.sin()) / (phi.cos() * dec.cos());
    if !(-1.0..=1.0).contains(&cos_hour_angle) {
        return None;
    }
    let hour_angle = cos_hour_angle.acos();

    let set = transit(J0 + (hour_angle + lw) / (2.0 * PI) + cycle);
    let rise = noon - (set - noon);

    Some((from_julian(rise)?, from_julian(set)?))
}

/// Today's sunrise and sunset at a site, as local minutes after midnight
///
/// Polar day reports the full day, polar night reports both at midnight.
pub fn solar_times(
    now: DateTime<Utc>,
    coordinates: &GeoCoordinates,
    utc_offset_minutes: i32,
) -> SolarTimes {
    let local_minutes = |time: DateTime<Utc>| {
        let minutes = (time + Duration::minutes(utc_offset_minutes as i64)).timestamp() / 60;
        minutes.rem_euclid(1440) as i32
    };

    match sunrise_sunset(now, coordinates) {
        Some((rise, set)) => SolarTimes {
            sunrise: local_minutes(rise),
            sunset: local_minutes(set),
        },
        None if sun_altitude(now, coordinates) > 0.0 => SolarTimes {
            sunrise: 0,
            sunset: 1439,
        },
        None => SolarTimes {
            sunrise: 0,
            sunset: 0,
        },
    }
}

/// Clear sky insolation for a sun altitude, kW/m²; 0 while the sun is too low
fn clear_sky_insolation(altitude: f64) -> f64 {
    ((990.0 * altitude.sin() - 30.0) / 1000.0).max(0.0)
}

/// Total solar radiation over the windows, kWh/m²
///
/// Clear sky insolation is integrated over each window and reduced by its
/// cloud cover (`1 - 0.75·cover^3.4`).
pub fn approximate_solar_radiation(windows: &[CloudCoverWindow], coordinates: &GeoCoordinates) -> f64 {
    let step = Duration::minutes(INTEGRATION_STEP_MINUTES);

    windows
        .iter()
        .map(|window| {
            let mut clear_sky = 0.0;
            let mut cursor = window.start;
            while cursor < window.end {
                let next = (cursor + step).min(window.end);
                let hours = (next - cursor).num_seconds() as f64 / 3600.0;
                let midpoint = cursor + (next - cursor) / 2;
                clear_sky += clear_sky_insolation(sun_altitude(midpoint, coordinates)) * hours;
                cursor = next;
            }
            clear_sky * (1.0 - 0.75 * window.cloud_cover.clamp(0.0, 1.0).powf(3.4))
        })
        .sum()
}
