use anyhow::Result;
use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::Serialize;

use super::position::{SolarPosition, check_coordinates};

/// Sunrise/sunset as local wall-clock times, and day length in hours.
///
/// Polar day reports `(None, None, Some(24.0))`; polar night
/// `(None, None, Some(0.0))`. A day with only one horizon crossing inside
/// the 24-hour window leaves `day_length` unset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SunTimes {
    pub sunrise: Option<NaiveTime>,
    pub sunset: Option<NaiveTime>,
    pub day_length: Option<f64>,
}

/// Coarse scan step over the 24-hour window (hours).
const SCAN_STEP: f64 = 0.25;

/// Finds the horizon crossings of the solar altitude over the given date.
///
/// The window is scanned at 15-minute resolution and each crossing refined
/// by bisection to sub-second precision.
pub fn sun_times(latitude: f64, longitude: f64, date: NaiveDate) -> Result<SunTimes> {
    check_coordinates(latitude, longitude)?;
    let day_of_year = date.ordinal();
    let altitude = |hours: f64| SolarPosition::at(latitude, longitude, day_of_year, hours).altitude;

    let mut sunrise: Option<f64> = None;
    let mut sunset: Option<f64> = None;
    let mut prev_hours = 0.0;
    let mut prev_alt = altitude(0.0);
    let mut hours = SCAN_STEP;
    while hours <= 24.0 + 1e-9 {
        let alt = altitude(hours);
        if sunrise.is_none() && prev_alt <= 0.0 && alt > 0.0 {
            sunrise = Some(refine_crossing(&altitude, prev_hours, hours, true));
        }
        if sunset.is_none() && prev_alt > 0.0 && alt <= 0.0 {
            sunset = Some(refine_crossing(&altitude, prev_hours, hours, false));
        }
        prev_hours = hours;
        prev_alt = alt;
        hours += SCAN_STEP;
    }

    if sunrise.is_none() && sunset.is_none() {
        // No crossing at all: polar day or polar night.
        let day_length = if altitude(12.0) > 0.0 { 24.0 } else { 0.0 };
        return Ok(SunTimes {
            sunrise: None,
            sunset: None,
            day_length: Some(day_length),
        });
    }

    let day_length = match (sunrise, sunset) {
        (Some(rise), Some(set)) => Some((set - rise).rem_euclid(24.0)),
        _ => None,
    };
    Ok(SunTimes {
        sunrise: sunrise.map(hours_to_time),
        sunset: sunset.map(hours_to_time),
        day_length,
    })
}

/// Bisects an altitude zero-crossing bracketed by `[lo, hi]`.
fn refine_crossing(altitude: &impl Fn(f64) -> f64, mut lo: f64, mut hi: f64, rising: bool) -> f64 {
    for _ in 0..24 {
        let mid = 0.5 * (lo + hi);
        let above = altitude(mid) > 0.0;
        if above == rising {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    0.5 * (lo + hi)
}

fn hours_to_time(hours: f64) -> NaiveTime {
    let secs = (hours.rem_euclid(24.0) * 3600.0).round() as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(secs.min(86_399), 0).unwrap_or(NaiveTime::MIN)
}
