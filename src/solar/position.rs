use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::ValidationError;
use crate::time::TimeSpec;

use super::suntimes::{SunTimes, sun_times};

/// Solar position (altitude, azimuth and zenith angles).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SolarPosition {
    /// Solar altitude angle in degrees (negative = below horizon).
    pub altitude: f64,
    /// Solar azimuth angle in degrees from north, clockwise (0=N, 90=E, 180=S, 270=W).
    pub azimuth: f64,
    /// Zenith angle in degrees (90 - altitude).
    pub zenith: f64,
}

impl SolarPosition {
    /// Calculates the solar position for a wall-clock time at a location.
    ///
    /// - `latitude`: in degrees (positive north)
    /// - `longitude`: in degrees (positive east)
    ///
    /// Pure and side-effect-free; identical inputs give identical results.
    pub fn calculate(latitude: f64, longitude: f64, time: &TimeSpec) -> Result<Self> {
        check_coordinates(latitude, longitude)?;
        Ok(Self::at(
            latitude,
            longitude,
            time.day_of_year(),
            time.local_hours(),
        ))
    }

    /// Core declination/hour-angle formula, without input validation.
    ///
    /// `local_hours` is wall-clock time as fractional hours (0-24).
    pub(crate) fn at(latitude: f64, longitude: f64, day_of_year: u32, local_hours: f64) -> Self {
        let lat = latitude.to_radians();
        let _ = longitude; // Longitude would only enter through a solar-time correction

        let decl = declination(day_of_year).to_radians();

        // Hour angle (15 degrees per hour from solar noon)
        let hour_angle = (15.0 * (local_hours - 12.0)).to_radians();

        // Solar altitude
        let sin_alt = lat.sin() * decl.sin() + lat.cos() * decl.cos() * hour_angle.cos();
        let altitude = sin_alt.clamp(-1.0, 1.0).asin().to_degrees();

        // Solar azimuth: atan2 gives the bearing measured from south
        // (west-positive); +180 re-bases it to clockwise-from-north.
        let az = hour_angle
            .sin()
            .atan2(hour_angle.cos() * lat.sin() - decl.tan() * lat.cos());
        let azimuth = (az.to_degrees() + 180.0).rem_euclid(360.0);

        Self {
            altitude,
            azimuth,
            zenith: 90.0 - altitude,
        }
    }

    /// Returns true if the sun is above the horizon.
    pub fn is_above_horizon(&self) -> bool {
        self.altitude > 0.0
    }

    /// Shadow length per meter of casting height, `1/tan(altitude)`.
    ///
    /// Infinite at or below the horizon (no finite shadow).
    pub fn shadow_coefficient(&self) -> f64 {
        if self.altitude <= 0.0 {
            f64::INFINITY
        } else {
            1.0 / self.altitude.to_radians().tan()
        }
    }
}

/// Solar declination in degrees (Cooper's approximation).
fn declination(day_of_year: u32) -> f64 {
    23.45 * (360.0 / 365.0 * (day_of_year as f64 - 81.0)).to_radians().sin()
}

pub(crate) fn check_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ValidationError::LatitudeOutOfRange(latitude).into());
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ValidationError::LongitudeOutOfRange(longitude).into());
    }
    Ok(())
}

/// Solar position at one whole hour of the day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlyPosition {
    pub hour: u32,
    pub altitude: f64,
    pub azimuth: f64,
}

/// Solar positions for all 24 hours of a day.
pub fn daily_positions(latitude: f64, longitude: f64, date: NaiveDate) -> Result<Vec<HourlyPosition>> {
    check_coordinates(latitude, longitude)?;
    let day_of_year = date.ordinal();
    Ok((0..24)
        .map(|hour| {
            let pos = SolarPosition::at(latitude, longitude, day_of_year, hour as f64);
            HourlyPosition {
                hour,
                altitude: pos.altitude,
                azimuth: pos.azimuth,
            }
        })
        .collect())
}

/// Position plus the day's sunrise/sunset, as reported to callers.
#[derive(Debug, Clone, Serialize)]
pub struct SolarReport {
    pub position: SolarPosition,
    pub sun_times: SunTimes,
    pub timestamp: DateTime<Tz>,
}

pub fn solar_report(latitude: f64, longitude: f64, time: &TimeSpec) -> Result<SolarReport> {
    let position = SolarPosition::calculate(latitude, longitude, time)?;
    let sun_times = sun_times(latitude, longitude, time.date)?;
    Ok(SolarReport {
        position,
        sun_times,
        timestamp: time.local(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Shanghai;
    use chrono_tz::UTC;

    fn time(date: (i32, u32, u32), hour: u32, minute: u32, tz: Tz) -> TimeSpec {
        TimeSpec::new(
            NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            hour,
            minute,
            tz,
        )
        .unwrap()
    }

    #[test]
    fn test_noon_equator_equinox_near_zenith() {
        // At solar noon on the equinox, sun should be nearly overhead at the equator
        let pos = SolarPosition::calculate(0.0, 0.0, &time((2024, 3, 21), 12, 0, UTC)).unwrap();
        assert!(
            pos.altitude > 85.0,
            "expected near-zenith, got {}",
            pos.altitude
        );
        assert!(pos.is_above_horizon());
        assert!((pos.zenith - (90.0 - pos.altitude)).abs() < 1e-12);
    }

    #[test]
    fn test_midnight_below_horizon() {
        let pos = SolarPosition::calculate(45.0, 0.0, &time((2024, 12, 21), 0, 0, UTC)).unwrap();
        assert!(!pos.is_above_horizon());
        assert_eq!(pos.shadow_coefficient(), f64::INFINITY);
    }

    #[test]
    fn test_noon_azimuth_south_in_northern_hemisphere() {
        let pos =
            SolarPosition::calculate(39.9042, 116.4074, &time((2024, 6, 21), 12, 0, Shanghai))
                .unwrap();
        assert!(
            (pos.azimuth - 180.0).abs() < 1.0,
            "expected ~180, got {}",
            pos.azimuth
        );
    }

    #[test]
    fn test_noon_azimuth_north_in_southern_hemisphere() {
        let pos = SolarPosition::calculate(-33.87, 151.21, &time((2024, 6, 21), 12, 0, UTC)).unwrap();
        let from_north = pos.azimuth.min(360.0 - pos.azimuth);
        assert!(from_north < 1.0, "expected ~0/360, got {}", pos.azimuth);
    }

    #[test]
    fn test_morning_sun_in_the_east() {
        let pos =
            SolarPosition::calculate(39.9042, 116.4074, &time((2024, 6, 21), 7, 0, Shanghai))
                .unwrap();
        assert!(
            pos.azimuth > 0.0 && pos.azimuth < 180.0,
            "morning azimuth should be east of the meridian, got {}",
            pos.azimuth
        );
    }

    #[test]
    fn test_minutes_shift_the_hour_angle() {
        let on_the_hour =
            SolarPosition::calculate(40.0, 0.0, &time((2024, 6, 21), 10, 0, UTC)).unwrap();
        let half_past =
            SolarPosition::calculate(40.0, 0.0, &time((2024, 6, 21), 10, 30, UTC)).unwrap();
        assert!(half_past.altitude > on_the_hour.altitude);
    }

    #[test]
    fn test_identical_inputs_identical_results() {
        let t = time((2024, 6, 21), 9, 30, Shanghai);
        let a = SolarPosition::calculate(39.9042, 116.4074, &t).unwrap();
        let b = SolarPosition::calculate(39.9042, 116.4074, &t).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_out_of_range_coordinates() {
        let t = time((2024, 6, 21), 12, 0, UTC);
        let err = SolarPosition::calculate(91.0, 0.0, &t).unwrap_err();
        assert!(err.downcast_ref::<ValidationError>().is_some());
        assert!(SolarPosition::calculate(0.0, 181.0, &t).is_err());
    }

    #[test]
    fn test_shadow_coefficient_at_45_degrees() {
        let pos = SolarPosition {
            altitude: 45.0,
            azimuth: 180.0,
            zenith: 45.0,
        };
        assert!((pos.shadow_coefficient() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_daily_positions_full_day() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        let positions = daily_positions(39.9042, 116.4074, date).unwrap();
        assert_eq!(positions.len(), 24);
        assert_eq!(positions[0].hour, 0);
        assert_eq!(positions[23].hour, 23);
        // Noon is the day's maximum in this local-time model.
        let max = positions
            .iter()
            .map(|p| p.altitude)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(max, positions[12].altitude);
    }
}
