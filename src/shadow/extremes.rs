//! Winter vs summer solstice shadow comparison.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Serialize;

use crate::geom::footprint::Footprint;
use crate::shadow::project::{ShadowPolygon, project};
use crate::solar::position::SolarPosition;
use crate::time::TimeSpec;

/// Month and day of the winter solstice (northern hemisphere).
pub const WINTER_SOLSTICE: (u32, u32) = (12, 22);
/// Month and day of the summer solstice (northern hemisphere).
pub const SUMMER_SOLSTICE: (u32, u32) = (6, 21);

/// Shadow cast on one solstice date.
#[derive(Debug, Clone, Serialize)]
pub struct SolsticeShadow {
    pub date: NaiveDate,
    pub shadow: Option<ShadowPolygon>,
    pub shadow_area: f64,
    /// Shadow length per meter of height, `1/tan(altitude)`; infinite when
    /// the sun does not rise above the horizon at the compared hour.
    pub coefficient: f64,
}

/// The year's two extreme shadows and their length ratio.
#[derive(Debug, Clone, Serialize)]
pub struct ExtremeComparison {
    pub winter: SolsticeShadow,
    pub summer: SolsticeShadow,
    /// `winter.coefficient / summer.coefficient`, or 0 when the summer
    /// coefficient is not a positive finite number.
    pub ratio: f64,
}

/// Compares the building's shadow at the same hour on both solstices.
pub fn compare_extremes(
    footprint: &Footprint,
    latitude: f64,
    longitude: f64,
    hour: u32,
    year: i32,
    tz: Tz,
) -> Result<ExtremeComparison> {
    let winter = solstice_shadow(footprint, latitude, longitude, hour, year, WINTER_SOLSTICE, tz)?;
    let summer = solstice_shadow(footprint, latitude, longitude, hour, year, SUMMER_SOLSTICE, tz)?;

    let ratio = if summer.coefficient.is_finite() && summer.coefficient > 0.0 {
        winter.coefficient / summer.coefficient
    } else {
        0.0
    };

    Ok(ExtremeComparison {
        winter,
        summer,
        ratio,
    })
}

fn solstice_shadow(
    footprint: &Footprint,
    latitude: f64,
    longitude: f64,
    hour: u32,
    year: i32,
    solstice: (u32, u32),
    tz: Tz,
) -> Result<SolsticeShadow> {
    let (month, day) = solstice;
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .with_context(|| format!("invalid solstice date {year}-{month:02}-{day:02}"))?;
    let time = TimeSpec::new(date, hour, 0, tz)?;
    let solar = SolarPosition::calculate(latitude, longitude, &time)?;
    let shadow = project(footprint, &solar);
    let shadow_area = shadow.as_ref().map_or(0.0, |s| s.area());
    Ok(SolsticeShadow {
        date,
        shadow,
        shadow_area,
        coefficient: solar.shadow_coefficient(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::point::GeoPoint;
    use chrono_tz::Asia::Shanghai;

    fn beijing_building() -> Footprint {
        let (lng, lat) = (116.4074, 39.9042);
        let size = 0.0005;
        Footprint::new(
            vec![
                GeoPoint { lng, lat },
                GeoPoint {
                    lng: lng + size,
                    lat,
                },
                GeoPoint {
                    lng: lng + size,
                    lat: lat + size,
                },
                GeoPoint {
                    lng,
                    lat: lat + size,
                },
            ],
            45.0,
        )
        .unwrap()
    }

    #[test]
    fn test_winter_shadow_longer_than_summer() {
        let fp = beijing_building();
        let cmp = compare_extremes(&fp, 39.9042, 116.4074, 12, 2024, Shanghai).unwrap();
        assert!(cmp.winter.coefficient > 1.0, "winter noon sun is low at 40°N");
        assert!(cmp.summer.coefficient < 1.0, "summer noon sun is high at 40°N");
        assert!(cmp.ratio > 1.0);
        assert!(cmp.winter.shadow_area > cmp.summer.shadow_area);
    }

    #[test]
    fn test_both_solstices_cast_shadows_at_noon() {
        let fp = beijing_building();
        let cmp = compare_extremes(&fp, 39.9042, 116.4074, 12, 2024, Shanghai).unwrap();
        assert!(cmp.winter.shadow.is_some());
        assert!(cmp.summer.shadow.is_some());
        assert_eq!(cmp.winter.date, NaiveDate::from_ymd_opt(2024, 12, 22).unwrap());
        assert_eq!(cmp.summer.date, NaiveDate::from_ymd_opt(2024, 6, 21).unwrap());
    }

    #[test]
    fn test_night_hour_ratio_is_zero() {
        // At 23:00 the sun is below the horizon on both solstices, so both
        // coefficients are infinite and the ratio degrades to zero.
        let fp = beijing_building();
        let cmp = compare_extremes(&fp, 39.9042, 116.4074, 23, 2024, Shanghai).unwrap();
        assert_eq!(cmp.winter.coefficient, f64::INFINITY);
        assert_eq!(cmp.summer.coefficient, f64::INFINITY);
        assert_eq!(cmp.ratio, 0.0);
        assert!(cmp.winter.shadow.is_none());
        assert_eq!(cmp.winter.shadow_area, 0.0);
    }

    #[test]
    fn test_rejects_invalid_hour() {
        let fp = beijing_building();
        assert!(compare_extremes(&fp, 39.9042, 116.4074, 24, 2024, Shanghai).is_err());
    }
}
