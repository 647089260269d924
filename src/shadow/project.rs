//! Projects a building footprint to its ground shadow.
//!
//! The shadow of an extruded polygon is approximated by the convex hull of
//! the base vertices and the roof vertices displaced along the shadow
//! direction. For convex footprints this is the exact swept silhouette;
//! for concave footprints it is a conservative over-approximation.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;

use crate::geom::METERS_PER_DEGREE;
use crate::geom::footprint::Footprint;
use crate::geom::point::GeoPoint;
use crate::geom::ring;
use crate::shadow::cache::ShadowResultCache;
use crate::solar::position::SolarPosition;

/// A shadow's ground polygon (convex, counter-clockwise, open ring) and its
/// planar area in square meters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShadowPolygon {
    ring: Vec<GeoPoint>,
    area: f64,
}

impl ShadowPolygon {
    pub(crate) fn new(ring: Vec<GeoPoint>, area: f64) -> Self {
        Self { ring, area }
    }

    pub fn vertices(&self) -> &[GeoPoint] {
        &self.ring
    }

    /// Planar area in square meters.
    pub fn area(&self) -> f64 {
        self.area
    }
}

/// Computes the shadow cast by a footprint for a solar position.
///
/// Returns `None` when the sun is at or below the horizon; that is a valid
/// no-shadow outcome, not an error. The returned polygon always contains
/// the footprint itself.
pub fn project(footprint: &Footprint, solar: &SolarPosition) -> Option<ShadowPolygon> {
    if !solar.is_above_horizon() {
        return None;
    }

    let origin = footprint.centroid();
    let length = footprint.height() / solar.altitude.to_radians().tan();

    // The shadow extends away from the sun.
    let azimuth = solar.azimuth.to_radians();
    let east = -length * azimuth.sin();
    let north = -length * azimuth.cos();

    // Meters per degree of longitude degenerates at the poles.
    let meters_per_lng = (METERS_PER_DEGREE * origin.lat.to_radians().cos()).max(1e-6);
    let dlng = east / meters_per_lng;
    let dlat = north / METERS_PER_DEGREE;

    let mut pts: Vec<GeoPoint> = footprint.vertices().to_vec();
    pts.extend(
        footprint
            .vertices()
            .iter()
            .map(|p| p.translated(dlng, dlat)),
    );

    let hull = ring::convex_hull(&pts);
    let area = ring::deg2_to_m2(ring::area(&hull), origin.lat);
    Some(ShadowPolygon::new(hull, area))
}

/// Like [`project`], but consults the cache before recomputing.
///
/// Only successful projections are cached; a below-horizon `None` is cheap
/// to re-derive and is never stored.
pub fn project_cached(
    cache: &ShadowResultCache,
    building_id: &str,
    footprint: &Footprint,
    solar: &SolarPosition,
    date: NaiveDate,
    hour: u32,
    ttl: Duration,
) -> Option<ShadowPolygon> {
    if let Some(entry) = cache.get(building_id, date, hour) {
        return Some(entry.shadow.clone());
    }
    let shadow = project(footprint, solar)?;
    cache.put(building_id, date, hour, shadow.clone(), ttl);
    Some(shadow)
}
