//! Planar operations on rings of [`GeoPoint`]s.
//!
//! Rings are stored open (the closing vertex is implicit) and treated as
//! flat 2D polygons in degree space. Areas in square meters use a single
//! latitude-dependent scale, adequate for footprint-sized geometry.

use anyhow::Result;

use crate::error::ValidationError;
use crate::geom::point::GeoPoint;
use crate::geom::{AREA_EPS, EPS, METERS_PER_DEGREE};

/// A 2D point in degree space, used by the clipping routines.
pub(crate) type Pt2 = (f64, f64);

/// Normalizes a ring: drops consecutive duplicates and the explicit closing
/// vertex, then checks that the result is a simple polygon with area.
pub fn normalize(ring: &[GeoPoint]) -> Result<Vec<GeoPoint>> {
    let mut pts: Vec<GeoPoint> = Vec::with_capacity(ring.len());
    for p in ring {
        if pts.last().is_none_or(|last: &GeoPoint| !last.is_close(p)) {
            pts.push(*p);
        }
    }
    if pts.len() > 1
        && let Some(last) = pts.last().copied()
        && pts[0].is_close(&last)
    {
        pts.pop();
    }
    if pts.len() < 3 {
        return Err(ValidationError::TooFewVertices(pts.len()).into());
    }
    if !is_simple(&pts) {
        return Err(ValidationError::SelfIntersecting.into());
    }
    if signed_area(&pts).abs() < AREA_EPS {
        return Err(ValidationError::DegenerateRing.into());
    }
    Ok(pts)
}

/// Shoelace formula; positive for counter-clockwise rings (square degrees).
pub fn signed_area(ring: &[GeoPoint]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        sum += a.lng * b.lat - b.lng * a.lat;
    }
    0.5 * sum
}

pub fn area(ring: &[GeoPoint]) -> f64 {
    signed_area(ring).abs()
}

/// Converts a square-degree area to square meters at the given latitude.
///
/// The longitude axis shrinks by cos(lat); the latitude axis does not.
pub(crate) fn deg2_to_m2(area_deg2: f64, latitude: f64) -> f64 {
    area_deg2 * METERS_PER_DEGREE * METERS_PER_DEGREE * latitude.to_radians().cos().abs()
}

/// Arithmetic mean of the vertices. Adequate as a local origin for
/// footprint-sized polygons.
pub fn centroid(ring: &[GeoPoint]) -> GeoPoint {
    let n = ring.len().max(1) as f64;
    GeoPoint {
        lng: ring.iter().map(|p| p.lng).sum::<f64>() / n,
        lat: ring.iter().map(|p| p.lat).sum::<f64>() / n,
    }
}

pub(crate) fn as_tuples(ring: &[GeoPoint]) -> Vec<Pt2> {
    ring.iter().map(|p| (p.lng, p.lat)).collect()
}

/// Checks that no two non-adjacent edges of the ring intersect or touch.
pub fn is_simple(ring: &[GeoPoint]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    for i in 0..n {
        let (a1, a2) = (ring[i], ring[(i + 1) % n]);
        for j in (i + 1)..n {
            // Skip the shared-endpoint pairs (consecutive edges and the
            // first/last edge pair).
            if j == i + 1 || (i == 0 && j == n - 1) {
                continue;
            }
            let (b1, b2) = (ring[j], ring[(j + 1) % n]);
            if segments_intersect(a1, a2, b1, b2) {
                return false;
            }
        }
    }
    true
}

fn cross(o: GeoPoint, a: GeoPoint, b: GeoPoint) -> f64 {
    (a.lng - o.lng) * (b.lat - o.lat) - (a.lat - o.lat) * (b.lng - o.lng)
}

fn on_segment(a: GeoPoint, b: GeoPoint, p: GeoPoint) -> bool {
    p.lng >= a.lng.min(b.lng) - EPS
        && p.lng <= a.lng.max(b.lng) + EPS
        && p.lat >= a.lat.min(b.lat) - EPS
        && p.lat <= a.lat.max(b.lat) + EPS
}

fn segments_intersect(p1: GeoPoint, p2: GeoPoint, p3: GeoPoint, p4: GeoPoint) -> bool {
    let d1 = cross(p3, p4, p1);
    let d2 = cross(p3, p4, p2);
    let d3 = cross(p1, p2, p3);
    let d4 = cross(p1, p2, p4);

    if ((d1 > EPS && d2 < -EPS) || (d1 < -EPS && d2 > EPS))
        && ((d3 > EPS && d4 < -EPS) || (d3 < -EPS && d4 > EPS))
    {
        return true;
    }
    // Collinear touching counts as an intersection between non-adjacent edges.
    (d1.abs() <= EPS && on_segment(p3, p4, p1))
        || (d2.abs() <= EPS && on_segment(p3, p4, p2))
        || (d3.abs() <= EPS && on_segment(p1, p2, p3))
        || (d4.abs() <= EPS && on_segment(p1, p2, p4))
}

/// Returns true if the ring turns in one direction only.
pub fn is_convex(ring: &[GeoPoint]) -> bool {
    let n = ring.len();
    if n < 4 {
        return n == 3;
    }
    let mut sign = 0.0_f64;
    for i in 0..n {
        let c = cross(ring[i], ring[(i + 1) % n], ring[(i + 2) % n]);
        if c.abs() <= EPS {
            continue;
        }
        if sign == 0.0 {
            sign = c.signum();
        } else if c.signum() != sign {
            return false;
        }
    }
    true
}

/// Andrew's monotone chain. Returns the hull as a counter-clockwise ring
/// without collinear vertices.
pub fn convex_hull(points: &[GeoPoint]) -> Vec<GeoPoint> {
    let mut pts: Vec<GeoPoint> = points.to_vec();
    pts.sort_by(|a, b| a.lng.total_cmp(&b.lng).then(a.lat.total_cmp(&b.lat)));
    pts.dedup_by(|a, b| a.is_close(b));
    let n = pts.len();
    if n < 3 {
        return pts;
    }

    let mut hull: Vec<GeoPoint> = Vec::with_capacity(2 * n);
    // Lower hull
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= EPS {
            hull.pop();
        }
        hull.push(p);
    }
    // Upper hull
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= EPS
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop(); // last point repeats the first
    hull
}
