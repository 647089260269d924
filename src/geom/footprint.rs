use anyhow::Result;
use serde::Serialize;

use crate::error::ValidationError;
use crate::geom::point::GeoPoint;
use crate::geom::ring;

/// A building's ground polygon and its height in meters.
///
/// The ring is validated on construction (simple, at least 3 distinct
/// vertices, non-zero area) and stored open; the engine never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Footprint {
    ring: Vec<GeoPoint>,
    height: f64,
}

impl Footprint {
    pub fn new(ring: Vec<GeoPoint>, height: f64) -> Result<Self> {
        if !(height > 0.0) {
            return Err(ValidationError::NonPositiveHeight(height).into());
        }
        let ring = ring::normalize(&ring)?;
        Ok(Self { ring, height })
    }

    /// Builds a footprint from a GeoJSON Polygon value.
    pub fn from_geojson(value: &serde_json::Value, height: f64) -> Result<Self> {
        let ring = crate::io::geojson::ring_from_geojson(value)?;
        Self::new(ring, height)
    }

    pub fn vertices(&self) -> &[GeoPoint] {
        &self.ring
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn centroid(&self) -> GeoPoint {
        ring::centroid(&self.ring)
    }

    /// Planar area of the footprint in square meters.
    pub fn area_m2(&self) -> f64 {
        ring::deg2_to_m2(ring::area(&self.ring), self.centroid().lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lng: f64, lat: f64) -> GeoPoint {
        GeoPoint { lng, lat }
    }

    fn square_ring(origin: (f64, f64), size: f64) -> Vec<GeoPoint> {
        vec![
            pt(origin.0, origin.1),
            pt(origin.0 + size, origin.1),
            pt(origin.0 + size, origin.1 + size),
            pt(origin.0, origin.1 + size),
        ]
    }

    #[test]
    fn test_new() {
        let fp = Footprint::new(square_ring((116.40, 39.90), 0.001), 30.0).unwrap();
        assert_eq!(fp.vertices().len(), 4);
        assert_eq!(fp.height(), 30.0);
    }

    #[test]
    fn test_rejects_non_positive_height() {
        let err = Footprint::new(square_ring((0.0, 0.0), 1.0), 0.0).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::NonPositiveHeight(0.0))
        );
        assert!(Footprint::new(square_ring((0.0, 0.0), 1.0), f64::NAN).is_err());
    }

    #[test]
    fn test_rejects_degenerate_ring() {
        let ring = vec![pt(0.0, 0.0), pt(1.0, 1.0), pt(2.0, 2.0)];
        assert!(Footprint::new(ring, 10.0).is_err());
    }

    #[test]
    fn test_area_m2_is_positive() {
        // Roughly 111m x 111m square at the equator.
        let fp = Footprint::new(square_ring((0.0, 0.0), 0.001), 10.0).unwrap();
        let area = fp.area_m2();
        assert!((area - 111_320.0_f64.powi(2) * 1e-6).abs() / area < 0.01);
    }

    #[test]
    fn test_centroid() {
        let fp = Footprint::new(square_ring((10.0, 20.0), 0.002), 10.0).unwrap();
        let c = fp.centroid();
        assert!((c.lng - 10.001).abs() < 1e-9);
        assert!((c.lat - 20.001).abs() < 1e-9);
    }
}
