use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::geom::EPS;

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lng: f64,
    pub lat: f64,
}

impl GeoPoint {
    /// Creates a point, rejecting out-of-range coordinates.
    pub fn new(lng: f64, lat: f64) -> Result<Self> {
        if !(-180.0..=180.0).contains(&lng) {
            return Err(ValidationError::LongitudeOutOfRange(lng).into());
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ValidationError::LatitudeOutOfRange(lat).into());
        }
        Ok(Self { lng, lat })
    }

    /// Returns true if both points are very close to each other.
    pub fn is_close(&self, other: &Self) -> bool {
        (self.lng - other.lng).abs() < EPS && (self.lat - other.lat).abs() < EPS
    }

    /// Returns a copy shifted by the given offsets in degrees.
    ///
    /// Intermediate results of the planar approximation may leave the
    /// nominal coordinate ranges; they are not re-validated.
    pub(crate) fn translated(&self, dlng: f64, dlat: f64) -> Self {
        Self {
            lng: self.lng + dlng,
            lat: self.lat + dlat,
        }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = f.precision().unwrap_or(6); // Default 6 decimals
        write!(
            f,
            "GeoPoint({:.prec$}, {:.prec$})",
            self.lng,
            self.lat,
            prec = prec
        )
    }
}
