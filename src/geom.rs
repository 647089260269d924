pub mod clip;
pub mod footprint;
pub mod point;
pub mod ring;

/// Geometric precision (degrees)
const EPS: f64 = 1e-12;

/// Smallest ring area treated as non-degenerate (square degrees).
pub(crate) const AREA_EPS: f64 = 1e-16;

/// Meters per degree of latitude (and of longitude at the equator).
pub(crate) const METERS_PER_DEGREE: f64 = 111_320.0;
