use thiserror::Error;

/// Malformed input: out-of-range coordinates, times or degenerate geometry.
///
/// Raised through `anyhow::Error`, so callers that need to distinguish bad
/// input from other failures can `downcast_ref::<ValidationError>()`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("latitude out of range [-90, 90]: {0}")]
    LatitudeOutOfRange(f64),
    #[error("longitude out of range [-180, 180]: {0}")]
    LongitudeOutOfRange(f64),
    #[error("hour out of range 0-23: {0}")]
    HourOutOfRange(u32),
    #[error("minute out of range 0-59: {0}")]
    MinuteOutOfRange(u32),
    #[error("step must be 1-60 minutes: {0}")]
    StepOutOfRange(u32),
    #[error("start hour {start} is after end hour {end}")]
    HourRangeReversed { start: u32, end: u32 },
    #[error("polygon ring needs at least 3 distinct vertices, got {0}")]
    TooFewVertices(usize),
    #[error("polygon ring is self-intersecting")]
    SelfIntersecting,
    #[error("polygon ring has no area")]
    DegenerateRing,
    #[error("building height must be positive, got {0}")]
    NonPositiveHeight(f64),
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),
    #[error("invalid GeoJSON: {0}")]
    InvalidGeoJson(String),
}
