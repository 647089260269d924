//! GeoJSON Polygon conversion for the engine's wire format.
//!
//! Wire rings carry an explicit closing vertex
//! (`{"type":"Polygon","coordinates":[[[lng,lat],...]]}`, first == last);
//! in-memory rings are open. Only the exterior ring is used.

use anyhow::Result;
use serde_json::{Value, json};

use crate::error::ValidationError;
use crate::geom::point::GeoPoint;
use crate::shadow::project::ShadowPolygon;

/// Serializes an open ring as a closed GeoJSON Polygon.
pub fn ring_to_geojson(ring: &[GeoPoint]) -> Value {
    let mut coords: Vec<[f64; 2]> = ring.iter().map(|p| [p.lng, p.lat]).collect();
    if let Some(first) = coords.first().copied() {
        coords.push(first);
    }
    json!({
        "type": "Polygon",
        "coordinates": [coords],
    })
}

pub fn shadow_to_geojson(shadow: &ShadowPolygon) -> Value {
    ring_to_geojson(shadow.vertices())
}

/// Parses the exterior ring of a GeoJSON Polygon into an open ring.
///
/// Coordinates are range-checked; the closing vertex is dropped.
pub fn ring_from_geojson(value: &Value) -> Result<Vec<GeoPoint>> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("missing \"type\""))?;
    if kind != "Polygon" {
        return Err(invalid(&format!("expected Polygon, got {kind}")).into());
    }

    let rings = value
        .get("coordinates")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("missing \"coordinates\" array"))?;
    let exterior = rings
        .first()
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("empty \"coordinates\""))?;

    let mut ring = Vec::with_capacity(exterior.len());
    for position in exterior {
        let pair = position
            .as_array()
            .ok_or_else(|| invalid("position is not an array"))?;
        if pair.len() < 2 {
            return Err(invalid("position needs [lng, lat]").into());
        }
        let lng = pair[0]
            .as_f64()
            .ok_or_else(|| invalid("longitude is not a number"))?;
        let lat = pair[1]
            .as_f64()
            .ok_or_else(|| invalid("latitude is not a number"))?;
        ring.push(GeoPoint::new(lng, lat)?);
    }

    // Drop the explicit closing vertex, if present.
    if ring.len() > 1
        && let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied())
        && first.is_close(&last)
    {
        ring.pop();
    }

    if ring.len() < 3 {
        return Err(ValidationError::TooFewVertices(ring.len()).into());
    }
    Ok(ring)
}

fn invalid(reason: &str) -> ValidationError {
    ValidationError::InvalidGeoJson(reason.to_string())
}
