//! Shadow overlap analysis on a target building.
//!
//! Merges the shadows of surrounding buildings and measures how much of the
//! target footprint they cover. Per-source contributions are also reported
//! against each *unmerged* shadow, so the details may sum to more than the
//! merged total when shadows overlap each other.

use log::{debug, warn};
use serde::Serialize;

use crate::geom::clip;
use crate::geom::footprint::Footprint;
use crate::geom::point::GeoPoint;
use crate::geom::ring;
use crate::shadow::project::ShadowPolygon;

/// One surrounding building's shadow, as handed to the analyzer.
///
/// `ring` is `None` when the source cast no shadow (sun below the horizon
/// for it); such sources are filtered out, not errors.
#[derive(Debug, Clone)]
pub struct SourceShadow {
    pub source_id: String,
    pub ring: Option<Vec<GeoPoint>>,
}

impl SourceShadow {
    pub fn new(source_id: impl Into<String>, ring: Option<Vec<GeoPoint>>) -> Self {
        Self {
            source_id: source_id.into(),
            ring,
        }
    }

    pub fn from_projection(source_id: impl Into<String>, shadow: Option<&ShadowPolygon>) -> Self {
        Self {
            source_id: source_id.into(),
            ring: shadow.map(|s| s.vertices().to_vec()),
        }
    }
}

/// Contribution of one source shadow against the target, unmerged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlapDetail {
    pub source_id: String,
    pub overlap_area: f64,
}

/// A source whose geometry could not be used; the rest of the batch
/// proceeds without it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedSource {
    pub source_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlapResult {
    /// Always 0 in this model: a building does not shadow itself. Kept for
    /// forward compatibility with self-occlusion modeling.
    pub self_shadow_area: f64,
    /// Target footprint ∩ union of all source shadows, square meters.
    pub projected_shadow_area: f64,
    /// Same value as `projected_shadow_area`, exposed separately for API
    /// parity.
    pub overlap_area: f64,
    /// Per-source overlaps in input order, each against the unmerged shadow.
    pub details: Vec<OverlapDetail>,
    /// Sources dropped for malformed geometry.
    pub skipped: Vec<SkippedSource>,
}

impl OverlapResult {
    fn empty(skipped: Vec<SkippedSource>) -> Self {
        Self {
            self_shadow_area: 0.0,
            projected_shadow_area: 0.0,
            overlap_area: 0.0,
            details: Vec::new(),
            skipped,
        }
    }
}

/// Measures how much of the target footprint the source shadows cover.
///
/// Shadows produced by this engine are convex; a foreign concave ring is
/// conservatively replaced by its convex hull before clipping. A malformed
/// source ring is skipped and recorded rather than failing the batch.
pub fn overlap(target: &Footprint, sources: &[SourceShadow]) -> OverlapResult {
    let mut skipped = Vec::new();
    let mut valid: Vec<(String, Vec<(f64, f64)>)> = Vec::with_capacity(sources.len());

    for source in sources {
        let Some(raw_ring) = &source.ring else {
            continue; // no shadow cast, a valid outcome
        };
        match ring::normalize(raw_ring) {
            Ok(mut normalized) => {
                if !ring::is_convex(&normalized) {
                    debug!(
                        "source {} shadow is concave; using its convex hull",
                        source.source_id
                    );
                    normalized = ring::convex_hull(&normalized);
                }
                let pts = clip::ensure_ccw(ring::as_tuples(&normalized));
                valid.push((source.source_id.clone(), pts));
            }
            Err(err) => {
                warn!("skipping source {}: {err}", source.source_id);
                skipped.push(SkippedSource {
                    source_id: source.source_id.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    if valid.is_empty() {
        return OverlapResult::empty(skipped);
    }

    let latitude = target.centroid().lat;
    let target_pts = ring::as_tuples(target.vertices());

    let details: Vec<OverlapDetail> = valid
        .iter()
        .map(|(source_id, pts)| OverlapDetail {
            source_id: source_id.clone(),
            overlap_area: ring::deg2_to_m2(clip::intersection_area(&target_pts, pts), latitude),
        })
        .collect();

    let hulls: Vec<Vec<(f64, f64)>> = valid.into_iter().map(|(_, pts)| pts).collect();
    let merged_deg2 = clip::union_intersection_area(&target_pts, &hulls);
    let projected_shadow_area = ring::deg2_to_m2(merged_deg2, latitude);

    OverlapResult {
        self_shadow_area: 0.0,
        projected_shadow_area,
        overlap_area: projected_shadow_area,
        details,
        skipped,
    }
}
