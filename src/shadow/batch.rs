//! Shadow projection for many buildings at once.
//!
//! Each building is validated and projected independently and in parallel;
//! one malformed building never aborts the batch. Results keep the input
//! order, failures are recorded alongside them.

use anyhow::Result;
use log::warn;
use rayon::prelude::*;
use serde::Serialize;

use crate::geom::footprint::Footprint;
use crate::geom::point::GeoPoint;
use crate::shadow::project::{ShadowPolygon, project};
use crate::solar::position::SolarPosition;
use crate::time::TimeSpec;

/// Raw per-building input, as resolved by the caller's storage layer.
#[derive(Debug, Clone)]
pub struct BuildingSpec {
    pub building_id: String,
    pub ring: Vec<GeoPoint>,
    pub height: f64,
}

/// A successfully processed building; `shadow` is `None` when the sun is
/// below the horizon at its location.
#[derive(Debug, Clone, Serialize)]
pub struct BatchShadow {
    pub building_id: String,
    pub shadow: Option<ShadowPolygon>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedBuilding {
    pub building_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub shadows: Vec<BatchShadow>,
    pub skipped: Vec<SkippedBuilding>,
}

/// Projects shadows for every building at the given time.
pub fn project_batch(buildings: &[BuildingSpec], time: &TimeSpec) -> BatchOutcome {
    let results: Vec<Result<BatchShadow, SkippedBuilding>> = buildings
        .par_iter()
        .map(|building| match shadow_for(building, time) {
            Ok(shadow) => Ok(BatchShadow {
                building_id: building.building_id.clone(),
                shadow,
            }),
            Err(err) => Err(SkippedBuilding {
                building_id: building.building_id.clone(),
                reason: err.to_string(),
            }),
        })
        .collect();

    let mut shadows = Vec::with_capacity(buildings.len());
    let mut skipped = Vec::new();
    for result in results {
        match result {
            Ok(shadow) => shadows.push(shadow),
            Err(failure) => {
                warn!(
                    "skipping building {}: {}",
                    failure.building_id, failure.reason
                );
                skipped.push(failure);
            }
        }
    }
    BatchOutcome { shadows, skipped }
}

fn shadow_for(building: &BuildingSpec, time: &TimeSpec) -> Result<Option<ShadowPolygon>> {
    let footprint = Footprint::new(building.ring.clone(), building.height)?;
    let centroid = footprint.centroid();
    let solar = SolarPosition::calculate(centroid.lat, centroid.lng, time)?;
    Ok(project(&footprint, &solar))
}
