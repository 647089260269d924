//! Time-stepped shadow sequences for animation playback.
//!
//! Frames are derived independently from their timestamps, so a sequence is
//! lazy, restartable and deterministic: iterating twice over the same
//! animation yields identical frames (the cache can only change whether a
//! value is recomputed, never what it is).

use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::ValidationError;
use crate::geom::footprint::Footprint;
use crate::shadow::cache::ShadowResultCache;
use crate::shadow::project::{ShadowPolygon, project, project_cached};
use crate::solar::position::{SolarPosition, check_coordinates};
use crate::time::TimeSpec;

/// One moment of a shadow animation.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    /// Minutes since local midnight.
    pub minutes: u32,
    pub timestamp: DateTime<Tz>,
    pub solar: SolarPosition,
    pub shadow: Option<ShadowPolygon>,
}

struct CacheBinding<'a> {
    cache: &'a ShadowResultCache,
    building_id: String,
    ttl: Duration,
}

/// A configured animation over one day's time window.
pub struct ShadowAnimation<'a> {
    footprint: &'a Footprint,
    latitude: f64,
    longitude: f64,
    date: NaiveDate,
    tz: Tz,
    start_hour: u32,
    end_hour: u32,
    step_minutes: u32,
    cache: Option<CacheBinding<'a>>,
}

impl<'a> ShadowAnimation<'a> {
    /// Steps from `start_hour:00` to `end_hour:00` inclusive.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        footprint: &'a Footprint,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
        tz: Tz,
        start_hour: u32,
        end_hour: u32,
        step_minutes: u32,
    ) -> Result<Self> {
        check_coordinates(latitude, longitude)?;
        if start_hour > 23 {
            return Err(ValidationError::HourOutOfRange(start_hour).into());
        }
        if end_hour > 23 {
            return Err(ValidationError::HourOutOfRange(end_hour).into());
        }
        if start_hour > end_hour {
            return Err(ValidationError::HourRangeReversed {
                start: start_hour,
                end: end_hour,
            }
            .into());
        }
        if step_minutes == 0 || step_minutes > 60 {
            return Err(ValidationError::StepOutOfRange(step_minutes).into());
        }
        Ok(Self {
            footprint,
            latitude,
            longitude,
            date,
            tz,
            start_hour,
            end_hour,
            step_minutes,
            cache: None,
        })
    }

    /// Serves whole-hour frames from the cache when possible.
    pub fn with_cache(
        mut self,
        cache: &'a ShadowResultCache,
        building_id: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        self.cache = Some(CacheBinding {
            cache,
            building_id: building_id.into(),
            ttl,
        });
        self
    }

    pub fn frame_count(&self) -> usize {
        (((self.end_hour - self.start_hour) * 60) / self.step_minutes) as usize + 1
    }

    /// Lazily yields frames in increasing timestamp order. The iterator can
    /// be re-created at will; each frame depends only on its own timestamp.
    pub fn frames(&self) -> impl Iterator<Item = Frame> + '_ {
        (self.start_hour * 60..=self.end_hour * 60)
            .step_by(self.step_minutes as usize)
            .map(|minutes| self.frame_at(minutes))
    }

    fn frame_at(&self, minutes: u32) -> Frame {
        let (hour, minute) = (minutes / 60, minutes % 60);
        let time = TimeSpec {
            date: self.date,
            hour,
            minute,
            tz: self.tz,
        };
        let solar = SolarPosition::at(
            self.latitude,
            self.longitude,
            time.day_of_year(),
            time.local_hours(),
        );
        // The cache is keyed by whole hours only.
        let shadow = match &self.cache {
            Some(binding) if minute == 0 => project_cached(
                binding.cache,
                &binding.building_id,
                self.footprint,
                &solar,
                self.date,
                hour,
                binding.ttl,
            ),
            _ => project(self.footprint, &solar),
        };
        Frame {
            minutes,
            timestamp: time.local(),
            solar,
            shadow,
        }
    }
}
