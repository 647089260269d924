use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, LocalResult, NaiveDate, TimeDelta, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::error::ValidationError;

/// A calendar date with a wall-clock time in an IANA timezone.
///
/// Immutable value; resolved to an absolute instant with [`TimeSpec::local`]
/// or [`TimeSpec::to_utc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpec {
    pub date: NaiveDate,
    pub hour: u32,
    pub minute: u32,
    pub tz: Tz,
}

impl TimeSpec {
    pub fn new(date: NaiveDate, hour: u32, minute: u32, tz: Tz) -> Result<Self> {
        if hour > 23 {
            return Err(ValidationError::HourOutOfRange(hour).into());
        }
        if minute > 59 {
            return Err(ValidationError::MinuteOutOfRange(minute).into());
        }
        Ok(Self {
            date,
            hour,
            minute,
            tz,
        })
    }

    /// Parses a `YYYY-MM-DD` date and an IANA timezone name.
    pub fn parse(date: &str, hour: u32, minute: u32, timezone: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .with_context(|| format!("invalid date {date:?}, expected YYYY-MM-DD"))?;
        let tz: Tz = timezone
            .parse()
            .map_err(|_| ValidationError::UnknownTimezone(timezone.to_string()))?;
        Self::new(date, hour, minute, tz)
    }

    /// The current wall-clock time in the given timezone.
    pub fn now(tz: Tz) -> Self {
        let now = Utc::now().with_timezone(&tz);
        Self {
            date: now.date_naive(),
            hour: now.hour(),
            minute: now.minute(),
            tz,
        }
    }

    /// Resolves the wall-clock time to an absolute instant in its timezone.
    ///
    /// An ambiguous time (DST fall-back) resolves to the earlier instant; a
    /// nonexistent time (spring-forward gap) is nudged one hour forward.
    pub fn local(&self) -> DateTime<Tz> {
        let naive = self.date.and_hms_opt(self.hour, self.minute, 0).unwrap_or_default();
        match self.tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(earliest, _) => earliest,
            LocalResult::None => self
                .tz
                .from_local_datetime(&(naive + TimeDelta::hours(1)))
                .earliest()
                .unwrap_or_else(|| self.tz.from_utc_datetime(&naive)),
        }
    }

    pub fn to_utc(&self) -> DateTime<Utc> {
        self.local().with_timezone(&Utc)
    }

    pub fn day_of_year(&self) -> u32 {
        self.date.ordinal()
    }

    /// Wall-clock time as fractional hours since local midnight.
    pub fn local_hours(&self) -> f64 {
        self.hour as f64 + self.minute as f64 / 60.0
    }

    /// Same date and timezone with a different wall-clock time.
    pub fn with_time(&self, hour: u32, minute: u32) -> Result<Self> {
        Self::new(self.date, hour, minute, self.tz)
    }
}
