//! Extraction windows over `published_at`.
//!
//! Bounds are accepted either as bare dates or full date-times. A bare date
//! means midnight on the lower bound and end of day (23:59:59) on the upper
//! bound, matching the upstream API's own interpretation. All validation
//! happens before any network call.

use crate::{Error, Result};
use chrono::{Duration, Local, NaiveDate, NaiveDateTime};

/// Fixed far-past lower bound used on a first run, before any watermark
/// exists.
pub const WATERMARK_FLOOR: &str = "1990-01-01T00:00:00";

/// Which end of the window a bound string is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Lower bound: bare dates resolve to 00:00:00
    Lower,
    /// Upper bound: bare dates resolve to 23:59:59
    Upper,
}

/// A closed `[from, to]` extraction window over `published_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionWindow {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl ExtractionWindow {
    /// Build a window from resolved bounds. Rejects inverted windows.
    pub fn new(from: NaiveDateTime, to: NaiveDateTime) -> Result<Self> {
        if from > to {
            return Err(Error::Validation(format!(
                "from bound {from} is later than to bound {to}"
            )));
        }
        Ok(Self { from, to })
    }

    /// Build a window from bound strings, applying per-end date semantics.
    pub fn parse(from: &str, to: &str) -> Result<Self> {
        let from = parse_bound(from, Bound::Lower)?;
        let to = parse_bound(to, Bound::Upper)?;
        Self::new(from, to)
    }

    /// The window for the next incremental run: one second past the
    /// watermark (or the fixed floor when none exists) through the end of
    /// the current day.
    pub fn next_incremental(watermark: Option<NaiveDateTime>) -> Result<Self> {
        let from = match watermark {
            Some(mark) => mark + Duration::seconds(1),
            None => parse_bound(WATERMARK_FLOOR, Bound::Lower)?,
        };
        let to = end_of_day(Local::now().date_naive());
        Self::new(from, to)
    }

    /// Lower bound formatted for the source path.
    pub fn from_param(&self) -> String {
        self.from.format("%Y-%m-%dT%H:%M:%S").to_string()
    }

    /// Upper bound formatted for the source path.
    pub fn to_param(&self) -> String {
        self.to.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

/// Parse one window bound: `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_bound(s: &str, bound: Bound) -> Result<NaiveDateTime> {
    let s = s.trim();

    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt);
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(match bound {
            Bound::Lower => date.and_hms_opt(0, 0, 0).expect("valid time"),
            Bound::Upper => end_of_day(date),
        });
    }

    Err(Error::Validation(format!(
        "invalid date bound {s:?}: expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS"
    )))
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(23, 59, 59).expect("valid time")
}
