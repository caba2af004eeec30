//! Trip date-range arithmetic
//!
//! Day counts are inclusive of both ends: a trip starting and ending on the
//! same calendar day lasts one day.

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Calendar date range with `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(Error::InvalidInput(format!(
                "Trip start {} is after trip end {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    /// Inclusive number of days, never less than 1
    pub fn days(&self) -> u32 {
        let span = (self.end - self.start).num_days() + 1;
        span.clamp(1, i64::from(u32::MAX)) as u32
    }
}

/// Persisted form of a trip's dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripDates {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: u32,
}

impl From<DateRange> for TripDates {
    fn from(range: DateRange) -> Self {
        Self {
            start: range.start,
            end: range.end,
            days: range.days(),
        }
    }
}
