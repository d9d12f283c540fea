//! Temporal overlap detection for inclusive date ranges.
//!
//! A missing end date means the range is open towards +infinity.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Range covering `from` and every later day.
    pub fn open_from(from: NaiveDate) -> Self {
        Self::new(from, None)
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }
}

/// Returns true when `[a_start, a_end]` and `[b_start, b_end]` share a day.
pub fn overlaps(
    a_start: NaiveDate,
    a_end: Option<NaiveDate>,
    b_start: NaiveDate,
    b_end: Option<NaiveDate>,
) -> bool {
    let a_before_b_ends = b_end.map_or(true, |end| a_start <= end);
    let b_before_a_ends = a_end.map_or(true, |end| b_start <= end);
    a_before_b_ends && b_before_a_ends
}
