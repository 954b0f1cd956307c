//! Serial implementation of `TimeSeriesOps`.

use super::timetable::TimetableEntry;
use super::traits::TimeSeriesOps;
use crate::errors::Result;
use crate::shadow::ShadowTable;

/// Evaluates entries one after another, stopping at the first failure.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialTimeSeries;

impl SerialTimeSeries {
    pub const fn new() -> Self {
        Self
    }
}

impl TimeSeriesOps for SerialTimeSeries {
    fn evaluate<F>(&self, entries: &[TimetableEntry], task: F) -> Result<Vec<ShadowTable>>
    where
        F: Fn(usize, &TimetableEntry) -> Result<ShadowTable> + Send + Sync,
    {
        entries.iter().enumerate().map(|(i, entry)| task(i, entry)).collect()
    }
}
