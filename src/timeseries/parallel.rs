//! Parallel implementation of `TimeSeriesOps`.

use super::timetable::TimetableEntry;
use super::traits::TimeSeriesOps;
use crate::errors::Result;
use crate::shadow::ShadowTable;
use rayon::prelude::*;

/// Evaluates entries on the rayon thread pool.
///
/// Timestamps are independent, so every entry runs to completion; layers are
/// then returned in entry order, or the earliest entry's error.
#[derive(Clone, Copy, Debug, Default)]
pub struct ParallelTimeSeries;

impl ParallelTimeSeries {
    pub const fn new() -> Self {
        Self
    }
}

impl TimeSeriesOps for ParallelTimeSeries {
    fn evaluate<F>(&self, entries: &[TimetableEntry], task: F) -> Result<Vec<ShadowTable>>
    where
        F: Fn(usize, &TimetableEntry) -> Result<ShadowTable> + Send + Sync,
    {
        let results: Vec<Result<ShadowTable>> =
            entries.par_iter().enumerate().map(|(i, entry)| task(i, entry)).collect();
        results.into_iter().collect()
    }
}
