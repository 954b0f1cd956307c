//! Traits for evaluating a timetable.

use super::timetable::TimetableEntry;
use crate::errors::Result;
use crate::shadow::ShadowTable;

/// Strategy for evaluating one shadow layer per timetable entry.
///
/// Implementations must return layers in entry order and, on failure, the
/// error of the earliest failing entry, so serial and parallel runs are
/// indistinguishable to the caller.
pub trait TimeSeriesOps {
    fn evaluate<F>(&self, entries: &[TimetableEntry], task: F) -> Result<Vec<ShadowTable>>
    where
        F: Fn(usize, &TimetableEntry) -> Result<ShadowTable> + Send + Sync;
}
