//! Shadow layers over a series of timestamps.

pub mod serial;
pub mod timetable;
pub mod traits;

#[cfg(feature = "parallel")]
pub mod parallel;

pub use timetable::{DaySpan, Timetable, TimetableEntry, check_sampling, parse_dates};
pub use traits::TimeSeriesOps;

pub use serial::SerialTimeSeries;

#[cfg(feature = "parallel")]
pub use parallel::ParallelTimeSeries;

/// Default executor for this build: parallel when the `parallel` feature is on.
#[cfg(not(feature = "parallel"))]
pub type DefaultTimeSeries = SerialTimeSeries;

/// Default executor for this build: parallel when the `parallel` feature is on.
#[cfg(feature = "parallel")]
pub type DefaultTimeSeries = ParallelTimeSeries;
