//! Sample timestamps between sunrise and sunset.

use crate::errors::{Result, ShadowError};
use crate::float_types::{HOUR, MIN_PADDING_SECONDS, Real};
use crate::sun::{SunEphemeris, SunTimes};
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Format of timestamp labels, also used as cache keys.
pub const LABEL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimetableEntry {
    pub timestamp: DateTime<Utc>,
    pub label: String,
}

impl TimetableEntry {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self { timestamp, label: timestamp.format(LABEL_FORMAT).to_string() }
    }
}

/// Sunrise and sunset of one sampled date.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DaySpan {
    pub date: NaiveDate,
    pub times: SunTimes,
}

/// Ordered sample timestamps for one or more dates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timetable {
    entries: Vec<TimetableEntry>,
    days: Vec<DaySpan>,
    step_seconds: i64,
}

/// Reject sampling parameters before any work is done.
pub fn check_sampling(step_seconds: i64, padding_seconds: i64) -> Result<()> {
    if padding_seconds < MIN_PADDING_SECONDS {
        return Err(ShadowError::InsufficientPadding { padding: padding_seconds, minimum: MIN_PADDING_SECONDS });
    }
    if step_seconds <= 0 {
        return Err(ShadowError::InvalidStep(step_seconds));
    }
    Ok(())
}

/// Parse `YYYY-MM-DD` date strings.
pub fn parse_dates<S: AsRef<str>>(dates: &[S]) -> Result<Vec<NaiveDate>> {
    dates
        .iter()
        .map(|d| {
            let d = d.as_ref();
            NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").map_err(|_| ShadowError::InvalidDate(d.to_string()))
        })
        .collect()
}

impl Timetable {
    /// Timestamps on `[sunrise + padding, sunset − padding)` every `step_seconds`,
    /// for each date in order, with sunrise/sunset taken at `(lon, lat)`.
    ///
    /// The padding keeps every sample with the sun clearly above the horizon.
    pub fn build<E: SunEphemeris + ?Sized>(
        ephemeris: &E,
        lon: Real,
        lat: Real,
        dates: &[NaiveDate],
        step_seconds: i64,
        padding_seconds: i64,
    ) -> Result<Self> {
        check_sampling(step_seconds, padding_seconds)?;

        let step = Duration::seconds(step_seconds);
        let padding = Duration::seconds(padding_seconds);
        let mut entries = Vec::new();
        let mut days = Vec::with_capacity(dates.len());

        for &date in dates {
            let times = ephemeris.times(date, lon, lat)?;
            let end = times.sunset - padding;
            let mut t = times.sunrise + padding;
            while t < end {
                entries.push(TimetableEntry::new(t));
                t += step;
            }
            days.push(DaySpan { date, times });
        }

        Ok(Self { entries, days, step_seconds })
    }

    /// A timetable from explicit timestamps, without sunrise/sunset bookkeeping.
    pub fn from_timestamps(timestamps: &[DateTime<Utc>], step_seconds: i64) -> Self {
        Self { entries: timestamps.iter().copied().map(TimetableEntry::new).collect(), days: Vec::new(), step_seconds }
    }

    pub fn entries(&self) -> &[TimetableEntry] {
        &self.entries
    }

    pub fn days(&self) -> &[DaySpan] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub const fn step_seconds(&self) -> i64 {
        self.step_seconds
    }

    /// Total sunrise-to-sunset hours over all dates.
    pub fn day_length_hours(&self) -> Real {
        self.days.iter().map(|d| d.times.day_length_seconds() as Real / HOUR).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EphemerisError;
    use chrono::TimeZone;

    /// Sunrise 06:00, sunset 18:00 UTC, sun always at 45°.
    struct FixedDay;

    impl SunEphemeris for FixedDay {
        fn position(&self, _: DateTime<Utc>, _: Real, _: Real) -> std::result::Result<crate::sun::SunPosition, EphemerisError> {
            Ok(crate::sun::SunPosition::new(0.0, 0.7853981633974483))
        }

        fn times(&self, date: NaiveDate, _: Real, _: Real) -> std::result::Result<SunTimes, EphemerisError> {
            let at = |h| Utc.from_utc_datetime(&date.and_hms_opt(h, 0, 0).unwrap_or_default());
            Ok(SunTimes { sunrise: at(6), sunset: at(18) })
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn hourly_samples_inside_padding() {
        let tt = Timetable::build(&FixedDay, 0.0, 0.0, &[day("2022-01-01")], 3600, 1800).unwrap();
        // 06:30, 07:30, ..., 16:30; 17:30 is the excluded end
        assert_eq!(tt.len(), 11);
        assert_eq!(tt.entries()[0].label, "2022-01-01 06:30:00");
        assert_eq!(tt.entries()[10].label, "2022-01-01 16:30:00");
        assert!((tt.day_length_hours() - 12.0).abs() < 1e-12);
    }

    #[test]
    fn dates_stay_in_order() {
        let tt = Timetable::build(&FixedDay, 0.0, 0.0, &[day("2022-06-02"), day("2022-06-01")], 7200, 3600).unwrap();
        assert_eq!(tt.days().len(), 2);
        assert_eq!(tt.entries()[0].timestamp.date_naive(), day("2022-06-02"));
        assert_eq!(tt.entries().last().unwrap().timestamp.date_naive(), day("2022-06-01"));
    }

    #[test]
    fn padding_boundary() {
        assert!(matches!(check_sampling(3600, 1799), Err(ShadowError::InsufficientPadding { padding: 1799, .. })));
        assert!(check_sampling(3600, 1800).is_ok());
        assert!(matches!(check_sampling(0, 1800), Err(ShadowError::InvalidStep(0))));
    }

    #[test]
    fn date_parsing() {
        assert_eq!(parse_dates(&["2022-01-01"]).unwrap(), vec![day("2022-01-01")]);
        assert!(matches!(parse_dates(&["2022-13-01"]), Err(ShadowError::InvalidDate(_))));
    }
}
