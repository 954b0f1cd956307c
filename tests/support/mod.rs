//! Test support library
//! Provides fixtures and helpers shared by the integration tests.
#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use geo::{MultiPolygon, Polygon, polygon};
use shadowrs::{
    Building, BuildingId, SunEphemeris, SunPosition,
    errors::EphemerisError,
    float_types::{FRAC_PI_4, Real},
    shadow::{ShadowKind, ShadowRecord},
    sun::SunTimes,
};

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Axis-aligned square with its min corner at `(x0, y0)`.
pub fn square(x0: Real, y0: Real, size: Real) -> Polygon<Real> {
    polygon![
        (x: x0, y: y0),
        (x: x0 + size, y: y0),
        (x: x0 + size, y: y0 + size),
        (x: x0, y: y0 + size),
    ]
}

/// A square building of `size` degrees at `(lon, lat)`.
pub fn square_building(id: BuildingId, lon: Real, lat: Real, size: Real, height: Real) -> Building {
    Building::from_ring(id, &[[lon, lat], [lon, lat + size], [lon + size, lat + size], [lon + size, lat]], height)
}

pub fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn ground_record(timestamp: DateTime<Utc>, poly: Polygon<Real>) -> ShadowRecord {
    ShadowRecord { building_id: 1, kind: ShadowKind::Ground, timestamp, geometry: MultiPolygon::new(vec![poly]) }
}

/// Sunrise 06:00, sunset 18:00 UTC; the sun stands due south (shadows point
/// north) at 45° all day.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedSun;

impl SunEphemeris for FixedSun {
    fn position(&self, _: DateTime<Utc>, _: Real, _: Real) -> Result<SunPosition, EphemerisError> {
        Ok(SunPosition::new(0.0, FRAC_PI_4))
    }

    fn times(&self, date: NaiveDate, _: Real, _: Real) -> Result<SunTimes, EphemerisError> {
        let at = |h| Utc.from_utc_datetime(&date.and_hms_opt(h, 0, 0).unwrap());
        Ok(SunTimes { sunrise: at(6), sunset: at(18) })
    }
}

/// Like [`FixedSun`], but positions fail from `fail_from` (UTC hour) on.
#[derive(Clone, Copy, Debug)]
pub struct FailingSun {
    pub fail_from: u32,
}

impl SunEphemeris for FailingSun {
    fn position(&self, ts: DateTime<Utc>, lon: Real, lat: Real) -> Result<SunPosition, EphemerisError> {
        use chrono::Timelike;
        if ts.hour() >= self.fail_from {
            return Err(EphemerisError::OutOfRange(ts.to_rfc3339()));
        }
        FixedSun.position(ts, lon, lat)
    }

    fn times(&self, date: NaiveDate, lon: Real, lat: Real) -> Result<SunTimes, EphemerisError> {
        FixedSun.times(date, lon, lat)
    }
}

/// Like [`FixedSun`], remembering where sunrise/sunset were asked for.
#[derive(Debug, Default)]
pub struct RecordingSun {
    pub day_queries: std::sync::Mutex<Vec<(Real, Real)>>,
}

impl SunEphemeris for RecordingSun {
    fn position(&self, ts: DateTime<Utc>, lon: Real, lat: Real) -> Result<SunPosition, EphemerisError> {
        FixedSun.position(ts, lon, lat)
    }

    fn times(&self, date: NaiveDate, lon: Real, lat: Real) -> Result<SunTimes, EphemerisError> {
        self.day_queries.lock().unwrap().push((lon, lat));
        FixedSun.times(date, lon, lat)
    }
}
