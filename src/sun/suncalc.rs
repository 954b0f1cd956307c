//! Low-precision solar ephemeris (the "suncalc" formulation).
//!
//! Accurate to well under a degree, which is far below the error of a flat
//! extruded-footprint building model. Azimuth is measured from south toward
//! west, so a sun at azimuth 0 casts shadows due north.

use super::{SunEphemeris, SunPosition, SunTimes};
use crate::errors::EphemerisError;
use crate::float_types::{PI, RAD, Real, TAU};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

const DAY_MS: Real = 1000.0 * 60.0 * 60.0 * 24.0;
const J1970: Real = 2_440_588.0;
const J2000: Real = 2_451_545.0;
const J0: Real = 0.0009;
/// Obliquity of the earth.
const OBLIQUITY: Real = RAD * 23.4397;
/// Sun altitude at sunrise/sunset, refraction and solar radius included.
const SUNRISE_ALTITUDE: Real = -0.833 * RAD;

fn to_julian(t: DateTime<Utc>) -> Real {
    t.timestamp_millis() as Real / DAY_MS - 0.5 + J1970
}

fn from_julian(j: Real) -> Result<DateTime<Utc>, EphemerisError> {
    let ms = (j + 0.5 - J1970) * DAY_MS;
    if !ms.is_finite() {
        return Err(EphemerisError::OutOfRange(format!("julian day {j}")));
    }
    Utc.timestamp_millis_opt(ms.round() as i64)
        .single()
        .ok_or_else(|| EphemerisError::OutOfRange(format!("julian day {j}")))
}

fn to_days(t: DateTime<Utc>) -> Real {
    to_julian(t) - J2000
}

fn right_ascension(l: Real, b: Real) -> Real {
    (l.sin() * OBLIQUITY.cos() - b.tan() * OBLIQUITY.sin()).atan2(l.cos())
}

fn declination(l: Real, b: Real) -> Real {
    (b.sin() * OBLIQUITY.cos() + b.cos() * OBLIQUITY.sin() * l.sin()).asin()
}

fn azimuth(h: Real, phi: Real, dec: Real) -> Real {
    h.sin().atan2(h.cos() * phi.sin() - dec.tan() * phi.cos())
}

fn altitude(h: Real, phi: Real, dec: Real) -> Real {
    (phi.sin() * dec.sin() + phi.cos() * dec.cos() * h.cos()).asin()
}

fn sidereal_time(d: Real, lw: Real) -> Real {
    RAD * (280.16 + 360.985_623_5 * d) - lw
}

fn solar_mean_anomaly(d: Real) -> Real {
    RAD * (357.5291 + 0.985_600_28 * d)
}

fn ecliptic_longitude(m: Real) -> Real {
    // equation of center
    let c = RAD * (1.9148 * m.sin() + 0.02 * (2.0 * m).sin() + 0.0003 * (3.0 * m).sin());
    // perihelion of the earth
    let p = RAD * 102.9372;
    m + c + p + PI
}

fn sun_coords(d: Real) -> (Real, Real) {
    let l = ecliptic_longitude(solar_mean_anomaly(d));
    (declination(l, 0.0), right_ascension(l, 0.0))
}

fn julian_cycle(d: Real, lw: Real) -> Real {
    (d - J0 - lw / TAU).round()
}

fn approx_transit(ht: Real, lw: Real, n: Real) -> Real {
    J0 + (ht + lw) / TAU + n
}

fn solar_transit_j(ds: Real, m: Real, l: Real) -> Real {
    J2000 + ds + 0.0053 * m.sin() - 0.0069 * (2.0 * l).sin()
}

fn hour_angle(h: Real, phi: Real, dec: Real) -> Real {
    ((h.sin() - phi.sin() * dec.sin()) / (phi.cos() * dec.cos())).acos()
}

fn check_location(lon: Real, lat: Real) -> Result<(), EphemerisError> {
    if !lon.is_finite() || !lat.is_finite() || lat.abs() > 90.0 {
        return Err(EphemerisError::InvalidLocation { lon, lat });
    }
    Ok(())
}

/// The suncalc ephemeris. Stateless.
#[derive(Clone, Copy, Debug, Default)]
pub struct SunCalc;

impl SunCalc {
    pub const fn new() -> Self {
        Self
    }
}

impl SunEphemeris for SunCalc {
    fn position(&self, timestamp: DateTime<Utc>, lon: Real, lat: Real) -> Result<SunPosition, EphemerisError> {
        check_location(lon, lat)?;
        let lw = RAD * -lon;
        let phi = RAD * lat;
        let d = to_days(timestamp);
        let (dec, ra) = sun_coords(d);
        let h = sidereal_time(d, lw) - ra;
        Ok(SunPosition::new(azimuth(h, phi, dec), altitude(h, phi, dec)))
    }

    fn times(&self, date: NaiveDate, lon: Real, lat: Real) -> Result<SunTimes, EphemerisError> {
        check_location(lon, lat)?;
        let noon = Utc.from_utc_datetime(&date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default()));

        let lw = RAD * -lon;
        let phi = RAD * lat;
        let d = to_days(noon);
        let n = julian_cycle(d, lw);
        let ds = approx_transit(0.0, lw, n);
        let m = solar_mean_anomaly(ds);
        let l = ecliptic_longitude(m);
        let dec = declination(l, 0.0);
        let j_noon = solar_transit_j(ds, m, l);

        let w = hour_angle(SUNRISE_ALTITUDE, phi, dec);
        if w.is_nan() {
            return Err(EphemerisError::NoSunriseSunset { date, lon, lat });
        }
        let j_set = solar_transit_j(approx_transit(w, lw, n), m, l);
        let j_rise = j_noon - (j_set - j_noon);

        Ok(SunTimes { sunrise: from_julian(j_rise)?, sunset: from_julian(j_set)? })
    }
}
