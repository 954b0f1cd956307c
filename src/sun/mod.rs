//! Sun position and sunrise/sunset lookup.

use crate::errors::{EphemerisError, Result, ShadowError};
use crate::float_types::Real;
use chrono::{DateTime, NaiveDate, Utc};
use nalgebra::Vector2;

pub mod suncalc;

pub use suncalc::SunCalc;

/// Sun direction for one (timestamp, location) pair.
///
/// `azimuth` follows the ephemeris convention: measured from south, positive
/// toward west. Both angles are radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SunPosition {
    pub azimuth: Real,
    pub altitude: Real,
}

impl SunPosition {
    pub const fn new(azimuth: Real, altitude: Real) -> Self {
        Self { azimuth, altitude }
    }

    pub fn is_above_horizon(&self) -> bool {
        self.altitude > 0.0
    }

    /// Planar offset of a shadow cast by a unit height, `(sin az, cos az) / tan alt`.
    ///
    /// Fails when the sun is not above the horizon: the tangent is zero or
    /// negative there and the shadow is unbounded.
    pub fn shadow_direction(&self) -> Result<Vector2<Real>> {
        if !(self.altitude > 0.0) || !self.azimuth.is_finite() {
            return Err(ShadowError::SunBelowHorizon { altitude: self.altitude });
        }
        let scale = 1.0 / self.altitude.tan();
        Ok(Vector2::new(self.azimuth.sin(), self.azimuth.cos()) * scale)
    }

    /// Offset of the shadow cast by an object of the given height.
    pub fn shadow_offset(&self, height: Real) -> Result<Vector2<Real>> {
        Ok(self.shadow_direction()? * height)
    }
}

/// Sunrise and sunset instants for a date.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SunTimes {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

impl SunTimes {
    pub fn day_length_seconds(&self) -> i64 {
        (self.sunset - self.sunrise).num_seconds()
    }
}

/// Source of sun positions and sunrise/sunset times.
pub trait SunEphemeris: Send + Sync {
    fn position(
        &self,
        timestamp: DateTime<Utc>,
        lon: Real,
        lat: Real,
    ) -> std::result::Result<SunPosition, EphemerisError>;

    fn times(
        &self,
        date: NaiveDate,
        lon: Real,
        lat: Real,
    ) -> std::result::Result<SunTimes, EphemerisError>;
}

impl<E: SunEphemeris + ?Sized> SunEphemeris for &E {
    fn position(
        &self,
        timestamp: DateTime<Utc>,
        lon: Real,
        lat: Real,
    ) -> std::result::Result<SunPosition, EphemerisError> {
        (**self).position(timestamp, lon, lat)
    }

    fn times(
        &self,
        date: NaiveDate,
        lon: Real,
        lat: Real,
    ) -> std::result::Result<SunTimes, EphemerisError> {
        (**self).times(date, lon, lat)
    }
}
