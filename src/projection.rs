//! Conversion of coordinate arrays between geographic degrees and a metric
//! planar frame.
//!
//! Shadow offsets are metres, so the caster works on projected coordinates
//! and only the final rings are taken back to longitude/latitude.
//!
//! ## **Strategies**
//! - [`EpsgTransform`]: delegates to `proj4rs` with the PROJ definition of
//!   any projected EPSG code (EPSG:3857 Web Mercator by default, EPSG:3395
//!   World Mercator, UTM zones, national grids...).
//! - [`SphericalMercator`]: the closed-form forward formula
//!   ```text
//!   x = λ·R
//!   y = (R/2)·ln((1 + sin φ) / (1 − sin φ))
//!   ```
//!   with an inverse normalised by the rounded half extent 20037508.34.
//!
//! The two disagree in the last digits; a [`CoordinateProjector`] holds exactly
//! one strategy so a computation never mixes them.

use crate::errors::{Result, ShadowError};
use crate::float_types::{EARTH_RADIUS, FRAC_PI_2, MERCATOR_HALF_EXTENT, PI, Real};
use ndarray::{Array, Axis, Dimension};
use proj4rs::Proj;
use proj4rs::transform::transform;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Geographic frame every transform starts from.
const WGS84_LONLAT: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// A point-wise transform between longitude/latitude degrees and a planar frame.
pub trait CrsTransform {
    fn forward(&self, lon: Real, lat: Real) -> Result<(Real, Real)>;
    fn inverse(&self, x: Real, y: Real) -> Result<(Real, Real)>;
}

/// Projected CRS selected by EPSG code, evaluated by `proj4rs`.
#[derive(Clone)]
pub struct EpsgTransform {
    code: u32,
    geographic: Arc<Proj>,
    projected: Arc<Proj>,
}

impl std::fmt::Debug for EpsgTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EpsgTransform").field("code", &self.code).finish_non_exhaustive()
    }
}

impl EpsgTransform {
    /// Look up the definition of `code`. Unknown and geographic codes are
    /// rejected with [`ShadowError::UnsupportedCrs`].
    pub fn new(code: u32) -> Result<Self> {
        // ESRI and legacy aliases of Web Mercator
        let epsg = match code {
            900913 | 102100 | 102113 => 3857,
            other => other,
        };
        let def = u16::try_from(epsg)
            .ok()
            .and_then(crs_definitions::from_code)
            .ok_or(ShadowError::UnsupportedCrs(code))?;
        if def.proj4.contains("+proj=longlat") || def.proj4.contains("+proj=latlong") {
            return Err(ShadowError::UnsupportedCrs(code));
        }

        let parse = |definition: &str| {
            Proj::from_proj_string(definition)
                .map(Arc::new)
                .map_err(|e| ShadowError::Crs { code, message: format!("{e:?}") })
        };
        Ok(Self { code, geographic: parse(WGS84_LONLAT)?, projected: parse(def.proj4)? })
    }

    pub const fn code(&self) -> u32 {
        self.code
    }
}

fn check_geographic(lon: Real, lat: Real) -> Result<()> {
    if !lon.is_finite() || !lat.is_finite() || lat.abs() >= 90.0 {
        return Err(ShadowError::ProjectionDomain { x: lon, y: lat });
    }
    Ok(())
}

fn check_planar(x: Real, y: Real) -> Result<()> {
    if !x.is_finite() || !y.is_finite() {
        return Err(ShadowError::ProjectionDomain { x, y });
    }
    Ok(())
}

impl CrsTransform for EpsgTransform {
    fn forward(&self, lon: Real, lat: Real) -> Result<(Real, Real)> {
        check_geographic(lon, lat)?;
        // proj4rs takes geographic coordinates in radians
        let mut point = (lon.to_radians(), lat.to_radians(), 0.0);
        transform(&self.geographic, &self.projected, &mut point)
            .map_err(|_| ShadowError::ProjectionDomain { x: lon, y: lat })?;
        check_planar(point.0, point.1)?;
        Ok((point.0, point.1))
    }

    fn inverse(&self, x: Real, y: Real) -> Result<(Real, Real)> {
        check_planar(x, y)?;
        let mut point = (x, y, 0.0);
        transform(&self.projected, &self.geographic, &mut point).map_err(|_| ShadowError::ProjectionDomain { x, y })?;
        let (lon, lat) = (point.0.to_degrees(), point.1.to_degrees());
        check_planar(lon, lat)?;
        Ok((lon, lat))
    }
}

/// Closed-form spherical Web Mercator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SphericalMercator;

impl CrsTransform for SphericalMercator {
    fn forward(&self, lon: Real, lat: Real) -> Result<(Real, Real)> {
        check_geographic(lon, lat)?;
        let a = lat * PI / 180.0;
        let x = lon * PI / 180.0 * EARTH_RADIUS;
        let y = EARTH_RADIUS / 2.0 * ((1.0 + a.sin()) / (1.0 - a.sin())).ln();
        Ok((x, y))
    }

    fn inverse(&self, x: Real, y: Real) -> Result<(Real, Real)> {
        check_planar(x, y)?;
        let lon = x / MERCATOR_HALF_EXTENT * 180.0;
        let lat = y / MERCATOR_HALF_EXTENT * 180.0;
        let lat = 180.0 / PI * (2.0 * (lat * PI / 180.0).exp().atan() - FRAC_PI_2);
        Ok((lon, lat))
    }
}

/// Which projection a computation uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionStrategy {
    /// Reproject through a projected CRS identified by EPSG code.
    Epsg(u32),
    /// Closed-form spherical Web Mercator.
    SphericalMercator,
}

impl Default for ProjectionStrategy {
    fn default() -> Self {
        ProjectionStrategy::Epsg(3857)
    }
}

#[derive(Clone, Debug)]
enum Backend {
    Epsg(EpsgTransform),
    Spherical(SphericalMercator),
}

/// Applies one projection strategy to whole coordinate arrays of shape
/// `(.., 2)`, e.g. `(N, 2)` points or `(N, K, 2)` rings.
#[derive(Clone, Debug)]
pub struct CoordinateProjector {
    strategy: ProjectionStrategy,
    backend: Backend,
}

impl CoordinateProjector {
    pub fn new(strategy: ProjectionStrategy) -> Result<Self> {
        let backend = match strategy {
            ProjectionStrategy::Epsg(code) => Backend::Epsg(EpsgTransform::new(code)?),
            ProjectionStrategy::SphericalMercator => Backend::Spherical(SphericalMercator),
        };
        Ok(Self { strategy, backend })
    }

    pub const fn strategy(&self) -> ProjectionStrategy {
        self.strategy
    }

    /// Longitude/latitude degrees to planar metres.
    pub fn to_metric<D: Dimension>(&self, lonlat: &Array<Real, D>) -> Result<Array<Real, D>> {
        match &self.backend {
            Backend::Epsg(t) => map_pairs(lonlat, |x, y| t.forward(x, y)),
            Backend::Spherical(t) => map_pairs(lonlat, |x, y| t.forward(x, y)),
        }
    }

    /// Planar metres back to longitude/latitude degrees.
    pub fn to_geographic<D: Dimension>(&self, metric: &Array<Real, D>) -> Result<Array<Real, D>> {
        match &self.backend {
            Backend::Epsg(t) => map_pairs(metric, |x, y| t.inverse(x, y)),
            Backend::Spherical(t) => map_pairs(metric, |x, y| t.inverse(x, y)),
        }
    }
}

fn map_pairs<D, F>(coords: &Array<Real, D>, f: F) -> Result<Array<Real, D>>
where
    D: Dimension,
    F: Fn(Real, Real) -> Result<(Real, Real)>,
{
    if coords.is_empty() {
        return Ok(coords.clone());
    }
    let ndim = coords.ndim();
    if ndim == 0 || coords.shape()[ndim - 1] != 2 {
        return Err(ShadowError::CoordinateShape(coords.shape().to_vec()));
    }

    let mut out = coords.clone();
    for mut pair in out.lanes_mut(Axis(ndim - 1)) {
        let (x, y) = f(pair[0], pair[1])?;
        pair[0] = x;
        pair[1] = y;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3, array};

    #[test]
    fn unsupported_code() {
        assert!(matches!(CoordinateProjector::new(ProjectionStrategy::Epsg(4326)), Err(ShadowError::UnsupportedCrs(4326))));
    }

    #[test]
    fn any_projected_code() {
        let utm = EpsgTransform::new(32651).unwrap();
        let (x, y) = utm.forward(121.47, 31.23).unwrap();
        // UTM 51N false easting 500 km, central meridian 123°E
        assert!(x > 300_000.0 && x < 500_000.0);
        assert!(y > 3_400_000.0 && y < 3_500_000.0);
        assert_eq!(EpsgTransform::new(900913).unwrap().code(), 900913);
        assert!(matches!(EpsgTransform::new(70_000), Err(ShadowError::UnsupportedCrs(70_000))));
    }

    #[test]
    fn empty_arrays_pass_through() {
        let p = CoordinateProjector::new(ProjectionStrategy::default()).unwrap();
        let pts = Array2::<Real>::zeros((0, 2));
        assert_eq!(p.to_metric(&pts).unwrap().shape(), &[0, 2]);
        let rings = Array3::<Real>::zeros((0, 5, 2));
        assert_eq!(p.to_geographic(&rings).unwrap().shape(), &[0, 5, 2]);
    }

    #[test]
    fn wrong_trailing_axis() {
        let p = CoordinateProjector::new(ProjectionStrategy::SphericalMercator).unwrap();
        let bad = Array2::<Real>::zeros((2, 3));
        assert!(matches!(p.to_metric(&bad), Err(ShadowError::CoordinateShape(_))));
    }

    #[test]
    fn known_values() {
        let p = CoordinateProjector::new(ProjectionStrategy::Epsg(3857)).unwrap();
        let m = p.to_metric(&array![[90.0, 0.0], [0.0, 0.0]]).unwrap();
        assert!((m[[0, 0]] - 10_018_754.171_394_622).abs() < 1e-6);
        assert!(m[[0, 1]].abs() < 1e-9);
        assert!(m[[1, 0]].abs() < 1e-9);
    }

    #[test]
    fn strategies_agree_closely_but_not_exactly() {
        let pts = array![[121.47, 31.23]];
        let a = CoordinateProjector::new(ProjectionStrategy::Epsg(3857)).unwrap();
        let b = CoordinateProjector::new(ProjectionStrategy::SphericalMercator).unwrap();
        let ma = a.to_metric(&pts).unwrap();
        let mb = b.to_metric(&pts).unwrap();
        assert!((ma[[0, 0]] - mb[[0, 0]]).abs() < 1e-3);
        assert!((ma[[0, 1]] - mb[[0, 1]]).abs() < 1e-3);
    }

    #[test]
    fn pole_is_outside_domain() {
        let p = CoordinateProjector::new(ProjectionStrategy::SphericalMercator).unwrap();
        assert!(matches!(p.to_metric(&array![[0.0, 90.0]]), Err(ShadowError::ProjectionDomain { .. })));
    }
}
