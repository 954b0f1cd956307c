//! Regular lattice of rectangular cells over a study area.

use crate::errors::{Result, ShadowError};
use crate::float_types::{GRID_EARTH_RADIUS, PI, Real};
use geo::{Polygon, Rect, polygon};

/// Largest lattice a single grid may hold.
pub const MAX_GRID_CELLS: i64 = 50_000_000;

/// Lattice geometry: cell `(col, row)` is centered on
/// `(lon_start + col·delta_lon, lat_start + row·delta_lat)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridParams {
    pub lon_start: Real,
    pub lat_start: Real,
    pub delta_lon: Real,
    pub delta_lat: Real,
}

impl GridParams {
    /// Degree steps equivalent to `accuracy` metres at the mean latitude of
    /// `bounds`, starting at its min corner.
    pub fn from_accuracy(bounds: &Rect<Real>, accuracy: Real) -> Result<Self> {
        if !(accuracy > 0.0) || !accuracy.is_finite() {
            return Err(ShadowError::InvalidCellSize(accuracy));
        }
        let mean_lat = (bounds.min().y + bounds.max().y) / 2.0;
        let delta_lat = accuracy * 360.0 / (2.0 * PI * GRID_EARTH_RADIUS);
        let delta_lon = delta_lat / mean_lat.to_radians().cos();
        Ok(Self { lon_start: bounds.min().x, lat_start: bounds.min().y, delta_lon, delta_lat })
    }

    /// Explicit steps in the coordinate units of `bounds`.
    pub fn with_steps(bounds: &Rect<Real>, delta_lon: Real, delta_lat: Real) -> Result<Self> {
        for step in [delta_lon, delta_lat] {
            if !(step > 0.0) || !step.is_finite() {
                return Err(ShadowError::InvalidCellSize(step));
            }
        }
        Ok(Self { lon_start: bounds.min().x, lat_start: bounds.min().y, delta_lon, delta_lat })
    }

    /// Cell containing a point.
    pub fn locate(&self, lon: Real, lat: Real) -> (i64, i64) {
        let col = ((lon - self.lon_start) / self.delta_lon + 0.5).floor() as i64;
        let row = ((lat - self.lat_start) / self.delta_lat + 0.5).floor() as i64;
        (col, row)
    }

    pub fn cell_polygon(&self, col: i64, row: i64) -> Polygon<Real> {
        let cx = self.lon_start + col as Real * self.delta_lon;
        let cy = self.lat_start + row as Real * self.delta_lat;
        let (hx, hy) = (self.delta_lon / 2.0, self.delta_lat / 2.0);
        polygon![
            (x: cx - hx, y: cy - hy),
            (x: cx + hx, y: cy - hy),
            (x: cx + hx, y: cy + hy),
            (x: cx - hx, y: cy + hy),
        ]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GridCell {
    pub col: i64,
    pub row: i64,
    pub geometry: Polygon<Real>,
}

/// Cells covering a bounding box, row-major from the min corner.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    params: GridParams,
    cells: Vec<GridCell>,
}

impl Grid {
    /// Cells of about `accuracy` metres covering geographic `bounds`.
    pub fn from_bounds(bounds: &Rect<Real>, accuracy: Real) -> Result<Self> {
        Self::covering(bounds, GridParams::from_accuracy(bounds, accuracy)?)
    }

    /// Cells of explicit size covering `bounds`.
    pub fn with_steps(bounds: &Rect<Real>, delta_lon: Real, delta_lat: Real) -> Result<Self> {
        Self::covering(bounds, GridParams::with_steps(bounds, delta_lon, delta_lat)?)
    }

    /// Fails with [`ShadowError::InvalidCellSize`] when the cells are so small
    /// that the lattice would exceed [`MAX_GRID_CELLS`].
    pub fn covering(bounds: &Rect<Real>, params: GridParams) -> Result<Self> {
        let (col_max, row_max) = params.locate(bounds.max().x, bounds.max().y);
        let total = col_max
            .checked_add(1)
            .zip(row_max.checked_add(1))
            .and_then(|(cols, rows)| cols.checked_mul(rows))
            .filter(|n| (0..=MAX_GRID_CELLS).contains(n))
            .ok_or(ShadowError::InvalidCellSize(params.delta_lon.min(params.delta_lat)))?;

        let mut cells = Vec::with_capacity(total as usize);
        for row in 0..=row_max {
            for col in 0..=col_max {
                cells.push(GridCell { col, row, geometry: params.cell_polygon(col, row) });
            }
        }
        Ok(Self { params, cells })
    }

    pub const fn params(&self) -> &GridParams {
        &self.params
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn locate(&self, lon: Real, lat: Real) -> (i64, i64) {
        self.params.locate(lon, lat)
    }
}
