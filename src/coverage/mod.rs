//! Shadow coverage: how long each piece of the study area stays in shadow.
//!
//! Two ways of cutting the study area are supported:
//! - **Grid**: a regular lattice, restricted to cells on roofs (roof coverage)
//!   or off buildings (ground coverage).
//! - **Partition**: the faces of the arrangement of all shadow polygons, so
//!   each face has a single, exact shadow count.
//!
//! A grid cell counts the sampled timestamps whose shadow touches it, once per
//! timestamp. A partition face counts the individual shadow polygons covering
//! it, so overlapping wall shadows of one timestamp each add to the count.
//! In both, `duration = count · step_seconds`. Pieces that were never shadowed
//! are kept with a count of zero, including holes enclosed by shadow.

use crate::building::{Building, total_bounds};
use crate::errors::{Result, ShadowError};
use crate::float_types::{HOUR, Real};
use crate::grid::Grid;
use crate::shadow::{ShadowKind, ShadowTable};
use geo::{BoundingRect, MultiPolygon, Polygon, Rect};

mod lattice;
mod partition;

/// How the study area is cut into pieces.
#[derive(Clone, Debug, PartialEq)]
pub enum CoverageMode {
    /// Regular cells of `cell_size` metres, or the given grid when present.
    Grid { cell_size: Real, grid: Option<Grid> },
    /// Faces of the overlapping shadow polygons.
    Partition,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CoverageRequest {
    pub kind: ShadowKind,
    pub mode: CoverageMode,
    /// Time represented by one sample.
    pub step_seconds: i64,
    /// Study area; defaults to the bounds of the building footprints.
    pub bounds: Option<Rect<Real>>,
    /// Sunrise-to-sunset hours, to derive sunshine hours from durations.
    pub day_length_hours: Option<Real>,
}

impl CoverageRequest {
    pub fn grid(kind: ShadowKind, cell_size: Real, step_seconds: i64) -> Self {
        Self { kind, mode: CoverageMode::Grid { cell_size, grid: None }, step_seconds, bounds: None, day_length_hours: None }
    }

    pub fn partition(kind: ShadowKind, step_seconds: i64) -> Self {
        Self { kind, mode: CoverageMode::Partition, step_seconds, bounds: None, day_length_hours: None }
    }

    /// Reuse an existing lattice instead of building one.
    pub fn with_grid(mut self, grid: Grid) -> Self {
        if let CoverageMode::Grid { grid: slot, .. } = &mut self.mode {
            *slot = Some(grid);
        }
        self
    }

    pub const fn with_bounds(mut self, bounds: Rect<Real>) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub const fn with_day_length(mut self, hours: Real) -> Self {
        self.day_length_hours = Some(hours);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CellId {
    Grid { col: i64, row: i64 },
    Fragment(usize),
}

#[derive(Clone, Debug, PartialEq)]
pub struct CoverageCell {
    pub id: CellId,
    pub geometry: Polygon<Real>,
    /// Timestamps (grid) or shadow polygons (partition) covering the piece.
    pub count: u32,
    /// Shadow duration in seconds.
    pub duration: Real,
    pub sunshine_hours: Option<Real>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CoverageTable {
    cells: Vec<CoverageCell>,
}

impl CoverageTable {
    pub fn cells(&self) -> &[CoverageCell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, id: CellId) -> Option<&CoverageCell> {
        self.cells.iter().find(|c| c.id == id)
    }

    pub fn max_count(&self) -> u32 {
        self.cells.iter().map(|c| c.count).max().unwrap_or(0)
    }
}

impl IntoIterator for CoverageTable {
    type Item = CoverageCell;
    type IntoIter = std::vec::IntoIter<CoverageCell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.into_iter()
    }
}

/// A per-timestamp union of shadows with its bounds, for cheap rejection.
pub(crate) struct TimestampShadow {
    pub geometry: MultiPolygon<Real>,
    pub rect: Option<Rect<Real>>,
}

pub(crate) fn timestamp_shadows(shadows: &ShadowTable, kind: ShadowKind) -> Vec<TimestampShadow> {
    shadows
        .union_by_timestamp(kind)
        .into_iter()
        .filter(|(_, geometry)| !geometry.0.is_empty())
        .map(|(_, geometry)| {
            let rect = geometry.bounding_rect();
            TimestampShadow { geometry, rect }
        })
        .collect()
}

fn finish(id: CellId, geometry: Polygon<Real>, count: u32, request: &CoverageRequest) -> CoverageCell {
    let duration = count as Real * request.step_seconds as Real;
    let sunshine_hours = request.day_length_hours.map(|hours| (hours - duration / HOUR).max(0.0));
    CoverageCell { id, geometry, count, duration, sunshine_hours }
}

/// Aggregate a shadow table into per-piece shadow counts and durations.
pub fn aggregate(shadows: &ShadowTable, buildings: &[Building], request: &CoverageRequest) -> Result<CoverageTable> {
    if request.step_seconds <= 0 {
        return Err(ShadowError::InvalidStep(request.step_seconds));
    }
    let cells = match &request.mode {
        CoverageMode::Grid { cell_size, grid } => {
            let grid = match grid {
                Some(grid) => grid.clone(),
                None => {
                    let bounds = request.bounds.or_else(|| total_bounds(buildings)).ok_or(ShadowError::EmptyStudyArea)?;
                    Grid::from_bounds(&bounds, *cell_size)?
                },
            };
            lattice::aggregate(shadows, buildings, &grid, request)
        },
        CoverageMode::Partition => partition::aggregate(shadows, request),
    };
    Ok(CoverageTable { cells })
}
