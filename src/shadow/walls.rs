//! Decomposition of footprints into walls.

use crate::building::{Building, BuildingId};
use crate::float_types::Real;
use ndarray::{Array1, Array3};

/// All walls of a set of buildings, stored column-wise so the caster can work
/// on them in bulk.
///
/// `coords` has shape `(N, 2, 2)`: wall, endpoint, (x, y).
#[derive(Clone, Debug, PartialEq)]
pub struct WallTable {
    pub coords: Array3<Real>,
    pub building_ids: Vec<BuildingId>,
    pub heights: Array1<Real>,
}

impl WallTable {
    /// One wall per consecutive pair of exterior ring coordinates, in ring
    /// order. Rings are stored closed, so a ring of `k` coordinates yields
    /// `k - 1` walls and the closing edge is the last of them.
    pub fn extract(buildings: &[Building]) -> Self {
        let count: usize = buildings.iter().map(|b| b.footprint.exterior().0.len().saturating_sub(1)).sum();

        let mut coords = Array3::<Real>::zeros((count, 2, 2));
        let mut building_ids = Vec::with_capacity(count);
        let mut heights = Vec::with_capacity(count);

        let mut row = 0;
        for building in buildings {
            for line in building.footprint.exterior().lines() {
                coords[[row, 0, 0]] = line.start.x;
                coords[[row, 0, 1]] = line.start.y;
                coords[[row, 1, 0]] = line.end.x;
                coords[[row, 1, 1]] = line.end.y;
                building_ids.push(building.id);
                heights.push(building.height);
                row += 1;
            }
        }

        Self { coords, building_ids, heights: Array1::from(heights) }
    }

    pub fn len(&self) -> usize {
        self.building_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.building_ids.is_empty()
    }

    /// Wall as `(x1, y1, x2, y2, building_id, height)`.
    pub fn wall(&self, i: usize) -> (Real, Real, Real, Real, BuildingId, Real) {
        (
            self.coords[[i, 0, 0]],
            self.coords[[i, 0, 1]],
            self.coords[[i, 1, 0]],
            self.coords[[i, 1, 1]],
            self.building_ids[i],
            self.heights[i],
        )
    }

    /// Same walls with coordinates replaced, e.g. after projection.
    pub fn with_coords(&self, coords: Array3<Real>) -> Self {
        Self { coords, building_ids: self.building_ids.clone(), heights: self.heights.clone() }
    }
}
