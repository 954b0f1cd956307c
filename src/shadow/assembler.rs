//! Turns cast wall quadrilaterals into a typed shadow table.

use super::{ShadowKind, ShadowRecord, ShadowTable, WallTable};
use crate::building::{Building, BuildingId};
use crate::float_types::Real;
use crate::geometry::{polygon_from_ring, repair, union_all};
use chrono::{DateTime, Utc};
use geo::{BooleanOps, MultiPolygon, Polygon};
use hashbrown::HashMap;
use ndarray::{Array3, Axis};

/// Options for assembling one timestamp's shadow table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShadowAssembler {
    /// Emit one `roof` record per building (its own footprint).
    pub roof: bool,
    /// Union all wall shadows of a building into one `ground` record.
    pub merge_by_building: bool,
    /// When merging, keep the footprint inside the ground shadow (`true`) or
    /// cut it out (`false`).
    pub include_building: bool,
}

impl Default for ShadowAssembler {
    fn default() -> Self {
        Self { roof: true, merge_by_building: false, include_building: true }
    }
}

impl ShadowAssembler {
    pub const fn new(roof: bool, merge_by_building: bool) -> Self {
        Self { roof, merge_by_building, include_building: true }
    }

    pub const fn include_building(mut self, include: bool) -> Self {
        self.include_building = include;
        self
    }

    /// Build the table for one timestamp.
    ///
    /// `quads` is the caster output in geographic coordinates, one `(5, 2)`
    /// ring per row of `walls`. Roof records come first, in building order,
    /// followed by ground records in wall (or, when merged, building) order.
    pub fn assemble(
        &self,
        buildings: &[Building],
        walls: &WallTable,
        quads: &Array3<Real>,
        timestamp: DateTime<Utc>,
    ) -> ShadowTable {
        let mut table = ShadowTable::new();

        if self.roof {
            table.extend(buildings.iter().map(|b| ShadowRecord {
                building_id: b.id,
                kind: ShadowKind::Roof,
                timestamp,
                geometry: MultiPolygon::new(vec![b.footprint.clone()]),
            }));
        }

        let wall_shadows = quads.axis_iter(Axis(0)).map(polygon_from_ring);

        if !self.merge_by_building {
            table.extend(walls.building_ids.iter().zip(wall_shadows).map(|(&building_id, quad)| ShadowRecord {
                building_id,
                kind: ShadowKind::Ground,
                timestamp,
                geometry: MultiPolygon::new(vec![quad]),
            }));
            return table;
        }

        let mut grouped: HashMap<BuildingId, Vec<Polygon<Real>>> = HashMap::new();
        for (&building_id, quad) in walls.building_ids.iter().zip(wall_shadows) {
            grouped.entry(building_id).or_default().push(quad);
        }

        for building in buildings {
            let Some(quads) = grouped.remove(&building.id) else {
                continue;
            };
            let footprint = MultiPolygon::new(vec![building.footprint.clone()]);
            let merged = repair(&union_all(quads));
            let merged = if self.include_building {
                merged.union(&footprint)
            } else {
                merged.difference(&footprint)
            };
            let merged = repair(&merged);
            if merged.0.is_empty() {
                continue;
            }
            table.push(ShadowRecord { building_id: building.id, kind: ShadowKind::Ground, timestamp, geometry: merged });
        }
        table
    }
}
