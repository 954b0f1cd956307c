//! Grid-mode coverage.

use super::{CellId, CoverageCell, CoverageRequest, finish, timestamp_shadows};
use crate::building::Building;
use crate::geometry::rects_overlap;
use crate::grid::Grid;
use crate::shadow::{ShadowKind, ShadowTable};
use geo::{BoundingRect, Intersects};

pub(super) fn aggregate(shadows: &ShadowTable, buildings: &[Building], grid: &Grid, request: &CoverageRequest) -> Vec<CoverageCell> {
    let footprints: Vec<_> = buildings.iter().map(|b| (b.footprint.bounding_rect(), &b.footprint)).collect();
    let layers = timestamp_shadows(shadows, request.kind);

    grid.cells()
        .iter()
        .filter_map(|cell| {
            let cell_rect = cell.geometry.bounding_rect()?;
            let on_building = footprints.iter().any(|(rect, footprint)| {
                rect.is_some_and(|r| rects_overlap(&r, &cell_rect)) && cell.geometry.intersects(*footprint)
            });
            let keep = match request.kind {
                ShadowKind::Roof => on_building,
                ShadowKind::Ground => !on_building,
            };
            if !keep {
                return None;
            }

            // one union per timestamp, so a timestamp counts at most once per cell
            let count = layers
                .iter()
                .filter(|layer| {
                    layer.rect.is_some_and(|r| rects_overlap(&r, &cell_rect)) && cell.geometry.intersects(&layer.geometry)
                })
                .count() as u32;

            Some(finish(CellId::Grid { col: cell.col, row: cell.row }, cell.geometry.clone(), count, request))
        })
        .collect()
}
