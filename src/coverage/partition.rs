//! Partition-mode coverage: exact faces of the shadow arrangement.

use super::{CellId, CoverageCell, CoverageRequest, finish};
use crate::float_types::Real;
use crate::geometry::{enclosed_gaps, polygonize_overlaps, rect_contains_point, sample_point};
use crate::shadow::ShadowTable;
use geo::{BoundingRect, Contains, MultiPolygon};

pub(super) fn aggregate(shadows: &ShadowTable, request: &CoverageRequest) -> Vec<CoverageCell> {
    // every shadow polygon on its own, overlaps within one timestamp included
    let outlines: Vec<MultiPolygon<Real>> = shadows
        .of_kind(request.kind)
        .filter(|record| !record.geometry.0.is_empty())
        .map(|record| record.geometry.clone())
        .collect();
    let rects: Vec<_> = outlines.iter().map(|outline| outline.bounding_rect()).collect();

    let mut faces = polygonize_overlaps(&outlines);
    faces.extend(enclosed_gaps(&outlines));

    faces
        .into_iter()
        .enumerate()
        .map(|(index, face)| {
            // The set of covering polygons is constant over a face, so one
            // interior sample decides it.
            let count = sample_point(&face).map_or(0, |p| {
                outlines
                    .iter()
                    .zip(&rects)
                    .filter(|(outline, rect)| rect.is_some_and(|r| rect_contains_point(&r, &p)) && outline.contains(&p))
                    .count() as u32
            });
            finish(CellId::Fragment(index), face, count, request)
        })
        .collect()
}
