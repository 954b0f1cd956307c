//! Polygon plumbing on top of `geo`: ring construction, bulk union, repair
//! and decomposition of overlapping polygons into faces.

use crate::float_types::{Real, sliver_area};
use geo::{
    Area, BooleanOps, BoundingRect, Centroid, Contains, Coord, InteriorPoint, LineString,
    MultiPolygon, Point, Polygon, Rect,
};
use ndarray::ArrayView2;

/// Build a polygon from a `(K, 2)` ring of coordinates.
pub fn polygon_from_ring(ring: ArrayView2<Real>) -> Polygon<Real> {
    let coords: Vec<Coord<Real>> = ring.outer_iter().map(|p| Coord { x: p[0], y: p[1] }).collect();
    Polygon::new(LineString::from(coords), vec![])
}

/// Union an arbitrary number of polygons.
///
/// Pairs are merged level by level so every boolean op sees inputs of similar
/// size, rather than growing one accumulator polygon by polygon.
pub fn union_all<I>(polygons: I) -> MultiPolygon<Real>
where
    I: IntoIterator<Item = Polygon<Real>>,
{
    let layer: Vec<MultiPolygon<Real>> = polygons.into_iter().map(|p| MultiPolygon::new(vec![p])).collect();
    union_multi(layer)
}

/// Union a list of multipolygons into one.
pub fn union_multi(mut layer: Vec<MultiPolygon<Real>>) -> MultiPolygon<Real> {
    while layer.len() > 1 {
        layer = layer
            .chunks(2)
            .map(|pair| pair[1..].iter().fold(pair[0].clone(), |acc, next| acc.union(next)))
            .collect();
    }
    layer.pop().unwrap_or_else(|| MultiPolygon::new(vec![]))
}

/// Clean up boolean-op output: renormalise rings through the overlay engine,
/// then drop sliver polygons and sliver holes.
pub fn repair(geometry: &MultiPolygon<Real>) -> MultiPolygon<Real> {
    let min_area = sliver_area();
    let normalized = geometry.union(&MultiPolygon::new(vec![]));

    let polygons = normalized
        .0
        .into_iter()
        .filter(|poly| poly.unsigned_area() > min_area)
        .map(|poly| {
            let (exterior, interiors) = poly.into_inner();
            let interiors = interiors
                .into_iter()
                .filter(|ring| Polygon::new(ring.clone(), vec![]).unsigned_area() > min_area)
                .collect();
            Polygon::new(exterior, interiors)
        })
        .collect();
    MultiPolygon::new(polygons)
}

/// Split a set of possibly overlapping shapes into the maximal faces of their
/// arrangement: non-overlapping polygons whose union is the union of the
/// input, and inside each of which the set of covering inputs is constant.
///
/// Each input is overlaid on the current faces, splitting every face into the
/// part inside and the part outside it, and the uncovered remainder of the
/// input becomes a new face.
pub fn polygonize_overlaps(shapes: &[MultiPolygon<Real>]) -> Vec<Polygon<Real>> {
    let min_area = sliver_area();
    let keep = |mp: MultiPolygon<Real>| -> Option<MultiPolygon<Real>> {
        let mp = MultiPolygon::new(mp.0.into_iter().filter(|p| p.unsigned_area() > min_area).collect());
        (!mp.0.is_empty()).then_some(mp)
    };

    let mut faces: Vec<MultiPolygon<Real>> = Vec::new();
    let mut covered = MultiPolygon::new(vec![]);
    for shape in shapes {
        let shape_rect = shape.bounding_rect();
        let mut next = Vec::with_capacity(faces.len() * 2 + 1);
        for face in faces {
            let disjoint = match (shape_rect, face.bounding_rect()) {
                (Some(a), Some(b)) => !rects_overlap(&a, &b),
                _ => true,
            };
            if disjoint {
                next.push(face);
                continue;
            }
            next.extend(keep(face.intersection(shape)));
            next.extend(keep(face.difference(shape)));
        }
        next.extend(keep(shape.difference(&covered)));
        covered = covered.union(shape);
        faces = next;
    }

    faces.into_iter().flat_map(|mp| mp.0).collect()
}

/// Regions enclosed by `shapes` that none of them covers: the holes of their
/// union, minus any shape lying inside a hole.
pub fn enclosed_gaps(shapes: &[MultiPolygon<Real>]) -> Vec<Polygon<Real>> {
    let min_area = sliver_area();
    let covered = union_multi(shapes.to_vec());
    let holes: Vec<MultiPolygon<Real>> = covered
        .0
        .iter()
        .flat_map(|poly| poly.interiors().iter().map(|ring| MultiPolygon::new(vec![Polygon::new(ring.clone(), vec![])])))
        .collect();

    holes
        .into_iter()
        .flat_map(|hole| hole.difference(&covered).0)
        .filter(|poly| poly.unsigned_area() > min_area)
        .collect()
}

/// A point strictly inside `polygon`: its centroid, or an interior point when
/// the centroid falls outside (concave or holed faces).
pub fn sample_point(polygon: &Polygon<Real>) -> Option<Point<Real>> {
    match polygon.centroid() {
        Some(c) if polygon.contains(&c) => Some(c),
        _ => polygon.interior_point(),
    }
}

#[inline]
pub fn rects_overlap(a: &Rect<Real>, b: &Rect<Real>) -> bool {
    a.min().x <= b.max().x && a.max().x >= b.min().x && a.min().y <= b.max().y && a.max().y >= b.min().y
}

#[inline]
pub fn rect_contains_point(rect: &Rect<Real>, p: &Point<Real>) -> bool {
    p.x() >= rect.min().x && p.x() <= rect.max().x && p.y() >= rect.min().y && p.y() <= rect.max().y
}
