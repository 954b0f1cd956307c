//! Building footprints and their preparation for shadow casting.

use crate::errors::{Result, ShadowError, ValidationError};
use crate::float_types::Real;
use geo::{BoundingRect, Coord, Polygon, Rect};

/// Unique building identifier.
pub type BuildingId = u64;

/// An extruded building: a geographic footprint (lon/lat degrees) and a
/// ground-relative height in metres.
#[derive(Clone, Debug, PartialEq)]
pub struct Building {
    pub id: BuildingId,
    pub footprint: Polygon<Real>,
    pub height: Real,
}

impl Building {
    pub fn new(id: BuildingId, footprint: Polygon<Real>, height: Real) -> Self {
        Self { id, footprint, height }
    }

    /// Build from an exterior ring of `[lon, lat]` points. The ring is closed
    /// automatically if the last point does not repeat the first.
    pub fn from_ring(id: BuildingId, ring: &[[Real; 2]], height: Real) -> Self {
        let coords: Vec<Coord<Real>> = ring.iter().map(|&[x, y]| Coord { x, y }).collect();
        Self::new(id, Polygon::new(coords.into(), vec![]), height)
    }

    /// Check the exterior ring is usable: at least a triangle and finite everywhere.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if !self.height.is_finite() {
            return Err(ValidationError::InvalidHeight(self.height));
        }
        let ring = &self.footprint.exterior().0;
        if ring.len() < 4 {
            return Err(ValidationError::TooFewPoints { count: ring.len() });
        }
        if let Some(bad) = ring.iter().find(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(ValidationError::InvalidCoordinate(*bad));
        }
        Ok(())
    }

    pub fn bounds(&self) -> Option<Rect<Real>> {
        self.footprint.bounding_rect()
    }
}

/// Subtract the ground offset, drop buildings that end up with no height and
/// validate the rest.
///
/// With `strict` set, a non-positive height is an error instead of a silent drop.
pub fn prepare_buildings(buildings: &[Building], ground: Real, strict: bool) -> Result<Vec<Building>> {
    let mut prepared = Vec::with_capacity(buildings.len());
    for building in buildings {
        building
            .validate()
            .map_err(|source| ShadowError::InvalidFootprint { building_id: building.id, source })?;

        let height = building.height - ground;
        if height <= 0.0 {
            if strict {
                return Err(ShadowError::NonPositiveHeight { building_id: building.id, height });
            }
            continue;
        }
        prepared.push(Building { height, ..building.clone() });
    }
    Ok(prepared)
}

/// Bounding rectangle of all footprints.
pub fn total_bounds(buildings: &[Building]) -> Option<Rect<Real>> {
    buildings
        .iter()
        .filter_map(Building::bounds)
        .reduce(|a, b| {
            Rect::new(
                Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            )
        })
}

/// Location at which the sun is evaluated for a single timestamp: the center
/// of the mean footprint bounds.
pub fn reference_location(buildings: &[Building]) -> Option<(Real, Real)> {
    let mut sums = [0.0; 4];
    let mut n = 0usize;
    for rect in buildings.iter().filter_map(Building::bounds) {
        sums[0] += rect.min().x;
        sums[1] += rect.min().y;
        sums[2] += rect.max().x;
        sums[3] += rect.max().y;
        n += 1;
    }
    if n == 0 {
        return None;
    }
    let n = n as Real;
    Some(((sums[0] + sums[2]) / (2.0 * n), (sums[1] + sums[3]) / (2.0 * n)))
}

/// Location used to look up sunrise/sunset: the min corner of the first
/// building's bounds. Only meaningful for geographically compact inputs.
pub fn timetable_location(buildings: &[Building]) -> Option<(Real, Real)> {
    buildings.first().and_then(Building::bounds).map(|r| (r.min().x, r.min().y))
}
