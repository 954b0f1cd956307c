mod support;

use geo::Polygon;
use ndarray::{Array1, Array2, array};
use shadowrs::{
    CoordinateProjector, ShadowConfig, ShadowEngine, ShadowError, ShadowKind, SunPosition,
    float_types::{FRAC_PI_4, PI, Real},
    shadow::{WallTable, cast_shadows},
};
use support::{FixedSun, approx_eq, date, square_building, utc};

fn ring_to_metric(projector: &CoordinateProjector, poly: &Polygon<Real>) -> Array2<Real> {
    let flat: Vec<Real> = poly.exterior().0.iter().flat_map(|c| [c.x, c.y]).collect();
    let ring = Array2::from_shape_vec((flat.len() / 2, 2), flat).unwrap();
    projector.to_metric(&ring).unwrap()
}

#[test]
fn test_shadow_length_matches_height_over_tan_altitude() {
    let walls = array![[[0.0, 0.0], [3.0, 4.0]], [[10.0, 10.0], [10.0, 0.0]], [[-5.0, 2.0], [-1.0, 2.0]]];
    let heights = Array1::from(vec![5.0, 12.5, 30.0]);
    for (azimuth, altitude) in [(0.3, 0.2), (-2.0, 1.1), (PI, FRAC_PI_4), (1.5, 0.05)] {
        let quads = cast_shadows(walls.view(), heights.view(), &SunPosition::new(azimuth, altitude)).unwrap();
        for i in 0..walls.len_of(ndarray::Axis(0)) {
            let expected = heights[i] / altitude.tan();
            // corner 2 is the far copy of wall endpoint 1, corner 3 of endpoint 0
            for (near, far) in [(1, 2), (0, 3)] {
                let dx = quads[[i, far, 0]] - quads[[i, near, 0]];
                let dy = quads[[i, far, 1]] - quads[[i, near, 1]];
                assert!(approx_eq(dx.hypot(dy), expected, 1e-9));
            }
            assert_eq!(quads[[i, 4, 0]], quads[[i, 0, 0]]);
            assert_eq!(quads[[i, 4, 1]], quads[[i, 0, 1]]);
        }
    }
}

#[test]
fn test_square_building_under_southern_sun() {
    let walls = array![
        [[0.0, 0.0], [0.0, 10.0]],
        [[0.0, 10.0], [10.0, 10.0]],
        [[10.0, 10.0], [10.0, 0.0]],
        [[10.0, 0.0], [0.0, 0.0]],
    ];
    let heights = Array1::from(vec![10.0; 4]);
    let quads = cast_shadows(walls.view(), heights.view(), &SunPosition::new(0.0, FRAC_PI_4)).unwrap();

    // north wall: swept 10 m north
    let north = quads.index_axis(ndarray::Axis(0), 1);
    let expect = [[0.0, 10.0], [10.0, 10.0], [10.0, 20.0], [0.0, 20.0], [0.0, 10.0]];
    for (k, [x, y]) in expect.iter().enumerate() {
        assert!(approx_eq(north[[k, 0]], *x, 1e-9) && approx_eq(north[[k, 1]], *y, 1e-9), "corner {k}");
    }
}

#[test]
fn test_engine_offsets_are_metric() {
    let engine = ShadowEngine::with_ephemeris(FixedSun, ShadowConfig::default()).unwrap();
    let building = square_building(1, 0.0, 0.0, 0.0001, 10.0);
    let table = engine.shadows_at(&[building.clone()], utc(2022, 1, 1, 12)).unwrap();

    assert_eq!(table.of_kind(ShadowKind::Roof).count(), 1);
    assert_eq!(table.of_kind(ShadowKind::Ground).count(), 4);
    assert_eq!(table.of_kind(ShadowKind::Roof).next().unwrap().geometry.0[0], building.footprint);

    for record in table.of_kind(ShadowKind::Ground) {
        let ring = ring_to_metric(engine.projector(), &record.geometry.0[0]);
        assert!(approx_eq(ring[[2, 0]] - ring[[1, 0]], 0.0, 1e-6));
        assert!(approx_eq(ring[[2, 1]] - ring[[1, 1]], 10.0, 1e-6));
    }
}

#[test]
fn test_ground_offset_shortens_shadows() {
    let config = ShadowConfig { ground: 4.0, roof: false, ..Default::default() };
    let engine = ShadowEngine::with_ephemeris(FixedSun, config).unwrap();
    let table = engine.shadows_at(&[square_building(1, 0.0, 0.0, 0.0001, 10.0)], utc(2022, 1, 1, 12)).unwrap();
    assert_eq!(table.len(), 4);
    for record in table.iter() {
        let ring = ring_to_metric(engine.projector(), &record.geometry.0[0]);
        assert!(approx_eq(ring[[2, 1]] - ring[[1, 1]], 6.0, 1e-6));
    }
}

#[test]
fn test_empty_building_set() {
    let engine = ShadowEngine::with_ephemeris(FixedSun, ShadowConfig::default()).unwrap();
    assert!(engine.shadows_at(&[], utc(2022, 1, 1, 12)).unwrap().is_empty());
    assert!(engine.run(&[], &[date("2022-01-01")], 3600, 1800).unwrap().is_empty());

    // everything below ground is dropped
    let config = ShadowConfig { ground: 50.0, ..Default::default() };
    let engine = ShadowEngine::with_ephemeris(FixedSun, config).unwrap();
    let table = engine.shadows_at(&[square_building(1, 0.0, 0.0, 0.0001, 10.0)], utc(2022, 1, 1, 12)).unwrap();
    assert!(table.is_empty());
}

#[test]
fn test_walls_follow_ring_order() {
    let building = square_building(4, 0.0, 0.0, 1.0, 3.0);
    let walls = WallTable::extract(&[building]);
    assert_eq!(walls.len(), 4);
    assert_eq!(walls.wall(0), (0.0, 0.0, 0.0, 1.0, 4, 3.0));
    assert_eq!(walls.wall(3), (1.0, 0.0, 0.0, 0.0, 4, 3.0));
}

#[test]
fn test_night_has_no_shadow() {
    let engine = ShadowEngine::new(ShadowConfig::default()).unwrap();
    // local midnight in Shanghai
    let err = engine.shadows_at(&[square_building(1, 121.47, 31.23, 0.0005, 20.0)], utc(2022, 1, 1, 16)).unwrap_err();
    assert!(matches!(err, ShadowError::SunBelowHorizon { .. }));
}
