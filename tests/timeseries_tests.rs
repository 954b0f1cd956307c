mod support;

use shadowrs::{
    RunContext, ShadowConfig, ShadowEngine, ShadowError, ShadowKind,
    cache::{CacheKey, InMemoryShadowCache, ShadowCache},
    progress::{CountingProgress, FnProgress, ProgressEvent, TracingProgress},
    timeseries::{SerialTimeSeries, Timetable, parse_dates},
};
use std::sync::Mutex;
use support::{FailingSun, FixedSun, RecordingSun, date, square_building, utc};

#[test]
fn test_padding_boundary_with_real_sun() {
    let engine = ShadowEngine::new(ShadowConfig::default()).unwrap();
    let buildings = [square_building(1, 121.47, 31.23, 0.0005, 20.0)];
    let dates = [date("2022-01-01")];

    let err = engine.run(&buildings, &dates, 3600, 1799).unwrap_err();
    assert!(matches!(err, ShadowError::InsufficientPadding { padding: 1799, minimum: 1800 }));

    let table = engine.run(&buildings, &dates, 3600, 1800).unwrap();
    assert!(!table.is_empty());
    // every sample has one roof and four wall records
    let timestamps = table.timestamps();
    assert_eq!(table.len(), timestamps.len() * 5);
    assert!(timestamps.len() >= 8);
}

#[test]
fn test_timetable_inside_daylight() {
    let engine = ShadowEngine::new(ShadowConfig::default()).unwrap();
    let buildings = [square_building(1, 121.47, 31.23, 0.0005, 20.0)];
    let tt = engine.timetable(&buildings, &parse_dates(&["2022-06-21"]).unwrap(), 1800, 1800).unwrap();
    let day = tt.days()[0].times;
    assert!(tt.entries().iter().all(|e| e.timestamp >= day.sunrise && e.timestamp < day.sunset));
    assert!(tt.day_length_hours() > 13.0 && tt.day_length_hours() < 15.0);
}

#[test]
fn test_run_concatenates_in_timetable_order() {
    let engine = ShadowEngine::with_ephemeris(FixedSun, ShadowConfig::default()).unwrap();
    let buildings = [square_building(1, 0.0, 0.0, 0.0001, 10.0), square_building(2, 0.001, 0.0, 0.0001, 20.0)];
    let table = engine.run(&buildings, &[date("2022-01-01"), date("2022-01-02")], 3600, 1800).unwrap();

    // 11 samples per day, 2 roof + 8 wall records each
    assert_eq!(table.timestamps().len(), 22);
    assert_eq!(table.len(), 22 * 10);
    let stamps: Vec<_> = table.iter().map(|r| r.timestamp).collect();
    assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(table.records()[0].kind, ShadowKind::Roof);
    assert_eq!(table.records()[0].timestamp, utc(2022, 1, 1, 6) + chrono::Duration::minutes(30));
}

#[test]
fn test_cache_and_progress() {
    let engine = ShadowEngine::with_ephemeris(FixedSun, ShadowConfig::default()).unwrap();
    let buildings = [square_building(1, 0.0, 0.0, 0.0001, 10.0)];
    let dates = [date("2022-01-01")];
    let cache = InMemoryShadowCache::new();

    let first = CountingProgress::new();
    let ctx = RunContext { area: "testville", cache: Some(&cache), progress: &first };
    let computed = engine.run_with(&buildings, &dates, 3600, 1800, &SerialTimeSeries, ctx).unwrap();
    assert_eq!((first.computed(), first.cached()), (11, 0));
    assert_eq!(first.records(), computed.len());
    assert_eq!(cache.len(), 11);
    assert!(cache.get(&CacheKey::new("testville", "2022-01-01 06:30:00")).unwrap().is_some());

    let second = CountingProgress::new();
    let ctx = RunContext { area: "testville", cache: Some(&cache), progress: &second };
    let reused = engine.run_with(&buildings, &dates, 3600, 1800, &SerialTimeSeries, ctx).unwrap();
    assert_eq!((second.computed(), second.cached()), (0, 11));
    assert_eq!(reused, computed);
}

#[test]
fn test_progress_event_order() {
    let engine = ShadowEngine::with_ephemeris(FixedSun, ShadowConfig::default()).unwrap();
    let events = Mutex::new(Vec::new());
    let observer = FnProgress(|e: &ProgressEvent| events.lock().unwrap().push(e.clone()));
    let ctx = RunContext { progress: &observer, ..Default::default() };
    engine
        .run_with(&[square_building(1, 0.0, 0.0, 0.0001, 10.0)], &[date("2022-01-01")], 7200, 3600, &SerialTimeSeries, ctx)
        .unwrap();

    let events = events.into_inner().unwrap();
    assert_eq!(events.first(), Some(&ProgressEvent::RunStarted { timestamps: 5 }));
    assert_eq!(events.last(), Some(&ProgressEvent::RunFinished { records: 25 }));
    assert_eq!(events.len(), 2 + 2 * 5);
}

#[test]
fn test_failing_timestamp_aborts_with_context() {
    let engine = ShadowEngine::with_ephemeris(FailingSun { fail_from: 10 }, ShadowConfig::default()).unwrap();
    let err = engine.run(&[square_building(1, 0.0, 0.0, 0.0001, 10.0)], &[date("2022-01-01")], 3600, 1800).unwrap_err();
    match &err {
        ShadowError::AtTimestamp { timestamp, .. } => {
            assert_eq!(*timestamp, utc(2022, 1, 1, 10) + chrono::Duration::minutes(30));
        },
        other => panic!("expected timestamp context, got {other:?}"),
    }
    assert!(matches!(err.root(), ShadowError::Ephemeris(_)));
}

#[test]
fn test_sun_times_located_at_first_input_building() {
    let sun = RecordingSun::default();
    let config = ShadowConfig { ground: 5.0, ..Default::default() };
    let engine = ShadowEngine::with_ephemeris(&sun, config).unwrap();
    // the first building is below the ground offset and casts nothing
    let buildings = [square_building(1, 0.01, 0.02, 0.0001, 3.0), square_building(2, 0.0, 0.0, 0.0001, 20.0)];
    let table = engine.run(&buildings, &[date("2022-01-01")], 3600, 1800).unwrap();

    assert!(table.iter().all(|r| r.building_id == 2));
    assert_eq!(*sun.day_queries.lock().unwrap(), vec![(0.01, 0.02)]);
}

#[test]
fn test_tracing_progress_run() {
    let engine = ShadowEngine::with_ephemeris(FixedSun, ShadowConfig::default()).unwrap();
    let ctx = RunContext { progress: &TracingProgress, ..Default::default() };
    let table = engine
        .run_with(&[square_building(1, 0.0, 0.0, 0.0001, 10.0)], &[date("2022-01-01")], 3600, 1800, &SerialTimeSeries, ctx)
        .unwrap();
    assert_eq!(table.len(), 11 * 5);
}

#[test]
fn test_explicit_timetable() {
    let engine = ShadowEngine::with_ephemeris(FixedSun, ShadowConfig { roof: false, ..Default::default() }).unwrap();
    let buildings = engine.prepare(&[square_building(1, 0.0, 0.0, 0.0001, 10.0)]).unwrap();
    let tt = Timetable::from_timestamps(&[utc(2022, 3, 1, 9), utc(2022, 3, 1, 15)], 3600);
    let table = engine.run_timetable(buildings, &tt, &SerialTimeSeries, RunContext::default()).unwrap();
    assert_eq!(table.timestamps(), vec![utc(2022, 3, 1, 9), utc(2022, 3, 1, 15)]);
    assert_eq!(table.len(), 8);
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_matches_serial() {
    use shadowrs::timeseries::ParallelTimeSeries;

    let engine = ShadowEngine::with_ephemeris(FixedSun, ShadowConfig { merge_by_building: true, ..Default::default() }).unwrap();
    let buildings = [square_building(1, 0.0, 0.0, 0.0001, 10.0), square_building(2, 0.0002, 0.0, 0.0001, 15.0)];
    let dates = [date("2022-01-01")];
    let serial = engine.run_with(&buildings, &dates, 1800, 1800, &SerialTimeSeries, RunContext::default()).unwrap();
    let parallel = engine.run_with(&buildings, &dates, 1800, 1800, &ParallelTimeSeries, RunContext::default()).unwrap();
    assert_eq!(serial, parallel);

    let failing = ShadowEngine::with_ephemeris(FailingSun { fail_from: 12 }, ShadowConfig::default()).unwrap();
    let err = failing.run_with(&buildings, &dates, 1800, 1800, &ParallelTimeSeries, RunContext::default()).unwrap_err();
    assert!(matches!(err, ShadowError::AtTimestamp { timestamp, .. } if timestamp == utc(2022, 1, 1, 12)));
}
