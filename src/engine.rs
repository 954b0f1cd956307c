//! Shadow computation for one timestamp or a whole timetable.

use crate::building::{Building, prepare_buildings, reference_location, timetable_location};
use crate::cache::{CacheKey, ShadowCache};
use crate::config::ShadowConfig;
use crate::errors::Result;
use crate::float_types::Real;
use crate::progress::{NoProgress, ProgressEvent, ProgressObserver};
use crate::projection::CoordinateProjector;
use crate::shadow::{ShadowTable, WallTable, cast_shadows};
use crate::sun::{SunCalc, SunEphemeris};
use crate::timeseries::{SerialTimeSeries, TimeSeriesOps, Timetable, TimetableEntry, check_sampling};
use chrono::{DateTime, NaiveDate, Utc};

/// Collaborators consulted while running a timetable.
#[derive(Clone, Copy)]
pub struct RunContext<'a> {
    /// Name of the study area, part of every cache key.
    pub area: &'a str,
    pub cache: Option<&'a dyn ShadowCache>,
    pub progress: &'a dyn ProgressObserver,
}

impl Default for RunContext<'_> {
    fn default() -> Self {
        Self { area: "somecity", cache: None, progress: &NoProgress }
    }
}

/// Buildings reduced to what a timestamp needs: walls already projected and
/// the location at which the sun is evaluated.
struct PreparedScene {
    buildings: Vec<Building>,
    walls: WallTable,
    metric_walls: WallTable,
    lon: Real,
    lat: Real,
}

/// Casts building shadows with one ephemeris, configuration and projection.
#[derive(Clone, Debug)]
pub struct ShadowEngine<E = SunCalc> {
    ephemeris: E,
    config: ShadowConfig,
    projector: CoordinateProjector,
}

impl ShadowEngine<SunCalc> {
    pub fn new(config: ShadowConfig) -> Result<Self> {
        Self::with_ephemeris(SunCalc, config)
    }
}

impl<E: SunEphemeris> ShadowEngine<E> {
    pub fn with_ephemeris(ephemeris: E, config: ShadowConfig) -> Result<Self> {
        let projector = CoordinateProjector::new(config.projection)?;
        Ok(Self { ephemeris, config, projector })
    }

    pub const fn config(&self) -> &ShadowConfig {
        &self.config
    }

    pub const fn projector(&self) -> &CoordinateProjector {
        &self.projector
    }

    pub const fn ephemeris(&self) -> &E {
        &self.ephemeris
    }

    /// Apply the ground offset and height filter of the configuration.
    pub fn prepare(&self, buildings: &[Building]) -> Result<Vec<Building>> {
        prepare_buildings(buildings, self.config.ground, self.config.strict_heights)
    }

    fn scene(&self, buildings: Vec<Building>) -> Result<Option<PreparedScene>> {
        let Some((lon, lat)) = reference_location(&buildings) else {
            return Ok(None);
        };
        let walls = WallTable::extract(&buildings);
        let metric_walls = walls.with_coords(self.projector.to_metric(&walls.coords)?);
        Ok(Some(PreparedScene { buildings, walls, metric_walls, lon, lat }))
    }

    fn cast_scene(&self, scene: &PreparedScene, timestamp: DateTime<Utc>) -> Result<ShadowTable> {
        let sun = self.ephemeris.position(timestamp, scene.lon, scene.lat)?;
        let metric = cast_shadows(scene.metric_walls.coords.view(), scene.metric_walls.heights.view(), &sun)?;
        let quads = self.projector.to_geographic(&metric)?;
        Ok(self.config.assembler().assemble(&scene.buildings, &scene.walls, &quads, timestamp))
    }

    /// Shadows of all buildings at one instant.
    ///
    /// An empty (or fully filtered) building set gives an empty table. Fails
    /// with [`crate::errors::ShadowError::SunBelowHorizon`] at night.
    pub fn shadows_at(&self, buildings: &[Building], timestamp: DateTime<Utc>) -> Result<ShadowTable> {
        match self.scene(self.prepare(buildings)?)? {
            Some(scene) => self.cast_scene(&scene, timestamp),
            None => Ok(ShadowTable::new()),
        }
    }

    /// Sample timestamps for `dates`, with sunrise/sunset looked up at the min
    /// corner of the first building's bounds. The building does not need to
    /// cast a shadow itself.
    pub fn timetable(&self, buildings: &[Building], dates: &[NaiveDate], step_seconds: i64, padding_seconds: i64) -> Result<Timetable> {
        check_sampling(step_seconds, padding_seconds)?;
        match timetable_location(buildings) {
            Some((lon, lat)) => Timetable::build(&self.ephemeris, lon, lat, dates, step_seconds, padding_seconds),
            None => Ok(Timetable::from_timestamps(&[], step_seconds)),
        }
    }

    /// Shadows for every sampled timestamp of `dates`, serially, without cache.
    pub fn run(&self, buildings: &[Building], dates: &[NaiveDate], step_seconds: i64, padding_seconds: i64) -> Result<ShadowTable> {
        self.run_with(buildings, dates, step_seconds, padding_seconds, &SerialTimeSeries, RunContext::default())
    }

    /// Like [`Self::run`] with an explicit executor, cache and progress observer.
    ///
    /// Any failing timestamp aborts the run; the returned error carries that
    /// timestamp (see [`crate::errors::ShadowError::AtTimestamp`]).
    pub fn run_with<O: TimeSeriesOps>(
        &self,
        buildings: &[Building],
        dates: &[NaiveDate],
        step_seconds: i64,
        padding_seconds: i64,
        ops: &O,
        ctx: RunContext<'_>,
    ) -> Result<ShadowTable> {
        check_sampling(step_seconds, padding_seconds)?;
        let prepared = self.prepare(buildings)?;
        if prepared.is_empty() {
            return self.run_timetable(prepared, &Timetable::from_timestamps(&[], step_seconds), ops, ctx);
        }
        let timetable = self.timetable(buildings, dates, step_seconds, padding_seconds)?;
        self.run_timetable(prepared, &timetable, ops, ctx)
    }

    /// Shadows for every entry of an existing timetable.
    pub fn run_timetable<O: TimeSeriesOps>(
        &self,
        prepared: Vec<Building>,
        timetable: &Timetable,
        ops: &O,
        ctx: RunContext<'_>,
    ) -> Result<ShadowTable> {
        let Some(scene) = self.scene(prepared)? else {
            ctx.progress.on_event(&ProgressEvent::RunStarted { timestamps: 0 });
            ctx.progress.on_event(&ProgressEvent::RunFinished { records: 0 });
            return Ok(ShadowTable::new());
        };

        ctx.progress.on_event(&ProgressEvent::RunStarted { timestamps: timetable.len() });
        tracing::debug!(area = ctx.area, timestamps = timetable.len(), walls = scene.walls.len(), "casting shadows");
        let layers = ops.evaluate(timetable.entries(), |index, entry| {
            self.layer(&scene, index, entry, &ctx).map_err(|e| {
                tracing::warn!(area = ctx.area, label = %entry.label, error = %e, "shadow layer failed");
                e.at(entry.timestamp)
            })
        })?;

        let mut table = ShadowTable::new();
        for layer in layers {
            table.append(layer);
        }
        ctx.progress.on_event(&ProgressEvent::RunFinished { records: table.len() });
        Ok(table)
    }

    fn layer(&self, scene: &PreparedScene, index: usize, entry: &TimetableEntry, ctx: &RunContext<'_>) -> Result<ShadowTable> {
        let timestamp = entry.timestamp;
        ctx.progress.on_event(&ProgressEvent::TimestampStarted { index, timestamp });

        let key = CacheKey::new(ctx.area, entry.label.clone());
        if let Some(cache) = ctx.cache {
            if let Some(hit) = cache.get(&key)? {
                tracing::debug!(area = ctx.area, label = %entry.label, records = hit.len(), "shadow layer served from cache");
                ctx.progress.on_event(&ProgressEvent::TimestampFinished { index, timestamp, records: hit.len(), cached: true });
                return Ok(hit);
            }
        }

        let layer = self.cast_scene(scene, timestamp)?;
        if let Some(cache) = ctx.cache {
            cache.put(key, &layer)?;
        }
        ctx.progress.on_event(&ProgressEvent::TimestampFinished { index, timestamp, records: layer.len(), cached: false });
        Ok(layer)
    }
}
