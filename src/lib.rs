//! Building shadows on geographic footprints, and how long each part of a
//! study area stays in them.
//!
//! Buildings are extruded footprints (lon/lat degrees plus a height in metres).
//! For a timestamp, the sun position gives a shadow direction; every wall of
//! every footprint is swept along it in a projected metric CRS, producing one
//! quadrilateral per wall. Quads are projected back to degrees and optionally
//! merged per building. Over a timetable of samples between sunrise and sunset
//! the shadows accumulate into a [`ShadowTable`], which [`coverage::aggregate`]
//! turns into per-cell (or per-face) shadow counts and durations.
//!
//! # Features
//! #### Default
//! - **f64** coordinates throughout (see [`float_types`])
//!
//! #### Optional
//! - **parallel**: evaluate timestamps with rayon and enable multithreaded
//!   boolean ops in `geo`

#![deny(unsafe_code)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod building;
pub mod cache;
pub mod config;
pub mod coverage;
pub mod engine;
pub mod errors;
pub mod float_types;
pub mod geometry;
pub mod grid;
pub mod progress;
pub mod projection;
pub mod shadow;
pub mod sun;
pub mod timeseries;

pub use building::{Building, BuildingId};
pub use config::ShadowConfig;
pub use coverage::{CoverageMode, CoverageRequest, CoverageTable};
pub use engine::{RunContext, ShadowEngine};
pub use errors::{Result, ShadowError};
pub use projection::{CoordinateProjector, ProjectionStrategy};
pub use shadow::{ShadowKind, ShadowRecord, ShadowTable};
pub use sun::{SunCalc, SunEphemeris, SunPosition};
