//! Validation and runtime errors

use crate::building::BuildingId;
use crate::float_types::Real;
use chrono::{DateTime, NaiveDate, Utc};
use geo::Coord;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ShadowError>;

/// All the possible footprint validation issues we might encounter
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// (TooFewPoints) A footprint ring has fewer than the minimal #points
    #[error("(TooFewPoints) A footprint ring needs at least 4 coordinates (closing one included), got {count}")]
    TooFewPoints { count: usize },
    /// (InvalidCoordinate) The coordinate has a NaN or infinite
    #[error("(InvalidCoordinate) The coordinate ({x}, {y}) has a NaN or infinite", x = .0.x, y = .0.y)]
    InvalidCoordinate(Coord<Real>),
    /// (InvalidHeight) The height is NaN or infinite
    #[error("(InvalidHeight) The height {0} is not finite")]
    InvalidHeight(Real),
}

/// Failures of the sun ephemeris.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EphemerisError {
    /// The sun never crosses the horizon on that date (polar day or polar night).
    #[error("no sunrise/sunset on {date} at ({lon}, {lat})")]
    NoSunriseSunset { date: NaiveDate, lon: Real, lat: Real },
    /// Longitude/latitude outside the valid range or not finite.
    #[error("invalid location ({lon}, {lat})")]
    InvalidLocation { lon: Real, lat: Real },
    /// An instant could not be represented.
    #[error("instant out of range: {0}")]
    OutOfRange(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ShadowError {
    /// Padding between sunrise/sunset and the first/last sample is too small.
    #[error("padding of {padding}s is below the {minimum}s minimum")]
    InsufficientPadding { padding: i64, minimum: i64 },
    /// Sampling step must be positive.
    #[error("time step must be positive, got {0}s")]
    InvalidStep(i64),
    /// Grid cell size must be positive and finite.
    #[error("grid cell size must be positive, got {0}")]
    InvalidCellSize(Real),
    /// A building is not taller than the ground offset (strict mode only).
    #[error("building {building_id} has non-positive height {height} after ground offset")]
    NonPositiveHeight { building_id: BuildingId, height: Real },
    /// A building footprint is malformed.
    #[error("building {building_id} has an invalid footprint: {source}")]
    InvalidFootprint {
        building_id: BuildingId,
        #[source]
        source: ValidationError,
    },
    /// The sun is at or below the horizon, so no finite shadow exists.
    #[error("sun altitude {altitude} rad is not above the horizon")]
    SunBelowHorizon { altitude: Real },
    /// A date string could not be parsed as `YYYY-MM-DD`.
    #[error("invalid date '{0}'")]
    InvalidDate(String),
    /// The projection has no implementation for this EPSG code.
    #[error("unsupported EPSG code {0}")]
    UnsupportedCrs(u32),
    /// The CRS definition of a known EPSG code could not be parsed.
    #[error("EPSG:{code}: {message}")]
    Crs { code: u32, message: String },
    /// A coordinate lies outside the domain of the projection.
    #[error("coordinate ({x}, {y}) outside the projection domain")]
    ProjectionDomain { x: Real, y: Real },
    /// Coordinate arrays must have a trailing axis of length 2.
    #[error("coordinate array must end in an axis of length 2, got shape {0:?}")]
    CoordinateShape(Vec<usize>),
    /// Coverage needs a study area: neither buildings nor explicit bounds were given.
    #[error("study area is empty")]
    EmptyStudyArea,
    /// Shadow layer cache failure.
    #[error("shadow cache: {0}")]
    Cache(String),
    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    /// Sun ephemeris failure.
    #[error(transparent)]
    Ephemeris(#[from] EphemerisError),
    /// Failure while processing one sampled timestamp of a time series.
    #[error("at {timestamp}: {source}")]
    AtTimestamp {
        timestamp: DateTime<Utc>,
        #[source]
        source: Box<ShadowError>,
    },
}

impl ShadowError {
    /// Attach the timestamp being processed, unless one is already attached.
    pub fn at(self, timestamp: DateTime<Utc>) -> Self {
        match self {
            ShadowError::AtTimestamp { .. } => self,
            other => ShadowError::AtTimestamp { timestamp, source: Box::new(other) },
        }
    }

    /// The innermost error, skipping timestamp context.
    pub fn root(&self) -> &ShadowError {
        match self {
            ShadowError::AtTimestamp { source, .. } => source.root(),
            other => other,
        }
    }
}
