//! Run configuration.

use crate::errors::Result;
use crate::float_types::{MIN_PADDING_SECONDS, Real};
use crate::projection::ProjectionStrategy;
use crate::shadow::ShadowAssembler;
use serde::{Deserialize, Serialize};

/// Settings shared by single-timestamp and time-series shadow runs.
///
/// Every field has a default, so a JSON document only needs the keys it changes:
/// ```
/// let cfg = shadowrs::config::ShadowConfig::from_json(r#"{ "ground": 2.5, "merge_by_building": true }"#).unwrap();
/// assert_eq!(cfg.step_seconds, 3600);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    /// Ground height subtracted from every building height.
    pub ground: Real,
    /// Emit roof records.
    pub roof: bool,
    /// Union wall shadows per building.
    pub merge_by_building: bool,
    /// Merged ground shadows include the footprint.
    pub include_building: bool,
    /// Reject buildings with non-positive height instead of dropping them.
    pub strict_heights: bool,
    pub projection: ProjectionStrategy,
    /// Time between samples.
    pub step_seconds: i64,
    /// Distance of the first and last sample from sunrise and sunset.
    pub padding_seconds: i64,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            ground: 0.0,
            roof: true,
            merge_by_building: false,
            include_building: true,
            strict_heights: false,
            projection: ProjectionStrategy::default(),
            step_seconds: 3600,
            padding_seconds: MIN_PADDING_SECONDS,
        }
    }
}

impl ShadowConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub const fn assembler(&self) -> ShadowAssembler {
        ShadowAssembler::new(self.roof, self.merge_by_building).include_building(self.include_building)
    }
}
