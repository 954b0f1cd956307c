//! Shadow records and the shadow table accumulated over a run.

use crate::building::BuildingId;
use crate::float_types::Real;
use crate::geometry::{repair, union_all};
use chrono::{DateTime, Utc};
use geo::MultiPolygon;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod assembler;
pub mod caster;
pub mod walls;

pub use assembler::ShadowAssembler;
pub use caster::cast_shadows;
pub use walls::WallTable;

/// Whether a record covers a roof (the building's own footprint) or the ground.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadowKind {
    Roof,
    Ground,
}

impl ShadowKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ShadowKind::Roof => "roof",
            ShadowKind::Ground => "ground",
        }
    }
}

impl std::fmt::Display for ShadowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One shadow geometry in geographic coordinates.
///
/// Unmerged ground records hold a single 5-vertex quadrilateral per wall.
#[derive(Clone, Debug, PartialEq)]
pub struct ShadowRecord {
    pub building_id: BuildingId,
    pub kind: ShadowKind,
    pub timestamp: DateTime<Utc>,
    pub geometry: MultiPolygon<Real>,
}

/// Shadow records across one or many timestamps.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShadowTable {
    records: Vec<ShadowRecord>,
}

impl ShadowTable {
    pub const fn new() -> Self {
        Self { records: Vec::new() }
    }

    pub fn from_records(records: Vec<ShadowRecord>) -> Self {
        Self { records }
    }

    pub fn push(&mut self, record: ShadowRecord) {
        self.records.push(record);
    }

    /// Append another table's records after this table's.
    pub fn append(&mut self, other: ShadowTable) {
        self.records.extend(other.records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ShadowRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ShadowRecord> {
        self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShadowRecord> {
        self.records.iter()
    }

    pub fn of_kind(&self, kind: ShadowKind) -> impl Iterator<Item = &ShadowRecord> {
        self.records.iter().filter(move |r| r.kind == kind)
    }

    /// Distinct timestamps in ascending order.
    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        let mut ts: Vec<_> = self.records.iter().map(|r| r.timestamp).collect();
        ts.sort_unstable();
        ts.dedup();
        ts
    }

    /// Union all records of `kind` per timestamp.
    pub fn union_by_timestamp(&self, kind: ShadowKind) -> BTreeMap<DateTime<Utc>, MultiPolygon<Real>> {
        let mut groups: HashMap<DateTime<Utc>, Vec<MultiPolygon<Real>>> = HashMap::new();
        for record in self.of_kind(kind) {
            groups.entry(record.timestamp).or_default().push(record.geometry.clone());
        }
        groups
            .into_iter()
            .map(|(t, shapes)| (t, repair(&union_all(shapes.into_iter().flat_map(|mp| mp.0)))))
            .collect()
    }
}

impl IntoIterator for ShadowTable {
    type Item = ShadowRecord;
    type IntoIter = std::vec::IntoIter<ShadowRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl FromIterator<ShadowRecord> for ShadowTable {
    fn from_iter<I: IntoIterator<Item = ShadowRecord>>(iter: I) -> Self {
        Self { records: iter.into_iter().collect() }
    }
}

impl Extend<ShadowRecord> for ShadowTable {
    fn extend<I: IntoIterator<Item = ShadowRecord>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}
