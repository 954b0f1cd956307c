//! Key-addressed store of already computed shadow layers.

use crate::errors::{Result, ShadowError};
use crate::shadow::ShadowTable;
use hashbrown::HashMap;
use std::sync::RwLock;

/// Identifies one shadow layer: a study area name and a timestamp label.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub area: String,
    pub label: String,
}

impl CacheKey {
    pub fn new(area: impl Into<String>, label: impl Into<String>) -> Self {
        Self { area: area.into(), label: label.into() }
    }
}

/// Storage consulted by the time-series driver before casting a timestamp.
pub trait ShadowCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Result<Option<ShadowTable>>;
    fn put(&self, key: CacheKey, layer: &ShadowTable) -> Result<()>;
}

/// Process-local cache.
#[derive(Debug, Default)]
pub struct InMemoryShadowCache {
    layers: RwLock<HashMap<CacheKey, ShadowTable>>,
}

impl InMemoryShadowCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.layers.read().map(|m| m.len()).unwrap_or_else(|e| e.into_inner().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ShadowCache for InMemoryShadowCache {
    fn get(&self, key: &CacheKey) -> Result<Option<ShadowTable>> {
        let layers = self.layers.read().map_err(|e| ShadowError::Cache(e.to_string()))?;
        Ok(layers.get(key).cloned())
    }

    fn put(&self, key: CacheKey, layer: &ShadowTable) -> Result<()> {
        let mut layers = self.layers.write().map_err(|e| ShadowError::Cache(e.to_string()))?;
        layers.insert(key, layer.clone());
        Ok(())
    }
}
