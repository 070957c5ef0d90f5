use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::Result;
use crate::scene::{DateWindow, SceneCollection, SceneQuery};

use super::{CancelToken, SceneSource};

/// Cache key: region, date window and cloud-cover threshold.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub region: String,
    pub window: DateWindow,
    /// `f32::to_bits` of the cloud-cover limit.
    pub max_cloud_bits: u32,
}

impl From<&SceneQuery> for CacheKey {
    fn from(q: &SceneQuery) -> Self {
        Self {
            region: q.region.clone(),
            window: q.window,
            max_cloud_bits: q.max_cloud_cover_pct.to_bits(),
        }
    }
}

/// Memoizes collections from an inner source.
///
/// Only completed queries are stored: a cancelled or failed query leaves the
/// cache untouched. Eviction is left to the owner via [`CachedSource::clear`]
/// and [`CachedSource::evict`].
pub struct CachedSource<S> {
    inner: S,
    entries: RwLock<HashMap<CacheKey, SceneCollection>>,
}

impl<S: SceneSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn contains(&self, query: &SceneQuery) -> bool {
        self.entries.read().contains_key(&CacheKey::from(query))
    }

    pub fn evict(&self, query: &SceneQuery) -> Option<SceneCollection> {
        self.entries.write().remove(&CacheKey::from(query))
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: SceneSource> SceneSource for CachedSource<S> {
    fn query(&self, query: &SceneQuery, cancel: &CancelToken) -> Result<SceneCollection> {
        let key = CacheKey::from(query);
        if let Some(hit) = self.entries.read().get(&key) {
            debug!(region = %query.region, window = %query.window, "Scene cache hit");
            return Ok(hit.clone());
        }

        // The lock is not held while the inner source runs.
        let collection = self.inner.query(query, cancel)?;
        cancel.check()?;
        self.entries.write().insert(key, collection.clone());
        Ok(collection)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
