use crate::error::Result;
use crate::scene::{Scene, SceneCollection, SceneQuery};

use super::{CancelToken, SceneSource};

/// Scenes held in memory. Applies the full query filter on every call.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    scenes: Vec<Scene>,
}

impl MemorySource {
    pub fn new(scenes: Vec<Scene>) -> Self {
        Self { scenes }
    }

    pub fn push(&mut self, scene: Scene) {
        self.scenes.push(scene);
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

impl SceneSource for MemorySource {
    fn query(&self, query: &SceneQuery, cancel: &CancelToken) -> Result<SceneCollection> {
        cancel.check()?;
        Ok(SceneCollection::from_query(query, &self.scenes))
    }

    fn name(&self) -> &str {
        "memory"
    }
}
