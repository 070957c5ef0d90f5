use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

use super::Region;

/// Supplies named boundaries (parent regions and their sub-regions) and
/// optional protected-area outlines used to annotate alerts.
pub trait RegionCatalog: Send + Sync {
    fn regions(&self) -> Result<Vec<Region>>;

    fn protected_areas(&self) -> Result<Vec<Region>> {
        Ok(Vec::new())
    }
}

/// Catalog held in memory, loadable from a TOML file.
///
/// Vertices are `[x, y]` in the same projected, metre-based CRS as the scenes
/// (here UTM 22S). Grid pixel sizes and hectare figures are derived from
/// these units, so geographic lon/lat boundaries must be reprojected first.
///
/// ```toml
/// [[regions]]
/// name = "Parana"
/// [[regions.boundary]]
/// exterior = [[180000.0, 7040000.0], [820000.0, 7040000.0], [820000.0, 7510000.0], [180000.0, 7510000.0]]
///
/// [[regions]]
/// name = "Curitiba"
/// parent = "Parana"
/// [[regions.boundary]]
/// exterior = [[660000.0, 7170000.0], [690000.0, 7170000.0], [690000.0, 7200000.0], [660000.0, 7200000.0]]
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StaticCatalog {
    #[serde(default)]
    pub regions: Vec<Region>,
    #[serde(default)]
    pub protected_areas: Vec<Region>,
}

impl StaticCatalog {
    pub fn new(regions: Vec<Region>) -> Self {
        Self {
            regions,
            protected_areas: Vec::new(),
        }
    }

    pub fn with_protected_areas(mut self, areas: Vec<Region>) -> Self {
        self.protected_areas = areas;
        self
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let catalog = Self::from_toml_str(&contents)?;
        debug!(
            path = %path.display(),
            regions = catalog.regions.len(),
            protected = catalog.protected_areas.len(),
            "Loaded region catalog"
        );
        Ok(catalog)
    }
}

impl RegionCatalog for StaticCatalog {
    fn regions(&self) -> Result<Vec<Region>> {
        Ok(self.regions.clone())
    }

    fn protected_areas(&self) -> Result<Vec<Region>> {
        Ok(self.protected_areas.clone())
    }
}
