use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::consts::QA_BAND;
use crate::error::{CanopyError, Result};
use crate::geo::GeoTransform;

/// Index of a scene directory (`scenes.toml`).
///
/// ```toml
/// crs = "EPSG:32722"
/// nodata = 0
///
/// [[scenes]]
/// id = "S2B_20240915"
/// date = "2024-09-15"
/// cloud_cover_pct = 12.5
/// transform = { origin_x = 600000.0, origin_y = 7200000.0, pixel_width = 10.0, pixel_height = -10.0 }
/// bands = { B2 = "S2B_20240915/B2.tif", B4 = "S2B_20240915/B4.tif", B8 = "S2B_20240915/B8.tif", QA60 = "S2B_20240915/QA60.tif" }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SceneManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<String>,
    /// Digital number marking missing data in spectral bands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodata: Option<u16>,
    /// Band exempt from the nodata check (its zero means "clear").
    #[serde(default = "default_qa_band")]
    pub qa_band: String,
    #[serde(default)]
    pub scenes: Vec<SceneEntry>,
}

fn default_qa_band() -> String {
    QA_BAND.to_string()
}

/// One scene: metadata plus one file per band, relative to the manifest.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneEntry {
    pub id: String,
    pub date: NaiveDate,
    pub cloud_cover_pct: f32,
    pub transform: GeoTransform,
    pub bands: BTreeMap<String, PathBuf>,
}

impl SceneManifest {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let manifest: SceneManifest =
            toml::from_str(contents).map_err(|e| CanopyError::InvalidManifest(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CanopyError::InvalidManifest(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        for scene in &self.scenes {
            if scene.bands.is_empty() {
                return Err(CanopyError::InvalidManifest(format!(
                    "scene {} lists no bands",
                    scene.id
                )));
            }
            if !(0.0..=100.0).contains(&scene.cloud_cover_pct) {
                return Err(CanopyError::InvalidManifest(format!(
                    "scene {} cloud cover {} outside [0, 100]",
                    scene.id, scene.cloud_cover_pct
                )));
            }
        }
        Ok(())
    }
}
