use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::consts::{BLUE_BAND, GREEN_BAND, NIR_BAND, RED_BAND};
use crate::error::{CanopyError, Result};
use crate::geo::AnalysisGrid;
use crate::imagery::cloud::{mask_clouds, CloudMaskConfig};
use crate::imagery::index::{normalized_difference, IndexBands};
use crate::raster::Raster;
use crate::region::Region;
use crate::scene::{DateWindow, Scene, SceneCollection};

use super::median::median_composite;

/// Per-pixel statistic used to collapse a scene stack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reducer {
    #[default]
    Median,
}

impl std::fmt::Display for Reducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Median => write!(f, "Median"),
        }
    }
}

/// Where a composite came from.
#[derive(Clone, Debug, PartialEq)]
pub struct Provenance {
    pub window: DateWindow,
    pub region: String,
    pub reducer: Reducer,
    /// Scenes that contributed to the reduction.
    pub scene_count: usize,
    /// Scenes dropped for missing bands.
    pub dropped_scenes: usize,
}

/// One representative image for a region and date window.
#[derive(Clone, Debug)]
pub struct CompositeImage {
    pub raster: Raster,
    pub provenance: Provenance,
}

impl CompositeImage {
    /// True if no scene contributed, or nothing valid survived clipping.
    pub fn is_no_data(&self) -> bool {
        self.provenance.scene_count == 0 || self.raster.is_no_data()
    }

    pub fn band(&self, name: &str) -> Result<&Array2<f32>> {
        self.raster.band(name)
    }
}

/// Bands carried into the composite and how the vegetation index is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompositeConfig {
    #[serde(default)]
    pub cloud_mask: CloudMaskConfig,
    #[serde(default)]
    pub index: IndexBands,
    /// Spectral bands reduced alongside the index (for true-colour display).
    #[serde(default = "default_spectral_bands")]
    pub spectral_bands: Vec<String>,
    #[serde(default)]
    pub reducer: Reducer,
}

fn default_spectral_bands() -> Vec<String> {
    [BLUE_BAND, GREEN_BAND, RED_BAND, NIR_BAND]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            cloud_mask: CloudMaskConfig::default(),
            index: IndexBands::default(),
            spectral_bands: default_spectral_bands(),
            reducer: Reducer::default(),
        }
    }
}

impl CompositeConfig {
    pub fn validate(&self) -> Result<()> {
        self.cloud_mask.validate()?;
        self.index.validate()
    }

    /// Output band names: spectral bands followed by the index band.
    pub fn output_bands(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.spectral_bands.iter().map(String::as_str).collect();
        if !names.contains(&self.index.name.as_str()) {
            names.push(self.index.name.as_str());
        }
        names
    }
}

/// Reduce the scenes of `collection` that fall inside `window` to one image.
///
/// Each scene is cloud-masked, gets the vegetation index band, and is resampled
/// onto `grid`. Scenes missing a required band are dropped with a warning.
/// The per-pixel median uses only valid observations; the result is clipped
/// to `region`. An empty window gives a fully invalid composite, not an error.
pub fn composite(
    collection: &SceneCollection,
    window: &DateWindow,
    region: &Region,
    grid: &AnalysisGrid,
    config: &CompositeConfig,
) -> Result<CompositeImage> {
    config.validate()?;
    let scenes: Vec<&Scene> = collection.in_window(window).collect();
    let bands = config.output_bands();

    let prepared: Vec<Option<Raster>> = scenes
        .par_iter()
        .map(|scene| prepare_scene(scene, grid, config, &bands))
        .collect::<Result<_>>()?;
    let dropped = prepared.iter().filter(|p| p.is_none()).count();
    let rasters: Vec<Raster> = prepared.into_iter().flatten().collect();

    let provenance = Provenance {
        window: *window,
        region: region.name.clone(),
        reducer: config.reducer,
        scene_count: rasters.len(),
        dropped_scenes: dropped,
    };

    if rasters.is_empty() {
        warn!(
            region = %region.name,
            window = %window,
            dropped,
            "No usable scenes in window, composite is empty"
        );
        return Ok(CompositeImage {
            raster: Raster::no_data(grid, &bands),
            provenance,
        });
    }

    let mut raster = match config.reducer {
        Reducer::Median => median_composite(&rasters, &bands)?,
    };
    raster.restrict(&region.mask_for(grid))?;

    info!(
        region = %region.name,
        window = %window,
        scenes = rasters.len(),
        dropped,
        valid_pixels = raster.valid_count(),
        "Composite complete"
    );

    Ok(CompositeImage { raster, provenance })
}

/// Cloud mask, index, band selection and resampling for one scene.
/// `Ok(None)` means the scene lacks a required band and is skipped.
fn prepare_scene(
    scene: &Scene,
    grid: &AnalysisGrid,
    config: &CompositeConfig,
    bands: &[&str],
) -> Result<Option<Raster>> {
    let prepared = mask_clouds(scene, &config.cloud_mask)
        .and_then(|masked| {
            normalized_difference(
                &masked,
                &config.index.positive,
                &config.index.negative,
                &config.index.name,
            )
        })
        .and_then(|indexed| indexed.select(bands));

    match prepared {
        Ok(raster) => {
            debug!(
                scene = %scene.id,
                date = %scene.date,
                clear_pixels = raster.valid_count(),
                "Scene prepared"
            );
            Ok(Some(raster.resample_to(grid)))
        }
        Err(CanopyError::MissingBand { band, .. }) => {
            warn!(scene = %scene.id, band = %band, "Dropping scene with missing band");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
