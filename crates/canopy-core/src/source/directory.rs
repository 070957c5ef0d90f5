use std::path::{Path, PathBuf};

use ndarray::Zip;
use tracing::{debug, info, warn};

use crate::consts::SCENE_MANIFEST_FILE;
use crate::error::{CanopyError, Result};
use crate::geo::BoundingBox;
use crate::io::image_io::load_band;
use crate::io::manifest::{SceneEntry, SceneManifest};
use crate::raster::Raster;
use crate::scene::{Scene, SceneCollection, SceneQuery};

use super::{CancelToken, SceneSource};

/// Scenes stored on disk as one 16-bit image per band, indexed by a
/// `scenes.toml` manifest. Band pixels are only read for scenes that pass
/// the query filter.
#[derive(Clone, Debug)]
pub struct DirectorySource {
    root: PathBuf,
    manifest: SceneManifest,
}

impl DirectorySource {
    /// Open a scene directory by reading its manifest.
    pub fn open(root: &Path) -> Result<Self> {
        let manifest = SceneManifest::load(&root.join(SCENE_MANIFEST_FILE))?;
        info!(
            root = %root.display(),
            scenes = manifest.scenes.len(),
            "Opened scene directory"
        );
        Ok(Self {
            root: root.to_path_buf(),
            manifest,
        })
    }

    pub fn manifest(&self) -> &SceneManifest {
        &self.manifest
    }

    /// Footprint from the transform and the dimensions of the first band file.
    fn footprint(&self, entry: &SceneEntry) -> Result<BoundingBox> {
        let first = entry
            .bands
            .values()
            .next()
            .ok_or_else(|| CanopyError::InvalidManifest(format!("scene {} lists no bands", entry.id)))?;
        let path = self.root.join(first);
        let (w, h) = image::image_dimensions(&path).map_err(|e| unavailable(&path, e))?;
        Ok(entry.transform.bounds(h as usize, w as usize))
    }

    fn load_scene(&self, entry: &SceneEntry, footprint: BoundingBox) -> Result<Scene> {
        let mut raster: Option<Raster> = None;

        for (name, rel) in &entry.bands {
            let path = self.root.join(rel);
            let data = load_band(&path).map_err(|e| unavailable(&path, e))?;
            let r = raster.get_or_insert_with(|| {
                let (h, w) = data.dim();
                Raster::all_valid(h, w, entry.transform)
            });
            r.push_band(name, data)?;
        }

        let mut raster = raster.ok_or_else(|| {
            CanopyError::InvalidManifest(format!("scene {} lists no bands", entry.id))
        })?;
        if let Some(crs) = &self.manifest.crs {
            raster.crs = Some(crs.clone());
        }
        if let Some(nodata) = self.manifest.nodata {
            let mut valid = raster.valid().clone();
            for band in raster.bands().iter().filter(|b| b.name != self.manifest.qa_band) {
                Zip::from(&mut valid)
                    .and(&band.data)
                    .for_each(|v, &dn| *v = *v && dn != nodata as f32);
            }
            raster.restrict(&valid)?;
        }

        Ok(Scene {
            id: entry.id.clone(),
            date: entry.date,
            cloud_cover_pct: entry.cloud_cover_pct,
            footprint,
            raster,
        })
    }
}

fn unavailable(path: &Path, err: impl std::fmt::Display) -> CanopyError {
    CanopyError::SourceUnavailable(format!("{}: {err}", path.display()))
}

impl SceneSource for DirectorySource {
    fn query(&self, query: &SceneQuery, cancel: &CancelToken) -> Result<SceneCollection> {
        let mut scenes = Vec::new();
        for entry in &self.manifest.scenes {
            cancel.check()?;
            if !query.window.contains(entry.date) || entry.cloud_cover_pct >= query.max_cloud_cover_pct {
                continue;
            }
            let footprint = self.footprint(entry)?;
            if !footprint.intersects(&query.bounds) {
                continue;
            }
            debug!(scene = %entry.id, date = %entry.date, "Loading scene");
            match self.load_scene(entry, footprint) {
                Ok(scene) => scenes.push(scene),
                // Band files that disagree in size spoil only their own scene.
                Err(CanopyError::InvalidDimensions { expected, actual }) => {
                    warn!(
                        scene = %entry.id,
                        expected = ?expected,
                        actual = ?actual,
                        "Dropping scene with mismatched band sizes"
                    );
                }
                Err(e) => return Err(e),
            }
        }
        info!(
            region = %query.region,
            window = %query.window,
            scenes = scenes.len(),
            "Directory query complete"
        );
        Ok(SceneCollection::new(query.region.clone(), scenes))
    }

    fn name(&self) -> &str {
        "directory"
    }
}
