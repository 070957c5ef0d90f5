use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CanopyError, Result};
use crate::geo::BoundingBox;
use crate::raster::Raster;

/// Half-open calendar window `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end <= start {
            return Err(CanopyError::InvalidConfig(format!(
                "date window end {end} must be after start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Window of `months` calendar months ending (exclusively) at `end`.
    pub fn lookback(end: NaiveDate, months: u32) -> Result<Self> {
        let start = end.checked_sub_months(Months::new(months)).ok_or_else(|| {
            CanopyError::InvalidConfig(format!("cannot look back {months} months from {end}"))
        })?;
        Self::new(start, end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

/// One acquisition of raw digital numbers.
#[derive(Clone, Debug)]
pub struct Scene {
    pub id: String,
    pub date: NaiveDate,
    /// Tile-level cloudy pixel percentage reported by the provider.
    pub cloud_cover_pct: f32,
    /// Footprint in the raster's coordinate reference.
    pub footprint: BoundingBox,
    pub raster: Raster,
}

impl Scene {
    /// Scene whose footprint is the raster's own extent.
    pub fn new(id: impl Into<String>, date: NaiveDate, cloud_cover_pct: f32, raster: Raster) -> Self {
        let footprint = raster.transform.bounds(raster.height(), raster.width());
        Self {
            id: id.into(),
            date,
            cloud_cover_pct,
            footprint,
            raster,
        }
    }
}

/// Filter applied by every scene source.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneQuery {
    /// Region name, used for logging and cache keys.
    pub region: String,
    pub bounds: BoundingBox,
    pub window: DateWindow,
    pub max_cloud_cover_pct: f32,
}

impl SceneQuery {
    /// True if `scene` passes the date, bounds and cloud-cover filters.
    /// Cloud cover must be strictly below the limit.
    pub fn accepts(&self, scene: &Scene) -> bool {
        self.window.contains(scene.date)
            && scene.footprint.intersects(&self.bounds)
            && scene.cloud_cover_pct < self.max_cloud_cover_pct
    }
}

/// Date-ordered scenes that passed a [`SceneQuery`].
#[derive(Clone, Debug)]
pub struct SceneCollection {
    pub region: String,
    scenes: Vec<Scene>,
}

impl SceneCollection {
    /// Collection sorted by acquisition date (stable for equal dates).
    pub fn new(region: impl Into<String>, mut scenes: Vec<Scene>) -> Self {
        scenes.sort_by_key(|s| s.date);
        Self {
            region: region.into(),
            scenes,
        }
    }

    pub fn empty(region: impl Into<String>) -> Self {
        Self::new(region, Vec::new())
    }

    /// Apply `query` to a set of candidate scenes.
    pub fn from_query<'a>(query: &SceneQuery, candidates: impl IntoIterator<Item = &'a Scene>) -> Self {
        let scenes = candidates
            .into_iter()
            .filter(|s| query.accepts(s))
            .cloned()
            .collect();
        Self::new(query.region.clone(), scenes)
    }

    /// Scenes whose date falls inside `window`.
    pub fn in_window(&self, window: &DateWindow) -> impl Iterator<Item = &Scene> {
        let window = *window;
        self.scenes.iter().filter(move |s| window.contains(s.date))
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}
