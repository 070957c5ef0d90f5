use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::composite::CompositeConfig;
use crate::consts::{
    DEFAULT_BARE_THRESHOLD, DEFAULT_FETCH_WORKERS, DEFAULT_FOREST_THRESHOLD,
    DEFAULT_MAX_CLOUD_COVER_PCT, DEFAULT_MAX_PATCH_COUNT, DEFAULT_MIN_PATCH_SIZE,
};
use crate::detection::{Connectivity, ThresholdConfig};
use crate::display::DisplayHints;
use crate::error::{CanopyError, Result};
use crate::geo::AnalysisGrid;
use crate::scene::DateWindow;
use crate::source::RetryPolicy;

/// Scene filtering and fetch behaviour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneFilterConfig {
    /// Scenes must report strictly less cloud cover than this percentage.
    #[serde(default = "default_max_cloud_cover_pct")]
    pub max_cloud_cover_pct: f32,
    /// Threads used to fetch the two windows.
    #[serde(default = "default_fetch_workers")]
    pub fetch_workers: usize,
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_max_cloud_cover_pct() -> f32 {
    DEFAULT_MAX_CLOUD_COVER_PCT
}
fn default_fetch_workers() -> usize {
    DEFAULT_FETCH_WORKERS
}

impl Default for SceneFilterConfig {
    fn default() -> Self {
        Self {
            max_cloud_cover_pct: DEFAULT_MAX_CLOUD_COVER_PCT,
            fetch_workers: DEFAULT_FETCH_WORKERS,
            retry: RetryPolicy::default(),
        }
    }
}

impl SceneFilterConfig {
    pub fn validate(&self) -> Result<()> {
        validate_max_cloud_cover(self.max_cloud_cover_pct)?;
        if self.fetch_workers == 0 {
            return Err(CanopyError::InvalidConfig(
                "fetch_workers must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Cloud-cover limits are percentages in [0, 100].
pub fn validate_max_cloud_cover(pct: f32) -> Result<()> {
    if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
        return Err(CanopyError::InvalidConfig(format!(
            "max_cloud_cover_pct must be in [0, 100], got {pct}"
        )));
    }
    Ok(())
}

/// Grid pixel sizes are positive finite CRS units.
pub fn validate_pixel_size(pixel_size: f64) -> Result<()> {
    if !(pixel_size.is_finite() && pixel_size > 0.0) {
        return Err(CanopyError::InvalidConfig(format!(
            "pixel_size must be positive, got {pixel_size}"
        )));
    }
    Ok(())
}

/// Named parameter sets matching the field-tested alert variants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Season-over-season comparison, small clearings included.
    #[default]
    Standard,
    /// Strict forest and bare thresholds, a required drop, erosion, and
    /// large patches only (~2.5 ha at 10 m).
    LowFalsePositives,
    /// Short windows with cloudier scenes allowed and small parcels kept.
    Monthly,
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "Standard"),
            Self::LowFalsePositives => write!(f, "Low False Positives"),
            Self::Monthly => write!(f, "Monthly"),
        }
    }
}

impl Preset {
    pub fn thresholds(self) -> ThresholdConfig {
        match self {
            Self::Standard => ThresholdConfig {
                forest_threshold: DEFAULT_FOREST_THRESHOLD,
                bare_threshold: DEFAULT_BARE_THRESHOLD,
                min_drop: None,
                erosion_radius: 0,
                connectivity: Connectivity::Eight,
                min_patch_size: DEFAULT_MIN_PATCH_SIZE,
                max_patch_count: Some(DEFAULT_MAX_PATCH_COUNT),
            },
            Self::LowFalsePositives => ThresholdConfig {
                forest_threshold: 0.80,
                bare_threshold: 0.30,
                min_drop: Some(0.40),
                erosion_radius: 1,
                connectivity: Connectivity::Eight,
                min_patch_size: 250,
                max_patch_count: Some(500),
            },
            Self::Monthly => ThresholdConfig {
                forest_threshold: DEFAULT_FOREST_THRESHOLD,
                bare_threshold: DEFAULT_BARE_THRESHOLD,
                min_drop: None,
                erosion_radius: 0,
                connectivity: Connectivity::Eight,
                min_patch_size: 6,
                max_patch_count: Some(50),
            },
        }
    }

    pub fn max_cloud_cover_pct(self) -> f32 {
        match self {
            Self::Standard | Self::LowFalsePositives => DEFAULT_MAX_CLOUD_COVER_PCT,
            Self::Monthly => 50.0,
        }
    }
}

/// Everything one analysis run needs. This is the re-run entry point's
/// parameter bundle: a new region or window means a new request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Region name resolved through the region catalog.
    pub region: String,
    pub baseline: DateWindow,
    pub current: DateWindow,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub scenes: SceneFilterConfig,
    #[serde(default)]
    pub composite: CompositeConfig,
    /// Analysis pixel size in CRS units, used when `grid` is not given.
    #[serde(default = "default_pixel_size")]
    pub pixel_size: f64,
    /// Explicit analysis grid; overrides the region-derived grid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<AnalysisGrid>,
    #[serde(default)]
    pub display: DisplayHints,
}

fn default_pixel_size() -> f64 {
    10.0
}

impl AnalysisRequest {
    pub fn new(region: impl Into<String>, baseline: DateWindow, current: DateWindow) -> Self {
        Self {
            region: region.into(),
            baseline,
            current,
            thresholds: ThresholdConfig::default(),
            scenes: SceneFilterConfig::default(),
            composite: CompositeConfig::default(),
            pixel_size: default_pixel_size(),
            grid: None,
            display: DisplayHints::default(),
        }
    }

    /// Replace thresholds and cloud-cover limit with a preset's values.
    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.thresholds = preset.thresholds();
        self.scenes.max_cloud_cover_pct = preset.max_cloud_cover_pct();
        self
    }

    pub fn with_grid(mut self, grid: AnalysisGrid) -> Self {
        self.grid = Some(grid);
        self
    }

    /// Reject invalid parameters before any data is fetched.
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        self.composite.validate()?;
        self.scenes.validate()?;
        if self.grid.is_none() {
            validate_pixel_size(self.pixel_size)?;
        }
        if let Some(grid) = &self.grid {
            if grid.height == 0 || grid.width == 0 {
                return Err(CanopyError::InvalidConfig("analysis grid is empty".into()));
            }
        }
        for window in [&self.baseline, &self.current] {
            if window.end <= window.start {
                return Err(CanopyError::InvalidConfig(format!(
                    "date window {window} is empty"
                )));
            }
        }
        Ok(())
    }

    /// Example request used by `canopy config`.
    pub fn example() -> Self {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
        Self::new(
            "Parana",
            DateWindow {
                start: date(2024, 9, 1),
                end: date(2025, 2, 5),
            },
            DateWindow {
                start: date(2025, 9, 1),
                end: date(2026, 2, 5),
            },
        )
        .with_preset(Preset::Standard)
    }
}
