use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_BARE_THRESHOLD, DEFAULT_FOREST_THRESHOLD, DEFAULT_MIN_PATCH_SIZE};
use crate::error::{CanopyError, Result};

/// Pixel neighbourhood used when grouping alert pixels into patches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Connectivity {
    /// Orthogonal neighbours only.
    Four,
    /// Orthogonal and diagonal neighbours.
    #[default]
    Eight,
}

impl TryFrom<u8> for Connectivity {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            4 => Ok(Self::Four),
            8 => Ok(Self::Eight),
            other => Err(format!("connectivity must be 4 or 8, got {other}")),
        }
    }
}

impl From<Connectivity> for u8 {
    fn from(c: Connectivity) -> u8 {
        match c {
            Connectivity::Four => 4,
            Connectivity::Eight => 8,
        }
    }
}

impl std::fmt::Display for Connectivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-connected", u8::from(*self))
    }
}

/// Thresholds and cleanup parameters for turning two composites into alerts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Baseline index must be strictly above this ("was forest").
    #[serde(default = "default_forest_threshold")]
    pub forest_threshold: f32,
    /// Current index must be strictly below this ("is bare").
    #[serde(default = "default_bare_threshold")]
    pub bare_threshold: f32,
    /// Baseline minus current must be strictly above this, when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_drop: Option<f32>,
    /// Square erosion half-width applied before patch counting. 0 disables.
    #[serde(default)]
    pub erosion_radius: usize,
    #[serde(default)]
    pub connectivity: Connectivity,
    /// Patches with fewer pixels are discarded.
    #[serde(default = "default_min_patch_size")]
    pub min_patch_size: usize,
    /// Reported patch sizes saturate at this count. Filtering always uses the
    /// exact size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_patch_count: Option<usize>,
}

fn default_forest_threshold() -> f32 {
    DEFAULT_FOREST_THRESHOLD
}
fn default_bare_threshold() -> f32 {
    DEFAULT_BARE_THRESHOLD
}
fn default_min_patch_size() -> usize {
    DEFAULT_MIN_PATCH_SIZE
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            forest_threshold: DEFAULT_FOREST_THRESHOLD,
            bare_threshold: DEFAULT_BARE_THRESHOLD,
            min_drop: None,
            erosion_radius: 0,
            connectivity: Connectivity::default(),
            min_patch_size: DEFAULT_MIN_PATCH_SIZE,
            max_patch_count: None,
        }
    }
}

impl ThresholdConfig {
    /// Reject out-of-range values before any raster work starts.
    pub fn validate(&self) -> Result<()> {
        check_unit("forest_threshold", self.forest_threshold)?;
        check_unit("bare_threshold", self.bare_threshold)?;
        if let Some(drop) = self.min_drop {
            if !drop.is_finite() || !(0.0..=2.0).contains(&drop) {
                return Err(CanopyError::InvalidConfig(format!(
                    "min_drop must be in [0, 2], got {drop}"
                )));
            }
        }
        if self.min_patch_size == 0 {
            return Err(CanopyError::InvalidConfig(
                "min_patch_size must be greater than 0".into(),
            ));
        }
        if let Some(cap) = self.max_patch_count {
            if cap < self.min_patch_size {
                return Err(CanopyError::InvalidConfig(format!(
                    "max_patch_count ({cap}) must be at least min_patch_size ({})",
                    self.min_patch_size
                )));
            }
        }
        Ok(())
    }
}

fn check_unit(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(CanopyError::InvalidConfig(format!(
            "{name} must be in [0, 1], got {value}"
        )))
    }
}
