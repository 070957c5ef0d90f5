use ndarray::{Array2, Zip};

use crate::consts::NDVI_BAND;
use crate::error::{CanopyError, Result};
use crate::raster::Raster;

use super::config::ThresholdConfig;

/// Candidate change mask from the NDVI bands of two composites.
pub fn classify(baseline: &Raster, current: &Raster, config: &ThresholdConfig) -> Result<Array2<bool>> {
    classify_band(baseline, current, NDVI_BAND, config)
}

/// Candidate change mask from an arbitrary index band.
///
/// A pixel is flagged only where it is valid in both rasters and every
/// enabled predicate holds: baseline above the forest threshold, current
/// below the bare threshold and, if configured, a drop above `min_drop`.
pub fn classify_band(
    baseline: &Raster,
    current: &Raster,
    band: &str,
    config: &ThresholdConfig,
) -> Result<Array2<bool>> {
    if baseline.dim() != current.dim() {
        return Err(CanopyError::InvalidDimensions {
            expected: baseline.dim(),
            actual: current.dim(),
        });
    }
    let before = baseline.band(band)?;
    let after = current.band(band)?;

    let mut out = Array2::from_elem(baseline.dim(), false);
    Zip::from(&mut out)
        .and(before)
        .and(after)
        .and(baseline.valid())
        .and(current.valid())
        .for_each(|o, &b, &c, &vb, &vc| {
            *o = vb && vc && is_candidate(b, c, config);
        });
    Ok(out)
}

fn is_candidate(baseline: f32, current: f32, config: &ThresholdConfig) -> bool {
    let was_forest = baseline > config.forest_threshold;
    let is_bare = current < config.bare_threshold;
    let large_drop = config
        .min_drop
        .map_or(true, |drop| baseline - current > drop);
    was_forest && is_bare && large_drop
}
