use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};

use crate::consts::{NDVI_BAND, NIR_BAND, RED_BAND};
use crate::error::{CanopyError, Result};
use crate::raster::Raster;

/// Band pair and output name of a normalized difference index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexBands {
    /// Minuend band (near-infrared for NDVI).
    pub positive: String,
    /// Subtrahend band (red for NDVI).
    pub negative: String,
    pub name: String,
}

impl Default for IndexBands {
    fn default() -> Self {
        Self {
            positive: NIR_BAND.to_string(),
            negative: RED_BAND.to_string(),
            name: NDVI_BAND.to_string(),
        }
    }
}

impl IndexBands {
    pub fn validate(&self) -> Result<()> {
        if self.positive == self.negative {
            return Err(CanopyError::InvalidConfig(format!(
                "index {} uses band {} on both sides",
                self.name, self.positive
            )));
        }
        if self.name.is_empty() {
            return Err(CanopyError::InvalidConfig("index band must be named".into()));
        }
        Ok(())
    }
}

/// Append the normalized difference `(A - B) / (A + B)` as band `name`.
///
/// Pixels where either input is invalid, the denominator is zero, or the
/// quotient is not finite become invalid. Since validity is shared by all
/// bands, those pixels are invalid for the whole output raster.
pub fn normalized_difference(
    raster: &Raster,
    band_a: &str,
    band_b: &str,
    name: &str,
) -> Result<Raster> {
    let a = raster.band(band_a)?;
    let b = raster.band(band_b)?;

    let mut index = Array2::<f32>::zeros(raster.dim());
    let mut valid = raster.valid().clone();

    Zip::from(&mut index)
        .and(&mut valid)
        .and(a)
        .and(b)
        .for_each(|out, v, &a, &b| {
            if !*v {
                return;
            }
            let sum = a + b;
            if sum == 0.0 {
                *v = false;
                return;
            }
            let nd = (a - b) / sum;
            if nd.is_finite() {
                *out = nd;
            } else {
                *v = false;
            }
        });

    let mut out = raster.clone();
    out.restrict(&valid)?;
    out.push_band(name, index)?;
    Ok(out)
}

/// NDVI from near-infrared (B8) and red (B4).
pub fn ndvi(raster: &Raster) -> Result<Raster> {
    normalized_difference(raster, NIR_BAND, RED_BAND, NDVI_BAND)
}
