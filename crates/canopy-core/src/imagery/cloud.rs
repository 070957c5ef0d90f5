use ndarray::Zip;
use serde::{Deserialize, Serialize};

use crate::consts::{QA_BAND, QA_CIRRUS_BIT, QA_CLOUD_BIT, REFLECTANCE_SCALE};
use crate::error::{CanopyError, Result};
use crate::raster::Raster;
use crate::scene::Scene;

/// Which QA bits invalidate a pixel, and how digital numbers map to reflectance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CloudMaskConfig {
    #[serde(default = "default_qa_band")]
    pub qa_band: String,
    #[serde(default = "default_cloud_bit")]
    pub cloud_bit: u8,
    #[serde(default = "default_cirrus_bit")]
    pub cirrus_bit: u8,
    /// Spectral digital numbers are divided by this.
    #[serde(default = "default_reflectance_scale")]
    pub reflectance_scale: f32,
}

fn default_qa_band() -> String {
    QA_BAND.to_string()
}
fn default_cloud_bit() -> u8 {
    QA_CLOUD_BIT
}
fn default_cirrus_bit() -> u8 {
    QA_CIRRUS_BIT
}
fn default_reflectance_scale() -> f32 {
    REFLECTANCE_SCALE
}

impl Default for CloudMaskConfig {
    fn default() -> Self {
        Self {
            qa_band: default_qa_band(),
            cloud_bit: QA_CLOUD_BIT,
            cirrus_bit: QA_CIRRUS_BIT,
            reflectance_scale: REFLECTANCE_SCALE,
        }
    }
}

impl CloudMaskConfig {
    /// Both flag bits must address the 32-bit QA word and the scale must be
    /// a positive finite number.
    pub fn validate(&self) -> Result<()> {
        for (label, bit) in [("cloud_bit", self.cloud_bit), ("cirrus_bit", self.cirrus_bit)] {
            if u32::from(bit) >= u32::BITS {
                return Err(CanopyError::InvalidConfig(format!(
                    "{label} must be below {}, got {bit}",
                    u32::BITS
                )));
            }
        }
        if !(self.reflectance_scale.is_finite() && self.reflectance_scale > 0.0) {
            return Err(CanopyError::InvalidConfig(format!(
                "reflectance_scale must be positive, got {}",
                self.reflectance_scale
            )));
        }
        if self.qa_band.is_empty() {
            return Err(CanopyError::InvalidConfig("qa_band must be named".into()));
        }
        Ok(())
    }

    fn flag_bits(&self) -> u32 {
        let bit = |b: u8| 1u32.checked_shl(u32::from(b)).unwrap_or(0);
        bit(self.cloud_bit) | bit(self.cirrus_bit)
    }

    /// True if the QA word has neither the cloud nor the cirrus bit set.
    pub fn is_clear(&self, qa: u32) -> bool {
        qa & self.flag_bits() == 0
    }
}

/// Invalidate cloudy and cirrus pixels and rescale spectral bands to reflectance.
///
/// The QA band is consumed: the output holds only the spectral bands, divided
/// by the reflectance scale. Pixels already invalid in the scene stay invalid,
/// as do pixels whose QA value is not a finite non-negative number.
pub fn mask_clouds(scene: &Scene, config: &CloudMaskConfig) -> Result<Raster> {
    config.validate()?;
    let raster = &scene.raster;
    let qa = raster
        .band(&config.qa_band)
        .map_err(|_| CanopyError::missing_band(&config.qa_band, format!("scene {}", scene.id)))?;

    let mut valid = raster.valid().clone();
    Zip::from(&mut valid).and(qa).for_each(|v, &q| {
        let clear = q.is_finite() && q >= 0.0 && config.is_clear(q as u32);
        *v = *v && clear;
    });

    let mut out = Raster::new(valid, raster.transform);
    out.crs = raster.crs.clone();
    for band in raster.bands().iter().filter(|b| b.name != config.qa_band) {
        let scale = config.reflectance_scale;
        out.push_band(&band.name, band.data.mapv(|dn| dn / scale))?;
    }
    Ok(out)
}
