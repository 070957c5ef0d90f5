use serde::{Deserialize, Serialize};

use crate::consts::{BLUE_BAND, GREEN_BAND, NDVI_BAND, RED_BAND};

/// Colour ramp, linearly interpolated between evenly spaced stops.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub stops: Vec<[u8; 3]>,
}

impl Palette {
    pub fn new(stops: Vec<[u8; 3]>) -> Self {
        Self { stops }
    }

    /// Red, orange, yellow, green, dark green.
    pub fn vegetation() -> Self {
        Self::new(vec![
            [255, 0, 0],
            [255, 165, 0],
            [255, 255, 0],
            [0, 128, 0],
            [0, 100, 0],
        ])
    }

    pub fn solid(color: [u8; 3]) -> Self {
        Self::new(vec![color])
    }

    /// Colour at `t` in [0, 1]; values outside are clamped.
    pub fn sample(&self, t: f32) -> [u8; 3] {
        match self.stops.len() {
            0 => [0, 0, 0],
            1 => self.stops[0],
            n => {
                let pos = t.clamp(0.0, 1.0) * (n - 1) as f32;
                let i = (pos.floor() as usize).min(n - 2);
                let frac = pos - i as f32;
                let (a, b) = (self.stops[i], self.stops[i + 1]);
                let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * frac).round() as u8;
                [mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])]
            }
        }
    }
}

/// Value range mapped onto the display range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stretch {
    pub min: f32,
    pub max: f32,
}

impl Stretch {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Position of `v` within the range, clamped to [0, 1].
    pub fn normalize(&self, v: f32) -> f32 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((v - self.min) / span).clamp(0.0, 1.0)
    }
}

/// Rendering intent handed to the visualization collaborator with each run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisplayHints {
    /// Band names for the red, green and blue display channels.
    pub true_color_bands: [String; 3],
    pub true_color_stretch: Stretch,
    pub index_band: String,
    pub index_stretch: Stretch,
    pub index_palette: Palette,
    pub alert_color: [u8; 3],
}

impl Default for DisplayHints {
    fn default() -> Self {
        Self {
            true_color_bands: [
                RED_BAND.to_string(),
                GREEN_BAND.to_string(),
                BLUE_BAND.to_string(),
            ],
            true_color_stretch: Stretch::new(0.0, 0.25),
            index_band: NDVI_BAND.to_string(),
            index_stretch: Stretch::new(0.0, 0.8),
            index_palette: Palette::vegetation(),
            alert_color: [255, 0, 0],
        }
    }
}
