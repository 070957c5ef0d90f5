use std::path::Path;

use image::{ImageBuffer, ImageFormat, Luma, Rgb, Rgba};
use ndarray::Array2;

use crate::detection::AlertMask;
use crate::display::{DisplayHints, Palette, Stretch};
use crate::error::Result;
use crate::raster::Raster;

/// Load a single-band image as raw digital numbers (no normalization).
pub fn load_band(path: &Path) -> Result<Array2<f32>> {
    let img = image::open(path)?;
    let gray = img.to_luma16();
    let (w, h) = gray.dimensions();
    let mut data = Array2::<f32>::zeros((h as usize, w as usize));

    for (col, row, pixel) in gray.enumerate_pixels() {
        data[[row as usize, col as usize]] = pixel.0[0] as f32;
    }

    Ok(data)
}

/// Save raw digital numbers as a 16-bit grayscale image (values saturate to u16).
pub fn save_band(data: &Array2<f32>, path: &Path) -> Result<()> {
    let (h, w) = data.dim();
    let pixels: Vec<u16> = data
        .iter()
        .map(|&v| v.round().clamp(0.0, u16::MAX as f32) as u16)
        .collect();
    let img = ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(w as u32, h as u32, pixels)
        .expect("buffer size matches dimensions");
    img.save(path)?;
    Ok(())
}

/// Save an index band as 16-bit TIFF, mapping `stretch` onto [1, 65535].
/// Invalid pixels are written as 0.
pub fn save_index_tiff(raster: &Raster, band: &str, stretch: &Stretch, path: &Path) -> Result<()> {
    let data = raster.band(band)?;
    let (h, w) = raster.dim();

    let mut pixels: Vec<u16> = Vec::with_capacity(h * w);
    for ((row, col), &v) in data.indexed_iter() {
        let val = if raster.valid()[[row, col]] {
            1 + (stretch.normalize(v) * 65534.0) as u16
        } else {
            0
        };
        pixels.push(val);
    }

    let img = ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(w as u32, h as u32, pixels)
        .expect("buffer size matches dimensions");
    img.save_with_format(path, ImageFormat::Tiff)?;
    Ok(())
}

/// Save an index band through a palette as RGBA PNG; invalid pixels are transparent.
pub fn save_index_png(
    raster: &Raster,
    band: &str,
    stretch: &Stretch,
    palette: &Palette,
    path: &Path,
) -> Result<()> {
    let data = raster.band(band)?;
    let (h, w) = raster.dim();

    let mut img = image::RgbaImage::new(w as u32, h as u32);
    for ((row, col), &v) in data.indexed_iter() {
        if raster.valid()[[row, col]] {
            let [r, g, b] = palette.sample(stretch.normalize(v));
            img.put_pixel(col as u32, row as u32, Rgba([r, g, b, 255]));
        }
    }

    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save a true-colour rendering as 8-bit RGB PNG; invalid pixels are black.
pub fn save_true_color_png(raster: &Raster, hints: &DisplayHints, path: &Path) -> Result<()> {
    let [r_name, g_name, b_name] = &hints.true_color_bands;
    let (r, g, b) = (raster.band(r_name)?, raster.band(g_name)?, raster.band(b_name)?);
    let (h, w) = raster.dim();
    let stretch = &hints.true_color_stretch;
    let to_u8 = |v: f32| (stretch.normalize(v) * 255.0) as u8;

    let mut img = image::RgbImage::new(w as u32, h as u32);
    for row in 0..h {
        for col in 0..w {
            if raster.valid()[[row, col]] {
                let px = Rgb([
                    to_u8(r[[row, col]]),
                    to_u8(g[[row, col]]),
                    to_u8(b[[row, col]]),
                ]);
                img.put_pixel(col as u32, row as u32, px);
            }
        }
    }

    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save alerts as RGBA PNG: `color` where flagged, transparent elsewhere.
pub fn save_alert_png(alerts: &AlertMask, color: [u8; 3], path: &Path) -> Result<()> {
    let (h, w) = alerts.alerts.dim();
    let [r, g, b] = color;

    let mut img = image::RgbaImage::new(w as u32, h as u32);
    for ((row, col), &flag) in alerts.alerts.indexed_iter() {
        if flag {
            img.put_pixel(col as u32, row as u32, Rgba([r, g, b, 255]));
        }
    }

    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save patch sizes as 16-bit grayscale TIFF (saturating at 65535).
pub fn save_patch_sizes(alerts: &AlertMask, path: &Path) -> Result<()> {
    let (h, w) = alerts.patch_size.dim();
    let pixels: Vec<u16> = alerts
        .patch_size
        .iter()
        .map(|&s| s.min(u16::MAX as u32) as u16)
        .collect();

    let img = ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(w as u32, h as u32, pixels)
        .expect("buffer size matches dimensions");
    img.save_with_format(path, ImageFormat::Tiff)?;
    Ok(())
}

/// Save an alert mask, choosing format from file extension: TIFF writes patch
/// sizes, anything else writes the coloured overlay PNG.
pub fn save_alerts(alerts: &AlertMask, color: [u8; 3], path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("tiff" | "tif") => save_patch_sizes(alerts, path),
        _ => save_alert_png(alerts, color, path),
    }
}

/// Save a composite's index band, choosing format from file extension.
pub fn save_index(raster: &Raster, hints: &DisplayHints, path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("png") => save_index_png(
            raster,
            &hints.index_band,
            &hints.index_stretch,
            &hints.index_palette,
            path,
        ),
        _ => save_index_tiff(raster, &hints.index_band, &hints.index_stretch, path),
    }
}
