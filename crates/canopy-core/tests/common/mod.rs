#![allow(dead_code)]

use canopy_core::consts::{BLUE_BAND, GREEN_BAND, NIR_BAND, QA_BAND, RED_BAND};
use canopy_core::geo::{AnalysisGrid, BoundingBox, GeoTransform};
use canopy_core::raster::Raster;
use canopy_core::region::{Region, StaticCatalog};
use canopy_core::scene::{DateWindow, Scene};
use chrono::NaiveDate;
use ndarray::Array2;

/// QA60 value with the opaque-cloud bit set.
pub const QA_CLOUD: f32 = 1024.0;
/// QA60 value with the cirrus bit set.
pub const QA_CIRRUS: f32 = 2048.0;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn window(start: NaiveDate, end: NaiveDate) -> DateWindow {
    DateWindow::new(start, end).unwrap()
}

/// Sep-Dec 2024.
pub fn baseline_window() -> DateWindow {
    window(date(2024, 9, 1), date(2025, 1, 1))
}

/// Sep-Dec 2025.
pub fn current_window() -> DateWindow {
    window(date(2025, 9, 1), date(2026, 1, 1))
}

/// North-up unit grid with its top-left corner at the origin.
pub fn unit_grid(size: usize) -> AnalysisGrid {
    AnalysisGrid::new(size, size, GeoTransform::identity())
}

/// Square region exactly covering `unit_grid(size)`.
pub fn square_region(name: &str, size: usize) -> Region {
    Region::rectangle(name, BoundingBox::new(0.0, -(size as f64), size as f64, 0.0))
}

pub fn catalog_for(size: usize) -> StaticCatalog {
    StaticCatalog::new(vec![square_region("Parana", size)])
}

/// Red and NIR digital numbers giving the requested NDVI (sum fixed at 10000).
pub fn dn_for_ndvi(ndvi: f32) -> (f32, f32) {
    let nir = 5000.0 * (1.0 + ndvi);
    let red = 5000.0 * (1.0 - ndvi);
    (red, nir)
}

/// Raw Sentinel-2-like raster (DN values, QA60 band) whose NDVI is
/// `ndvi(row, col)` and QA is `qa(row, col)`.
pub fn scene_raster(
    size: usize,
    ndvi: impl Fn(usize, usize) -> f32,
    qa: impl Fn(usize, usize) -> f32,
) -> Raster {
    let red = Array2::from_shape_fn((size, size), |(r, c)| dn_for_ndvi(ndvi(r, c)).0);
    let nir = Array2::from_shape_fn((size, size), |(r, c)| dn_for_ndvi(ndvi(r, c)).1);
    Raster::all_valid(size, size, GeoTransform::identity())
        .with_band(BLUE_BAND, Array2::from_elem((size, size), 400.0))
        .unwrap()
        .with_band(GREEN_BAND, Array2::from_elem((size, size), 600.0))
        .unwrap()
        .with_band(RED_BAND, red)
        .unwrap()
        .with_band(NIR_BAND, nir)
        .unwrap()
        .with_band(QA_BAND, Array2::from_shape_fn((size, size), |(r, c)| qa(r, c)))
        .unwrap()
}

/// Cloud-free scene with the given NDVI pattern.
pub fn clear_scene(
    id: &str,
    on: NaiveDate,
    size: usize,
    ndvi: impl Fn(usize, usize) -> f32,
) -> Scene {
    Scene::new(id, on, 5.0, scene_raster(size, ndvi, |_, _| 0.0))
}

/// True inside the half-open square block `[lo, hi) x [lo, hi)`.
pub fn in_block(row: usize, col: usize, lo: usize, hi: usize) -> bool {
    (lo..hi).contains(&row) && (lo..hi).contains(&col)
}

/// Baseline: NDVI 0.85 over a 20x20 block at [5, 25), 0 elsewhere.
pub fn forest_block_ndvi(row: usize, col: usize) -> f32 {
    if in_block(row, col, 5, 25) {
        0.85
    } else {
        0.0
    }
}

/// Current: NDVI 0.10 over a 10x10 sub-block at [10, 20), 0.85 over the rest
/// of the forest block, 0 elsewhere.
pub fn cleared_block_ndvi(row: usize, col: usize) -> f32 {
    if in_block(row, col, 10, 20) {
        0.10
    } else {
        forest_block_ndvi(row, col)
    }
}

/// Composite-like raster holding only an NDVI band.
pub fn ndvi_raster(data: Array2<f32>) -> Raster {
    let (h, w) = data.dim();
    Raster::all_valid(h, w, GeoTransform::identity())
        .with_band("NDVI", data)
        .unwrap()
}

pub fn mask_from(rows: &[&str]) -> Array2<bool> {
    let h = rows.len();
    let w = rows[0].len();
    Array2::from_shape_fn((h, w), |(r, c)| rows[r].as_bytes()[c] == b'#')
}

pub fn count_true(mask: &Array2<bool>) -> usize {
    mask.iter().filter(|&&v| v).count()
}
