mod common;

use canopy_core::detection::{filter_by_size, Connectivity};
use canopy_core::display::{DisplayHints, Palette, Stretch};
use canopy_core::io::{load_band, save_alerts, save_band, save_index};
use ndarray::array;

use common::*;

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

#[test]
fn test_stretch_clamps() {
    let s = Stretch::new(0.0, 0.8);
    assert_eq!(s.normalize(-1.0), 0.0);
    assert_eq!(s.normalize(0.4), 0.5);
    assert_eq!(s.normalize(2.0), 1.0);
    assert_eq!(Stretch::new(1.0, 1.0).normalize(1.0), 0.0);
}

#[test]
fn test_vegetation_palette_endpoints() {
    let p = Palette::vegetation();
    assert_eq!(p.sample(0.0), [255, 0, 0]);
    assert_eq!(p.sample(1.0), [0, 100, 0]);
    assert_eq!(p.sample(0.5), [255, 255, 0]);
    assert_eq!(Palette::solid([1, 2, 3]).sample(0.7), [1, 2, 3]);
}

#[test]
fn test_display_hints_default_bands() {
    let hints = DisplayHints::default();
    assert_eq!(hints.true_color_bands, ["B4", "B3", "B2"]);
    assert_eq!(hints.index_band, "NDVI");
    assert_eq!(hints.alert_color, [255, 0, 0]);
}

// ---------------------------------------------------------------------------
// File output
// ---------------------------------------------------------------------------

#[test]
fn test_band_round_trip_tiff() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("b8.tif");
    let data = array![[0.0, 1200.0], [8000.0, 70000.0]];
    save_band(&data, &path).unwrap();
    let loaded = load_band(&path).unwrap();
    assert_eq!(loaded, array![[0.0, 1200.0], [8000.0, 65535.0]]);
}

#[test]
fn test_index_tiff_reserves_zero_for_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ndvi.tiff");
    let mut raster = ndvi_raster(array![[0.0, 0.4, 0.8]]);
    raster.restrict(&array![[true, true, false]]).unwrap();
    save_index(&raster, &DisplayHints::default(), &path).unwrap();

    let loaded = load_band(&path).unwrap();
    assert_eq!(loaded, array![[1.0, 32768.0, 0.0]]);
}

#[test]
fn test_index_png_transparent_where_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ndvi.png");
    let mut raster = ndvi_raster(array![[0.8, 0.8]]);
    raster.restrict(&array![[true, false]]).unwrap();
    save_index(&raster, &DisplayHints::default(), &path).unwrap();

    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(0, 0).0, [0, 100, 0, 255]);
    assert_eq!(img.get_pixel(1, 0).0[3], 0);
}

#[test]
fn test_alerts_png_and_patch_tiff() {
    let dir = tempfile::tempdir().unwrap();
    let mask = mask_from(&["##.", "##.", "..."]);
    let alerts = filter_by_size(&mask, Connectivity::Eight, 1, None);

    let png = dir.path().join("alerts.png");
    save_alerts(&alerts, [255, 0, 0], &png).unwrap();
    let img = image::open(&png).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(1, 1).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(2, 2).0[3], 0);

    let tiff = dir.path().join("patch_sizes.tiff");
    save_alerts(&alerts, [255, 0, 0], &tiff).unwrap();
    let sizes = load_band(&tiff).unwrap();
    assert_eq!(sizes[[0, 0]], 4.0);
    assert_eq!(sizes[[2, 2]], 0.0);
}
