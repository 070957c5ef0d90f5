mod common;

use approx::assert_relative_eq;
use canopy_core::composite::{compute_median, composite, median_composite, CompositeConfig, Reducer};
use canopy_core::consts::{NDVI_BAND, QA_BAND, RED_BAND};
use canopy_core::error::CanopyError;
use canopy_core::geo::{BoundingBox, GeoTransform};
use canopy_core::raster::Raster;
use canopy_core::region::Region;
use canopy_core::scene::{Scene, SceneCollection};
use ndarray::{array, Array2};

use common::*;

fn single_value(value: f32, valid: bool) -> Raster {
    let mut r = Raster::all_valid(1, 1, GeoTransform::identity())
        .with_band("V", array![[value]])
        .unwrap();
    r.restrict(&array![[valid]]).unwrap();
    r
}

// ---------------------------------------------------------------------------
// compute_median
// ---------------------------------------------------------------------------

#[test]
fn test_median_odd_count() {
    let mut v = [0.2, 0.8, 0.5];
    assert_relative_eq!(compute_median(&mut v).unwrap(), 0.5);
}

#[test]
fn test_median_even_count_averages_middle_two() {
    let mut v = [0.2, 0.8];
    assert_relative_eq!(compute_median(&mut v).unwrap(), 0.5);
    let mut w = [4.0, 1.0, 3.0, 2.0];
    assert_relative_eq!(compute_median(&mut w).unwrap(), 2.5);
}

#[test]
fn test_median_empty_and_single() {
    assert_eq!(compute_median(&mut []), None);
    assert_eq!(compute_median(&mut [0.3]), Some(0.3));
}

// ---------------------------------------------------------------------------
// median_composite
// ---------------------------------------------------------------------------

#[test]
fn test_median_composite_skips_invalid_observations() {
    let stack = vec![
        single_value(0.2, true),
        single_value(0.8, true),
        single_value(0.5, true),
        single_value(100.0, false),
    ];
    let out = median_composite(&stack, &["V"]).unwrap();
    assert!(out.valid()[[0, 0]]);
    assert_relative_eq!(out.band("V").unwrap()[[0, 0]], 0.5);
}

#[test]
fn test_median_composite_no_valid_observation_is_invalid() {
    let stack = vec![single_value(0.4, false), single_value(0.6, false)];
    let out = median_composite(&stack, &["V"]).unwrap();
    assert!(!out.valid()[[0, 0]]);
}

#[test]
fn test_median_composite_rejects_empty_and_mismatched() {
    assert!(matches!(
        median_composite(&[], &["V"]),
        Err(CanopyError::InvalidConfig(_))
    ));
    let big = Raster::all_valid(2, 2, GeoTransform::identity())
        .with_band("V", Array2::zeros((2, 2)))
        .unwrap();
    assert!(matches!(
        median_composite(&[single_value(0.1, true), big], &["V"]),
        Err(CanopyError::InvalidDimensions { .. })
    ));
}

#[test]
fn test_median_composite_large_grid_parallel_path() {
    // 300x300 exceeds the parallel threshold.
    let stack: Vec<Raster> = [0.1f32, 0.9, 0.4]
        .iter()
        .map(|&v| {
            Raster::all_valid(300, 300, GeoTransform::identity())
                .with_band("V", Array2::from_elem((300, 300), v))
                .unwrap()
        })
        .collect();
    let out = median_composite(&stack, &["V"]).unwrap();
    assert!(out.band("V").unwrap().iter().all(|&v| (v - 0.4).abs() < 1e-6));
}

// ---------------------------------------------------------------------------
// composite
// ---------------------------------------------------------------------------

#[test]
fn test_composite_cloudy_observation_excluded() {
    let size = 4;
    let scenes = vec![
        clear_scene("a", date(2024, 9, 10), size, |_, _| 0.8),
        clear_scene("b", date(2024, 10, 10), size, |_, _| 0.6),
        // Cloudy everywhere: contributes nothing.
        Scene::new("c", date(2024, 11, 10), 20.0, scene_raster(size, |_, _| -0.5, |_, _| QA_CLOUD)),
    ];
    let collection = SceneCollection::new("Parana", scenes);
    let image = composite(
        &collection,
        &baseline_window(),
        &square_region("Parana", size),
        &unit_grid(size),
        &CompositeConfig::default(),
    )
    .unwrap();

    assert!(!image.is_no_data());
    assert_eq!(image.provenance.scene_count, 3);
    assert_eq!(image.provenance.reducer, Reducer::Median);
    let ndvi = image.band(NDVI_BAND).unwrap();
    assert_relative_eq!(ndvi[[2, 2]], 0.7, epsilon = 1e-5);
}

#[test]
fn test_composite_ignores_scenes_outside_window() {
    let size = 3;
    let scenes = vec![
        clear_scene("in", date(2024, 9, 10), size, |_, _| 0.8),
        // Window end is exclusive.
        clear_scene("edge", date(2025, 1, 1), size, |_, _| 0.0),
    ];
    let collection = SceneCollection::new("Parana", scenes);
    let image = composite(
        &collection,
        &baseline_window(),
        &square_region("Parana", size),
        &unit_grid(size),
        &CompositeConfig::default(),
    )
    .unwrap();
    assert_eq!(image.provenance.scene_count, 1);
    assert_relative_eq!(image.band(NDVI_BAND).unwrap()[[0, 0]], 0.8, epsilon = 1e-5);
}

#[test]
fn test_composite_empty_window_is_no_data() {
    let size = 5;
    let collection = SceneCollection::empty("Parana");
    let image = composite(
        &collection,
        &baseline_window(),
        &square_region("Parana", size),
        &unit_grid(size),
        &CompositeConfig::default(),
    )
    .unwrap();

    assert!(image.is_no_data());
    assert_eq!(image.raster.valid_count(), 0);
    assert_eq!(image.raster.dim(), (size, size));
    assert!(image.raster.has_band(NDVI_BAND));
}

#[test]
fn test_composite_drops_scene_missing_band() {
    let size = 3;
    let good = clear_scene("good", date(2024, 9, 10), size, |_, _| 0.8);
    let broken = {
        let raw = scene_raster(size, |_, _| 0.1, |_, _| 0.0);
        let without_red = raw.select(&["B2", "B3", "B8", QA_BAND]).unwrap();
        assert!(!without_red.has_band(RED_BAND));
        Scene::new("broken", date(2024, 10, 10), 0.0, without_red)
    };
    let collection = SceneCollection::new("Parana", vec![good, broken]);
    let image = composite(
        &collection,
        &baseline_window(),
        &square_region("Parana", size),
        &unit_grid(size),
        &CompositeConfig::default(),
    )
    .unwrap();

    assert_eq!(image.provenance.scene_count, 1);
    assert_eq!(image.provenance.dropped_scenes, 1);
    assert_relative_eq!(image.band(NDVI_BAND).unwrap()[[1, 1]], 0.8, epsilon = 1e-5);
}

#[test]
fn test_composite_clipped_to_region() {
    let size = 4;
    let collection = SceneCollection::new(
        "West",
        vec![clear_scene("a", date(2024, 9, 10), size, |_, _| 0.8)],
    );
    // Left half of the grid only.
    let west = Region::rectangle("West", BoundingBox::new(0.0, -4.0, 2.0, 0.0));
    let image = composite(
        &collection,
        &baseline_window(),
        &west,
        &unit_grid(size),
        &CompositeConfig::default(),
    )
    .unwrap();

    let valid = image.raster.valid();
    assert_eq!(image.raster.valid_count(), 8);
    assert!(valid[[0, 0]] && valid[[3, 1]]);
    assert!(!valid[[0, 2]] && !valid[[3, 3]]);
}
