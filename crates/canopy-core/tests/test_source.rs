mod common;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use canopy_core::consts::SCENE_MANIFEST_FILE;
use canopy_core::error::{CanopyError, Result};
use canopy_core::geo::{BoundingBox, GeoTransform};
use canopy_core::io::{save_band, SceneEntry, SceneManifest};
use canopy_core::scene::{DateWindow, SceneCollection, SceneQuery};
use canopy_core::source::{
    fetch_windows, CachedSource, CancelToken, DirectorySource, MemorySource, RetryPolicy,
    RetryingSource, SceneSource,
};

use common::*;

fn query(window: DateWindow, max_cloud: f32) -> SceneQuery {
    SceneQuery {
        region: "Parana".into(),
        bounds: BoundingBox::new(0.0, -4.0, 4.0, 0.0),
        window,
        max_cloud_cover_pct: max_cloud,
    }
}

fn memory_source() -> MemorySource {
    let mut cloudy = clear_scene("cloudy", date(2024, 10, 1), 4, |_, _| 0.8);
    cloudy.cloud_cover_pct = 30.0;
    MemorySource::new(vec![
        clear_scene("late", date(2024, 12, 20), 4, |_, _| 0.8),
        clear_scene("early", date(2024, 9, 5), 4, |_, _| 0.8),
        cloudy,
        clear_scene("next-year", date(2025, 10, 1), 4, |_, _| 0.2),
    ])
}

/// Counts calls and fails with `SourceUnavailable` for the first `failures`.
struct CountingSource {
    inner: MemorySource,
    calls: AtomicUsize,
    failures: usize,
}

impl CountingSource {
    fn new(failures: usize) -> Self {
        Self {
            inner: memory_source(),
            calls: AtomicUsize::new(0),
            failures,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SceneSource for CountingSource {
    fn query(&self, query: &SceneQuery, cancel: &CancelToken) -> Result<SceneCollection> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.failures {
            return Err(CanopyError::SourceUnavailable(format!("attempt {n}")));
        }
        self.inner.query(query, cancel)
    }

    fn name(&self) -> &str {
        "counting"
    }
}

// ---------------------------------------------------------------------------
// MemorySource filter contract
// ---------------------------------------------------------------------------

#[test]
fn test_memory_source_filters_and_orders() {
    let collection = memory_source()
        .query(&query(baseline_window(), 30.0), &CancelToken::new())
        .unwrap();
    let ids: Vec<&str> = collection.scenes().iter().map(|s| s.id.as_str()).collect();
    // Cloud cover must be strictly below the limit.
    assert_eq!(ids, ["early", "late"]);
}

#[test]
fn test_memory_source_bounds_filter() {
    let mut q = query(baseline_window(), 100.0);
    q.bounds = BoundingBox::new(50.0, 50.0, 60.0, 60.0);
    let collection = memory_source().query(&q, &CancelToken::new()).unwrap();
    assert!(collection.is_empty());
}

#[test]
fn test_memory_source_respects_cancel() {
    let cancel = CancelToken::new();
    cancel.cancel();
    assert!(matches!(
        memory_source().query(&query(baseline_window(), 30.0), &cancel),
        Err(CanopyError::Cancelled)
    ));
}

// ---------------------------------------------------------------------------
// Cache and retry
// ---------------------------------------------------------------------------

#[test]
fn test_cached_source_hits() {
    let cached = CachedSource::new(CountingSource::new(0));
    let q = query(baseline_window(), 30.0);
    let first = cached.query(&q, &CancelToken::new()).unwrap();
    let second = cached.query(&q, &CancelToken::new()).unwrap();
    assert_eq!(first.len(), second.len());
    assert_eq!(cached.inner().calls(), 1);
    assert!(cached.contains(&q));

    // A different cloud threshold is a different key.
    cached.query(&query(baseline_window(), 50.0), &CancelToken::new()).unwrap();
    assert_eq!(cached.inner().calls(), 2);
    assert_eq!(cached.len(), 2);

    assert!(cached.evict(&q).is_some());
    cached.query(&q, &CancelToken::new()).unwrap();
    assert_eq!(cached.inner().calls(), 3);
    cached.clear();
    assert!(cached.is_empty());
}

#[test]
fn test_cached_source_does_not_store_failures() {
    let cached = CachedSource::new(CountingSource::new(1));
    let q = query(baseline_window(), 30.0);
    assert!(cached.query(&q, &CancelToken::new()).is_err());
    assert!(cached.is_empty());
    assert!(cached.query(&q, &CancelToken::new()).is_ok());
    assert_eq!(cached.len(), 1);
}

#[test]
fn test_retrying_source_recovers() {
    let policy = RetryPolicy {
        attempts: 3,
        base_delay_ms: 0,
    };
    let source = RetryingSource::new(CountingSource::new(2), policy);
    let collection = source
        .query(&query(baseline_window(), 30.0), &CancelToken::new())
        .unwrap();
    assert_eq!(collection.len(), 2);
}

#[test]
fn test_retrying_source_gives_up() {
    let policy = RetryPolicy {
        attempts: 1,
        base_delay_ms: 0,
    };
    let source = RetryingSource::new(CountingSource::new(5), policy);
    assert!(matches!(
        source.query(&query(baseline_window(), 30.0), &CancelToken::new()),
        Err(CanopyError::SourceUnavailable(_))
    ));
}

#[test]
fn test_retry_delay_doubles() {
    let policy = RetryPolicy {
        attempts: 3,
        base_delay_ms: 100,
    };
    assert_eq!(policy.delay(0).as_millis(), 100);
    assert_eq!(policy.delay(2).as_millis(), 400);
}

// ---------------------------------------------------------------------------
// fetch_windows
// ---------------------------------------------------------------------------

#[test]
fn test_fetch_windows_both_collections() {
    let source = memory_source();
    let fetched = fetch_windows(
        &source,
        &query(baseline_window(), 30.0),
        &query(current_window(), 30.0),
        2,
        &CancelToken::new(),
    )
    .unwrap();
    assert_eq!(fetched.baseline.len(), 2);
    assert_eq!(fetched.current.len(), 1);
}

#[test]
fn test_fetch_windows_cancelled() {
    let cancel = CancelToken::new();
    let clone = cancel.clone();
    clone.cancel();
    assert!(cancel.is_cancelled());
    let result = fetch_windows(
        &memory_source(),
        &query(baseline_window(), 30.0),
        &query(current_window(), 30.0),
        1,
        &cancel,
    );
    assert!(matches!(result, Err(CanopyError::Cancelled)));
}

// ---------------------------------------------------------------------------
// DirectorySource
// ---------------------------------------------------------------------------

fn write_scene_dir(root: &std::path::Path) {
    let size = 4;
    let mut scenes = Vec::new();
    for (id, on, cloud) in [
        ("s-sep", date(2024, 9, 10), 5.0),
        ("s-oct", date(2024, 10, 10), 45.0),
    ] {
        std::fs::create_dir_all(root.join(id)).unwrap();
        let raster = scene_raster(size, |_, _| 0.6, |r, c| if r == 0 && c == 0 { QA_CLOUD } else { 0.0 });
        let mut bands = BTreeMap::new();
        for band in raster.bands() {
            let rel = PathBuf::from(id).join(format!("{}.tif", band.name));
            let mut data = band.data.clone();
            if band.name == "B4" {
                // Nodata at one pixel.
                data[[3, 3]] = 0.0;
            }
            save_band(&data, &root.join(&rel)).unwrap();
            bands.insert(band.name.clone(), rel);
        }
        scenes.push(SceneEntry {
            id: id.to_string(),
            date: on,
            cloud_cover_pct: cloud,
            transform: GeoTransform::identity(),
            bands,
        });
    }
    let manifest = SceneManifest {
        crs: Some("EPSG:32722".into()),
        nodata: Some(0),
        qa_band: "QA60".into(),
        scenes,
    };
    std::fs::write(root.join(SCENE_MANIFEST_FILE), manifest.to_toml_string().unwrap()).unwrap();
}

#[test]
fn test_directory_source_query() {
    let dir = tempfile::tempdir().unwrap();
    write_scene_dir(dir.path());

    let source = DirectorySource::open(dir.path()).unwrap();
    assert_eq!(source.manifest().scenes.len(), 2);

    let collection = source
        .query(&query(baseline_window(), 30.0), &CancelToken::new())
        .unwrap();
    assert_eq!(collection.len(), 1);
    let scene = &collection.scenes()[0];
    assert_eq!(scene.id, "s-sep");
    assert_eq!(scene.raster.crs.as_deref(), Some("EPSG:32722"));
    assert_eq!(scene.footprint, BoundingBox::new(0.0, -4.0, 4.0, 0.0));
    // QA zeros are not nodata; the B4 zero is.
    assert!(scene.raster.valid()[[0, 0]]);
    assert!(!scene.raster.valid()[[3, 3]]);
    assert_eq!(scene.raster.band("B8").unwrap()[[1, 1]], 8000.0);
}

#[test]
fn test_directory_source_missing_file_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    write_scene_dir(dir.path());
    std::fs::remove_file(dir.path().join("s-sep").join("B8.tif")).unwrap();

    let source = DirectorySource::open(dir.path()).unwrap();
    assert!(matches!(
        source.query(&query(baseline_window(), 30.0), &CancelToken::new()),
        Err(CanopyError::SourceUnavailable(_))
    ));
}

#[test]
fn test_directory_source_drops_scene_with_mismatched_bands() {
    let dir = tempfile::tempdir().unwrap();
    write_scene_dir(dir.path());
    // One band of s-sep shrinks to 3x3; s-oct is untouched.
    save_band(
        &ndarray::Array2::from_elem((3, 3), 8000.0),
        &dir.path().join("s-sep").join("B8.tif"),
    )
    .unwrap();

    let source = DirectorySource::open(dir.path()).unwrap();
    let collection = source
        .query(&query(baseline_window(), 50.0), &CancelToken::new())
        .unwrap();
    let ids: Vec<&str> = collection.scenes().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, ["s-oct"]);
}

#[test]
fn test_manifest_rejects_bad_cloud_cover() {
    let text = r#"
[[scenes]]
id = "bad"
date = "2024-09-10"
cloud_cover_pct = 140.0
transform = { origin_x = 0.0, origin_y = 0.0, pixel_width = 10.0, pixel_height = -10.0 }
bands = { B4 = "bad/B4.tif" }
"#;
    assert!(matches!(
        SceneManifest::from_toml_str(text),
        Err(CanopyError::InvalidManifest(_))
    ));
}
