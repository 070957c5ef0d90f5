use std::sync::Arc;

use tracing::{info, warn};

use crate::composite::composite;
use crate::detection::{classify, erode, filter_by_size};
use crate::error::{CanopyError, Result};
use crate::geo::AnalysisGrid;
use crate::region::{resolve, Region, RegionCatalog};
use crate::scene::{DateWindow, SceneQuery};
use crate::source::{fetch_windows, CancelToken, SceneSource};

use super::config::{validate_pixel_size, AnalysisRequest};
use super::summary::summarize;
use super::types::{AnalysisOutput, NoOpReporter, PipelineStage, ProgressReporter};

/// Analysis grid for a request: the explicit grid if given, otherwise a
/// north-up grid of `pixel_size` covering the region's bounds.
pub fn analysis_grid(request: &AnalysisRequest, region: &Region) -> Result<AnalysisGrid> {
    if let Some(grid) = request.grid {
        return Ok(grid);
    }
    validate_pixel_size(request.pixel_size)?;
    let bounds = region.bounds().ok_or_else(|| {
        CanopyError::InvalidConfig(format!("region '{}' has an empty boundary", region.name))
    })?;
    Ok(AnalysisGrid::covering(&bounds, request.pixel_size))
}

fn scene_query(request: &AnalysisRequest, grid: &AnalysisGrid, window: DateWindow) -> SceneQuery {
    SceneQuery {
        region: request.region.clone(),
        bounds: grid.bounds(),
        window,
        max_cloud_cover_pct: request.scenes.max_cloud_cover_pct,
    }
}

/// Run the full change-detection analysis with a thread-safe progress reporter.
///
/// Invalid parameters and unknown regions abort before any scene is fetched.
/// A window without usable scenes does not abort: its composite is flagged
/// `no_data` and the alert mask comes out all-false. Cancellation is checked
/// between stages and yields `Cancelled` with no partial output.
pub fn run_analysis_reported(
    request: &AnalysisRequest,
    source: &dyn SceneSource,
    catalog: &dyn RegionCatalog,
    reporter: Arc<dyn ProgressReporter>,
    cancel: &CancelToken,
) -> Result<AnalysisOutput> {
    reporter.begin_stage(PipelineStage::Validating, None);
    request.validate()?;
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::ResolvingRegion, None);
    let region = resolve(catalog, &request.region)?;
    let protected_areas = catalog.protected_areas()?;
    let grid = analysis_grid(request, &region)?;
    reporter.finish_stage();
    info!(
        region = %region.name,
        height = grid.height,
        width = grid.width,
        baseline = %request.baseline,
        current = %request.current,
        "Starting analysis"
    );
    cancel.check()?;

    reporter.begin_stage(PipelineStage::Fetching, Some(2));
    let collections = fetch_windows(
        source,
        &scene_query(request, &grid, request.baseline),
        &scene_query(request, &grid, request.current),
        request.scenes.fetch_workers,
        cancel,
    )?;
    reporter.advance(2);
    reporter.finish_stage();
    cancel.check()?;

    reporter.begin_stage(PipelineStage::Compositing, Some(2));
    let (baseline, current) = rayon::join(
        || {
            let image = composite(
                &collections.baseline,
                &request.baseline,
                &region,
                &grid,
                &request.composite,
            );
            reporter.advance(1);
            image
        },
        || {
            let image = composite(
                &collections.current,
                &request.current,
                &region,
                &grid,
                &request.composite,
            );
            reporter.advance(1);
            image
        },
    );
    let (baseline, current) = (baseline?, current?);
    reporter.finish_stage();
    if baseline.is_no_data() || current.is_no_data() {
        warn!(
            baseline_scenes = baseline.provenance.scene_count,
            current_scenes = current.provenance.scene_count,
            "A window has no usable data, alerts will be empty"
        );
    }
    cancel.check()?;

    let thresholds = &request.thresholds;
    reporter.begin_stage(PipelineStage::Classifying, None);
    let candidates = classify(&baseline.raster, &current.raster, thresholds)?;
    let candidate_pixels = candidates.iter().filter(|&&c| c).count();
    reporter.finish_stage();
    info!(candidate_pixels, "Change classification complete");
    cancel.check()?;

    reporter.begin_stage(PipelineStage::Eroding, None);
    let eroded = erode(&candidates, thresholds.erosion_radius);
    reporter.finish_stage();
    cancel.check()?;

    reporter.begin_stage(PipelineStage::FilteringPatches, None);
    let alerts = filter_by_size(
        &eroded,
        thresholds.connectivity,
        thresholds.min_patch_size,
        thresholds.max_patch_count,
    )
    .with_transform(grid.transform);
    reporter.finish_stage();
    cancel.check()?;

    reporter.begin_stage(PipelineStage::Summarizing, None);
    let summary = summarize(
        &alerts,
        thresholds.connectivity,
        candidate_pixels,
        &protected_areas,
    );
    reporter.finish_stage();
    info!(
        alert_pixels = summary.alert_pixels,
        patches = summary.patch_count,
        hectares = summary.alert_hectares,
        "Analysis complete"
    );

    Ok(AnalysisOutput {
        region,
        baseline,
        current,
        alerts,
        summary,
        hints: request.display.clone(),
    })
}

/// Run the full analysis without progress reporting.
pub fn run_analysis(
    request: &AnalysisRequest,
    source: &dyn SceneSource,
    catalog: &dyn RegionCatalog,
    cancel: &CancelToken,
) -> Result<AnalysisOutput> {
    run_analysis_reported(request, source, catalog, Arc::new(NoOpReporter), cancel)
}
