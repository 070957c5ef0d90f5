use std::path::PathBuf;

use anyhow::{Context, Result};
use canopy_core::composite::composite;
use canopy_core::consts::DEFAULT_MAX_CLOUD_COVER_PCT;
use canopy_core::io::{save_index, save_true_color_png};
use canopy_core::pipeline::{analysis_grid, AnalysisRequest};
use canopy_core::region::resolve;
use canopy_core::scene::{DateWindow, SceneQuery};
use canopy_core::source::{CancelToken, DirectorySource, SceneSource};
use clap::Args;

use super::args::{parse_window, CatalogArgs};

#[derive(Args)]
pub struct CompositeArgs {
    /// Scene directory containing scenes.toml
    pub dir: PathBuf,

    /// Region name from the catalog
    #[arg(long)]
    pub region: String,

    /// Date window as START..END (end exclusive)
    #[arg(long, value_parser = parse_window)]
    pub window: DateWindow,

    /// Keep scenes with cloud cover strictly below this percentage
    #[arg(long, default_value_t = DEFAULT_MAX_CLOUD_COVER_PCT)]
    pub max_cloud: f32,

    /// Analysis pixel size in CRS units
    #[arg(long, default_value = "10")]
    pub pixel_size: f64,

    /// Also write a true-color PNG of the composite
    #[arg(long)]
    pub true_color: Option<PathBuf>,

    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// NDVI output (.tiff for 16-bit, .png for the palette rendering)
    #[arg(short, long, default_value = "ndvi.tiff")]
    pub output: PathBuf,
}

/// Build and save the median composite of a single window.
pub fn run(args: &CompositeArgs) -> Result<()> {
    // A single-window request, so the flags get the same checks as `run`.
    let mut request = AnalysisRequest::new(args.region.clone(), args.window, args.window);
    request.scenes.max_cloud_cover_pct = args.max_cloud;
    request.pixel_size = args.pixel_size;
    request.validate().context("Invalid composite parameters")?;

    let catalog = args.catalog.load()?;
    let region = resolve(&catalog, &args.region)?;
    let grid = analysis_grid(&request, &region)?;

    let source = DirectorySource::open(&args.dir)
        .with_context(|| format!("Failed to open scene directory {}", args.dir.display()))?;
    let query = SceneQuery {
        region: region.name.clone(),
        bounds: grid.bounds(),
        window: args.window,
        max_cloud_cover_pct: request.scenes.max_cloud_cover_pct,
    };
    let collection = source.query(&query, &CancelToken::new())?;
    let image = composite(
        &collection,
        &args.window,
        &region,
        &grid,
        &request.composite,
    )?;

    let hints = &request.display;
    save_index(&image.raster, hints, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    if let Some(ref path) = args.true_color {
        save_true_color_png(&image.raster, hints, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    let p = &image.provenance;
    println!(
        "{} composite of {} scene(s) ({} dropped) for {} in {}",
        p.reducer, p.scene_count, p.dropped_scenes, p.region, p.window
    );
    if image.is_no_data() {
        println!("Window has no usable data; output is empty");
    }
    println!("Output saved to {}", args.output.display());

    Ok(())
}
