use std::path::PathBuf;

use anyhow::{Context, Result};
use canopy_core::consts::DEFAULT_MAX_CLOUD_COVER_PCT;
use canopy_core::pipeline::validate_max_cloud_cover;
use canopy_core::region::resolve;
use canopy_core::scene::{DateWindow, SceneQuery};
use canopy_core::source::{CancelToken, DirectorySource, SceneSource};
use clap::Args;

use super::args::{parse_window, CatalogArgs};

#[derive(Args)]
pub struct ScenesArgs {
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

    #[command(flatten)]
    pub catalog: CatalogArgs,
}

/// List the scenes that pass the region, window and cloud filters.
pub fn run(args: &ScenesArgs) -> Result<()> {
    validate_max_cloud_cover(args.max_cloud).context("Invalid --max-cloud")?;
    let catalog = args.catalog.load()?;
    let region = resolve(&catalog, &args.region)?;
    let bounds = region
        .bounds()
        .with_context(|| format!("Region '{}' has an empty boundary", region.name))?;

    let source = DirectorySource::open(&args.dir)
        .with_context(|| format!("Failed to open scene directory {}", args.dir.display()))?;
    let query = SceneQuery {
        region: region.name.clone(),
        bounds,
        window: args.window,
        max_cloud_cover_pct: args.max_cloud,
    };
    let collection = source.query(&query, &CancelToken::new())?;

    println!(
        "{} scene(s) for {} in {} (of {} in manifest)",
        collection.len(),
        region.name,
        args.window,
        source.manifest().scenes.len()
    );
    for scene in collection.scenes() {
        println!(
            "  {}  {:>5.1}% cloud  {}",
            scene.date,
            scene.cloud_cover_pct,
            scene.id
        );
    }

    Ok(())
}
