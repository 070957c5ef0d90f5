use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use canopy_core::detection::Connectivity;
use canopy_core::io::{save_alerts, save_index, save_true_color_png};
use canopy_core::pipeline::{run_analysis_reported, AnalysisOutput, AnalysisRequest, Preset};
use canopy_core::scene::DateWindow;
use canopy_core::source::{CancelToken, DirectorySource, RetryingSource};
use chrono::{Months, NaiveDate};
use clap::Args;
use tracing::debug;

use super::args::{parse_window, window_or_lookback, CatalogArgs, PresetArg};
use crate::progress::BarReporter;
use crate::summary::{print_alert_summary, print_request_summary};

#[derive(Args)]
pub struct RunArgs {
    /// Scene directory containing scenes.toml
    pub dir: PathBuf,

    /// Analysis config file (TOML); replaces every option below
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Region name from the catalog
    #[arg(long, required_unless_present = "config")]
    pub region: Option<String>,

    /// Baseline window as START..END; defaults to the current window a year earlier
    #[arg(long, value_parser = parse_window)]
    pub baseline: Option<DateWindow>,

    /// Current window as START..END; defaults to a lookback ending at --end
    #[arg(long, value_parser = parse_window)]
    pub current: Option<DateWindow>,

    /// End date (exclusive) of the lookback window; defaults to today
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Length of the lookback window in months
    #[arg(long, default_value = "4")]
    pub lookback_months: u32,

    /// Threshold preset
    #[arg(long, value_enum, default_value = "standard")]
    pub preset: PresetArg,

    /// Baseline NDVI must exceed this
    #[arg(long)]
    pub forest: Option<f32>,

    /// Current NDVI must be below this
    #[arg(long)]
    pub bare: Option<f32>,

    /// Required NDVI drop between windows
    #[arg(long)]
    pub min_drop: Option<f32>,

    /// Erosion radius in pixels (0 disables)
    #[arg(long)]
    pub erosion: Option<usize>,

    /// Minimum patch size in pixels
    #[arg(long)]
    pub min_patch: Option<usize>,

    /// Pixel connectivity (4 or 8)
    #[arg(long, value_parser = clap::value_parser!(u8).range(4..=8))]
    pub connectivity: Option<u8>,

    /// Keep scenes with cloud cover strictly below this percentage
    #[arg(long)]
    pub max_cloud: Option<f32>,

    /// Analysis pixel size in CRS units
    #[arg(long, default_value = "10")]
    pub pixel_size: f64,

    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Output directory for composites, alerts and the summary
    #[arg(short, long, default_value = "canopy-out")]
    pub output: PathBuf,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let request = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid analysis config")?
    } else {
        build_request_from_args(args)?
    };
    debug!(?request, "Resolved analysis request");

    let catalog = args.catalog.load()?;
    let source = RetryingSource::new(
        DirectorySource::open(&args.dir)
            .with_context(|| format!("Failed to open scene directory {}", args.dir.display()))?,
        request.scenes.retry.clone(),
    );

    print_request_summary(&request, &args.dir);

    let reporter = Arc::new(BarReporter::new()?);
    let output = run_analysis_reported(
        &request,
        &source,
        &catalog,
        reporter.clone(),
        &CancelToken::new(),
    )?;
    reporter.finish();

    write_outputs(&output, &args.output)?;
    print_alert_summary(&output);
    println!("\nOutputs saved to {}", args.output.display());

    Ok(())
}

fn build_request_from_args(args: &RunArgs) -> Result<AnalysisRequest> {
    let region = args.region.clone().context("--region is required without --config")?;
    let current = window_or_lookback(args.current, args.end, args.lookback_months)?;
    let baseline = match args.baseline {
        Some(window) => window,
        None => year_before(&current)?,
    };

    let mut request =
        AnalysisRequest::new(region, baseline, current).with_preset(Preset::from(args.preset));
    let t = &mut request.thresholds;
    if let Some(v) = args.forest {
        t.forest_threshold = v;
    }
    if let Some(v) = args.bare {
        t.bare_threshold = v;
    }
    if args.min_drop.is_some() {
        t.min_drop = args.min_drop;
    }
    if let Some(v) = args.erosion {
        t.erosion_radius = v;
    }
    if let Some(v) = args.min_patch {
        t.min_patch_size = v;
        t.max_patch_count = t.max_patch_count.map(|cap| cap.max(v));
    }
    if let Some(v) = args.connectivity {
        t.connectivity = Connectivity::try_from(v).map_err(anyhow::Error::msg)?;
    }
    if let Some(v) = args.max_cloud {
        request.scenes.max_cloud_cover_pct = v;
    }
    request.pixel_size = args.pixel_size;
    Ok(request)
}

fn year_before(window: &DateWindow) -> Result<DateWindow> {
    let shift = |d: NaiveDate| {
        d.checked_sub_months(Months::new(12))
            .with_context(|| format!("Cannot shift {d} back a year"))
    };
    Ok(DateWindow::new(shift(window.start)?, shift(window.end)?)?)
}

fn write_outputs(output: &AnalysisOutput, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let hints = &output.hints;
    let path = |name: &str| dir.join(name);

    save_index(&output.baseline.raster, hints, &path("baseline_ndvi.tiff"))?;
    save_index(&output.current.raster, hints, &path("current_ndvi.tiff"))?;
    save_index(&output.current.raster, hints, &path("current_ndvi.png"))?;
    save_true_color_png(&output.current.raster, hints, &path("current_true_color.png"))?;
    save_alerts(&output.alerts, hints.alert_color, &path("alerts.png"))?;
    save_alerts(&output.alerts, hints.alert_color, &path("patch_sizes.tiff"))?;

    let summary = toml::to_string_pretty(&output.summary)?;
    std::fs::write(path("summary.toml"), summary).context("Failed to write summary")?;
    Ok(())
}
