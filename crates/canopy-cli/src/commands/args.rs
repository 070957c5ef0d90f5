use std::path::PathBuf;

use anyhow::{Context, Result};
use canopy_core::pipeline::Preset;
use canopy_core::region::StaticCatalog;
use canopy_core::scene::DateWindow;
use chrono::NaiveDate;
use clap::{Args, ValueEnum};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PresetArg {
    Standard,
    LowFalsePositives,
    Monthly,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Standard => Preset::Standard,
            PresetArg::LowFalsePositives => Preset::LowFalsePositives,
            PresetArg::Monthly => Preset::Monthly,
        }
    }
}

/// Region catalog location, shared by every command that resolves regions.
#[derive(Args, Clone)]
pub struct CatalogArgs {
    /// Region catalog file (TOML)
    #[arg(long, default_value = "regions.toml")]
    pub catalog: PathBuf,
}

impl CatalogArgs {
    pub fn load(&self) -> Result<StaticCatalog> {
        StaticCatalog::load(&self.catalog)
            .with_context(|| format!("Failed to load region catalog {}", self.catalog.display()))
    }
}

/// Parse `START..END` (ISO dates, end exclusive).
pub fn parse_window(s: &str) -> std::result::Result<DateWindow, String> {
    let (start, end) = s
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got '{s}'"))?;
    let start: NaiveDate = start.trim().parse().map_err(|e| format!("start date: {e}"))?;
    let end: NaiveDate = end.trim().parse().map_err(|e| format!("end date: {e}"))?;
    DateWindow::new(start, end).map_err(|e| e.to_string())
}

/// The explicit window if given, otherwise `months` ending at `end` (today
/// when unset).
pub fn window_or_lookback(
    window: Option<DateWindow>,
    end: Option<NaiveDate>,
    months: u32,
) -> Result<DateWindow> {
    if let Some(window) = window {
        return Ok(window);
    }
    let end = end.unwrap_or_else(|| chrono::Local::now().date_naive());
    Ok(DateWindow::lookback(end, months)?)
}
