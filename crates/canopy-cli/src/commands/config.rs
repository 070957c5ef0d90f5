use std::path::PathBuf;

use anyhow::{Context, Result};
use canopy_core::pipeline::{AnalysisRequest, Preset};
use clap::Args;

use super::args::PresetArg;

#[derive(Args)]
pub struct ConfigArgs {
    /// Threshold preset to fill in
    #[arg(long, value_enum, default_value = "standard")]
    pub preset: PresetArg,

    /// Write config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save a complete example AnalysisRequest as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let config = AnalysisRequest::example().with_preset(Preset::from(args.preset));
    let toml_str = toml::to_string_pretty(&config)?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Default config saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}
