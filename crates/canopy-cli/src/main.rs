mod commands;
mod progress;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "canopy", about = "Satellite deforestation alert tool")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full change-detection analysis
    Run(commands::pipeline::RunArgs),
    /// Build the median composite of one window
    Composite(commands::composite::CompositeArgs),
    /// List scenes passing the region, window and cloud filters
    Scenes(commands::scenes::ScenesArgs),
    /// List regions or the sub-regions of one region
    Regions(commands::regions::RegionsArgs),
    /// Print an example analysis config
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Run(args) => commands::pipeline::run(args),
        Commands::Composite(args) => commands::composite::run(args),
        Commands::Scenes(args) => commands::scenes::run(args),
        Commands::Regions(args) => commands::regions::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
