use anyhow::Result;
use canopy_core::region::{partition, RegionCatalog};
use clap::Args;

use super::args::CatalogArgs;

#[derive(Args)]
pub struct RegionsArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// List the sub-regions of this region instead of the top level
    #[arg(long)]
    pub parent: Option<String>,
}

pub fn run(args: &RegionsArgs) -> Result<()> {
    let catalog = args.catalog.load()?;

    let regions = match args.parent {
        Some(ref parent) => partition(&catalog, parent)?,
        None => {
            let mut top: Vec<_> = catalog
                .regions()?
                .into_iter()
                .filter(|r| r.parent.is_none())
                .collect();
            top.sort_by(|a, b| a.name.cmp(&b.name));
            top
        }
    };

    for region in &regions {
        match region.bounds() {
            Some(b) => println!(
                "{:<32} [{:.1}, {:.1}] - [{:.1}, {:.1}]",
                region.name, b.min_x, b.min_y, b.max_x, b.max_y
            ),
            None => println!("{:<32} (empty boundary)", region.name),
        }
    }

    let protected = catalog.protected_areas()?;
    if args.parent.is_none() && !protected.is_empty() {
        println!("\nProtected areas: {}", protected.len());
    }

    Ok(())
}
