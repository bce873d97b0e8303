use anyhow::Result;
use clap::Args;

use crate::config;
use crate::desk::catalog::Catalog;

#[derive(Debug, Args, Clone)]
pub struct CatalogArgs {
    /// Print the catalog as JSON.
    #[arg(long)]
    json: bool,
}

pub fn run(args: CatalogArgs) -> Result<()> {
    let catalog = Catalog::builtin().extended(config::load_documents()?);

    if args.json {
        println!("{}", serde_json::to_string_pretty(catalog.documents())?);
        return Ok(());
    }

    for (index, document) in catalog.documents().iter().enumerate() {
        println!("{:>2}. {}\n    {}", index + 1, document.title, document.url);
    }
    Ok(())
}
