//! Projection export command

use clap::Args;
use mdtrack_engine::projection::{export_projections, load_defs};
use mdtrack_store::SqliteSource;
use std::path::Path;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Path to the master SQLite database
    #[arg(long, default_value = "master.db")]
    pub db: String,

    /// JSON file of projection definitions ([{"name", "query"}, ...])
    #[arg(long)]
    pub defs: String,

    /// Output file for the compressed projection document
    #[arg(long, default_value = ".mdtrack/projections.json.zst")]
    pub output: String,
}

pub fn execute(args: ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let defs = load_defs(Path::new(&args.defs))?;
    let source = SqliteSource::open(&args.db)?;
    let counts = export_projections(&source, &defs, Path::new(&args.output))?;

    println!("Projections exported to {}:", args.output);
    for (name, count) in &counts {
        println!("  {}: {} records", name, count);
    }

    Ok(())
}
