//! Diff inspection command

use clap::Args;
use mdtrack_store::FsArtifactStore;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Short hash of the arriving version whose diff to show
    pub short_hash: String,

    /// Artifact root directory
    #[arg(long, default_value = ".mdtrack")]
    pub out: String,

    /// Print the full diff document as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: ShowArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = FsArtifactStore::new(&args.out);
    let diff = store.load_diff(&args.short_hash)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&diff)?);
        return Ok(());
    }

    println!(
        "Diff {} → {} ({})",
        mdtrack_core::digest::short_hash(&diff.from_hash),
        mdtrack_core::digest::short_hash(&diff.to_hash),
        diff.date
    );
    println!(
        "  {} tables changed (+{} -{} ~{})",
        diff.summary.tables_changed, diff.summary.added, diff.summary.removed, diff.summary.modified
    );
    for (table, changes) in &diff.tables {
        println!(
            "  {}: +{} -{} ~{}",
            table,
            changes.added.len(),
            changes.removed.len(),
            changes.modified.len()
        );
    }

    Ok(())
}
