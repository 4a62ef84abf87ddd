//! Tracking run command

use clap::Args;
use mdtrack_core::digest::short_hash;
use mdtrack_engine::{run_pipeline, RunOutcome};
use mdtrack_store::{FsArtifactStore, SqliteSource};

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Path to the master SQLite database
    #[arg(long, default_value = "master.db")]
    pub db: String,

    /// Artifact root directory
    #[arg(long, default_value = ".mdtrack")]
    pub out: String,
}

pub fn execute(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let source = SqliteSource::open(&args.db)?;
    let mut store = FsArtifactStore::new(&args.out);
    let today = chrono::Local::now().date_naive();

    match run_pipeline(&source, &mut store, today)? {
        RunOutcome::Unchanged { hash } => {
            println!(
                "Source unchanged (hash={}), nothing recorded",
                short_hash(&hash)
            );
        }
        RunOutcome::Recorded { entry, first_run } => {
            println!("Version recorded:");
            println!("  short_hash: {}", entry.short_hash);
            println!("  date: {}", entry.date);
            match (&entry.summary, first_run) {
                (Some(s), _) => {
                    println!("  tables_changed: {}", s.tables_changed);
                    println!(
                        "  added: {}  removed: {}  modified: {}",
                        s.added, s.removed, s.modified
                    );
                }
                (None, true) => println!("  (first version, no diff)"),
                (None, false) => println!("  (previous snapshot missing, diff skipped)"),
            }
        }
    }

    Ok(())
}
