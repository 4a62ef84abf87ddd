//! Version ledger listing command

use clap::Args;
use mdtrack_store::{ArtifactStore, FsArtifactStore};

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Artifact root directory
    #[arg(long, default_value = ".mdtrack")]
    pub out: String,
}

pub fn execute(args: HistoryArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = FsArtifactStore::new(&args.out);
    let ledger = store.load_ledger()?;

    if ledger.is_empty() {
        println!("No versions recorded yet");
        return Ok(());
    }

    for entry in &ledger {
        let change = match &entry.summary {
            Some(s) => format!(
                "{} tables changed (+{} -{} ~{})",
                s.tables_changed, s.added, s.removed, s.modified
            ),
            None => "initial version".to_string(),
        };
        println!("{}  {}  {}", entry.short_hash, entry.date, change);
    }

    Ok(())
}
