//! Run orchestration: the snapshot/diff/version-chain state machine.
//!
//! States: `START → HASHED → (UNCHANGED_STOP | SNAPSHOTTED → DIFFED → PERSISTED)`.
//!
//! One run processes one source to completion or aborts. The pointer/meta
//! record is only rewritten as the very last step, so any failure before
//! that leaves the pre-run state intact and a re-run safely redoes the
//! work. No step is retried within a run.

use chrono::NaiveDate;
use mdtrack_core::digest::{hash_bytes, short_hash};
use mdtrack_core::diff::engine::{compute_diff, FirstColumnKey};
use mdtrack_core::errors::Result;
use mdtrack_core::model::{PointerRecord, VersionEntry};
use mdtrack_store::{ArtifactStore, SqliteSource};

/// Terminal state of one pipeline run.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The source hash matches the pointer; nothing was written.
    Unchanged { hash: String },
    /// A new version was recorded in the ledger.
    Recorded {
        entry: VersionEntry,
        /// True when this was the first-ever run (no diff was produced).
        first_run: bool,
    },
}

/// Execute one tracking run against the given source and artifact store.
///
/// # Errors
///
/// - `SourceAccess` — the source cannot be read or scanned; nothing is written
/// - `CorruptState` — persisted pointer/ledger/snapshot cannot be decoded
/// - `DuplicateKey` — a table has rows sharing a diff key
/// - `WriteFailure` / `ChainViolation` — persisting an artifact failed; the
///   pointer still names the previous version, so a re-run redoes the work
pub fn run_pipeline(
    source: &SqliteSource,
    store: &mut dyn ArtifactStore,
    date: NaiveDate,
) -> Result<RunOutcome> {
    // START → HASHED
    let raw = source.raw_bytes()?;
    let hash = hash_bytes(&raw);
    let short = short_hash(&hash).to_string();

    // HASHED → UNCHANGED_STOP: identical source is a guaranteed no-op
    let pointer = store.load_pointer()?;
    if let Some(p) = &pointer {
        if p.hash == hash {
            tracing::info!(hash = %short, "Source unchanged, skipping run");
            return Ok(RunOutcome::Unchanged { hash });
        }
    }

    // HASHED → SNAPSHOTTED. The scan happens before any write so a source
    // failure aborts with zero artifacts touched.
    let current = source.snapshot()?;
    let previous = match &pointer {
        Some(_) => store.load_snapshot()?,
        None => None,
    };
    store.write_raw_archive(&raw)?;
    tracing::info!(
        hash = %short,
        tables = current.len(),
        "Captured snapshot of changed source"
    );

    // SNAPSHOTTED → DIFFED: skipped on the first-ever run
    let summary = match &previous {
        Some(prev) => {
            let from_hash = pointer
                .as_ref()
                .map(|p| p.hash.as_str())
                .unwrap_or_default();
            let diff = compute_diff(prev, &current, &FirstColumnKey, from_hash, &hash, date)?;
            let summary = diff.summary;
            store.write_diff(&short, &diff)?;
            tracing::info!(
                hash = %short,
                tables_changed = summary.tables_changed,
                added = summary.added,
                removed = summary.removed,
                modified = summary.modified,
                "Recorded diff"
            );
            Some(summary)
        }
        None => None,
    };

    // DIFFED → PERSISTED: snapshot, ledger entry, then the pointer last
    store.write_snapshot(&current)?;

    let previous_hash = pointer.map(|p| p.hash);
    let entry = VersionEntry {
        hash: hash.clone(),
        short_hash: short.clone(),
        date,
        previous_hash: previous_hash.clone(),
        summary,
    };
    store.append_entry(entry.clone())?;
    store.update_pointer(&PointerRecord {
        hash,
        date,
        previous_hash,
    })?;

    tracing::info!(hash = %short, "Version recorded");
    Ok(RunOutcome::Recorded {
        first_run: entry.previous_hash.is_none(),
        entry,
    })
}
