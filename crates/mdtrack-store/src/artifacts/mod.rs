//! Artifact persistence: ledger, pointer, snapshot, diff, and raw archive.
//!
//! The pipeline talks to persistent state exclusively through the
//! [`ArtifactStore`] trait so tests can substitute the in-memory backend.
//! Writes are whole-file; the ledger append rewrites the full ledger.

mod fs_store;
mod mem_store;

pub use fs_store::FsArtifactStore;
pub use mem_store::MemoryArtifactStore;

use crate::errors::Result;
use mdtrack_core::errors::{TrackError, TrackErrorKind};
use mdtrack_core::model::{PointerRecord, Snapshot, VersionEntry};
use mdtrack_core::SnapshotDiff;

/// Pointer/meta record filename.
pub const POINTER_FILE: &str = "meta.json";
/// Version ledger filename.
pub const LEDGER_FILE: &str = "versions.json";
/// Latest-snapshot artifact filename (only the latest is retained).
pub const SNAPSHOT_FILE: &str = "snapshot.json.zst";
/// Raw-source archive filename.
pub const ARCHIVE_FILE: &str = "source.db.zst";
/// Directory holding one diff artifact per version transition.
pub const DIFFS_DIR: &str = "diffs";

/// Persistent store for all version-chain artifacts.
///
/// Reads return `None`/empty when state does not exist yet (first-ever
/// run) and `CorruptState` when it exists but cannot be decoded. The
/// append/update operations are expected to be called in pipeline order:
/// archive and snapshot first, diff next, ledger entry, then the pointer
/// as the final step of a run.
pub trait ArtifactStore {
    fn load_pointer(&self) -> Result<Option<PointerRecord>>;
    fn load_ledger(&self) -> Result<Vec<VersionEntry>>;
    fn load_snapshot(&self) -> Result<Option<Snapshot>>;

    /// (Over)write the compressed byte-for-byte copy of the source.
    fn write_raw_archive(&mut self, raw: &[u8]) -> Result<()>;
    /// (Over)write the compressed latest snapshot.
    fn write_snapshot(&mut self, snapshot: &Snapshot) -> Result<()>;
    /// Write the diff artifact for the arriving version, keyed by its
    /// short hash. Diffs are never overwritten with different content.
    fn write_diff(&mut self, short_hash: &str, diff: &SnapshotDiff) -> Result<()>;

    /// Append a version entry, rewriting the full ledger.
    fn append_entry(&mut self, entry: VersionEntry) -> Result<()>;
    /// Rewrite the pointer/meta record. Must be the last write of a run.
    fn update_pointer(&mut self, pointer: &PointerRecord) -> Result<()>;
}

/// Validate the ledger invariants before appending `entry`.
///
/// # Errors
///
/// `ChainViolation` when the entry's hash already exists in the ledger or
/// its `previous_hash` does not match the current tail.
pub(crate) fn validate_append(ledger: &[VersionEntry], entry: &VersionEntry) -> Result<()> {
    if ledger.iter().any(|e| e.hash == entry.hash) {
        return Err(TrackError::new(TrackErrorKind::ChainViolation)
            .with_op("append_entry")
            .with_message(format!(
                "hash {} already recorded in the ledger",
                entry.short_hash
            )));
    }
    let tail_hash = ledger.last().map(|e| e.hash.as_str());
    if entry.previous_hash.as_deref() != tail_hash {
        return Err(TrackError::new(TrackErrorKind::ChainViolation)
            .with_op("append_entry")
            .with_message(format!(
                "previous_hash {:?} does not match ledger tail {:?}",
                entry.previous_hash, tail_hash
            )));
    }
    Ok(())
}
