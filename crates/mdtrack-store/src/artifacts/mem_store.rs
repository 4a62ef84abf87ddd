//! In-memory artifact store for tests.
//!
//! Mirrors the filesystem store's semantics (including write-once diffs
//! and ledger validation) and counts every write call, which is how the
//! "no writes on an unchanged source" property is asserted.

use crate::artifacts::{validate_append, ArtifactStore};
use crate::errors::Result;
use mdtrack_core::errors::{TrackError, TrackErrorKind};
use mdtrack_core::model::{PointerRecord, Snapshot, VersionEntry};
use mdtrack_core::SnapshotDiff;
use std::collections::BTreeMap;

/// Artifact store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    pointer: Option<PointerRecord>,
    ledger: Vec<VersionEntry>,
    snapshot: Option<Snapshot>,
    raw_archive: Option<Vec<u8>>,
    diffs: BTreeMap<String, SnapshotDiff>,
    write_count: usize,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of write operations performed against this store.
    pub fn write_count(&self) -> usize {
        self.write_count
    }

    pub fn raw_archive(&self) -> Option<&[u8]> {
        self.raw_archive.as_deref()
    }

    pub fn diff(&self, short_hash: &str) -> Option<&SnapshotDiff> {
        self.diffs.get(short_hash)
    }

    pub fn diff_count(&self) -> usize {
        self.diffs.len()
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn load_pointer(&self) -> Result<Option<PointerRecord>> {
        Ok(self.pointer.clone())
    }

    fn load_ledger(&self) -> Result<Vec<VersionEntry>> {
        Ok(self.ledger.clone())
    }

    fn load_snapshot(&self) -> Result<Option<Snapshot>> {
        Ok(self.snapshot.clone())
    }

    fn write_raw_archive(&mut self, raw: &[u8]) -> Result<()> {
        self.write_count += 1;
        self.raw_archive = Some(raw.to_vec());
        Ok(())
    }

    fn write_snapshot(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.write_count += 1;
        self.snapshot = Some(snapshot.clone());
        Ok(())
    }

    fn write_diff(&mut self, short_hash: &str, diff: &SnapshotDiff) -> Result<()> {
        self.write_count += 1;
        if let Some(existing) = self.diffs.get(short_hash) {
            if existing == diff {
                return Ok(());
            }
            return Err(TrackError::new(TrackErrorKind::WriteFailure)
                .with_op("write_diff")
                .with_message("diff artifact already exists with different content"));
        }
        self.diffs.insert(short_hash.to_string(), diff.clone());
        Ok(())
    }

    fn append_entry(&mut self, entry: VersionEntry) -> Result<()> {
        self.write_count += 1;
        validate_append(&self.ledger, &entry)?;
        self.ledger.push(entry);
        Ok(())
    }

    fn update_pointer(&mut self, pointer: &PointerRecord) -> Result<()> {
        self.write_count += 1;
        self.pointer = Some(pointer.clone());
        Ok(())
    }
}
