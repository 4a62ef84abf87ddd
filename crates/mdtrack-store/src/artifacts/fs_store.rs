//! Filesystem artifact store.
//!
//! Layout under the artifact root:
//!
//! ```text
//! meta.json            pointer/meta record (pretty JSON, overwritten)
//! versions.json        full ledger (pretty JSON, rewritten on append)
//! snapshot.json.zst    latest snapshot (compact JSON, zstd, overwritten)
//! source.db.zst        raw source archive (zstd, overwritten)
//! diffs/<short>.json.zst  one per version transition, write-once
//! ```

use crate::artifacts::{
    validate_append, ArtifactStore, ARCHIVE_FILE, DIFFS_DIR, LEDGER_FILE, POINTER_FILE,
    SNAPSHOT_FILE,
};
use crate::atomic::atomic_write;
use crate::compress::{compress, decompress};
use crate::errors::{corrupt_state, io_error, serialization_error, Result};
use mdtrack_core::errors::{TrackError, TrackErrorKind};
use mdtrack_core::model::{PointerRecord, Snapshot, VersionEntry};
use mdtrack_core::SnapshotDiff;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Artifact store rooted at a directory on disk.
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    /// Create a store over the given artifact root. The directory is
    /// created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the diff artifact for a short hash.
    pub fn diff_path(&self, short_hash: &str) -> PathBuf {
        self.root
            .join(DIFFS_DIR)
            .join(format!("{}.json.zst", short_hash))
    }

    /// Read and decode the diff artifact for a short hash.
    ///
    /// # Errors
    ///
    /// `NotFound` if no diff was recorded for that hash, `CorruptState`
    /// if the file exists but cannot be decoded.
    pub fn load_diff(&self, short_hash: &str) -> Result<SnapshotDiff> {
        let path = self.diff_path(short_hash);
        if !path.exists() {
            return Err(TrackError::new(TrackErrorKind::NotFound)
                .with_op("load_diff")
                .with_path(path.display().to_string())
                .with_message(format!("no diff recorded for {}", short_hash)));
        }
        read_compressed_json(&path, "load_diff")
    }

    fn read_plain_json<T: DeserializeOwned>(&self, file: &str, op: &str) -> Result<Option<T>> {
        let path = self.root.join(file);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)
            .map_err(|e| io_error(op, e).with_path(path.display().to_string()))?;
        let value = serde_json::from_slice(&bytes)
            .map_err(|e| corrupt_state(op, &path, e.to_string()))?;
        Ok(Some(value))
    }

    fn write_plain_json<T: Serialize>(&self, file: &str, op: &str, value: &T) -> Result<()> {
        let json = serde_json::to_vec_pretty(value).map_err(|e| serialization_error(op, e))?;
        atomic_write(&self.root.join(file), &json)
    }
}

fn read_compressed_json<T: DeserializeOwned>(path: &Path, op: &str) -> Result<T> {
    let compressed =
        fs::read(path).map_err(|e| io_error(op, e).with_path(path.display().to_string()))?;
    let bytes =
        decompress(&compressed).map_err(|e| corrupt_state(op, path, e.message().to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| corrupt_state(op, path, e.to_string()))
}

impl ArtifactStore for FsArtifactStore {
    fn load_pointer(&self) -> Result<Option<PointerRecord>> {
        self.read_plain_json(POINTER_FILE, "load_pointer")
    }

    fn load_ledger(&self) -> Result<Vec<VersionEntry>> {
        Ok(self
            .read_plain_json(LEDGER_FILE, "load_ledger")?
            .unwrap_or_default())
    }

    fn load_snapshot(&self) -> Result<Option<Snapshot>> {
        let path = self.root.join(SNAPSHOT_FILE);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(read_compressed_json(&path, "load_snapshot")?))
    }

    fn write_raw_archive(&mut self, raw: &[u8]) -> Result<()> {
        let compressed = compress(raw)?;
        let path = self.root.join(ARCHIVE_FILE);
        atomic_write(&path, &compressed)?;
        tracing::debug!(
            path = %path.display(),
            raw_bytes = raw.len(),
            compressed_bytes = compressed.len(),
            "Archived raw source"
        );
        Ok(())
    }

    fn write_snapshot(&mut self, snapshot: &Snapshot) -> Result<()> {
        let json =
            serde_json::to_vec(snapshot).map_err(|e| serialization_error("write_snapshot", e))?;
        let compressed = compress(&json)?;
        let path = self.root.join(SNAPSHOT_FILE);
        atomic_write(&path, &compressed)?;
        tracing::debug!(
            path = %path.display(),
            tables = snapshot.len(),
            json_bytes = json.len(),
            "Persisted snapshot"
        );
        Ok(())
    }

    fn write_diff(&mut self, short_hash: &str, diff: &SnapshotDiff) -> Result<()> {
        let json = serde_json::to_vec(diff).map_err(|e| serialization_error("write_diff", e))?;
        let path = self.diff_path(short_hash);
        if path.exists() {
            // Write-once: a retried run re-producing the same diff is fine,
            // anything else would rewrite history
            let existing: Vec<u8> = {
                let compressed = fs::read(&path)
                    .map_err(|e| io_error("write_diff", e).with_path(path.display().to_string()))?;
                decompress(&compressed)?
            };
            if existing == json {
                return Ok(());
            }
            return Err(TrackError::new(TrackErrorKind::WriteFailure)
                .with_op("write_diff")
                .with_path(path.display().to_string())
                .with_message("diff artifact already exists with different content"));
        }
        atomic_write(&path, &compress(&json)?)?;
        tracing::debug!(
            path = %path.display(),
            tables_changed = diff.summary.tables_changed,
            "Persisted diff"
        );
        Ok(())
    }

    fn append_entry(&mut self, entry: VersionEntry) -> Result<()> {
        let mut ledger = self.load_ledger()?;
        validate_append(&ledger, &entry)?;
        ledger.push(entry);
        self.write_plain_json(LEDGER_FILE, "append_entry", &ledger)?;
        tracing::debug!(entries = ledger.len(), "Rewrote version ledger");
        Ok(())
    }

    fn update_pointer(&mut self, pointer: &PointerRecord) -> Result<()> {
        self.write_plain_json(POINTER_FILE, "update_pointer", pointer)?;
        tracing::debug!(hash = %pointer.hash, "Updated pointer");
        Ok(())
    }
}
