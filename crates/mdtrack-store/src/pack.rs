//! Asset pack encoding and decoding.
//!
//! Packs a directory tree of structured documents and binary assets into a
//! single compressed blob with an internal offset/length manifest. The
//! uncompressed blob layout:
//!
//! ```text
//! [entry_count: u32 LE]
//! per entry: [key_len: u16 LE][key bytes (UTF-8)][offset: u64 LE][length: u64 LE]
//! [concatenated entry payloads]
//! ```
//!
//! Offsets are relative to the end of the manifest. Entries are sorted by
//! key so packing the same tree always produces the same bytes. The whole
//! blob is zstd-compressed on disk.

use crate::atomic::atomic_write;
use crate::compress::{compress, decompress};
use crate::errors::{io_error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use mdtrack_core::errors::{TrackError, TrackErrorKind};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Structural errors in a pack blob's manifest.
#[derive(Debug, Error)]
pub enum PackFormatError {
    #[error("pack manifest is truncated")]
    Truncated,
    #[error("pack entry key is not valid UTF-8")]
    InvalidKey,
    #[error("entry '{key}' points outside the payload")]
    EntryOutOfBounds { key: String },
}

impl From<PackFormatError> for TrackError {
    fn from(err: PackFormatError) -> Self {
        TrackError::new(TrackErrorKind::CorruptState)
            .with_op("read_pack")
            .with_message(err.to_string())
    }
}

/// One manifest entry: a key and the payload span it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackEntry {
    /// '/'-separated path of the packed file, relative to the source root
    pub key: String,
    /// Byte offset into the payload section
    pub offset: u64,
    /// Payload length in bytes
    pub length: u64,
}

/// Sizes reported after writing a pack.
#[derive(Debug, Clone, Copy)]
pub struct PackStats {
    pub entries: usize,
    pub raw_len: usize,
    pub compressed_len: usize,
}

fn collect_files(dir: &Path, base: &Path, out: &mut Vec<(String, PathBuf)>) -> Result<()> {
    let mut dir_entries: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| io_error("pack_walk", e).with_path(dir.display().to_string()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()
        .map_err(|e| io_error("pack_walk", e).with_path(dir.display().to_string()))?;
    dir_entries.sort();

    for path in dir_entries {
        if path.is_dir() {
            collect_files(&path, base, out)?;
        } else if path.is_file() {
            let rel = path.strip_prefix(base).map_err(|_| {
                TrackError::new(TrackErrorKind::Internal)
                    .with_op("pack_walk")
                    .with_message("walked outside the pack root")
            })?;
            let key = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            out.push((key, path));
        }
    }
    Ok(())
}

/// Pack a directory tree into a compressed blob.
///
/// # Errors
///
/// `InvalidInput` if the tree is empty or a key exceeds the u16 length
/// field; `Io`/`WriteFailure` on filesystem errors.
pub fn pack_tree(src: &Path) -> Result<(Vec<u8>, PackStats)> {
    let mut files = Vec::new();
    collect_files(src, src, &mut files)?;
    // collect_files walks in sorted order per directory; the final key
    // order must be globally sorted
    files.sort_by(|a, b| a.0.cmp(&b.0));

    if files.is_empty() {
        return Err(TrackError::new(TrackErrorKind::InvalidInput)
            .with_op("pack_tree")
            .with_path(src.display().to_string())
            .with_message("nothing to pack: directory contains no files"));
    }

    let mut manifest: Vec<u8> = Vec::new();
    let mut payload: Vec<u8> = Vec::new();

    manifest
        .write_u32::<LittleEndian>(files.len() as u32)
        .map_err(|e| io_error("pack_tree", e))?;

    for (key, path) in &files {
        let bytes =
            fs::read(path).map_err(|e| io_error("pack_tree", e).with_path(key.clone()))?;
        let key_bytes = key.as_bytes();
        if key_bytes.len() > u16::MAX as usize {
            return Err(TrackError::new(TrackErrorKind::InvalidInput)
                .with_op("pack_tree")
                .with_message(format!("key too long for manifest: {}", key)));
        }
        let offset = payload.len() as u64;
        manifest
            .write_u16::<LittleEndian>(key_bytes.len() as u16)
            .map_err(|e| io_error("pack_tree", e))?;
        manifest.extend_from_slice(key_bytes);
        manifest
            .write_u64::<LittleEndian>(offset)
            .map_err(|e| io_error("pack_tree", e))?;
        manifest
            .write_u64::<LittleEndian>(bytes.len() as u64)
            .map_err(|e| io_error("pack_tree", e))?;
        payload.extend_from_slice(&bytes);
    }

    let mut blob = manifest;
    blob.extend_from_slice(&payload);
    let raw_len = blob.len();
    let compressed = compress(&blob)?;
    let stats = PackStats {
        entries: files.len(),
        raw_len,
        compressed_len: compressed.len(),
    };
    Ok((compressed, stats))
}

/// Pack a directory tree and write the blob to `out` atomically.
pub fn write_pack(src: &Path, out: &Path) -> Result<PackStats> {
    let (compressed, stats) = pack_tree(src)?;
    atomic_write(out, &compressed)?;
    tracing::info!(
        entries = stats.entries,
        raw_bytes = stats.raw_len,
        compressed_bytes = stats.compressed_len,
        path = %out.display(),
        "Wrote asset pack"
    );
    Ok(stats)
}

/// Decoded pack blob: parsed manifest plus the payload section.
#[derive(Debug)]
pub struct PackReader {
    entries: Vec<PackEntry>,
    payload: Vec<u8>,
}

impl PackReader {
    /// Decompress and parse a pack blob.
    pub fn from_bytes(compressed: &[u8]) -> Result<Self> {
        let blob = decompress(compressed)?;
        let mut cursor = Cursor::new(blob.as_slice());

        let count = cursor
            .read_u32::<LittleEndian>()
            .map_err(|_| PackFormatError::Truncated)?;

        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let key_len = cursor
                .read_u16::<LittleEndian>()
                .map_err(|_| PackFormatError::Truncated)?;
            let mut key_bytes = vec![0u8; key_len as usize];
            std::io::Read::read_exact(&mut cursor, &mut key_bytes)
                .map_err(|_| PackFormatError::Truncated)?;
            let key =
                String::from_utf8(key_bytes).map_err(|_| PackFormatError::InvalidKey)?;
            let offset = cursor
                .read_u64::<LittleEndian>()
                .map_err(|_| PackFormatError::Truncated)?;
            let length = cursor
                .read_u64::<LittleEndian>()
                .map_err(|_| PackFormatError::Truncated)?;
            entries.push(PackEntry {
                key,
                offset,
                length,
            });
        }

        let payload_start = cursor.position() as usize;
        let payload = blob[payload_start..].to_vec();

        // Bounds-check every entry up front so reads cannot panic later
        for entry in &entries {
            let in_bounds = entry
                .offset
                .checked_add(entry.length)
                .is_some_and(|end| end <= payload.len() as u64);
            if !in_bounds {
                return Err(PackFormatError::EntryOutOfBounds {
                    key: entry.key.clone(),
                }
                .into());
            }
        }

        Ok(Self { entries, payload })
    }

    /// Read and parse a pack file from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let compressed = fs::read(path)
            .map_err(|e| io_error("read_pack", e).with_path(path.display().to_string()))?;
        Self::from_bytes(&compressed)
    }

    pub fn entries(&self) -> &[PackEntry] {
        &self.entries
    }

    /// Payload bytes for a key.
    ///
    /// # Errors
    ///
    /// `NotFound` when the key is not in the manifest.
    pub fn get(&self, key: &str) -> Result<&[u8]> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.key == key)
            .ok_or_else(|| {
                TrackError::new(TrackErrorKind::NotFound)
                    .with_op("read_pack")
                    .with_key(key)
                    .with_message("key not present in pack manifest")
            })?;
        let start = entry.offset as usize;
        let end = start + entry.length as usize;
        Ok(&self.payload[start..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seeded_tree(dir: &TempDir) -> PathBuf {
        let root = dir.path().join("assets");
        fs::create_dir_all(root.join("icons")).unwrap();
        fs::write(root.join("data.json"), b"{\"k\":1}").unwrap();
        fs::write(root.join("icons/a.png"), [137, 80, 78, 71]).unwrap();
        fs::write(root.join("icons/b.png"), b"").unwrap();
        root
    }

    #[test]
    fn test_pack_round_trip() {
        let dir = TempDir::new().unwrap();
        let root = seeded_tree(&dir);

        let (blob, stats) = pack_tree(&root).unwrap();
        assert_eq!(stats.entries, 3);

        let reader = PackReader::from_bytes(&blob).unwrap();
        assert_eq!(reader.get("data.json").unwrap(), b"{\"k\":1}");
        assert_eq!(reader.get("icons/a.png").unwrap(), [137, 80, 78, 71]);
        assert_eq!(reader.get("icons/b.png").unwrap(), b"");
    }

    #[test]
    fn test_manifest_keys_are_sorted() {
        let dir = TempDir::new().unwrap();
        let root = seeded_tree(&dir);

        let (blob, _) = pack_tree(&root).unwrap();
        let reader = PackReader::from_bytes(&blob).unwrap();
        let keys: Vec<&str> = reader.entries().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["data.json", "icons/a.png", "icons/b.png"]);
    }

    #[test]
    fn test_packing_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let root = seeded_tree(&dir);

        let (blob1, _) = pack_tree(&root).unwrap();
        let (blob2, _) = pack_tree(&root).unwrap();
        assert_eq!(blob1, blob2);
    }

    #[test]
    fn test_offsets_are_contiguous() {
        let dir = TempDir::new().unwrap();
        let root = seeded_tree(&dir);

        let (blob, _) = pack_tree(&root).unwrap();
        let reader = PackReader::from_bytes(&blob).unwrap();
        let mut expected_offset = 0u64;
        for entry in reader.entries() {
            assert_eq!(entry.offset, expected_offset);
            expected_offset += entry.length;
        }
    }

    #[test]
    fn test_missing_key_is_not_found() {
        let dir = TempDir::new().unwrap();
        let root = seeded_tree(&dir);

        let (blob, _) = pack_tree(&root).unwrap();
        let reader = PackReader::from_bytes(&blob).unwrap();
        let err = reader.get("absent.bin").unwrap_err();
        assert_eq!(err.kind(), TrackErrorKind::NotFound);
    }

    #[test]
    fn test_empty_tree_is_rejected() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("empty");
        fs::create_dir_all(&root).unwrap();
        let err = pack_tree(&root).unwrap_err();
        assert_eq!(err.kind(), TrackErrorKind::InvalidInput);
    }

    #[test]
    fn test_truncated_blob_is_corrupt_state() {
        let dir = TempDir::new().unwrap();
        let root = seeded_tree(&dir);

        let (blob, _) = pack_tree(&root).unwrap();
        let decompressed = crate::compress::decompress(&blob).unwrap();
        // Re-compress a manifest cut mid-entry
        let cut = crate::compress::compress(&decompressed[..5]).unwrap();
        let err = PackReader::from_bytes(&cut).unwrap_err();
        assert_eq!(err.kind(), TrackErrorKind::CorruptState);
    }

    #[test]
    fn test_write_pack_creates_file() {
        let dir = TempDir::new().unwrap();
        let root = seeded_tree(&dir);
        let out = dir.path().join("gamedata.bin.zst");

        let stats = write_pack(&root, &out).unwrap();
        assert_eq!(stats.entries, 3);

        let reader = PackReader::open(&out).unwrap();
        assert_eq!(reader.entries().len(), 3);
    }
}
