//! Atomic write primitives
//!
//! Uses temp→rename pattern to ensure no partial writes

use crate::errors::{write_failure, Result};
use std::fs;
use std::path::Path;

/// Atomically write bytes to a file
///
/// Uses temp file + rename so readers never observe a torn file
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    // Create parent directory if it doesn't exist
    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|e| write_failure("create_artifact_dir", parent, e))?;
    }

    // Create temp file in the same directory
    let temp_path = target_path.with_extension("tmp");

    fs::write(&temp_path, content).map_err(|e| write_failure("write_artifact_temp", &temp_path, e))?;

    // Atomically rename temp to target
    fs::rename(&temp_path, target_path)
        .map_err(|e| write_failure("rename_artifact_temp", target_path, e))?;

    Ok(())
}
