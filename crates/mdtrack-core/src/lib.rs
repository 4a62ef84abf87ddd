//! mdtrack Core - Data model and pure algorithms for master-dataset tracking
//!
//! This crate provides the foundational pieces of mdtrack, including:
//! - `RowValue` tagged scalar values mirroring SQLite storage classes
//! - Snapshot and version-ledger data models
//! - Content hashing (SHA-256, 12-character short hashes)
//! - The keyed snapshot diff engine
//! - The canonical error facility and logging initialization
//!
//! Everything here is pure: no filesystem, database, or network access.

pub mod diff;
pub mod digest;
pub mod errors;
pub mod logging;
pub mod model;

// Re-export commonly used types
pub use diff::engine::{compute_diff, FirstColumnKey, KeyExtractor};
pub use diff::model::SnapshotDiff;
pub use errors::{Result, TrackError, TrackErrorKind};
pub use model::{DiffSummary, PointerRecord, RowValue, Snapshot, TableData, VersionEntry};
