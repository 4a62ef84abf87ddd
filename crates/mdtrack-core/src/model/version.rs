//! Version-chain records: ledger entries, diff summaries, and the pointer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Aggregate change counts across all tables that appear in a diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    /// Number of tables with at least one added/removed/modified row
    pub tables_changed: usize,
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

/// One entry in the append-only version ledger.
///
/// Chain property: `previous_hash` of entry *n* equals `hash` of entry
/// *n-1*; only the first-ever entry has no previous hash. `summary` is
/// absent for the first entry (there was nothing to diff against).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionEntry {
    /// Full content hash of the raw source (64 hex chars)
    pub hash: String,
    /// First 12 hex characters of `hash`, used in filenames and display
    pub short_hash: String,
    /// Date the version was recorded (ISO-8601)
    pub date: NaiveDate,
    pub previous_hash: Option<String>,
    pub summary: Option<DiffSummary>,
}

/// The most recently fully-processed source hash.
///
/// Used solely to short-circuit re-processing an identical source;
/// rewritten as the final step of every successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerRecord {
    pub hash: String,
    pub date: NaiveDate,
    pub previous_hash: Option<String>,
}
