//! Snapshot diff output types.
//!
//! All types implement `Debug, Clone, Serialize, Deserialize, PartialEq`.
//! Collections use `BTreeMap` for deterministic serialization.

use crate::model::value::RowValue;
use crate::model::version::DiffSummary;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A row present in both snapshots whose contents changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifiedRow {
    /// The diff key shared by both versions of the row
    pub key: RowValue,
    /// The full row as it appeared in the previous snapshot
    pub before: Vec<RowValue>,
    /// The full row as it appears in the current snapshot
    pub after: Vec<RowValue>,
}

/// Per-table change partition.
///
/// Invariants: `added` and `removed` are disjoint by key, and every
/// `modified` entry's key exists in both input snapshots for this table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableChanges {
    /// Column names (current snapshot's if the table exists there)
    pub columns: Vec<String>,
    /// Rows whose key exists only in the current snapshot
    pub added: Vec<Vec<RowValue>>,
    /// Rows whose key exists only in the previous snapshot
    pub removed: Vec<Vec<RowValue>>,
    /// Rows present on both sides with differing contents
    pub modified: Vec<ModifiedRow>,
}

impl TableChanges {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

/// The full diff between two consecutive snapshots.
///
/// A table appears in `tables` only if it has at least one added, removed,
/// or modified row, so diff artifacts stay proportional to actual change
/// volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDiff {
    /// Content hash of the source the previous snapshot was taken from
    pub from_hash: String,
    /// Content hash of the arriving source
    pub to_hash: String,
    /// Date the diff was computed (ISO-8601)
    pub date: NaiveDate,
    pub summary: DiffSummary,
    pub tables: BTreeMap<String, TableChanges>,
}
