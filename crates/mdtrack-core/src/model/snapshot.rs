//! Full structural snapshots of the relational source.
//!
//! A snapshot maps every table name to its ordered columns and rows.
//! `BTreeMap` keeps table iteration name-sorted so snapshot artifacts
//! serialize deterministically across runs.

use crate::model::value::RowValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One table's full contents: ordered column names plus ordered rows.
///
/// Invariant: every row has exactly `columns.len()` values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<RowValue>>,
}

impl TableData {
    /// An empty table (no columns, no rows), used by the diff engine to
    /// represent a table absent from one side.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.rows.is_empty()
    }
}

/// A complete capture of every table at one point in time.
///
/// Snapshots are immutable once written; a new run always produces a fresh
/// snapshot rather than mutating the prior one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    tables: BTreeMap<String, TableData>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a table. Used only while building a snapshot.
    pub fn insert(&mut self, name: impl Into<String>, data: TableData) {
        self.tables.insert(name.into(), data);
    }

    pub fn get(&self, name: &str) -> Option<&TableData> {
        self.tables.get(name)
    }

    /// Table names in sorted order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TableData)> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl FromIterator<(String, TableData)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, TableData)>>(iter: I) -> Self {
        Self {
            tables: iter.into_iter().collect(),
        }
    }
}
