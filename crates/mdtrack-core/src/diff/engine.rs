//! Snapshot diff computation engine.
//!
//! The core entry point is [`compute_diff`], which compares two full
//! snapshots and produces a [`SnapshotDiff`]. The comparison is a full
//! O(rows) re-scan per run; both snapshots are held in memory.

use crate::diff::model::{ModifiedRow, SnapshotDiff, TableChanges};
use crate::errors::{Result, TrackError, TrackErrorKind};
use crate::model::snapshot::{Snapshot, TableData};
use crate::model::value::RowValue;
use crate::model::version::DiffSummary;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Extracts the diff key for a row.
///
/// Injected into [`compute_diff`] so the row-identity contract is explicit
/// and testable rather than a positional convention buried in the engine.
pub trait KeyExtractor {
    /// The key identifying `row` within `table`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if no key can be derived for the row.
    fn key_for(&self, table: &str, columns: &[String], row: &[RowValue]) -> Result<RowValue>;
}

/// Default extractor: the row's first column value.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstColumnKey;

impl KeyExtractor for FirstColumnKey {
    fn key_for(&self, table: &str, _columns: &[String], row: &[RowValue]) -> Result<RowValue> {
        row.first().cloned().ok_or_else(|| {
            TrackError::new(TrackErrorKind::InvalidInput)
                .with_op("key_for")
                .with_table(table)
                .with_message("cannot derive a diff key from a zero-column row")
        })
    }
}

/// Build the key→row mapping for one side of a table.
///
/// # Errors
///
/// Returns `DuplicateKey` when two rows share a key. Non-unique keys mask
/// real data errors, so they abort the diff instead of resolving to
/// last-row-wins.
fn key_rows<'a>(
    table: &str,
    columns: &[String],
    rows: &'a [Vec<RowValue>],
    keys: &dyn KeyExtractor,
) -> Result<BTreeMap<RowValue, &'a Vec<RowValue>>> {
    let mut by_key: BTreeMap<RowValue, &'a Vec<RowValue>> = BTreeMap::new();
    for row in rows {
        let key = keys.key_for(table, columns, row)?;
        if by_key.insert(key.clone(), row).is_some() {
            return Err(TrackError::new(TrackErrorKind::DuplicateKey)
                .with_op("diff")
                .with_table(table)
                .with_key(key.to_string())
                .with_message("table has two rows with the same diff key"));
        }
    }
    Ok(by_key)
}

/// Compute one table's change partition, or `None` if nothing changed.
fn diff_table(
    table: &str,
    old_data: &TableData,
    new_data: &TableData,
    keys: &dyn KeyExtractor,
) -> Result<Option<TableChanges>> {
    let old_by_key = key_rows(table, &old_data.columns, &old_data.rows, keys)?;
    let new_by_key = key_rows(table, &new_data.columns, &new_data.rows, keys)?;

    // Source row order is preserved within each partition.
    let mut added = Vec::new();
    for row in &new_data.rows {
        let key = keys.key_for(table, &new_data.columns, row)?;
        if !old_by_key.contains_key(&key) {
            added.push(row.clone());
        }
    }

    let mut removed = Vec::new();
    let mut modified = Vec::new();
    for row in &old_data.rows {
        let key = keys.key_for(table, &old_data.columns, row)?;
        match new_by_key.get(&key) {
            None => removed.push(row.clone()),
            Some(new_row) if *new_row != row => modified.push(ModifiedRow {
                key,
                before: row.clone(),
                after: (*new_row).clone(),
            }),
            Some(_) => {}
        }
    }

    if added.is_empty() && removed.is_empty() && modified.is_empty() {
        return Ok(None);
    }

    Ok(Some(TableChanges {
        columns: if new_data.columns.is_empty() && !old_data.columns.is_empty() {
            old_data.columns.clone()
        } else {
            new_data.columns.clone()
        },
        added,
        removed,
        modified,
    }))
}

/// Compute a structured, deterministic diff between two snapshots.
///
/// Every table in the union of both snapshots' table names is compared;
/// a table absent from one side is treated as empty, which is how the diff
/// represents whole-table addition and removal. Tables with no changes are
/// omitted from the result.
///
/// # Errors
///
/// - `DuplicateKey` — two rows in one table share a diff key
/// - `InvalidInput` — the extractor could not derive a key for a row
pub fn compute_diff(
    old: &Snapshot,
    new: &Snapshot,
    keys: &dyn KeyExtractor,
    from_hash: &str,
    to_hash: &str,
    date: NaiveDate,
) -> Result<SnapshotDiff> {
    let all_tables: BTreeSet<&str> = old.table_names().chain(new.table_names()).collect();

    let empty = TableData::empty();
    let mut tables: BTreeMap<String, TableChanges> = BTreeMap::new();
    for table in all_tables {
        let old_data = old.get(table).unwrap_or(&empty);
        let new_data = new.get(table).unwrap_or(&empty);
        if let Some(changes) = diff_table(table, old_data, new_data, keys)? {
            tables.insert(table.to_string(), changes);
        }
    }

    let summary = DiffSummary {
        tables_changed: tables.len(),
        added: tables.values().map(|t| t.added.len()).sum(),
        removed: tables.values().map(|t| t.removed.len()).sum(),
        modified: tables.values().map(|t| t.modified.len()).sum(),
    };

    tracing::debug!(
        tables_changed = summary.tables_changed,
        added = summary.added,
        removed = summary.removed,
        modified = summary.modified,
        "Computed snapshot diff"
    );

    Ok(SnapshotDiff {
        from_hash: from_hash.to_string(),
        to_hash: to_hash.to_string(),
        date,
        summary,
        tables,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: Vec<Vec<RowValue>>) -> TableData {
        TableData {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    fn snapshot_with(name: &str, data: TableData) -> Snapshot {
        let mut s = Snapshot::new();
        s.insert(name, data);
        s
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 4).unwrap()
    }

    #[test]
    fn test_identical_snapshots_produce_empty_diff() {
        let data = table(
            &["id", "name"],
            vec![vec![RowValue::Integer(1), RowValue::Text("a".into())]],
        );
        let old = snapshot_with("t", data.clone());
        let new = snapshot_with("t", data);
        let diff = compute_diff(&old, &new, &FirstColumnKey, "aaa", "bbb", date()).unwrap();
        assert!(diff.tables.is_empty());
        assert_eq!(diff.summary, DiffSummary::default());
    }

    #[test]
    fn test_duplicate_key_is_an_error() {
        let data = table(
            &["id", "name"],
            vec![
                vec![RowValue::Integer(1), RowValue::Text("a".into())],
                vec![RowValue::Integer(1), RowValue::Text("b".into())],
            ],
        );
        let old = Snapshot::new();
        let new = snapshot_with("t", data);
        let err = compute_diff(&old, &new, &FirstColumnKey, "aaa", "bbb", date()).unwrap_err();
        assert_eq!(err.kind(), TrackErrorKind::DuplicateKey);
        assert_eq!(err.table(), Some("t"));
        assert_eq!(err.key(), Some("1"));
    }

    #[test]
    fn test_custom_extractor_is_honoured() {
        // Key on the second column instead of the first
        struct SecondColumnKey;
        impl KeyExtractor for SecondColumnKey {
            fn key_for(
                &self,
                table: &str,
                _columns: &[String],
                row: &[RowValue],
            ) -> Result<RowValue> {
                row.get(1).cloned().ok_or_else(|| {
                    TrackError::new(TrackErrorKind::InvalidInput).with_table(table)
                })
            }
        }

        let old = snapshot_with(
            "t",
            table(
                &["id", "code"],
                vec![vec![RowValue::Integer(1), RowValue::Text("x".into())]],
            ),
        );
        let new = snapshot_with(
            "t",
            table(
                &["id", "code"],
                vec![vec![RowValue::Integer(2), RowValue::Text("x".into())]],
            ),
        );
        let diff = compute_diff(&old, &new, &SecondColumnKey, "aaa", "bbb", date()).unwrap();
        // Same second-column key, different row → modified, not add+remove
        let changes = diff.tables.get("t").unwrap();
        assert!(changes.added.is_empty());
        assert!(changes.removed.is_empty());
        assert_eq!(changes.modified.len(), 1);
    }
}
