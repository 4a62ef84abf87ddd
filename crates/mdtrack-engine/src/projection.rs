//! Fixed-query table projections.
//!
//! Downstream consumers want typed record sets, not raw table dumps. A
//! projection definition names a record set and the SELECT that produces
//! it; running the set maps every result row to an object keyed by the
//! query's column names. Projections read the same source the tracker
//! reads but are otherwise independent of the version chain.

use mdtrack_core::errors::{Result, TrackError, TrackErrorKind};
use mdtrack_core::model::RowValue;
use mdtrack_store::atomic::atomic_write;
use mdtrack_store::compress::compress;
use mdtrack_store::errors::{from_rusqlite, io_error, serialization_error};
use mdtrack_store::source::row_value_from_sql;
use mdtrack_store::SqliteSource;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// One named record set and the fixed query that produces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionDef {
    pub name: String,
    pub query: String,
}

/// A projected record: column name → scalar value.
pub type Record = BTreeMap<String, RowValue>;

/// Load projection definitions from a JSON file.
///
/// # Errors
///
/// `InvalidInput` for duplicate or empty names; `Io`/`Serialization` for
/// unreadable files.
pub fn load_defs(path: &Path) -> Result<Vec<ProjectionDef>> {
    let bytes = fs::read(path)
        .map_err(|e| io_error("load_projection_defs", e).with_path(path.display().to_string()))?;
    let defs: Vec<ProjectionDef> =
        serde_json::from_slice(&bytes).map_err(|e| serialization_error("load_projection_defs", e))?;

    let mut seen = BTreeSet::new();
    for def in &defs {
        if def.name.trim().is_empty() {
            return Err(TrackError::new(TrackErrorKind::InvalidInput)
                .with_op("load_projection_defs")
                .with_message("projection definition has an empty name"));
        }
        if !seen.insert(def.name.as_str()) {
            return Err(TrackError::new(TrackErrorKind::InvalidInput)
                .with_op("load_projection_defs")
                .with_message(format!("duplicate projection name: {}", def.name)));
        }
    }
    Ok(defs)
}

/// Run one projection query.
fn run_one(source: &SqliteSource, def: &ProjectionDef) -> Result<Vec<Record>> {
    let mut stmt = source
        .connection()
        .prepare(&def.query)
        .map_err(|e| from_rusqlite("projection", e).with_table(def.name.clone()))?;

    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

    let mut records = Vec::new();
    let mut rows = stmt
        .query([])
        .map_err(|e| from_rusqlite("projection", e).with_table(def.name.clone()))?;
    while let Some(row) = rows
        .next()
        .map_err(|e| from_rusqlite("projection", e).with_table(def.name.clone()))?
    {
        let mut record = Record::new();
        for (i, column) in columns.iter().enumerate() {
            let value = row
                .get_ref(i)
                .map_err(|e| from_rusqlite("projection", e).with_table(def.name.clone()))?;
            record.insert(column.clone(), row_value_from_sql(value));
        }
        records.push(record);
    }
    Ok(records)
}

/// Run every projection definition against the source.
///
/// # Errors
///
/// Query failures are `SourceAccess` and abort the whole export; there is
/// no partial-success mode.
pub fn run_projections(
    source: &SqliteSource,
    defs: &[ProjectionDef],
) -> Result<BTreeMap<String, Vec<Record>>> {
    let mut sets = BTreeMap::new();
    for def in defs {
        let records = run_one(source, def)?;
        tracing::debug!(name = %def.name, records = records.len(), "Projected record set");
        sets.insert(def.name.clone(), records);
    }
    Ok(sets)
}

/// Run all projections and write the combined document, compressed.
///
/// Returns the per-set record counts.
pub fn export_projections(
    source: &SqliteSource,
    defs: &[ProjectionDef],
    out: &Path,
) -> Result<BTreeMap<String, usize>> {
    let sets = run_projections(source, defs)?;
    let counts: BTreeMap<String, usize> = sets
        .iter()
        .map(|(name, records)| (name.clone(), records.len()))
        .collect();

    let json = serde_json::to_vec(&sets).map_err(|e| serialization_error("export_projections", e))?;
    atomic_write(out, &compress(&json)?)?;

    tracing::info!(
        sets = counts.len(),
        path = %out.display(),
        "Exported projections"
    );
    Ok(counts)
}
