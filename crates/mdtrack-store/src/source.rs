//! SQLite source reading.
//!
//! The source is opened read-only: the tracker never mutates the master
//! dataset, and a missing file must fail instead of being created. Tables
//! are enumerated in name-sorted order so snapshots are reproducible, and
//! every table is read with a full unfiltered scan preserving the source's
//! native row order and scalar types.

use crate::errors::{from_rusqlite, io_error, Result};
use mdtrack_core::model::{RowValue, Snapshot, TableData};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::fs;
use std::path::{Path, PathBuf};

/// A readable relational source backed by a SQLite file.
#[derive(Debug)]
pub struct SqliteSource {
    path: PathBuf,
    conn: Connection,
}

impl SqliteSource {
    /// Open the source read-only.
    ///
    /// # Errors
    ///
    /// Returns `SourceAccess` if the file is missing or not openable as a
    /// SQLite database.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| from_rusqlite("open_source", e).with_path(path.display().to_string()))?;
        Ok(Self { path, conn })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The underlying connection, for read-only collaborators (projection).
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// The exact file bytes, for hashing and archiving.
    pub fn raw_bytes(&self) -> Result<Vec<u8>> {
        fs::read(&self.path)
            .map_err(|e| io_error("read_source_bytes", e).with_path(self.path.display().to_string()))
    }

    /// All table names in the source's catalog, name-sorted.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .map_err(|e| from_rusqlite("list_tables", e))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| from_rusqlite("list_tables", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| from_rusqlite("list_tables", e))?;
        Ok(names)
    }

    /// Full unfiltered scan of one table.
    pub fn scan_table(&self, table: &str) -> Result<TableData> {
        // Double quotes inside the identifier are escaped by doubling
        let query = format!("SELECT * FROM \"{}\"", table.replace('"', "\"\""));
        let mut stmt = self
            .conn
            .prepare(&query)
            .map_err(|e| from_rusqlite("scan_table", e).with_table(table))?;

        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let column_count = columns.len();

        let mut rows = Vec::new();
        let mut raw_rows = stmt
            .query([])
            .map_err(|e| from_rusqlite("scan_table", e).with_table(table))?;
        while let Some(row) = raw_rows
            .next()
            .map_err(|e| from_rusqlite("scan_table", e).with_table(table))?
        {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                let value = row
                    .get_ref(i)
                    .map_err(|e| from_rusqlite("scan_table", e).with_table(table))?;
                values.push(row_value_from_sql(value));
            }
            rows.push(values);
        }

        Ok(TableData { columns, rows })
    }

    /// Materialize every table as a [`Snapshot`].
    ///
    /// # Errors
    ///
    /// Any enumeration or scan failure is a `SourceAccess` error and aborts
    /// the run before any artifact is written.
    pub fn snapshot(&self) -> Result<Snapshot> {
        let mut snapshot = Snapshot::new();
        for table in self.table_names()? {
            let data = self.scan_table(&table)?;
            tracing::debug!(
                table = %table,
                columns = data.columns.len(),
                rows = data.rows.len(),
                "Scanned table"
            );
            snapshot.insert(table, data);
        }
        Ok(snapshot)
    }
}

/// Convert a SQLite cell into the tagged value model, with no coercion.
pub fn row_value_from_sql(value: ValueRef<'_>) -> RowValue {
    match value {
        ValueRef::Null => RowValue::Null,
        ValueRef::Integer(i) => RowValue::Integer(i),
        ValueRef::Real(r) => RowValue::Real(r),
        ValueRef::Text(t) => RowValue::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => RowValue::Blob(b.to_vec()),
    }
}
