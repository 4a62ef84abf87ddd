//! Core data model: scalar values, table snapshots, and version records.

pub mod snapshot;
pub mod value;
pub mod version;

pub use snapshot::{Snapshot, TableData};
pub use value::RowValue;
pub use version::{DiffSummary, PointerRecord, VersionEntry};
