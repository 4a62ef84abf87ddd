//! Error handling for mdtrack-store
//!
//! Wraps the core TrackError with store-specific helpers

use mdtrack_core::errors::{TrackError, TrackErrorKind};
use std::path::Path;

/// Result type alias using TrackError
pub type Result<T> = std::result::Result<T, TrackError>;

/// Create a source-access error
pub fn source_access(op: &str, reason: impl Into<String>) -> TrackError {
    TrackError::new(TrackErrorKind::SourceAccess)
        .with_op(op)
        .with_message(reason)
}

/// Create a source-access error from rusqlite::Error
pub fn from_rusqlite(op: &str, err: rusqlite::Error) -> TrackError {
    TrackError::new(TrackErrorKind::SourceAccess)
        .with_op(op)
        .with_message(err.to_string())
}

/// Create a corrupt-persisted-state error
pub fn corrupt_state(op: &str, path: &Path, reason: impl Into<String>) -> TrackError {
    TrackError::new(TrackErrorKind::CorruptState)
        .with_op(op)
        .with_path(path.display().to_string())
        .with_message(reason)
}

/// Create a write-failure error
pub fn write_failure(op: &str, path: &Path, err: std::io::Error) -> TrackError {
    TrackError::new(TrackErrorKind::WriteFailure)
        .with_op(op)
        .with_path(path.display().to_string())
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(op: &str, err: std::io::Error) -> TrackError {
    TrackError::new(TrackErrorKind::Io)
        .with_op(op)
        .with_message(err.to_string())
}

/// Create a serialization error
pub fn serialization_error(op: &str, err: serde_json::Error) -> TrackError {
    TrackError::new(TrackErrorKind::Serialization)
        .with_op(op)
        .with_message(err.to_string())
}
