//! mdtrack Store - Persistence layer for the version tracker
//!
//! Provides:
//! - SQLite source reading (raw bytes + full table snapshots)
//! - zstd compression helpers for all persisted artifacts
//! - Atomic temp→rename file writes
//! - The `ArtifactStore` abstraction with filesystem and in-memory backends
//! - The asset pack encoder/decoder

pub mod artifacts;
pub mod atomic;
pub mod compress;
pub mod errors;
pub mod pack;
pub mod source;

// Re-export key types
pub use artifacts::{ArtifactStore, FsArtifactStore, MemoryArtifactStore};
pub use errors::Result;
pub use source::SqliteSource;
