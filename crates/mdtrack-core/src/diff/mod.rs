//! Keyed snapshot diffing.
//!
//! [`engine::compute_diff`] partitions every table's rows into
//! added/removed/modified sets keyed by an injected key extractor.

pub mod engine;
pub mod model;
