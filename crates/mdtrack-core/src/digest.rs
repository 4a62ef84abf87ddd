//! Content digest computation.
//!
//! The digest over the raw source bytes is the change-detection key for the
//! whole pipeline and the identity embedded in ledger entries and diff
//! filenames. It must be deterministic: same bytes, same digest, always.

use sha2::{Digest, Sha256};

/// Number of leading hex characters used as the human-friendly short hash.
pub const SHORT_HASH_LEN: usize = 12;

/// Compute the SHA-256 digest of the given bytes, hex-encoded (64 chars).
///
/// The input is hashed byte-for-byte with no normalization.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// The first [`SHORT_HASH_LEN`] characters of a full hex digest.
///
/// Digests shorter than that are returned unchanged (only possible for
/// inputs that were never produced by [`hash_bytes`]).
pub fn short_hash(full: &str) -> &str {
    if full.len() < SHORT_HASH_LEN {
        full
    } else {
        &full[..SHORT_HASH_LEN]
    }
}
