//! zstd compression for persisted artifacts.

use crate::errors::Result;
use mdtrack_core::errors::{TrackError, TrackErrorKind};

/// Compression level for all artifacts (zstd's balanced default).
const LEVEL: i32 = 3;

/// Compress data. Returns the compressed bytes.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    zstd::encode_all(data, LEVEL).map_err(|e| {
        TrackError::new(TrackErrorKind::Io)
            .with_op("compress")
            .with_message(e.to_string())
    })
}

/// Decompress data previously produced by [`compress`].
///
/// # Errors
///
/// Returns `CorruptState`: the only inputs this is called on are persisted
/// artifacts, so undecodable bytes mean damaged state, not bad user input.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    zstd::decode_all(data).map_err(|e| {
        TrackError::new(TrackErrorKind::CorruptState)
            .with_op("decompress")
            .with_message(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_round_trip(data in prop::collection::vec(any::<u8>(), 0..50_000)) {
            let c = compress(&data).unwrap();
            let d = decompress(&c).unwrap();
            prop_assert_eq!(d, data);
        }
    }

    #[test]
    fn test_empty_round_trips() {
        let c = compress(&[]).unwrap();
        assert_eq!(decompress(&c).unwrap(), b"");
    }

    #[test]
    fn test_garbage_is_corrupt_state() {
        let err = decompress(b"not a zstd frame").unwrap_err();
        assert_eq!(err.kind(), TrackErrorKind::CorruptState);
    }
}
