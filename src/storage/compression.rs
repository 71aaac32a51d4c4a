//! Whole-payload compression

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::errors::{ColumnarError, ColumnarResult};

use super::options::Compression;

/// Upper bound on pre-allocation, as a multiple of the stored size
const MAX_PREALLOC_RATIO: u64 = 4;

/// Compresses a column payload. `Compression::None` returns the input.
pub fn compress(codec: Compression, level: u32, payload: Vec<u8>) -> ColumnarResult<Vec<u8>> {
    match codec {
        Compression::None => Ok(payload),
        Compression::Zlib => {
            let mut encoder = ZlibEncoder::new(
                Vec::with_capacity(payload.len() / 2 + 16),
                flate2::Compression::new(level.min(9)),
            );
            encoder
                .write_all(&payload)
                .map_err(|e| ColumnarError::io("Failed to compress payload", e))?;
            encoder
                .finish()
                .map_err(|e| ColumnarError::io("Failed to compress payload", e))
        }
    }
}

/// Decompresses a stored payload and checks it inflates to exactly
/// `expected_len` bytes.
///
/// # Errors
///
/// `CorruptData` if the stream is malformed or the length differs.
pub fn decompress(codec: Compression, stored: Vec<u8>, expected_len: u64) -> ColumnarResult<Vec<u8>> {
    let payload = match codec {
        Compression::None => stored,
        Compression::Zlib => {
            // Capacity is a hint bounded by the stored size; the declared length is untrusted.
            let hint = (stored.len() as u64).saturating_mul(MAX_PREALLOC_RATIO);
            let mut out = Vec::with_capacity(expected_len.min(hint) as usize);
            // Read one byte past the declared length so an oversized stream is caught
            // without inflating all of it.
            ZlibDecoder::new(stored.as_slice())
                .take(expected_len.saturating_add(1))
                .read_to_end(&mut out)
                .map_err(|e| ColumnarError::CorruptData(format!("zlib stream invalid: {}", e)))?;
            out
        }
    };

    if payload.len() as u64 != expected_len {
        return Err(ColumnarError::CorruptData(format!(
            "payload decodes to {} bytes, metadata declares {}",
            payload.len(),
            expected_len
        )));
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zlib_roundtrip() {
        let payload: Vec<u8> = (0..4096u32).flat_map(|i| (i % 7).to_le_bytes()).collect();
        let stored = compress(Compression::Zlib, 6, payload.clone()).unwrap();
        assert!(stored.len() < payload.len());
        // zlib header
        assert_eq!(stored[0], 0x78);

        let restored = decompress(Compression::Zlib, stored, payload.len() as u64).unwrap();
        assert_eq!(restored, payload);
    }

    #[test]
    fn test_none_is_passthrough() {
        let stored = compress(Compression::None, 6, vec![1, 2, 3]).unwrap();
        assert_eq!(stored, vec![1, 2, 3]);
        assert_eq!(decompress(Compression::None, stored, 3).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_length_mismatch_is_corrupt() {
        let stored = compress(Compression::Zlib, 6, vec![9; 100]).unwrap();
        let err = decompress(Compression::Zlib, stored.clone(), 99).unwrap_err();
        assert!(matches!(err, ColumnarError::CorruptData(_)));
        assert!(decompress(Compression::Zlib, stored, 101).is_err());
    }

    #[test]
    fn test_oversized_declared_length_is_corrupt() {
        let stored = compress(Compression::Zlib, 6, vec![7; 64]).unwrap();
        let err = decompress(Compression::Zlib, stored.clone(), u64::MAX).unwrap_err();
        assert!(matches!(err, ColumnarError::CorruptData(_)));

        let err = decompress(Compression::Zlib, stored, 1 << 40).unwrap_err();
        assert!(err.to_string().contains("metadata declares"));
    }

    #[test]
    fn test_garbage_stream_is_corrupt() {
        let err = decompress(Compression::Zlib, vec![0xde, 0xad, 0xbe, 0xef], 4).unwrap_err();
        assert!(matches!(err, ColumnarError::CorruptData(_)));
    }
}
