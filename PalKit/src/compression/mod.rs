//! `YJ_1` decompression adapters
//!
//! The `YJ_1` codec itself lives outside this crate. Archives carrying the
//! `YJ_1` marker are handed whole to a [`Decompressor`]; anything else is
//! treated as already-decompressed data.

pub mod command;
#[cfg(feature = "native-yj1")]
pub mod native;

use crate::error::Result;

pub use command::ScriptDecompressor;
#[cfg(feature = "native-yj1")]
pub use native::NativeDecompressor;

/// Four-byte marker at the start of `YJ_1` compressed data.
pub const YJ1_MAGIC: &[u8; 4] = b"YJ_1";

/// Compression state of an archive buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Starts with the `YJ_1` marker.
    Yj1,
    /// No known marker; the bytes are used as-is.
    Raw,
}

impl Compression {
    /// Detect the compression scheme from the leading marker.
    #[must_use]
    pub fn detect(data: &[u8]) -> Self {
        if data.starts_with(YJ1_MAGIC) {
            Self::Yj1
        } else {
            Self::Raw
        }
    }

    /// Short label for log output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yj1 => "YJ_1",
            Self::Raw => "raw",
        }
    }
}

/// Something that can expand a complete `YJ_1` buffer.
pub trait Decompressor {
    /// Decode `data` (including its marker) into the uncompressed bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecompressionFailed`](crate::Error::DecompressionFailed)
    /// or an I/O error when the input is malformed or the backend fails.
    fn decode(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Decompress `data` only when it carries the `YJ_1` marker.
///
/// Returns the detected scheme alongside the (possibly unchanged) bytes.
///
/// # Errors
///
/// Propagates the decompressor's error for marked buffers.
pub fn decompress_if_marked(
    data: Vec<u8>,
    decompressor: &dyn Decompressor,
) -> Result<(Compression, Vec<u8>)> {
    match Compression::detect(&data) {
        Compression::Yj1 => {
            let decoded = decompressor.decode(&data)?;
            tracing::debug!("YJ_1: {} -> {} bytes", data.len(), decoded.len());
            Ok((Compression::Yj1, decoded))
        }
        Compression::Raw => Ok((Compression::Raw, data)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::Cell;

    struct Reverse {
        calls: Cell<usize>,
    }

    impl Decompressor for Reverse {
        fn decode(&self, data: &[u8]) -> Result<Vec<u8>> {
            self.calls.set(self.calls.get() + 1);
            Ok(data.iter().rev().copied().collect())
        }
    }

    struct Broken;

    impl Decompressor for Broken {
        fn decode(&self, _data: &[u8]) -> Result<Vec<u8>> {
            Err(Error::DecompressionFailed {
                message: "bad block".to_string(),
            })
        }
    }

    #[test]
    fn test_detect() {
        assert_eq!(Compression::detect(b"YJ_1\x00\x10"), Compression::Yj1);
        assert_eq!(Compression::detect(b"YJ_"), Compression::Raw);
        assert_eq!(Compression::detect(b"\x03\x00\x05\x00"), Compression::Raw);
        assert_eq!(Compression::detect(&[]), Compression::Raw);
    }

    #[test]
    fn test_raw_data_skips_decompressor() {
        let reverse = Reverse { calls: Cell::new(0) };
        let (scheme, out) = decompress_if_marked(vec![1, 2, 3], &reverse).unwrap();
        assert_eq!(scheme, Compression::Raw);
        assert_eq!(out, vec![1, 2, 3]);
        assert_eq!(reverse.calls.get(), 0);
    }

    #[test]
    fn test_marked_data_is_handed_over_whole() {
        let reverse = Reverse { calls: Cell::new(0) };
        let (scheme, out) = decompress_if_marked(b"YJ_1ab".to_vec(), &reverse).unwrap();
        assert_eq!(scheme, Compression::Yj1);
        assert_eq!(out, b"ba1_JY");
        assert_eq!(reverse.calls.get(), 1);
    }

    #[test]
    fn test_failure_propagates() {
        let result = decompress_if_marked(b"YJ_1".to_vec(), &Broken);
        assert!(matches!(result, Err(Error::DecompressionFailed { .. })));
    }
}
