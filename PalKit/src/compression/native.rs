//! `YJ_1` decompression through a native `decodeyj1` export
//!
//! The library allocates the output buffer itself and reports its length;
//! the bytes are copied out and the buffer is left to the library.

#![allow(unsafe_code)]

use std::ffi::c_int;
use std::path::{Path, PathBuf};
use std::ptr;

use libloading::{Library, Symbol};

use super::Decompressor;
use crate::error::{Error, Result};

/// `int decodeyj1(const void *src, void **dst, int *len)`
type DecodeYj1 = unsafe extern "C" fn(*const u8, *mut *mut u8, *mut c_int) -> c_int;

const DECODE_SYMBOL: &[u8] = b"decodeyj1\0";

/// Validate what `decodeyj1` reported before the output buffer is touched.
fn checked_output_len(status: c_int, out: *const u8, len: c_int) -> Result<usize> {
    if status != 0 {
        return Err(Error::DecompressionFailed {
            message: format!("decodeyj1 returned status {status}"),
        });
    }
    if out.is_null() {
        return Err(Error::DecompressionFailed {
            message: "decoder returned no buffer".to_string(),
        });
    }
    usize::try_from(len).map_err(|_| Error::DecompressionFailed {
        message: format!("decoder reported negative length {len}"),
    })
}

/// Decompressor backed by a dynamically loaded decoder library.
pub struct NativeDecompressor {
    library: Library,
    path: PathBuf,
}

impl std::fmt::Debug for NativeDecompressor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeDecompressor")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl NativeDecompressor {
    /// Load the decoder library and check that it exports `decodeyj1`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NativeLibrary`] if the library cannot be loaded or
    /// lacks the symbol.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let library_error = |e: libloading::Error| Error::NativeLibrary {
            path: path.clone(),
            message: e.to_string(),
        };

        // SAFETY: loading runs the library's initialisers; the decoder is a
        // plain C library with no global constructors we depend on.
        let library = unsafe { Library::new(&path) }.map_err(library_error)?;
        // SAFETY: the symbol is only looked up here, not called.
        unsafe { library.get::<DecodeYj1>(DECODE_SYMBOL) }.map_err(library_error)?;

        tracing::info!("Loaded native YJ_1 decoder from {}", path.display());
        Ok(Self { library, path })
    }
}

impl Decompressor for NativeDecompressor {
    fn decode(&self, data: &[u8]) -> Result<Vec<u8>> {
        // SAFETY: the signature matches the exported C function.
        let decode: Symbol<DecodeYj1> = unsafe { self.library.get(DECODE_SYMBOL) }
            .map_err(|e| Error::NativeLibrary {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        let mut out: *mut u8 = ptr::null_mut();
        let mut len: c_int = 0;
        // SAFETY: `data` outlives the call; `out` and `len` are valid out-params.
        let status = unsafe { decode(data.as_ptr(), &raw mut out, &raw mut len) };
        let len = checked_output_len(status, out, len)?;

        // SAFETY: the decoder guarantees `len` readable bytes at `out`.
        let decoded = unsafe { std::slice::from_raw_parts(out, len) }.to_vec();
        Ok(decoded)
    }
}
