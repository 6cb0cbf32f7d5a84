//! Error types for `PalKit`

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// The error type for `PalKit` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A named input archive does not exist.
    #[error("input archive not found: {path}")]
    MissingInput {
        /// The path that was looked up.
        path: PathBuf,
    },

    // ==================== MKF Archive Errors ====================
    /// The buffer is not a readable MKF archive.
    #[error("invalid MKF archive: {message}")]
    InvalidMkf {
        /// Description of what is invalid.
        message: String,
    },

    /// The requested sub-file is absent or empty in the MKF archive.
    #[error("MKF entry {index} not found")]
    MkfEntryNotFound {
        /// The sub-file index that was requested.
        index: usize,
    },

    // ==================== Decompression Errors ====================
    /// `YJ_1` decompression failed.
    #[error("YJ_1 decompression failed: {message}")]
    DecompressionFailed {
        /// The error message.
        message: String,
    },

    /// The native decoder library could not be loaded or lacks the decode symbol.
    #[error("failed to load native decoder {path}: {message}")]
    NativeLibrary {
        /// Path of the dynamic library.
        path: PathBuf,
        /// The loader's error message.
        message: String,
    },

    // ==================== Rasterization Errors ====================
    /// The external raster tool exited unsuccessfully.
    #[error("raster tool failed ({status}): {stderr}")]
    RasterToolFailed {
        /// Exit status as reported by the OS.
        status: String,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// The external raster tool did not finish in time and was killed.
    #[error("raster tool timed out after {0:?}")]
    RasterTimeout(Duration),

    /// The rasterizer reported success but wrote no file.
    #[error("raster output missing: {path}")]
    RasterOutputMissing {
        /// Expected output path.
        path: PathBuf,
    },

    /// The rasterizer wrote a file too small to be a real image.
    #[error("raster output too small: {bytes} bytes (need more than {min})")]
    RasterOutputTooSmall {
        /// Size of the produced file.
        bytes: u64,
        /// Plausibility threshold.
        min: u64,
    },

    /// Image encoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    // ==================== Configuration Errors ====================
    /// Configuration file could not be parsed.
    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration could not be serialized.
    #[error("config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

/// A specialized Result type for `PalKit` operations.
pub type Result<T> = std::result::Result<T, Error>;
