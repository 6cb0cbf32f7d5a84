//! Frame → image rasterizers
//!
//! A sprite frame does not record its own dimensions, so callers guess a
//! [`FrameSize`] and ask a [`Rasterizer`] to render the frame at that size.
//! Whether the guess was right is judged only by [`verify_output`]: an image
//! file larger than [`MIN_IMAGE_BYTES`] counts as plausible. This is a size
//! heuristic only; a wrong guess can still pass.

pub mod command;
pub mod rle;

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Error, Result};

pub use command::ScriptRasterizer;
pub use rle::RleRasterizer;

/// Output files at or below this many bytes are treated as degenerate.
pub const MIN_IMAGE_BYTES: u64 = 500;

/// Candidate width × height for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameSize {
    /// Create a new size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels covered.
    #[must_use]
    pub fn pixels(self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Renders one frame's raw bytes into an image file.
pub trait Rasterizer {
    /// Render `frame` at `size` using the palette resource at `palette`,
    /// writing the image to `output`.
    ///
    /// # Errors
    ///
    /// Returns an error when the conversion fails or times out. A returned
    /// `Ok` is still subject to [`verify_output`].
    fn convert(&self, frame: &[u8], size: FrameSize, palette: &Path, output: &Path) -> Result<()>;
}

/// Remove a file left at `output` by an earlier attempt or run, so that
/// [`verify_output`] only ever sees what the current conversion wrote.
///
/// # Errors
///
/// Returns an I/O error if an existing file cannot be removed.
pub fn clear_output(output: &Path) -> Result<()> {
    match fs::remove_file(output) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Check that `output` exists and is larger than [`MIN_IMAGE_BYTES`].
///
/// Returns the file size on success.
///
/// # Errors
///
/// Returns [`Error::RasterOutputMissing`] or [`Error::RasterOutputTooSmall`].
pub fn verify_output(output: &Path) -> Result<u64> {
    let bytes = fs::metadata(output)
        .map_err(|_| Error::RasterOutputMissing {
            path: output.to_path_buf(),
        })?
        .len();

    if bytes > MIN_IMAGE_BYTES {
        Ok(bytes)
    } else {
        Err(Error::RasterOutputTooSmall {
            bytes,
            min: MIN_IMAGE_BYTES,
        })
    }
}
