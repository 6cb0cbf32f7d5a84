//! In-process rasterizer for run-length encoded sprite frames
//!
//! Control bytes select between two packet kinds:
//!
//! - `1xxxxxxx` - a run: the next byte is a palette index repeated `x + 1` times
//! - `0xxxxxxx` - literals: the next `x + 1` bytes are palette indices
//!
//! Pixels fill the canvas row by row. Decoding stops once the canvas is full
//! or the input runs out; pixels never reached stay fully transparent.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgba, RgbaImage};

use super::{FrameSize, Rasterizer};
use crate::error::Result;
use crate::formats::Palette;

/// Decode an RLE frame into an RGBA canvas of `size`.
#[must_use]
pub fn decode_rle(data: &[u8], palette: &Palette, size: FrameSize) -> RgbaImage {
    let mut image = RgbaImage::new(size.width, size.height);
    let total = size.pixels();
    let mut written = 0usize;

    let mut put = |index: u8, written: &mut usize| {
        let [r, g, b] = palette.rgb(index);
        let x = (*written % size.width as usize) as u32;
        let y = (*written / size.width as usize) as u32;
        image.put_pixel(x, y, Rgba([r, g, b, 255]));
        *written += 1;
    };

    let mut bytes = data.iter().copied();
    'packets: while written < total {
        let Some(control) = bytes.next() else {
            break;
        };

        if control & 0x80 != 0 {
            let count = usize::from(control & 0x7F) + 1;
            let Some(index) = bytes.next() else {
                break;
            };
            for _ in 0..count.min(total - written) {
                put(index, &mut written);
            }
        } else {
            let count = usize::from(control) + 1;
            for _ in 0..count {
                if written >= total {
                    break 'packets;
                }
                let Some(index) = bytes.next() else {
                    break 'packets;
                };
                put(index, &mut written);
            }
        }
    }

    image
}

/// Renders RLE frames to PNG without leaving the process.
///
/// The palette file is a `PAT.MKF` archive; the decoded palette is cached
/// for as long as the same path keeps being passed in.
#[derive(Debug, Default)]
pub struct RleRasterizer {
    palette_index: usize,
    cache: RefCell<Option<(PathBuf, Palette)>>,
}

impl RleRasterizer {
    /// Create a rasterizer that uses palette slot `palette_index` of `PAT.MKF`.
    #[must_use]
    pub fn new(palette_index: usize) -> Self {
        Self {
            palette_index,
            cache: RefCell::new(None),
        }
    }

    fn palette(&self, path: &Path) -> Result<Palette> {
        if let Some((cached_path, palette)) = self.cache.borrow().as_ref() {
            if cached_path == path {
                return Ok(palette.clone());
            }
        }

        let palette = Palette::load(path, self.palette_index)?;
        *self.cache.borrow_mut() = Some((path.to_path_buf(), palette.clone()));
        Ok(palette)
    }
}

impl Rasterizer for RleRasterizer {
    fn convert(&self, frame: &[u8], size: FrameSize, palette: &Path, output: &Path) -> Result<()> {
        let palette = self.palette(palette)?;
        let image = decode_rle(frame, &palette, size);
        image.save_with_format(output, ImageFormat::Png)?;
        Ok(())
    }
}
