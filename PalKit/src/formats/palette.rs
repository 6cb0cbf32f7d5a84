//! VGA palettes from `PAT.MKF`

use std::fs;
use std::path::Path;

use super::mkf::read_mkf_entry;
use crate::error::Result;

/// Number of colours in a palette.
pub const PALETTE_COLORS: usize = 256;

/// Size of a raw palette (RGB triplets) in bytes.
pub const PALETTE_BYTES: usize = PALETTE_COLORS * 3;

/// A 256-colour palette with 8-bit components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<[u8; 3]>,
}

/// Scale a 6-bit VGA DAC component to 8 bits.
#[inline]
fn expand_vga(value: u8) -> u8 {
    (value << 2) | (value >> 4)
}

impl Palette {
    /// Build a palette from raw 6-bit RGB triplets.
    ///
    /// Bytes beyond the end of `raw` read as 0, so a short table yields
    /// black for the missing colours.
    #[must_use]
    pub fn from_vga_bytes(raw: &[u8]) -> Self {
        let component = |i: usize| expand_vga(raw.get(i).copied().unwrap_or(0));
        let colors = (0..PALETTE_COLORS)
            .map(|c| [component(c * 3), component(c * 3 + 1), component(c * 3 + 2)])
            .collect();
        Self { colors }
    }

    /// Read palette `index` out of an in-memory `PAT.MKF` archive.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive table is invalid or the palette slot is empty.
    pub fn from_pat(pat: &[u8], index: usize) -> Result<Self> {
        let entry = read_mkf_entry(pat, index)?;
        Ok(Self::from_vga_bytes(&entry[..entry.len().min(PALETTE_BYTES)]))
    }

    /// Load palette `index` from a `PAT.MKF` file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the palette is missing.
    pub fn load<P: AsRef<Path>>(path: P, index: usize) -> Result<Self> {
        let data = fs::read(path.as_ref())?;
        Self::from_pat(&data, index)
    }

    /// RGB colour for a palette index.
    #[must_use]
    pub fn rgb(&self, index: u8) -> [u8; 3] {
        self.colors[usize::from(index)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::mkf::tests::build_mkf;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_vga_expansion() {
        assert_eq!(expand_vga(0), 0);
        assert_eq!(expand_vga(63), 255);
        assert_eq!(expand_vga(32), 130);
    }

    #[test]
    fn test_short_table_pads_with_black() {
        let palette = Palette::from_vga_bytes(&[63, 0, 63, 16]);
        assert_eq!(palette.rgb(0), [255, 0, 255]);
        assert_eq!(palette.rgb(1), [65, 0, 0]);
        assert_eq!(palette.rgb(255), [0, 0, 0]);
    }

    #[test]
    fn test_from_pat_uses_requested_slot() {
        let night = vec![63u8; PALETTE_BYTES];
        let day = vec![0u8; PALETTE_BYTES];
        let pat = build_mkf(&[Some(day.as_slice()), Some(night.as_slice())]);

        assert_eq!(Palette::from_pat(&pat, 0).unwrap().rgb(7), [0, 0, 0]);
        assert_eq!(Palette::from_pat(&pat, 1).unwrap().rgb(7), [255, 255, 255]);
        assert!(Palette::from_pat(&pat, 2).is_err());
    }
}
