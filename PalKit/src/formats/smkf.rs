//! `sMKF` (secondary MKF) frame tables
//!
//! Sprite archives (`SSS`, `MGO`, `RGM` sub-files) pack their animation frames
//! behind a table of 16-bit little-endian *word* offsets:
//!
//! ```text
//! +0  u16  declared frame count N
//! +2  u16  word offset of frame 0
//! +4  u16  word offset of frame 1   (also the end of frame 0)
//! ...
//! ```
//!
//! Frame `i` spans `[table[i] * 2, table[i + 1] * 2)`. There is no explicit
//! end marker beyond the declared count, and real archives are often padded
//! or truncated, so parsing stops at the first entry that cannot be read or
//! does not describe a well-formed range. Everything accepted before that
//! point is returned; a short or empty result is not an error.

use byteorder::{ByteOrder, LittleEndian};

/// One frame record inside a decompressed sprite archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    /// Position in the archive's frame table (0-based).
    pub index: usize,
    /// Byte offset of the frame data within the archive buffer.
    pub offset: usize,
    /// The frame bytes, borrowed from the archive buffer.
    pub data: &'a [u8],
}

impl Frame<'_> {
    /// Length of the frame data in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Byte offset one past the end of the frame.
    #[must_use]
    pub fn end(&self) -> usize {
        self.offset + self.data.len()
    }
}

/// Read the declared frame count, or `None` if the buffer is shorter than 2 bytes.
#[must_use]
pub fn declared_frame_count(data: &[u8]) -> Option<u16> {
    data.get(0..2).map(LittleEndian::read_u16)
}

/// Read table slot `slot` (slot 0 is the frame count) as a byte offset.
fn read_table_offset(data: &[u8], slot: usize) -> Option<usize> {
    let pos = slot.checked_mul(2)?;
    let bytes = data.get(pos..pos.checked_add(2)?)?;
    Some(usize::from(LittleEndian::read_u16(bytes)) * 2)
}

/// Parse the frame table of a decompressed sprite archive.
///
/// Frames are returned in table order. Parsing stops at the first index whose
/// table entries fall outside the buffer, or whose range violates
/// `0 < offset < next_offset <= data.len()`.
#[must_use]
pub fn parse_frames(data: &[u8]) -> Vec<Frame<'_>> {
    let Some(count) = declared_frame_count(data) else {
        return Vec::new();
    };

    let mut frames = Vec::new();
    for index in 0..usize::from(count) {
        let Some(offset) = read_table_offset(data, index + 1) else {
            break;
        };
        let Some(next_offset) = read_table_offset(data, index + 2) else {
            break;
        };

        if offset == 0 || next_offset <= offset || next_offset > data.len() {
            tracing::debug!(
                "sMKF table stops at frame {index}: offset={offset}, next={next_offset}, len={}",
                data.len()
            );
            break;
        }

        frames.push(Frame {
            index,
            offset,
            data: &data[offset..next_offset],
        });
    }

    frames
}
