//! Primary MKF archives
//!
//! An MKF file starts with a table of little-endian `u32` byte offsets. The
//! first offset doubles as the table length, so the archive holds
//! `first / 4 - 1` sub-files; sub-file `i` spans `[table[i], table[i + 1])`.
//! Empty or out-of-range slots are common and are skipped rather than treated
//! as corruption.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Error, Result};

/// Location of one sub-file inside an MKF archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MkfEntry {
    /// Slot index in the offset table.
    pub index: usize,
    /// Byte offset where the sub-file begins.
    pub begin: usize,
    /// Byte offset one past the end of the sub-file.
    pub end: usize,
}

impl MkfEntry {
    /// Sub-file length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    /// Whether the sub-file is empty (never true for entries returned by [`parse_mkf`]).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Borrow the sub-file bytes from the archive buffer.
    #[must_use]
    pub fn data<'a>(&self, archive: &'a [u8]) -> &'a [u8] {
        &archive[self.begin..self.end]
    }
}

/// Parse the offset table of an MKF archive.
///
/// # Errors
///
/// Returns [`Error::InvalidMkf`] if the buffer is shorter than one table entry
/// or the table it declares runs past the end of the buffer.
pub fn parse_mkf(data: &[u8]) -> Result<Vec<MkfEntry>> {
    if data.len() < 4 {
        return Err(Error::InvalidMkf {
            message: format!("{} bytes is too short for an offset table", data.len()),
        });
    }

    let mut cursor = Cursor::new(data);
    let first = cursor.read_u32::<LittleEndian>()? as usize;
    let slots = (first / 4).saturating_sub(1);

    // slots + 1 offsets must be readable
    if (slots + 1) * 4 > data.len() {
        return Err(Error::InvalidMkf {
            message: format!("offset table of {slots} entries exceeds {} bytes", data.len()),
        });
    }

    let mut offsets = Vec::with_capacity(slots + 1);
    offsets.push(first);
    for _ in 0..slots {
        offsets.push(cursor.read_u32::<LittleEndian>()? as usize);
    }

    let entries = offsets
        .windows(2)
        .enumerate()
        .filter_map(|(index, pair)| {
            let (begin, end) = (pair[0], pair[1]);
            let valid = begin > 0 && begin < data.len() && end > begin && end <= data.len();
            valid.then_some(MkfEntry { index, begin, end })
        })
        .collect();

    Ok(entries)
}

/// Borrow sub-file `index` of an MKF archive.
///
/// # Errors
///
/// Returns [`Error::InvalidMkf`] if the table cannot be read, or
/// [`Error::MkfEntryNotFound`] if the slot is empty or out of range.
pub fn read_mkf_entry(data: &[u8], index: usize) -> Result<&[u8]> {
    parse_mkf(data)?
        .into_iter()
        .find(|entry| entry.index == index)
        .map(|entry| entry.data(data))
        .ok_or(Error::MkfEntryNotFound { index })
}

/// Split an MKF archive on disk into `{prefix}{index}.{ext}` files.
///
/// Returns the paths written, in slot order. The destination directory is
/// created if needed.
///
/// # Errors
///
/// Returns an error if the archive cannot be read or parsed, or a sub-file
/// cannot be written.
pub fn unpack_mkf<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    destination: Q,
    prefix: &str,
    ext: &str,
) -> Result<Vec<PathBuf>> {
    let source = source.as_ref();
    let destination = destination.as_ref();

    let data = fs::read(source)?;
    let entries = parse_mkf(&data)?;
    tracing::info!("Unpacking {} sub-files from {}", entries.len(), source.display());

    fs::create_dir_all(destination)?;

    let mut written = Vec::with_capacity(entries.len());
    for entry in entries {
        let path = destination.join(format!("{prefix}{}.{ext}", entry.index));
        fs::write(&path, entry.data(&data))?;
        tracing::debug!("  {} ({} bytes)", path.display(), entry.len());
        written.push(path);
    }

    Ok(written)
}
