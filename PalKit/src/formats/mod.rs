//! File format handlers for PAL1 resource archives
//!
//! - [`mkf`] - primary MKF archives (32-bit byte offset table)
//! - [`smkf`] - sprite frame tables (16-bit word offset table)
//! - [`palette`] - VGA palettes stored in `PAT.MKF`

pub mod mkf;
pub mod palette;
pub mod smkf;

pub use mkf::{MkfEntry, parse_mkf, read_mkf_entry, unpack_mkf};
pub use palette::Palette;
pub use smkf::{Frame, declared_frame_count, parse_frames};
