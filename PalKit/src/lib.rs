//! # PalKit
//!
//! Sprite extraction for the resource archives of the original DOS release
//! of PAL1.
//!
//! ## Supported Formats
//!
//! - **MKF** - primary archives with a 32-bit offset table (`PAT.MKF`, ...)
//! - **`sMKF`** - sprite frame tables with 16-bit word offsets
//! - **`YJ_1`** - compressed archives, expanded by an external decoder
//! - **RLE frames** - rendered to PNG by an external script or in-process
//!
//! ## Quick Start
//!
//! ### Listing the frames of an archive
//!
//! ```no_run
//! use palkit::formats::parse_frames;
//!
//! let data = std::fs::read("sss1.dec")?;
//! for frame in parse_frames(&data) {
//!     println!("frame {} at {} ({} bytes)", frame.index, frame.offset, frame.size());
//! }
//! # Ok::<(), palkit::Error>(())
//! ```
//!
//! ### Running the extraction
//!
//! ```no_run
//! use palkit::prelude::*;
//!
//! let config = ExtractConfig::load("palkit.toml")?;
//! let decompressor = config.build_decompressor()?;
//! let rasterizer = config.build_rasterizer();
//!
//! let summary = SpriteExtractor::new(&config, decompressor.as_ref(), rasterizer.as_ref())
//!     .run(&|_| {})?;
//! println!("{} frames extracted", summary.extracted_count());
//! # Ok::<(), palkit::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default) - Enables the `palkit` command-line binary
//! - `native-yj1` - Loads `decodeyj1` from a dynamic library instead of
//!   running the decoder script

pub mod compression;
pub mod converter;
pub mod error;
pub mod extract;
pub mod formats;
pub mod utils;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};

    pub use crate::compression::{Compression, Decompressor, ScriptDecompressor, decompress_if_marked};
    #[cfg(feature = "native-yj1")]
    pub use crate::compression::NativeDecompressor;
    pub use crate::converter::{FrameSize, Rasterizer, RleRasterizer, ScriptRasterizer, verify_output};
    pub use crate::formats::{Frame, MkfEntry, Palette, parse_frames, parse_mkf, read_mkf_entry};

    pub use crate::extract::{
        CharacterEntry, CharacterOutcome, CharacterReport, ExtractConfig, ExtractPhase,
        ExtractProgress, ExtractionSummary, FrameReport, SpriteExtractor,
    };
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
