//! Sprite extraction pipeline
//!
//! For every configured character: read the archive, expand it if it carries
//! the `YJ_1` marker, parse its `sMKF` frame table, then render the first
//! [`FRAMES_PER_CHARACTER`] frames. Each frame is tried at every entry of
//! [`CANDIDATE_SIZES`] in order until one produces a plausible image. When
//! frame 0 succeeds at [`REPRESENTATIVE_SIZE`], it is also copied to
//! `{label}.png`.
//!
//! Failures stay local: a bad size moves on to the next size, a frame that
//! fails everywhere moves on to the next frame, and a character whose archive
//! is missing or cannot be decompressed is skipped. Only an output directory
//! that cannot be created stops a run.
//!
//! # Example
//!
//! ```no_run
//! use palkit::extract::{ExtractConfig, SpriteExtractor};
//!
//! let config = ExtractConfig::default();
//! let decompressor = config.build_decompressor()?;
//! let rasterizer = config.build_rasterizer();
//!
//! let extractor = SpriteExtractor::new(&config, decompressor.as_ref(), rasterizer.as_ref());
//! let summary = extractor.run(&|_| {})?;
//! println!("{} frames extracted", summary.extracted_count());
//! # Ok::<(), palkit::Error>(())
//! ```

mod config;
mod types;

pub use config::{CharacterEntry, DecompressorKind, ExtractConfig, RasterizerKind, ToolPaths};
pub use types::{
    AttemptFailure, CharacterOutcome, CharacterReport, ExtractPhase, ExtractProgress,
    ExtractProgressCallback, ExtractedImage, ExtractionSummary, FrameReport, SizeAttempt,
    SkipReason,
};

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::compression::{Compression, Decompressor, decompress_if_marked};
use crate::converter::{FrameSize, Rasterizer, clear_output, verify_output};
use crate::error::{Error, Result};
use crate::formats::{Frame, parse_frames};

/// Sizes tried for every frame, in priority order.
pub const CANDIDATE_SIZES: [FrameSize; 4] = [
    FrameSize::new(48, 72),
    FrameSize::new(64, 96),
    FrameSize::new(96, 96),
    FrameSize::new(64, 64),
];

/// Only this many leading frames of each archive are rendered.
pub const FRAMES_PER_CHARACTER: usize = 6;

/// Frame 0 rendered at this size becomes the character's `{label}.png`.
pub const REPRESENTATIVE_SIZE: FrameSize = FrameSize::new(64, 96);

/// `{output_dir}/{label}_frame{index}_{w}x{h}.png`
#[must_use]
pub fn frame_output_path(output_dir: &Path, label: &str, index: usize, size: FrameSize) -> PathBuf {
    output_dir.join(format!("{label}_frame{index}_{size}.png"))
}

/// `{output_dir}/{label}.png`
#[must_use]
pub fn representative_path(output_dir: &Path, label: &str) -> PathBuf {
    output_dir.join(format!("{label}.png"))
}

/// Read an archive, reporting a nonexistent file as [`Error::MissingInput`].
///
/// # Errors
///
/// Returns [`Error::MissingInput`] or the underlying I/O error.
pub fn read_archive(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::MissingInput {
            path: path.to_path_buf(),
        },
        _ => Error::Io(e),
    })
}

/// Runs the extraction pipeline with injected backends.
pub struct SpriteExtractor<'a> {
    config: &'a ExtractConfig,
    decompressor: &'a dyn Decompressor,
    rasterizer: &'a dyn Rasterizer,
}

impl<'a> SpriteExtractor<'a> {
    /// Create an extractor over `config` using the given backends.
    #[must_use]
    pub fn new(
        config: &'a ExtractConfig,
        decompressor: &'a dyn Decompressor,
        rasterizer: &'a dyn Rasterizer,
    ) -> Self {
        Self {
            config,
            decompressor,
            rasterizer,
        }
    }

    /// Create the output directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn prepare_output(&self) -> Result<()> {
        fs::create_dir_all(&self.config.output_dir)?;
        Ok(())
    }

    /// Process every configured character in order.
    ///
    /// # Errors
    ///
    /// Returns an error only if the output directory cannot be created;
    /// per-character problems are recorded in the summary.
    pub fn run(&self, progress: ExtractProgressCallback) -> Result<ExtractionSummary> {
        self.prepare_output()?;

        let total = self.config.characters.len();
        let characters = self
            .config
            .characters
            .iter()
            .enumerate()
            .map(|(i, entry)| self.process(entry, i + 1, total, progress))
            .collect();

        let summary = ExtractionSummary { characters };
        tracing::info!(
            "Extraction finished: {} frames extracted, {} failed, {} characters skipped",
            summary.extracted_count(),
            summary.failed_count(),
            summary.skipped_count()
        );
        Ok(summary)
    }

    /// Process a single character entry.
    ///
    /// The output directory must already exist (see [`Self::prepare_output`]).
    pub fn extract_character(
        &self,
        entry: &CharacterEntry,
        progress: ExtractProgressCallback,
    ) -> CharacterReport {
        self.process(entry, 1, 1, progress)
    }

    fn process(
        &self,
        entry: &CharacterEntry,
        current: usize,
        total: usize,
        progress: ExtractProgressCallback,
    ) -> CharacterReport {
        let report = |phase| progress(&ExtractProgress::new(phase, current, total, &entry.label));
        let archive = self.config.archive_path(entry);

        report(ExtractPhase::Pending);
        let outcome = self.extract_archive(entry, &archive, &report);
        if let CharacterOutcome::Skipped(reason) = &outcome {
            tracing::warn!("Skipping {}: {reason}", entry.label);
        }
        report(ExtractPhase::Done);

        CharacterReport {
            label: entry.label.clone(),
            archive,
            outcome,
        }
    }

    fn extract_archive(
        &self,
        entry: &CharacterEntry,
        archive: &Path,
        report: &dyn Fn(ExtractPhase),
    ) -> CharacterOutcome {
        let data = match read_archive(archive) {
            Ok(data) => data,
            Err(Error::MissingInput { path }) => {
                return CharacterOutcome::Skipped(SkipReason::MissingInput(path));
            }
            Err(e) => return CharacterOutcome::Skipped(SkipReason::ReadFailed(e.to_string())),
        };
        tracing::info!("{}: read {} ({} bytes)", entry.label, archive.display(), data.len());
        report(ExtractPhase::Loaded);

        let (compression, decoded) = match decompress_if_marked(data, self.decompressor) {
            Ok(result) => result,
            Err(e) => {
                return CharacterOutcome::Skipped(SkipReason::DecompressionFailed(e.to_string()));
            }
        };
        report(match compression {
            Compression::Yj1 => ExtractPhase::Decompressed,
            Compression::Raw => ExtractPhase::Raw,
        });

        let frames = parse_frames(&decoded);
        tracing::info!(
            "{}: {} frames in {} bytes ({})",
            entry.label,
            frames.len(),
            decoded.len(),
            compression.as_str()
        );
        report(ExtractPhase::Parsed);

        let palette = self.config.palette_path();
        let reports: Vec<FrameReport> = frames
            .iter()
            .take(FRAMES_PER_CHARACTER)
            .map(|frame| {
                self.extract_frame(&entry.label, frame, &palette, &|size| {
                    report(ExtractPhase::Extracting {
                        frame: frame.index,
                        size,
                    });
                })
            })
            .collect();

        let representative = self.copy_representative(&entry.label, &reports);

        CharacterOutcome::Extracted {
            compression,
            decoded_len: decoded.len(),
            frames_found: frames.len(),
            frames: reports,
            representative,
        }
    }

    /// Try each candidate size until one yields a plausible image.
    fn extract_frame(
        &self,
        label: &str,
        frame: &Frame<'_>,
        palette: &Path,
        on_attempt: &dyn Fn(FrameSize),
    ) -> FrameReport {
        let mut attempts = Vec::with_capacity(CANDIDATE_SIZES.len());
        let mut extracted = None;

        for size in CANDIDATE_SIZES {
            on_attempt(size);
            let output = frame_output_path(&self.config.output_dir, label, frame.index, size);

            let result = clear_output(&output)
                .and_then(|()| self.rasterizer.convert(frame.data, size, palette, &output))
                .and_then(|()| verify_output(&output))
                .map_err(AttemptFailure::from);

            match &result {
                Ok(bytes) => {
                    tracing::debug!("{label} frame {} @ {size}: {bytes} bytes", frame.index);
                    extracted = Some(ExtractedImage {
                        size,
                        path: output,
                        bytes: *bytes,
                    });
                }
                Err(failure) => {
                    tracing::debug!("{label} frame {} @ {size}: {failure}", frame.index);
                }
            }

            attempts.push(SizeAttempt { size, result });
            if extracted.is_some() {
                break;
            }
        }

        if extracted.is_none() {
            tracing::info!("{label}: frame {} failed at every candidate size", frame.index);
        }

        FrameReport {
            index: frame.index,
            offset: frame.offset,
            size: frame.size(),
            attempts,
            extracted,
        }
    }

    fn copy_representative(&self, label: &str, frames: &[FrameReport]) -> Option<PathBuf> {
        let image = frames
            .iter()
            .find(|f| f.index == 0)?
            .extracted
            .as_ref()
            .filter(|image| image.size == REPRESENTATIVE_SIZE)?;

        let target = representative_path(&self.config.output_dir, label);
        match fs::copy(&image.path, &target) {
            Ok(_) => Some(target),
            Err(e) => {
                tracing::warn!("Failed to copy {} to {}: {e}", image.path.display(), target.display());
                None
            }
        }
    }
}
