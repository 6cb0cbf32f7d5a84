//! Extraction results and progress reporting

use std::fmt;
use std::path::PathBuf;

use crate::compression::Compression;
use crate::converter::FrameSize;
use crate::error::Error;

// ============================================================================
// Attempt / frame / character results
// ============================================================================

/// Why a single (frame, size) conversion attempt did not count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// The converter exited unsuccessfully.
    ToolFailed {
        /// Exit status text.
        status: String,
        /// Captured standard error.
        stderr: String,
    },
    /// The converter was killed after its timeout.
    TimedOut,
    /// The converter reported success but no file appeared.
    MissingOutput,
    /// The output exists but is not larger than the plausibility threshold.
    TooSmall {
        /// Size of the file that was produced.
        bytes: u64,
    },
    /// Any other error (I/O, image encoding, palette loading).
    Other(String),
}

impl From<Error> for AttemptFailure {
    fn from(err: Error) -> Self {
        match err {
            Error::RasterToolFailed { status, stderr } => Self::ToolFailed { status, stderr },
            Error::RasterTimeout(_) => Self::TimedOut,
            Error::RasterOutputMissing { .. } => Self::MissingOutput,
            Error::RasterOutputTooSmall { bytes, .. } => Self::TooSmall { bytes },
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToolFailed { status, stderr } if stderr.is_empty() => write!(f, "{status}"),
            Self::ToolFailed { status, stderr } => write!(f, "{status}: {stderr}"),
            Self::TimedOut => f.write_str("timed out"),
            Self::MissingOutput => f.write_str("no output written"),
            Self::TooSmall { bytes } => write!(f, "output only {bytes} bytes"),
            Self::Other(message) => f.write_str(message),
        }
    }
}

/// One candidate size tried for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeAttempt {
    pub size: FrameSize,
    /// Output size in bytes on success.
    pub result: Result<u64, AttemptFailure>,
}

/// A frame that was rendered successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedImage {
    pub size: FrameSize,
    pub path: PathBuf,
    pub bytes: u64,
}

/// What happened to one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameReport {
    pub index: usize,
    pub offset: usize,
    /// Frame data length in bytes.
    pub size: usize,
    /// Attempts in the order they were made; stops after the first success.
    pub attempts: Vec<SizeAttempt>,
    pub extracted: Option<ExtractedImage>,
}

impl FrameReport {
    /// Whether any candidate size produced a plausible image.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.extracted.is_some()
    }
}

/// Why a character produced no frames at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The archive file does not exist.
    MissingInput(PathBuf),
    /// The archive exists but could not be read.
    ReadFailed(String),
    /// The `YJ_1` backend rejected the archive.
    DecompressionFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput(path) => write!(f, "archive not found: {}", path.display()),
            Self::ReadFailed(message) => write!(f, "read failed: {message}"),
            Self::DecompressionFailed(message) => write!(f, "decompression failed: {message}"),
        }
    }
}

/// Outcome for one character entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharacterOutcome {
    /// The archive was parsed and its leading frames were tried.
    Extracted {
        compression: Compression,
        /// Length of the buffer handed to the frame parser.
        decoded_len: usize,
        /// Number of frames the table yielded.
        frames_found: usize,
        frames: Vec<FrameReport>,
        /// `{label}.png`, when frame 0 rendered at the representative size.
        representative: Option<PathBuf>,
    },
    /// Nothing was attempted for this character.
    Skipped(SkipReason),
}

/// Report for one character entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterReport {
    pub label: String,
    pub archive: PathBuf,
    pub outcome: CharacterOutcome,
}

impl CharacterReport {
    /// Frames that produced an image.
    #[must_use]
    pub fn extracted_count(&self) -> usize {
        match &self.outcome {
            CharacterOutcome::Extracted { frames, .. } => {
                frames.iter().filter(|f| f.succeeded()).count()
            }
            CharacterOutcome::Skipped(_) => 0,
        }
    }

    /// Frames that were tried but failed at every size.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        match &self.outcome {
            CharacterOutcome::Extracted { frames, .. } => {
                frames.iter().filter(|f| !f.succeeded()).count()
            }
            CharacterOutcome::Skipped(_) => 0,
        }
    }

    /// Whether the character was skipped before frame extraction.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, CharacterOutcome::Skipped(_))
    }
}

/// Aggregate over a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub characters: Vec<CharacterReport>,
}

impl ExtractionSummary {
    /// Total frames rendered across all characters.
    #[must_use]
    pub fn extracted_count(&self) -> usize {
        self.characters.iter().map(CharacterReport::extracted_count).sum()
    }

    /// Total frames that failed at every size.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.characters.iter().map(CharacterReport::failed_count).sum()
    }

    /// Characters that were skipped.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.characters.iter().filter(|c| c.is_skipped()).count()
    }
}

// ============================================================================
// Progress Types
// ============================================================================

/// Progress callback type for extraction runs
pub type ExtractProgressCallback<'a> = &'a dyn Fn(&ExtractProgress);

/// Per-character extraction state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractPhase {
    /// Not started yet
    Pending,
    /// Archive bytes read
    Loaded,
    /// `YJ_1` data expanded
    Decompressed,
    /// No marker, bytes used as-is
    Raw,
    /// Frame table parsed
    Parsed,
    /// Trying one candidate size for one frame
    Extracting {
        frame: usize,
        size: FrameSize,
    },
    /// Character finished (or skipped)
    Done,
}

impl ExtractPhase {
    /// Get a human-readable description of this phase
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Loaded => "Loaded",
            Self::Decompressed => "Decompressed",
            Self::Raw => "Raw",
            Self::Parsed => "Parsed",
            Self::Extracting { .. } => "Extracting",
            Self::Done => "Done",
        }
    }
}

/// Progress information during an extraction run
#[derive(Debug, Clone)]
pub struct ExtractProgress {
    /// Current phase of the current character
    pub phase: ExtractPhase,
    /// Current character number (1-indexed)
    pub current: usize,
    /// Total number of characters
    pub total: usize,
    /// Label of the character being processed
    pub label: String,
}

impl ExtractProgress {
    /// Create a new progress update
    #[must_use]
    pub fn new(phase: ExtractPhase, current: usize, total: usize, label: impl Into<String>) -> Self {
        Self {
            phase,
            current,
            total,
            label: label.into(),
        }
    }
}
