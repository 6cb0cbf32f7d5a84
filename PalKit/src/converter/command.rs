//! Rasterization through an external `derle`-style script

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use super::{FrameSize, Rasterizer};
use crate::error::{Error, Result};
use crate::utils::{ToolRun, run_tool};

/// Default time a single conversion may take.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs `<interpreter> <script> <frame> -o <output> -p <palette>`.
///
/// The script reads the frame's dimensions from the frame data itself; the
/// candidate size only affects the output name chosen by the caller.
#[derive(Debug, Clone)]
pub struct ScriptRasterizer {
    interpreter: PathBuf,
    script: PathBuf,
    timeout: Duration,
}

impl ScriptRasterizer {
    /// Create a rasterizer with the default 10 second timeout.
    pub fn new(interpreter: impl Into<PathBuf>, script: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-conversion timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Rasterizer for ScriptRasterizer {
    fn convert(&self, frame: &[u8], size: FrameSize, palette: &Path, output: &Path) -> Result<()> {
        // Removed on drop, whichever way this function exits
        let mut input = tempfile::Builder::new()
            .prefix("palkit-frame-")
            .suffix(".tmp")
            .tempfile()?;
        input.write_all(frame)?;
        input.flush()?;

        let mut command = Command::new(&self.interpreter);
        command
            .arg(&self.script)
            .arg(input.path())
            .arg("-o")
            .arg(output)
            .arg("-p")
            .arg(palette);

        tracing::debug!("{} @ {size}: {:?}", self.script.display(), command);

        match run_tool(&mut command, Some(self.timeout))? {
            ToolRun::Finished(out) if out.status.success() => Ok(()),
            ToolRun::Finished(out) => Err(Error::RasterToolFailed {
                status: out.status.to_string(),
                stderr: out.stderr,
            }),
            ToolRun::TimedOut => Err(Error::RasterTimeout(self.timeout)),
        }
    }
}
