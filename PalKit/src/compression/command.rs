//! `YJ_1` decompression through an external script (`deyj1.py IN -o OUT`)

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use super::Decompressor;
use crate::error::{Error, Result};
use crate::utils::{ToolRun, run_tool};

/// Runs a `deyj1`-style script: `<interpreter> <script> <input> -o <output>`.
#[derive(Debug, Clone)]
pub struct ScriptDecompressor {
    interpreter: PathBuf,
    script: PathBuf,
    timeout: Option<Duration>,
}

impl ScriptDecompressor {
    /// Create a decompressor that runs `script` with `interpreter`.
    pub fn new(interpreter: impl Into<PathBuf>, script: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
            timeout: None,
        }
    }

    /// Kill the script if it runs longer than `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Decompressor for ScriptDecompressor {
    fn decode(&self, data: &[u8]) -> Result<Vec<u8>> {
        let scratch = tempfile::Builder::new().prefix("palkit-yj1-").tempdir()?;
        let input = scratch.path().join("input.yj1");
        let output = scratch.path().join("output.dec");

        let mut file = fs::File::create(&input)?;
        file.write_all(data)?;
        drop(file);

        let mut command = Command::new(&self.interpreter);
        command.arg(&self.script).arg(&input).arg("-o").arg(&output);

        match run_tool(&mut command, self.timeout)? {
            ToolRun::Finished(out) if out.status.success() => {}
            ToolRun::Finished(out) => {
                return Err(Error::DecompressionFailed {
                    message: format!("{} exited with {}: {}", self.script.display(), out.status, out.stderr),
                });
            }
            ToolRun::TimedOut => {
                return Err(Error::DecompressionFailed {
                    message: format!("{} timed out", self.script.display()),
                });
            }
        }

        fs::read(&output).map_err(|e| Error::DecompressionFailed {
            message: format!("no output from {}: {e}", self.script.display()),
        })
    }
}
