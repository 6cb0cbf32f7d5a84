//! Running external converter tools

use std::io::{Read, Seek, SeekFrom};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::Result;

/// How often a running tool is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Result of a tool invocation that ran to completion.
#[derive(Debug)]
pub struct ToolOutput {
    /// Exit status of the process.
    pub status: ExitStatus,
    /// Captured standard error, lossily decoded and trimmed.
    pub stderr: String,
}

/// Outcome of [`run_tool`].
#[derive(Debug)]
pub enum ToolRun {
    /// The process exited on its own.
    Finished(ToolOutput),
    /// The process outlived its deadline and was killed.
    TimedOut,
}

/// Run `command` to completion, killing it if it exceeds `timeout`.
///
/// Standard output is discarded; standard error is spooled to an anonymous
/// temp file so a chatty tool cannot block on a full pipe.
///
/// # Errors
///
/// Returns an error if the process cannot be spawned or waited on.
pub fn run_tool(command: &mut Command, timeout: Option<Duration>) -> Result<ToolRun> {
    let mut stderr_file = tempfile::tempfile()?;

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::from(stderr_file.try_clone()?))
        .spawn()?;

    let deadline = timeout.map(|t| Instant::now() + t);
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            tracing::debug!("Killing tool after {:?}", timeout.unwrap_or_default());
            // The child may exit between try_wait and kill
            let _ = child.kill();
            let _ = child.wait();
            return Ok(ToolRun::TimedOut);
        }
        thread::sleep(POLL_INTERVAL);
    };

    let mut stderr = Vec::new();
    stderr_file.seek(SeekFrom::Start(0))?;
    stderr_file.read_to_end(&mut stderr)?;

    Ok(ToolRun::Finished(ToolOutput {
        status,
        stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
    }))
}
