//! Builder for executing external tool commands with timeout and
//! cancellation support.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::{Error, Result};

/// Default command timeout: 30 minutes. Stream copies of large files are
/// disk bound and can take a while.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

impl ToolOutput {
    /// Stdout followed by stderr.
    pub fn combined(&self) -> String {
        let mut combined = String::with_capacity(self.stdout.len() + self.stderr.len() + 1);
        combined.push_str(&self.stdout);
        if !self.stdout.is_empty() && !self.stdout.ends_with('\n') && !self.stderr.is_empty() {
            combined.push('\n');
        }
        combined.push_str(&self.stderr);
        combined
    }
}

/// A builder for constructing and executing external tool invocations.
///
/// # Example
///
/// ```no_run
/// use movietag_av::ToolCommand;
/// use std::path::PathBuf;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> movietag_av::Result<()> {
/// let output = ToolCommand::new(PathBuf::from("ffmpeg"))
///     .arg("-version")
///     .execute(&CancellationToken::new())
///     .await?;
/// println!("{}", output.stdout);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
    timeout: Duration,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<OsString>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<OsString>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Set the maximum execution time.
    pub fn timeout(&mut self, d: Duration) -> &mut Self {
        self.timeout = d;
        self
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Execute the command, capturing stdout and stderr.
    ///
    /// The child is killed if the timeout expires or `cancel` fires.
    ///
    /// # Errors
    ///
    /// - [`Error::ToolNotFound`] if the program cannot be found.
    /// - [`Error::ToolFailed`] on non-zero exit (carrying the combined
    ///   output), timeout, or any other spawn/wait failure.
    /// - [`Error::Cancelled`] if `cancel` fires first.
    pub async fn execute(&self, cancel: &CancellationToken) -> Result<ToolOutput> {
        let program_name = self.program_name();

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(feature = "tracing")]
        tracing::debug!(tool = %program_name, args = ?self.args, "spawning tool");

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::tool_not_found(program_name.clone())
            } else {
                Error::tool_failed(&program_name, format!("failed to spawn: {e}"), "")
            }
        })?;

        // Dropping the wait future drops the child, which kills it.
        let waited = tokio::select! {
            result = tokio::time::timeout(self.timeout, child.wait_with_output()) => result,
            _ = cancel.cancelled() => return Err(Error::Cancelled),
        };

        match waited {
            Ok(Ok(output)) => {
                let tool_output = ToolOutput {
                    status: output.status,
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                };

                if !output.status.success() {
                    return Err(Error::tool_failed(
                        program_name,
                        format!("exited with status {}", output.status),
                        tool_output.combined(),
                    ));
                }

                Ok(tool_output)
            }
            Ok(Err(e)) => Err(Error::tool_failed(
                program_name,
                format!("I/O error waiting for process: {e}"),
                "",
            )),
            Err(_elapsed) => Err(Error::tool_failed(
                program_name,
                format!("timed out after {:?}", self.timeout),
                "",
            )),
        }
    }
}
