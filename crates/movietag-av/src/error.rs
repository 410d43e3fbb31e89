//! Error types for movietag-av.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rewriting a container.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required external tool is not available.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// An external tool ran but did not produce a usable result.
    ///
    /// `output` holds whatever the tool wrote to stdout and stderr.
    #[error("tool execution failed: {tool}: {message}")]
    ToolFailed {
        tool: String,
        message: String,
        output: String,
    },

    /// A filesystem step (temp file, rename, removal) failed.
    #[error("failed to {action} {}: {source}", path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The specified file was not found.
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// The rewritten file would overwrite an unrelated existing file.
    #[error("destination already exists: {}", path.display())]
    DestinationExists { path: PathBuf },

    /// Invalid input provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The operation was cancelled by the caller.
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// Create a tool not found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create a tool execution failed error.
    pub fn tool_failed(
        tool: impl Into<String>,
        message: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
            output: output.into(),
        }
    }

    /// Create a filesystem error.
    pub fn filesystem(
        action: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Captured tool output, for [`Error::ToolFailed`].
    pub fn tool_output(&self) -> Option<&str> {
        match self {
            Self::ToolFailed { output, .. } => Some(output),
            _ => None,
        }
    }
}
