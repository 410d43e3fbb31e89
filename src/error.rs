//! Pipeline-level error type.

use std::path::PathBuf;

use crate::metadata::ProviderError;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by [`Pipeline`](crate::pipeline::Pipeline) operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The metadata catalog call failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Rewriting the container failed.
    #[error(transparent)]
    Rewrite(#[from] movietag_av::Error),

    /// The file does not have one of the accepted extensions.
    #[error("unsupported file type: {}", path.display())]
    UnsupportedFile { path: PathBuf },

    /// The file does not exist.
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Processing was requested before a candidate was selected.
    #[error("no movie selected")]
    NoSelection,

    /// The selected index does not refer to a candidate.
    #[error("selection {index} is out of range ({count} candidates)")]
    SelectionOutOfRange { index: usize, count: usize },

    /// The search query is blank.
    #[error("search query is empty")]
    EmptyQuery,

    /// No TMDB API key is configured.
    #[error(
        "no TMDB API key configured; run `movietag set-api-key <KEY>` or set {}",
        crate::config::API_KEY_ENV
    )]
    MissingApiKey,

    /// The configured release marker vocabulary does not compile.
    #[error(transparent)]
    Parser(#[from] movietag_parser::config::ConfigError),
}

impl Error {
    /// Whether the error came from a cancelled operation.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Error::Provider(ProviderError::Cancelled) | Error::Rewrite(movietag_av::Error::Cancelled)
        )
    }
}
