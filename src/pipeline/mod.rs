//! The identification pipeline: open, search, select, process.
//!
//! A [`Pipeline`] holds the collaborators (catalog, parser, rewriter) and is
//! stateless itself; all per-file state lives in the caller's [`Session`].

mod session;

pub use session::Session;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use movietag_av::{ContainerRewriter, FfmpegRemuxer, MediaRemuxer, MovieMetadata};
use movietag_parser::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{Config, FilesConfig};
use crate::error::{Error, Result};
use crate::metadata::{
    map_details, FuzzyResolver, MetadataProvider, ProviderError, SearchResult, TmdbProvider,
};

/// Drives one file from name to tagged, renamed container.
#[derive(Clone)]
pub struct Pipeline {
    provider: Arc<dyn MetadataProvider>,
    resolver: FuzzyResolver,
    parser: Parser,
    rewriter: ContainerRewriter,
    files: FilesConfig,
}

impl Pipeline {
    /// Pipeline with the default parser vocabulary and file extensions.
    pub fn new(provider: Arc<dyn MetadataProvider>, remuxer: Arc<dyn MediaRemuxer>) -> Self {
        Self {
            resolver: FuzzyResolver::new(provider.clone()),
            provider,
            parser: Parser::default(),
            rewriter: ContainerRewriter::new(remuxer),
            files: FilesConfig::default(),
        }
    }

    /// Production pipeline: TMDB and ffmpeg, configured from `config`.
    ///
    /// # Errors
    ///
    /// [`Error::MissingApiKey`] without an API key, [`Error::Parser`] for a
    /// bad marker vocabulary, [`Error::Provider`] if the HTTP client cannot
    /// be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        if !config.tmdb.has_api_key() {
            return Err(Error::MissingApiKey);
        }

        let provider = TmdbProvider::builder(config.tmdb.api_key.trim())
            .language(&config.tmdb.language)
            .base_url(&config.tmdb.base_url)
            .image_base_url(&config.tmdb.image_base_url)
            .timeout(config.tmdb.timeout())
            .build()?;

        let remuxer = FfmpegRemuxer::new()
            .with_path(config.tools.ffmpeg_path.clone())
            .with_timeout(config.tools.timeout());

        Ok(Self::new(Arc::new(provider), Arc::new(remuxer))
            .with_parser(config.parser.build_parser()?)
            .with_files(config.files.clone()))
    }

    pub fn with_parser(mut self, parser: Parser) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_files(mut self, files: FilesConfig) -> Self {
        self.files = files;
        self
    }

    pub fn resolver(&self) -> &FuzzyResolver {
        &self.resolver
    }

    /// Start a session for `path`: check the extension, check the file
    /// exists, parse the name.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<Session> {
        let path = path.as_ref();

        if !self.files.is_supported(path) {
            return Err(Error::UnsupportedFile {
                path: path.to_path_buf(),
            });
        }
        if !path.is_file() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let info = self.parser.parse(path);
        debug!(file = %path.display(), title = %info.title, year = %info.year, "Parsed file name");

        Ok(Session::new(path.to_path_buf(), info))
    }

    /// Search for candidates and store them in the session.
    ///
    /// `query` defaults to the parsed title. The parsed year narrows the
    /// search only when `use_year` is set; a manually typed query usually
    /// wants the wider net.
    pub async fn search<'s>(
        &self,
        session: &'s mut Session,
        query: Option<&str>,
        use_year: bool,
        cancel: &CancellationToken,
    ) -> Result<&'s [SearchResult]> {
        let query = query.unwrap_or(&session.info().title).trim().to_string();
        if query.is_empty() {
            return Err(Error::EmptyQuery);
        }

        let year = if use_year {
            session.info().year_hint().map(str::to_string)
        } else {
            None
        };

        let candidates = self
            .resolver
            .resolve(&query, year.as_deref(), cancel)
            .await?;
        info!(query = %query, year = ?year, candidates = candidates.len(), "Search complete");

        session.set_candidates(candidates);
        Ok(session.candidates())
    }

    /// Select the candidate at zero-based `index`.
    pub fn select<'s>(&self, session: &'s mut Session, index: usize) -> Result<&'s SearchResult> {
        let count = session.candidates().len();
        if index >= count {
            return Err(Error::SelectionOutOfRange { index, count });
        }
        session.set_selected(index);
        session.selected().ok_or(Error::NoSelection)
    }

    /// Fetch details (and optionally the poster) for the selection and map
    /// them to the tag record.
    ///
    /// A poster that cannot be downloaded is logged and left out.
    pub async fn prepare(
        &self,
        session: &Session,
        attach_poster: bool,
        cancel: &CancellationToken,
    ) -> Result<MovieMetadata> {
        let selected = session.selected().ok_or(Error::NoSelection)?;
        let details = self.provider.movie_details(selected.id, cancel).await?;

        let poster = if attach_poster && !details.poster_path.is_empty() {
            match self.provider.fetch_image(&details.poster_path, cancel).await {
                Ok(bytes) => bytes,
                Err(ProviderError::Cancelled) => return Err(ProviderError::Cancelled.into()),
                Err(e) => {
                    warn!(error = %e, "Failed to download poster, continuing without artwork");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        Ok(map_details(&details, poster))
    }

    /// Where the file will end up once tagged with `tags`.
    pub fn destination(&self, session: &Session, tags: &MovieMetadata) -> PathBuf {
        movietag_av::destination_path(session.file(), tags)
    }

    /// Tag and rename the file for the selected candidate. Returns the new
    /// path, which the session also points to afterwards.
    pub async fn process(
        &self,
        session: &mut Session,
        attach_poster: bool,
        cancel: &CancellationToken,
    ) -> Result<PathBuf> {
        let tags = self.prepare(session, attach_poster, cancel).await?;
        let renamed = self.rewriter.rewrite(session.file(), &tags, cancel).await?;

        info!(from = %session.file().display(), to = %renamed.display(), "File tagged");
        session.set_file(renamed.clone());
        Ok(renamed)
    }
}

#[cfg(test)]
impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn from_config_requires_api_key() {
        let config = Config::default();
        assert_matches!(Pipeline::from_config(&config), Err(Error::MissingApiKey));

        let mut config = Config::default();
        config.tmdb.api_key = "   ".into();
        assert_matches!(Pipeline::from_config(&config), Err(Error::MissingApiKey));
    }

    #[test]
    fn from_config_builds_with_key() {
        let mut config = Config::default();
        config.tmdb.api_key = "key".into();
        assert!(Pipeline::from_config(&config).is_ok());
    }

    #[test]
    fn open_rejects_unsupported_extension() {
        let mut config = Config::default();
        config.tmdb.api_key = "key".into();
        let pipeline = Pipeline::from_config(&config).unwrap();

        assert_matches!(
            pipeline.open("notes.txt"),
            Err(Error::UnsupportedFile { .. })
        );
        assert_matches!(
            pipeline.open("/definitely/not/here.mkv"),
            Err(Error::FileNotFound { .. })
        );
    }
}
