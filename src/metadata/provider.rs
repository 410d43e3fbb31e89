//! Trait definition and types for metadata providers.
//!
//! This module defines the [`MetadataProvider`] trait that a movie catalog
//! backend implements, along with the shared data types returned by its
//! queries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

// ---------------------------------------------------------------------------
// Search results
// ---------------------------------------------------------------------------

/// A single candidate returned from a movie search.
///
/// Absent text fields are empty strings. `id` is the identity key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Catalog identifier.
    pub id: u64,
    /// Display title.
    pub title: String,
    /// Release date as `YYYY-MM-DD`, or empty.
    pub release_date: String,
    /// Synopsis.
    pub overview: String,
    /// Relative path of the poster image (e.g. `/abc.jpg`), or empty.
    pub poster_path: String,
}

impl SearchResult {
    /// The release year, when the release date starts with four digits.
    pub fn year(&self) -> Option<&str> {
        release_year(&self.release_date)
    }

    /// `"Title (year)"`, or just the title when the year is unknown.
    pub fn display_title(&self) -> String {
        match self.year() {
            Some(year) => format!("{} ({year})", self.title),
            None => self.title.clone(),
        }
    }

    /// The overview cut to at most `max` characters, with `...` appended
    /// when something was cut.
    pub fn display_overview(&self, max: usize) -> String {
        match self.overview.char_indices().nth(max) {
            Some((cut, _)) => format!("{}...", &self.overview[..cut]),
            None => self.overview.clone(),
        }
    }
}

/// The first four characters of a release date, if they are ASCII digits.
pub fn release_year(release_date: &str) -> Option<&str> {
    release_date
        .get(..4)
        .filter(|y| y.bytes().all(|b| b.is_ascii_digit()))
}

// ---------------------------------------------------------------------------
// Details
// ---------------------------------------------------------------------------

/// A genre label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub name: String,
}

/// A cast credit, in billing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,
}

/// A crew credit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewMember {
    pub name: String,
    /// Job title such as `"Director"` or `"Screenplay"`.
    pub job: String,
}

/// Full record for one movie: the search fields plus genres and credits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: u64,
    pub title: String,
    pub release_date: String,
    pub overview: String,
    pub poster_path: String,
    pub genres: Vec<Genre>,
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Result type alias for provider calls.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Errors a metadata provider can return.
///
/// `endpoint` is the request path without its query string, so credentials
/// never end up in error messages or logs.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Transport failure, including timeouts.
    #[error("request to {endpoint} failed: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },

    /// The response body did not match the expected schema.
    #[error("malformed response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// The call itself was invalid and was not sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The caller cancelled the request.
    #[error("request cancelled")]
    Cancelled,
}

impl ProviderError {
    /// The request URL carries the API key, so it is stripped from `source`.
    pub fn network(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            endpoint: endpoint.into(),
            source: source.without_url(),
        }
    }

    pub fn decode(endpoint: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            source,
        }
    }
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Async trait over a remote movie catalog.
///
/// Every call takes a [`CancellationToken`]; a cancelled call returns
/// [`ProviderError::Cancelled`]. Providers are shared behind an `Arc`.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Short, lowercase identifier for this provider (e.g. `"tmdb"`).
    fn name(&self) -> &'static str;

    /// Search for movies matching `query`, optionally narrowed to `year`.
    ///
    /// Results keep the order the service returned them in.
    async fn search_movie(
        &self,
        query: &str,
        year: Option<&str>,
        cancel: &CancellationToken,
    ) -> ProviderResult<Vec<SearchResult>>;

    /// Fetch the full record, including credits, for the movie `id`.
    async fn movie_details(
        &self,
        id: u64,
        cancel: &CancellationToken,
    ) -> ProviderResult<MovieDetails>;

    /// Download the image at the relative `path` (as found in
    /// [`SearchResult::poster_path`]).
    ///
    /// An empty `path` is rejected with [`ProviderError::InvalidRequest`]
    /// before anything is sent.
    async fn fetch_image(&self, path: &str, cancel: &CancellationToken)
        -> ProviderResult<Vec<u8>>;
}
