//! TMDB (The Movie Database) metadata provider.
//!
//! Implements [`MetadataProvider`] by querying the TMDB v3 REST API.
//!
//! Features:
//! - Token-bucket rate limiting at 4 requests / second via [`governor`].
//! - Per-request timeout (30 seconds by default).
//! - Cancellation of in-flight requests through a [`CancellationToken`].
//! - Strict response schemas: missing identity fields are decode errors,
//!   missing optional text is an empty string.
//!
//! Failed requests are not retried.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::metadata::provider::{
    CastMember, CrewMember, Genre, MetadataProvider, MovieDetails, ProviderError,
    ProviderResult, SearchResult,
};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/original";
pub const DEFAULT_LANGUAGE: &str = "en-US";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const REQUESTS_PER_SECOND: u32 = 4;

// ---------------------------------------------------------------------------
// TMDB API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse {
    results: Vec<TmdbMovieSearchResult>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieSearchResult {
    id: u64,
    title: String,
    release_date: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieDetail {
    id: u64,
    title: String,
    release_date: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    genres: Vec<TmdbGenre>,
    credits: TmdbCredits,
}

#[derive(Debug, Deserialize)]
struct TmdbGenre {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TmdbCredits {
    cast: Vec<TmdbCast>,
    crew: Vec<TmdbCrew>,
}

#[derive(Debug, Deserialize)]
struct TmdbCast {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TmdbCrew {
    name: String,
    job: String,
}

impl From<TmdbMovieSearchResult> for SearchResult {
    fn from(r: TmdbMovieSearchResult) -> Self {
        SearchResult {
            id: r.id,
            title: r.title,
            release_date: r.release_date.unwrap_or_default(),
            overview: r.overview.unwrap_or_default(),
            poster_path: r.poster_path.unwrap_or_default(),
        }
    }
}

impl From<TmdbMovieDetail> for MovieDetails {
    fn from(d: TmdbMovieDetail) -> Self {
        MovieDetails {
            id: d.id,
            title: d.title,
            release_date: d.release_date.unwrap_or_default(),
            overview: d.overview.unwrap_or_default(),
            poster_path: d.poster_path.unwrap_or_default(),
            genres: d.genres.into_iter().map(|g| Genre { name: g.name }).collect(),
            cast: d
                .credits
                .cast
                .into_iter()
                .map(|c| CastMember { name: c.name })
                .collect(),
            crew: d
                .credits
                .crew
                .into_iter()
                .map(|c| CrewMember {
                    name: c.name,
                    job: c.job,
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Provider implementation
// ---------------------------------------------------------------------------

/// TMDB metadata provider.
///
/// # Examples
///
/// ```no_run
/// use movietag::metadata::providers::TmdbProvider;
///
/// let provider = TmdbProvider::builder("your-api-key")
///     .language("de-DE")
///     .build()?;
/// # Ok::<(), movietag::metadata::ProviderError>(())
/// ```
pub struct TmdbProvider {
    client: reqwest::Client,
    api_key: String,
    language: String,
    base_url: String,
    image_base_url: String,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl std::fmt::Debug for TmdbProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbProvider")
            .field("language", &self.language)
            .field("base_url", &self.base_url)
            .field("image_base_url", &self.image_base_url)
            .finish_non_exhaustive()
    }
}

/// Builder for [`TmdbProvider`].
#[derive(Clone)]
pub struct TmdbProviderBuilder {
    api_key: String,
    language: String,
    base_url: String,
    image_base_url: String,
    timeout: Duration,
}

impl TmdbProviderBuilder {
    /// ISO-639-1 language tag such as `"en-US"`.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// API root, without a trailing slash.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Prefix that relative image paths are appended to.
    pub fn image_base_url(mut self, url: impl Into<String>) -> Self {
        self.image_base_url = url.into();
        self
    }

    /// Timeout applied to every request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the provider.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Client`] if the HTTP client cannot be set up.
    pub fn build(self) -> ProviderResult<TmdbProvider> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ProviderError::Client)?;

        let per_second = NonZeroU32::new(REQUESTS_PER_SECOND).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(per_second));

        Ok(TmdbProvider {
            client,
            api_key: self.api_key,
            language: self.language,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            image_base_url: self.image_base_url.trim_end_matches('/').to_string(),
            rate_limiter,
        })
    }
}

impl TmdbProvider {
    /// Start configuring a provider that authenticates with `api_key`.
    pub fn builder(api_key: impl Into<String>) -> TmdbProviderBuilder {
        TmdbProviderBuilder {
            api_key: api_key.into(),
            language: DEFAULT_LANGUAGE.to_string(),
            base_url: TMDB_BASE_URL.to_string(),
            image_base_url: TMDB_IMAGE_BASE.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Provider with default settings.
    pub fn new(api_key: impl Into<String>) -> ProviderResult<Self> {
        Self::builder(api_key).build()
    }

    /// Execute a rate limited GET and return the body of a 2xx response.
    ///
    /// The whole exchange, body included, races against `cancel`.
    async fn get(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
        cancel: &CancellationToken,
    ) -> ProviderResult<Vec<u8>> {
        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }

        let exchange = async {
            self.rate_limiter.until_ready().await;

            let resp = request
                .send()
                .await
                .map_err(|e| ProviderError::network(endpoint, e))?;

            let status = resp.status();
            if !status.is_success() {
                return Err(ProviderError::Status {
                    endpoint: endpoint.to_string(),
                    status,
                });
            }

            let body = resp
                .bytes()
                .await
                .map_err(|e| ProviderError::network(endpoint, e))?;
            Ok::<_, ProviderError>(body.to_vec())
        };

        tokio::select! {
            result = exchange => result,
            _ = cancel.cancelled() => Err(ProviderError::Cancelled),
        }
    }

    /// GET an API path with credentials and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        cancel: &CancellationToken,
    ) -> ProviderResult<T> {
        let request = self
            .client
            .get(format!("{}{path}", self.base_url))
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
            ])
            .query(params);

        let body = self.get(path, request, cancel).await?;
        decode(path, &body)
    }

    /// Full URL for a relative image path.
    fn image_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.image_base_url)
        } else {
            format!("{}/{path}", self.image_base_url)
        }
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, body: &[u8]) -> ProviderResult<T> {
    serde_json::from_slice(body).map_err(|e| ProviderError::decode(endpoint, e))
}

#[async_trait]
impl MetadataProvider for TmdbProvider {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    async fn search_movie(
        &self,
        query: &str,
        year: Option<&str>,
        cancel: &CancellationToken,
    ) -> ProviderResult<Vec<SearchResult>> {
        let mut params = vec![("query", query)];
        if let Some(year) = year {
            params.push(("year", year));
        }

        debug!(query, year = ?year, "TMDB search movie");

        let body: TmdbSearchResponse = self.get_json("/search/movie", &params, cancel).await?;
        Ok(body.results.into_iter().map(SearchResult::from).collect())
    }

    async fn movie_details(
        &self,
        id: u64,
        cancel: &CancellationToken,
    ) -> ProviderResult<MovieDetails> {
        let path = format!("/movie/{id}");
        debug!(id, "TMDB get movie details");

        let detail: TmdbMovieDetail = self
            .get_json(&path, &[("append_to_response", "credits")], cancel)
            .await?;
        Ok(detail.into())
    }

    async fn fetch_image(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> ProviderResult<Vec<u8>> {
        if path.trim().is_empty() {
            return Err(ProviderError::InvalidRequest(
                "image path must not be empty".to_string(),
            ));
        }

        let url = self.image_url(path);
        debug!(url = %url, "TMDB fetch image");

        self.get(path, self.client.get(&url), cancel).await
    }
}
