//! Shared test doubles for integration tests.
//!
//! [`FakeProvider`] answers catalog calls from scripted data and records every
//! search. [`RecordingRemuxer`] stands in for ffmpeg: it records the plan and
//! writes a recognisable output file.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use movietag::metadata::{
    CastMember, CrewMember, Genre, MetadataProvider, MovieDetails, ProviderError, ProviderResult,
    SearchResult,
};
use movietag_av::{MediaRemuxer, RemuxPlan};
use tokio_util::sync::CancellationToken;

pub fn result(id: u64, title: &str, release_date: &str) -> SearchResult {
    SearchResult {
        id,
        title: title.to_string(),
        release_date: release_date.to_string(),
        overview: format!("Overview of {title}"),
        poster_path: format!("/poster{id}.jpg"),
    }
}

pub fn heat_details() -> MovieDetails {
    MovieDetails {
        id: 949,
        title: "Heat".into(),
        release_date: "1995-12-15".into(),
        overview: "A group of professional bank robbers".into(),
        poster_path: "/heat.jpg".into(),
        genres: vec![
            Genre {
                name: "Action".into(),
            },
            Genre {
                name: "Crime".into(),
            },
        ],
        cast: vec![
            CastMember {
                name: "Al Pacino".into(),
            },
            CastMember {
                name: "Robert De Niro".into(),
            },
        ],
        crew: vec![CrewMember {
            name: "Michael Mann".into(),
            job: "Director".into(),
        }],
    }
}

fn server_error(endpoint: &str) -> ProviderError {
    ProviderError::Status {
        endpoint: endpoint.to_string(),
        status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Default)]
pub struct FakeProvider {
    searches: HashMap<String, Vec<SearchResult>>,
    failing_queries: Vec<String>,
    details: HashMap<u64, MovieDetails>,
    image: Option<Vec<u8>>,
    calls: Mutex<Vec<(String, Option<String>)>>,
    image_calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, query: &str, results: Vec<SearchResult>) -> Self {
        self.searches.insert(query.to_string(), results);
        self
    }

    pub fn with_failing_search(mut self, query: &str) -> Self {
        self.failing_queries.push(query.to_string());
        self
    }

    pub fn with_details(mut self, details: MovieDetails) -> Self {
        self.details.insert(details.id, details);
        self
    }

    /// Poster bytes served for any image path. Without this, image
    /// downloads fail.
    pub fn with_image(mut self, bytes: &[u8]) -> Self {
        self.image = Some(bytes.to_vec());
        self
    }

    pub fn search_calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn image_calls(&self) -> Vec<String> {
        self.image_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn search_movie(
        &self,
        query: &str,
        year: Option<&str>,
        cancel: &CancellationToken,
    ) -> ProviderResult<Vec<SearchResult>> {
        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), year.map(str::to_string)));

        if self.failing_queries.iter().any(|q| q == query) {
            return Err(server_error("/search/movie"));
        }
        Ok(self.searches.get(query).cloned().unwrap_or_default())
    }

    async fn movie_details(
        &self,
        id: u64,
        cancel: &CancellationToken,
    ) -> ProviderResult<MovieDetails> {
        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }
        self.details
            .get(&id)
            .cloned()
            .ok_or_else(|| server_error(&format!("/movie/{id}")))
    }

    async fn fetch_image(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> ProviderResult<Vec<u8>> {
        if path.is_empty() {
            return Err(ProviderError::InvalidRequest("empty image path".into()));
        }
        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }
        self.image_calls.lock().unwrap().push(path.to_string());
        self.image.clone().ok_or_else(|| server_error(path))
    }
}

/// Remuxer double that copies the source with a `remuxed:` prefix.
#[derive(Default)]
pub struct RecordingRemuxer {
    plans: Mutex<Vec<RemuxPlan>>,
}

impl RecordingRemuxer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn plans(&self) -> Vec<RemuxPlan> {
        self.plans.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaRemuxer for RecordingRemuxer {
    fn name(&self) -> &str {
        "recording"
    }

    fn ensure_available(&self) -> movietag_av::Result<()> {
        Ok(())
    }

    async fn remux(
        &self,
        plan: &RemuxPlan,
        _cancel: &CancellationToken,
    ) -> movietag_av::Result<()> {
        self.plans.lock().unwrap().push(plan.clone());
        let mut out = b"remuxed:".to_vec();
        out.extend(fs::read(&plan.inputs()[0]).unwrap());
        fs::write(plan.output(), out).unwrap();
        Ok(())
    }
}
