//! Progressively relaxed movie search.
//!
//! File names often carry words the catalog does not know about (edition
//! tags, uploader names, leftovers the parser missed). The resolver searches
//! the full query first, then only its first two words, then only the first
//! word, and merges everything it finds.

use std::collections::HashSet;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::provider::{MetadataProvider, ProviderResult, SearchResult};

/// Runs tiered searches against a [`MetadataProvider`] and deduplicates the
/// candidates by id.
#[derive(Clone)]
pub struct FuzzyResolver {
    provider: Arc<dyn MetadataProvider>,
}

impl FuzzyResolver {
    pub fn new(provider: Arc<dyn MetadataProvider>) -> Self {
        Self { provider }
    }

    /// Search every tier of `raw_query` in order and merge the results.
    ///
    /// `year` is forwarded unchanged to each tier. Candidates keep the order
    /// in which they were first seen; later duplicates are dropped. The first
    /// failing search aborts the whole resolution.
    pub async fn resolve(
        &self,
        raw_query: &str,
        year: Option<&str>,
        cancel: &CancellationToken,
    ) -> ProviderResult<Vec<SearchResult>> {
        let mut seen = HashSet::new();
        let mut merged = Vec::new();

        for query in search_tiers(raw_query) {
            let results = self.provider.search_movie(&query, year, cancel).await?;
            let before = merged.len();

            merged.extend(results.into_iter().filter(|r| seen.insert(r.id)));

            debug!(
                query = %query,
                year = ?year,
                new = merged.len() - before,
                total = merged.len(),
                "search tier complete"
            );
        }

        Ok(merged)
    }
}

/// The queries issued for `raw_query`: the trimmed query, its first two
/// words, its first word. Empty and repeated tiers are left out.
pub fn search_tiers(raw_query: &str) -> Vec<String> {
    let words: Vec<&str> = raw_query.split_whitespace().collect();

    let candidates = [
        raw_query.trim().to_string(),
        words.iter().take(2).copied().collect::<Vec<_>>().join(" "),
        words.first().map(|w| w.to_string()).unwrap_or_default(),
    ];

    let mut tiers: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !candidate.is_empty() && !tiers.contains(&candidate) {
            tiers.push(candidate);
        }
    }
    tiers
}
