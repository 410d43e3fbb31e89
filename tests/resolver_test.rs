//! Tiered search behaviour of the fuzzy resolver.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use common::{result, FakeProvider};
use movietag::metadata::{FuzzyResolver, ProviderError};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn merges_tiers_in_first_seen_order() {
    let provider = Arc::new(
        FakeProvider::new()
            .with_search(
                "The Lord of the Rings",
                vec![result(120, "The Fellowship of the Ring", "2001-12-18")],
            )
            .with_search(
                "The Lord",
                vec![
                    result(121, "The Two Towers", "2002-12-18"),
                    result(120, "The Fellowship of the Ring", "2001-12-18"),
                ],
            )
            .with_search(
                "The",
                vec![
                    result(122, "The Return of the King", "2003-12-17"),
                    result(121, "The Two Towers", "2002-12-18"),
                ],
            ),
    );
    let resolver = FuzzyResolver::new(provider.clone());

    let found = resolver
        .resolve("The Lord of the Rings", None, &CancellationToken::new())
        .await
        .unwrap();

    let ids: Vec<u64> = found.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![120, 121, 122]);

    let queries: Vec<String> = provider.search_calls().into_iter().map(|c| c.0).collect();
    assert_eq!(queries, vec!["The Lord of the Rings", "The Lord", "The"]);
}

#[tokio::test]
async fn year_hint_is_forwarded_to_every_tier() {
    let provider = Arc::new(FakeProvider::new());
    let resolver = FuzzyResolver::new(provider.clone());

    resolver
        .resolve("Blade Runner 2049", Some("2017"), &CancellationToken::new())
        .await
        .unwrap();

    let calls = provider.search_calls();
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|(_, year)| year.as_deref() == Some("2017")));
}

#[tokio::test]
async fn single_word_query_searches_once() {
    let provider = Arc::new(FakeProvider::new().with_search("Heat", vec![result(949, "Heat", "1995-12-15")]));
    let resolver = FuzzyResolver::new(provider.clone());

    let found = resolver
        .resolve("Heat", None, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(provider.search_calls().len(), 1);
}

#[tokio::test]
async fn blank_query_issues_no_requests() {
    let provider = Arc::new(FakeProvider::new());
    let resolver = FuzzyResolver::new(provider.clone());

    let found = resolver
        .resolve("   ", None, &CancellationToken::new())
        .await
        .unwrap();

    assert!(found.is_empty());
    assert!(provider.search_calls().is_empty());
}

#[tokio::test]
async fn failure_aborts_remaining_tiers() {
    let provider = Arc::new(
        FakeProvider::new()
            .with_search("Blade Runner 2049", vec![result(335984, "Blade Runner 2049", "2017-10-04")])
            .with_failing_search("Blade Runner"),
    );
    let resolver = FuzzyResolver::new(provider.clone());

    let err = resolver
        .resolve("Blade Runner 2049", None, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_matches!(err, ProviderError::Status { .. });
    assert_eq!(provider.search_calls().len(), 2);
}

#[tokio::test]
async fn cancellation_is_surfaced() {
    let provider = Arc::new(FakeProvider::new());
    let resolver = FuzzyResolver::new(provider.clone());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = resolver.resolve("Heat", None, &cancel).await.unwrap_err();
    assert_matches!(err, ProviderError::Cancelled);
}
