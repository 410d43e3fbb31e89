//! TMDB provider against a mock HTTP server.

use std::time::Duration;

use assert_matches::assert_matches;
use movietag::metadata::{MetadataProvider, ProviderError, TmdbProvider};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer) -> TmdbProvider {
    TmdbProvider::builder("test-key")
        .base_url(server.uri())
        .image_base_url(format!("{}/t/p/original", server.uri()))
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap()
}

#[tokio::test]
async fn search_sends_credentials_query_and_year() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("language", "en-US"))
        .and(query_param("query", "The Matrix"))
        .and(query_param("year", "1999"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1,
            "results": [
                {"id": 603, "title": "The Matrix", "release_date": "1999-03-30",
                 "overview": "Neo", "poster_path": "/matrix.jpg", "vote_average": 8.2},
                {"id": 604, "title": "The Matrix Reloaded", "release_date": null}
            ],
            "total_results": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = provider(&server)
        .search_movie("The Matrix", Some("1999"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, 603);
    assert_eq!(results[0].year(), Some("1999"));
    assert_eq!(results[1].release_date, "");
    assert_eq!(results[1].poster_path, "");
}

#[tokio::test]
async fn details_request_credits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/949"))
        .and(query_param("append_to_response", "credits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 949,
            "title": "Heat",
            "release_date": "1995-12-15",
            "overview": "Obsessive master thief",
            "poster_path": "/heat.jpg",
            "genres": [{"id": 28, "name": "Action"}],
            "credits": {
                "cast": [{"id": 1158, "name": "Al Pacino"}],
                "crew": [{"id": 638, "name": "Michael Mann", "job": "Director"}]
            }
        })))
        .mount(&server)
        .await;

    let details = provider(&server)
        .movie_details(949, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(details.title, "Heat");
    assert_eq!(details.genres[0].name, "Action");
    assert_eq!(details.cast[0].name, "Al Pacino");
    assert_eq!(details.crew[0].job, "Director");
}

#[tokio::test]
async fn image_is_fetched_from_image_origin() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/t/p/original/heat.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\xff\xd8\xffjpeg".to_vec()))
        .mount(&server)
        .await;

    let bytes = provider(&server)
        .fetch_image("/heat.jpg", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(bytes, b"\xff\xd8\xffjpeg");
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status_code": 7,
            "status_message": "Invalid API key"
        })))
        .mount(&server)
        .await;

    let err = provider(&server)
        .search_movie("Heat", None, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_matches!(err, ProviderError::Status { status, .. } if status.as_u16() == 401);
    assert!(!err.to_string().contains("test-key"), "{err}");
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/949"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 949,
            "title": "Heat",
            "genres": []
        })))
        .mount(&server)
        .await;

    let err = provider(&server)
        .movie_details(949, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_matches!(err, ProviderError::Decode { .. });
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": []}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let provider = TmdbProvider::builder("test-key")
        .base_url(server.uri())
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();

    let err = provider
        .search_movie("Heat", None, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_matches!(err, ProviderError::Network { .. });
    assert!(!format!("{err:?}").contains("test-key"), "{err:?}");
}

#[tokio::test]
async fn cancellation_interrupts_in_flight_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": []}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let provider = provider(&server);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let err = provider
        .search_movie("Heat", None, &cancel)
        .await
        .unwrap_err();

    assert_matches!(err, ProviderError::Cancelled);
}

#[tokio::test]
async fn empty_image_path_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = provider(&server)
        .fetch_image("", &CancellationToken::new())
        .await
        .unwrap_err();

    assert_matches!(err, ProviderError::InvalidRequest(_));
}
