//! Pipeline steps end to end with scripted catalog and remuxer.

mod common;

use std::fs;
use std::sync::Arc;

use assert_matches::assert_matches;
use common::{heat_details, result, FakeProvider, RecordingRemuxer};
use movietag::{Error, Pipeline};
use tokio_util::sync::CancellationToken;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nposter";

fn heat_provider() -> FakeProvider {
    FakeProvider::new()
        .with_search(
            "Heat",
            vec![
                result(949, "Heat", "1995-12-15"),
                result(12345, "Heat", "1986-03-14"),
            ],
        )
        .with_details(heat_details())
}

#[tokio::test]
async fn open_search_select_process() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("Heat.1995.1080p.BluRay.x264-GROUP.mkv");
    fs::write(&file, b"movie").unwrap();

    let provider = Arc::new(heat_provider().with_image(PNG));
    let remuxer = RecordingRemuxer::new();
    let pipeline = Pipeline::new(provider.clone(), remuxer.clone());
    let cancel = CancellationToken::new();

    let mut session = pipeline.open(&file).unwrap();
    assert_eq!(session.info().title, "Heat");
    assert_eq!(session.info().year, "1995");

    let candidates = pipeline
        .search(&mut session, None, true, &cancel)
        .await
        .unwrap();
    assert_eq!(candidates.len(), 2);
    assert_eq!(
        provider.search_calls(),
        vec![("Heat".to_string(), Some("1995".to_string()))]
    );

    let selected = pipeline.select(&mut session, 0).unwrap();
    assert_eq!(selected.id, 949);

    let renamed = pipeline.process(&mut session, true, &cancel).await.unwrap();

    assert_eq!(renamed, dir.path().join("Heat (1995).mkv"));
    assert_eq!(session.file(), renamed.as_path());
    assert!(!file.exists());
    assert_eq!(fs::read(&renamed).unwrap(), b"remuxed:movie");
    assert_eq!(provider.image_calls(), vec!["/heat.jpg"]);

    let plans = remuxer.plans();
    assert_eq!(plans.len(), 1);
    assert!(plans[0].attaches_poster());
    let metadata = plans[0].metadata();
    assert!(metadata.contains(&("director".to_string(), "Michael Mann".to_string())));
    assert!(metadata.contains(&("actors".to_string(), "Al Pacino, Robert De Niro".to_string())));
    assert!(metadata.contains(&("genre".to_string(), "Action, Crime".to_string())));
}

#[tokio::test]
async fn manual_query_skips_year() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("heat.1995.mkv");
    fs::write(&file, b"movie").unwrap();

    let provider = Arc::new(heat_provider());
    let pipeline = Pipeline::new(provider.clone(), RecordingRemuxer::new());

    let mut session = pipeline.open(&file).unwrap();
    pipeline
        .search(&mut session, Some("  Heat "), false, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(provider.search_calls(), vec![("Heat".to_string(), None)]);
}

#[tokio::test]
async fn poster_failure_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("heat.mkv");
    fs::write(&file, b"movie").unwrap();

    // No image configured: every download fails.
    let provider = Arc::new(heat_provider());
    let remuxer = RecordingRemuxer::new();
    let pipeline = Pipeline::new(provider.clone(), remuxer.clone());
    let cancel = CancellationToken::new();

    let mut session = pipeline.open(&file).unwrap();
    pipeline.search(&mut session, None, true, &cancel).await.unwrap();
    pipeline.select(&mut session, 0).unwrap();
    let renamed = pipeline.process(&mut session, true, &cancel).await.unwrap();

    assert!(renamed.exists());
    assert_eq!(provider.image_calls().len(), 1);
    assert!(!remuxer.plans()[0].attaches_poster());
}

#[tokio::test]
async fn poster_can_be_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("heat.mkv");
    fs::write(&file, b"movie").unwrap();

    let provider = Arc::new(heat_provider().with_image(PNG));
    let pipeline = Pipeline::new(provider.clone(), RecordingRemuxer::new());
    let cancel = CancellationToken::new();

    let mut session = pipeline.open(&file).unwrap();
    pipeline.search(&mut session, None, true, &cancel).await.unwrap();
    pipeline.select(&mut session, 0).unwrap();
    let tags = pipeline.prepare(&session, false, &cancel).await.unwrap();

    assert!(!tags.has_poster());
    assert!(provider.image_calls().is_empty());
    assert_eq!(
        pipeline.destination(&session, &tags),
        dir.path().join("Heat (1995).mkv")
    );
    // Preparing alone leaves the file where it was.
    assert!(file.exists());
}

#[tokio::test]
async fn process_requires_selection() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("heat.mkv");
    fs::write(&file, b"movie").unwrap();

    let pipeline = Pipeline::new(Arc::new(heat_provider()), RecordingRemuxer::new());
    let cancel = CancellationToken::new();
    let mut session = pipeline.open(&file).unwrap();

    let err = pipeline.process(&mut session, true, &cancel).await.unwrap_err();
    assert_matches!(err, Error::NoSelection);

    pipeline.search(&mut session, None, true, &cancel).await.unwrap();
    let err = pipeline.select(&mut session, 2).unwrap_err();
    assert_matches!(err, Error::SelectionOutOfRange { index: 2, count: 2 });
    assert!(session.selected().is_none());
}

#[tokio::test]
async fn empty_title_needs_a_query() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("1080p.BluRay.mkv");
    fs::write(&file, b"movie").unwrap();

    let provider = Arc::new(FakeProvider::new());
    let pipeline = Pipeline::new(provider.clone(), RecordingRemuxer::new());
    let mut session = pipeline.open(&file).unwrap();
    assert_eq!(session.info().title, "");

    let err = pipeline
        .search(&mut session, None, true, &CancellationToken::new())
        .await
        .unwrap_err();
    assert_matches!(err, Error::EmptyQuery);
    assert!(provider.search_calls().is_empty());
}

#[tokio::test]
async fn cancelled_process_leaves_file_alone() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("heat.mkv");
    fs::write(&file, b"movie").unwrap();

    let remuxer = RecordingRemuxer::new();
    let pipeline = Pipeline::new(Arc::new(heat_provider()), remuxer.clone());
    let cancel = CancellationToken::new();
    let mut session = pipeline.open(&file).unwrap();
    pipeline.search(&mut session, None, true, &cancel).await.unwrap();
    pipeline.select(&mut session, 0).unwrap();

    cancel.cancel();
    let err = pipeline.process(&mut session, true, &cancel).await.unwrap_err();

    assert!(err.is_cancelled(), "{err}");
    assert!(remuxer.plans().is_empty());
    assert_eq!(fs::read(&file).unwrap(), b"movie");
}

#[test]
fn open_validates_extension_and_existence() {
    let pipeline = Pipeline::new(Arc::new(FakeProvider::new()), RecordingRemuxer::new());
    let dir = tempfile::tempdir().unwrap();

    let text = dir.path().join("notes.txt");
    fs::write(&text, b"x").unwrap();
    assert_matches!(pipeline.open(&text), Err(Error::UnsupportedFile { .. }));

    assert_matches!(
        pipeline.open(dir.path().join("missing.mkv")),
        Err(Error::FileNotFound { .. })
    );

    let upper = dir.path().join("HEAT.1995.MKV");
    fs::write(&upper, b"x").unwrap();
    assert_eq!(pipeline.open(&upper).unwrap().info().title, "HEAT");
}
