//! Tests for the download executor.
//!
//! Every test runs against a local `wiremock` server and checks both the
//! written file and the ledger left next to it.

use haul::cancel::CancellationToken;
use haul::download::DownloadJobSpec;
use haul::downloader::DownloaderBuilder;
use haul::http::MediaPageRule;
use haul::jobs::{JobId, JobKind};
use haul::ledger::StatusLedger;
use haul::Error;

use reqwest::{StatusCode, Url};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::helpers::*;

fn url(server: &MockServer, path: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), path)).unwrap()
}

fn cancel_after(millis: u64) -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(millis)).await;
        trigger.cancel();
    });
    cancel
}

#[test]
fn test_downloader_defaults() {
    let downloader = DownloaderBuilder::new().build().unwrap();

    assert_eq!(downloader.media_page_rule(), Some(&MediaPageRule::default()));
    assert_eq!(downloader.progress_interval(), Duration::from_millis(500));
    assert!(downloader.headers().is_none());
    assert!(format!("{:?}", downloader).contains("Downloader"));
}

#[test]
fn test_downloader_getters() {
    let downloader = DownloaderBuilder::new()
        .user_agent(TEST_USER_AGENT)
        .media_page_rule(None)
        .progress_interval(Duration::from_secs(1))
        .build()
        .unwrap();

    assert_eq!(downloader.user_agent(), TEST_USER_AGENT);
    assert!(downloader.media_page_rule().is_none());
    assert_eq!(downloader.progress_interval(), Duration::from_secs(1));
}

#[tokio::test]
async fn test_download_writes_file_and_records_sources() {
    init_tracing();
    let server = MockServer::start().await;
    let body = create_test_content(4096);
    Mock::given(method("GET"))
        .and(path("/files/game.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = create_temp_dir();
    let progress = Arc::new(RecordingProgress::default());
    let downloader = create_test_downloader(progress.clone());
    let target_url = url(&server, "/files/game.zip");
    let original_url = url(&server, "/catalog/game");
    let spec = DownloadJobSpec::new(target_url.clone(), dir.path(), "game.zip")
        .original_url(original_url.clone())
        .logical_id(TEST_SLUG);

    let downloaded = downloader
        .execute(JobId::new(1), &spec, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(downloaded.path, dir.path().join("game.zip"));
    assert_eq!(downloaded.size, 4096);
    assert_file_size(&downloaded.path, 4096);
    assert_eq!(
        ledger_text(&spec.target()),
        format!("SLUG:{}\n{}\n{}\n", TEST_SLUG, target_url, original_url)
    );

    let events = progress.events();
    assert_eq!(
        events.first(),
        Some(&ProgressEvent::Started(JobKind::Download, "game.zip".into()))
    );
    assert_eq!(events.last(), Some(&ProgressEvent::Finished));
    let values = progress.progress_values();
    assert_non_decreasing(&values);
    assert_eq!(values.last(), Some(&4096));
}

#[tokio::test]
async fn test_repeated_download_does_not_repeat_sources() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/game.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK".to_vec()))
        .mount(&server)
        .await;

    let dir = create_temp_dir();
    let downloader = create_test_downloader(Arc::new(RecordingProgress::default()));
    let target_url = url(&server, "/game.zip");
    let spec = DownloadJobSpec::new(target_url.clone(), dir.path(), "game.zip");

    for id in 1..=2 {
        downloader
            .execute(JobId::new(id), &spec, &CancellationToken::new())
            .await
            .unwrap();
    }

    assert_eq!(ledger_text(&spec.target()), format!("{}\n", target_url));
}

#[tokio::test]
async fn test_server_error_is_recorded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone.zip"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = create_temp_dir();
    let downloader = create_test_downloader(Arc::new(RecordingProgress::default()));
    let target_url = url(&server, "/gone.zip");
    let spec = DownloadJobSpec::new(target_url.clone(), dir.path(), "gone.zip");
    write_ledger(&spec.target(), &format!("{}\n", target_url));

    let result = downloader
        .execute(JobId::new(1), &spec, &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(Error::Server(StatusCode::NOT_FOUND))));
    assert_eq!(
        ledger_text(&spec.target()),
        format!("{}\tERROR:Server responded with 404 Not Found\n", target_url)
    );
    // The destination is truncated up front and not cleaned up.
    assert_file_size(&dir.path().join("gone.zip"), 0);
}

#[tokio::test]
async fn test_failure_without_ledger_creates_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = create_temp_dir();
    let downloader = create_test_downloader(Arc::new(RecordingProgress::default()));
    let spec = DownloadJobSpec::new(url(&server, "/x.zip"), dir.path(), "x.zip");

    let result = downloader
        .execute(JobId::new(1), &spec, &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(Error::Server(_))));
    assert!(!spec.target().ledger_path().exists());
}

#[tokio::test]
async fn test_cancelled_download_leaves_ledger_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(create_test_content(1024))
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let dir = create_temp_dir();
    let downloader = create_test_downloader(Arc::new(RecordingProgress::default()));
    let spec = DownloadJobSpec::new(url(&server, "/slow.zip"), dir.path(), "slow.zip");
    let before = format!("SLUG:{}\nhttps://mirror.example.com/slow.zip\n", TEST_SLUG);
    write_ledger(&spec.target(), &before);

    let result = tokio::time::timeout(
        Duration::from_secs(10),
        downloader.execute(JobId::new(1), &spec, &cancel_after(100)),
    )
    .await
    .expect("cancellation was not honoured");

    assert!(matches!(result, Err(Error::Cancelled)));
    assert_eq!(ledger_text(&spec.target()), before);
}

#[tokio::test]
async fn test_pre_roll_delay_is_cancellable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = create_temp_dir();
    let downloader = create_test_downloader(Arc::new(RecordingProgress::default()));
    let spec = DownloadJobSpec::new(url(&server, "/x.zip"), dir.path(), "x.zip")
        .pre_roll_delay_seconds(60);

    let result = tokio::time::timeout(
        Duration::from_secs(10),
        downloader.execute(JobId::new(1), &spec, &cancel_after(50)),
    )
    .await
    .expect("cancellation was not honoured");

    assert!(matches!(result, Err(Error::Cancelled)));
}

#[tokio::test]
async fn test_session_cookies_and_warmup_referer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/landing"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/game.zip"))
        .and(header("cookie", "sid=abc123"))
        .and(header("referer", format!("{}/", server.uri()).as_str()))
        .and(header("user-agent", TEST_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"data".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = create_temp_dir();
    let downloader = create_test_downloader(Arc::new(RecordingProgress::default()));
    let spec = DownloadJobSpec::new(url(&server, "/game.zip"), dir.path(), "game.zip")
        .warmup_url(url(&server, "/landing"))
        .session_cookies("sid=abc123");

    let downloaded = downloader
        .execute(JobId::new(1), &spec, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(downloaded.size, 4);
}

#[tokio::test]
async fn test_warmup_cookies_are_replayed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/landing"))
        .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "session=xyz; Path=/"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/game.zip"))
        .and(header("cookie", "session=xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"data".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = create_temp_dir();
    let downloader = create_test_downloader(Arc::new(RecordingProgress::default()));
    let spec = DownloadJobSpec::new(url(&server, "/game.zip"), dir.path(), "game.zip")
        .warmup_url(url(&server, "/landing"));

    downloader
        .execute(JobId::new(1), &spec, &CancellationToken::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_failed_warmup_is_tolerated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/game.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"data".to_vec()))
        .mount(&server)
        .await;

    let dir = create_temp_dir();
    let downloader = create_test_downloader(Arc::new(RecordingProgress::default()));
    // Nothing listens on port 9 of the loopback address.
    let spec = DownloadJobSpec::new(url(&server, "/game.zip"), dir.path(), "game.zip")
        .warmup_url(Url::parse("http://127.0.0.1:9/landing").unwrap());

    let downloaded = downloader
        .execute(JobId::new(1), &spec, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(downloaded.size, 4);
}

#[tokio::test]
async fn test_media_page_is_visited_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vault/"))
        .and(query_param("p", "details"))
        .and(query_param("mediaId", "42"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let detail_page = format!("{}/vault/?p=details&mediaId=42", server.uri());
    Mock::given(method("GET"))
        .and(path("/get"))
        .and(header("referer", detail_page.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"data".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = create_temp_dir();
    let downloader = create_test_downloader(Arc::new(RecordingProgress::default()));
    let spec = DownloadJobSpec::new(url(&server, "/get?mediaId=42"), dir.path(), "game.zip");

    downloader
        .execute(JobId::new(1), &spec, &CancellationToken::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_downloader_with_memory_ledger() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"data".to_vec()))
        .mount(&server)
        .await;

    let dir = create_temp_dir();
    let ledger = StatusLedger::new(haul::ledger::MemoryLedgerStore::default());
    let downloader = DownloaderBuilder::new()
        .ledger(ledger.clone())
        .build()
        .unwrap();
    let target_url = url(&server, "/game.zip");
    let spec = DownloadJobSpec::new(target_url.clone(), dir.path(), "game.zip");

    downloader
        .execute(JobId::new(1), &spec, &CancellationToken::new())
        .await
        .unwrap();

    assert!(ledger.has_source(&spec.target(), target_url.as_str()).unwrap());
    assert!(!spec.target().ledger_path().exists());
}
