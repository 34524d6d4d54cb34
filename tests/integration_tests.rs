//! Integration tests for the haul crate.
//!
//! These tests drive whole jobs through the [`JobRunner`]: a download
//! followed by an extraction against the same ledger, concurrent submissions
//! on one target and cancellation by job id.

use haul::download::DownloadJobSpec;
use haul::extractor::ExtractionJobSpec;
use haul::jobs::{JobKind, JobOutput, JobRunner, JobRunnerBuilder, Status};
use haul::ledger::StatusLedger;
use haul::Error;

use reqwest::Url;
use std::fs::File;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

mod common;
use common::helpers::*;

fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, data) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(data.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn runner_with_counter(counter: Arc<AtomicUsize>) -> JobRunner {
    JobRunnerBuilder::new()
        .ledger(StatusLedger::default())
        .on_complete(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_download_then_extract() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/roms/game.zip"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(zip_bytes(&[("game.nes", "NES"), ("manual.txt", "read me")])),
        )
        .mount(&server)
        .await;

    let dir = create_temp_dir();
    let completed = Arc::new(AtomicUsize::new(0));
    let runner = runner_with_counter(completed.clone());
    let url = format!("{}/roms/game.zip", server.uri());

    let spec = DownloadJobSpec::from_url(&url, dir.path())
        .unwrap()
        .logical_id(TEST_SLUG);
    let target = spec.target();
    let job = runner.submit_download(spec).unwrap();
    let summary = runner.wait(job).await.unwrap();

    assert_eq!(summary.status(), &Status::Success);
    assert_eq!(summary.kind(), JobKind::Download);
    let archive = match summary.output() {
        Some(JobOutput::Downloaded(downloaded)) => downloaded.path.clone(),
        other => panic!("unexpected output {:?}", other),
    };
    assert!(runner.downloader().ledger().has_source(&target, &url).unwrap());

    let dest = dir.path().join("game");
    let job = runner
        .submit_extraction(ExtractionJobSpec::new(&archive, &dest).delete_archive_on_success(true))
        .unwrap();
    let summary = runner.wait(job).await.unwrap();

    assert!(summary.is_success());
    assert_file_exists(&dest.join("game.nes"));
    assert_file_exists(&dest.join("manual.txt"));
    assert!(!archive.exists());
    assert_eq!(
        ledger_text(&target),
        format!("SLUG:{}\n{}\t{}\n", TEST_SLUG, url, dest.display())
    );
    assert_eq!(completed.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_busy_target_is_refused() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"data".to_vec())
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let dir = create_temp_dir();
    let runner = runner_with_counter(Arc::new(AtomicUsize::new(0)));
    let url = Url::parse(&format!("{}/game.zip", server.uri())).unwrap();

    let first = runner
        .submit_download(DownloadJobSpec::new(url.clone(), dir.path(), "game.zip"))
        .unwrap();
    assert!(runner.is_active(first));

    let second = runner.submit_download(DownloadJobSpec::new(url.clone(), dir.path(), "game.zip"));
    assert!(matches!(second, Err(Error::TargetBusy(_))));

    // A different target is fine.
    let other = runner
        .submit_download(DownloadJobSpec::new(url, dir.path(), "other.zip"))
        .unwrap();

    assert!(runner.cancel(first));
    assert!(runner.cancel(other));
    assert_eq!(runner.wait(first).await.unwrap().status(), &Status::Cancelled);
    assert_eq!(runner.wait(other).await.unwrap().status(), &Status::Cancelled);
    assert!(!runner.is_active(first));
    assert!(!runner.cancel(first));
}

#[tokio::test]
async fn test_cancelled_job_leaves_ledger_untouched() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"data".to_vec())
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let dir = create_temp_dir();
    let completed = Arc::new(AtomicUsize::new(0));
    let runner = runner_with_counter(completed.clone());
    let url = Url::parse(&format!("{}/game.zip", server.uri())).unwrap();
    let spec = DownloadJobSpec::new(url.clone(), dir.path(), "game.zip");
    let before = format!("{}\tERROR:previous failure\n", url);
    write_ledger(&spec.target(), &before);

    let job = runner.submit_download(spec.clone()).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(runner.cancel(job));
    let summary = tokio::time::timeout(Duration::from_secs(10), runner.wait(job))
        .await
        .expect("cancellation was not honoured")
        .unwrap();

    assert_eq!(summary.status(), &Status::Cancelled);
    assert_eq!(ledger_text(&spec.target()), before);
    assert_eq!(completed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_extraction_summary() {
    let dir = create_temp_dir();
    let runner = runner_with_counter(Arc::new(AtomicUsize::new(0)));
    let archive = dir.path().join("game.rar");
    File::create(&archive)
        .unwrap()
        .write_all(b"Rar!\x1a\x07\x00")
        .unwrap();

    let job = runner
        .submit_extraction(ExtractionJobSpec::new(&archive, dir.path().join("game")))
        .unwrap();
    let summary = runner.wait(job).await.unwrap();

    assert_eq!(
        summary.status(),
        &Status::Fail("Unsupported archive format: RAR".into())
    );
    assert!(summary.output().is_none());
    assert_eq!(summary.title(), "game.rar");
}
