#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use haul::downloader::{Downloader, DownloaderBuilder};
use haul::extractor::{Extractor, ExtractorBuilder};
use haul::jobs::{JobId, JobKind};
use haul::ledger::{DownloadTarget, StatusLedger};
use haul::progress::{ProgressBarOpts, ProgressSink, StyleOptions};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

// Common test constants
pub const TEST_USER_AGENT: &str = "haul-test-agent";
pub const TEST_SLUG: &str = "super-mario-bros";

/// Routes library logs to the test output, filtered by `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Creates a temporary directory for testing purposes
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Creates a temporary file with the given content
pub fn create_temp_file(dir: &Path, filename: &str, content: &[u8]) -> PathBuf {
    let file_path = dir.join(filename);
    fs::write(&file_path, content).expect("Failed to write temporary file");
    file_path
}

/// Creates test file content of specified size
pub fn create_test_content(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 256) as u8).collect()
}

/// Writes a ZIP archive holding `entries`. Names ending in `/` are directories.
pub fn create_test_zip(dir: &Path, filename: &str, entries: &[(&str, &str)]) -> PathBuf {
    let path = dir.join(filename);
    let mut writer = ZipWriter::new(File::create(&path).expect("Failed to create archive"));
    for (name, data) in entries {
        if name.ends_with('/') {
            writer
                .add_directory(*name, SimpleFileOptions::default())
                .expect("Failed to add directory");
        } else {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .expect("Failed to start entry");
            writer
                .write_all(data.as_bytes())
                .expect("Failed to write entry");
        }
    }
    writer.finish().expect("Failed to finish archive");
    path
}

/// Asserts that a file exists at the given path
pub fn assert_file_exists(path: &Path) {
    assert!(path.exists(), "File should exist at path: {:?}", path);
}

/// Asserts that a file has the expected size
pub fn assert_file_size(path: &Path, expected_size: u64) {
    let metadata = fs::metadata(path).expect("Failed to get file metadata");
    assert_eq!(
        metadata.len(),
        expected_size,
        "File size mismatch at path: {:?}",
        path
    );
}

/// Makes `path` read-only for everyone (unix mode `0o555`)
#[cfg(unix)]
pub fn make_read_only(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o555))
        .expect("Failed to change permissions");
}

/// Makes `path` writable again so the temporary directory can be removed
#[cfg(unix)]
pub fn make_writable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .expect("Failed to change permissions");
}

/// Whether a read-only directory actually refuses writes, which is not the
/// case when the tests run as root
#[cfg(unix)]
pub fn permissions_enforced(dir: &Path) -> bool {
    let locked = dir.join("permission-check");
    fs::create_dir(&locked).expect("Failed to create directory");
    make_read_only(&locked);
    let enforced = File::create(locked.join("file")).is_err();
    make_writable(&locked);
    fs::remove_dir_all(&locked).expect("Failed to remove directory");
    enforced
}

// === Ledger Helpers ===

/// Reads the raw ledger file of `target`
pub fn ledger_text(target: &DownloadTarget) -> String {
    fs::read_to_string(target.ledger_path()).expect("Failed to read ledger")
}

/// Writes a ledger file for `target` holding `text`
pub fn write_ledger(target: &DownloadTarget, text: &str) {
    fs::write(target.ledger_path(), text).expect("Failed to write ledger");
}

// === Progress Helpers ===

/// One event received by a [`RecordingProgress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started(JobKind, String),
    Progress(u64, Option<u64>, Option<u8>),
    Entry(String),
    Finished,
}

/// A progress sink remembering every event.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<(JobId, ProgressEvent)>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub fn progress_values(&self) -> Vec<u64> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::Progress(current, _, _) => Some(current),
                _ => None,
            })
            .collect()
    }

    pub fn entries(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::Entry(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    fn push(&self, job: JobId, event: ProgressEvent) {
        self.events.lock().unwrap().push((job, event));
    }
}

impl ProgressSink for RecordingProgress {
    fn on_started(&self, job: JobId, kind: JobKind, title: &str) {
        self.push(job, ProgressEvent::Started(kind, title.to_string()));
    }

    fn on_progress(&self, job: JobId, current: u64, total: Option<u64>, percentage: Option<u8>) {
        self.push(job, ProgressEvent::Progress(current, total, percentage));
    }

    fn on_current_entry(&self, job: JobId, name: &str) {
        self.push(job, ProgressEvent::Entry(name.to_string()));
    }

    fn on_finished(&self, job: JobId) {
        self.push(job, ProgressEvent::Finished);
    }
}

/// Asserts that numeric progress never goes backwards
pub fn assert_non_decreasing(values: &[u64]) {
    assert!(
        values.windows(2).all(|pair| pair[0] <= pair[1]),
        "Progress went backwards: {:?}",
        values
    );
}

/// Creates hidden style options for testing
pub fn create_hidden_style_options() -> StyleOptions {
    StyleOptions::new(ProgressBarOpts::hidden(), ProgressBarOpts::hidden())
}

// === Executor Helpers ===

/// Creates a downloader writing to the file ledger and reporting every event
pub fn create_test_downloader(progress: Arc<RecordingProgress>) -> Downloader {
    DownloaderBuilder::new()
        .user_agent(TEST_USER_AGENT)
        .progress(progress)
        .progress_interval(Duration::ZERO)
        .build()
        .expect("Failed to build downloader")
}

/// Creates an extractor writing to the file ledger and reporting every event
pub fn create_test_extractor(progress: Arc<RecordingProgress>) -> Extractor {
    ExtractorBuilder::new()
        .progress(progress)
        .progress_interval(Duration::ZERO)
        .ledger(StatusLedger::default())
        .build()
}
