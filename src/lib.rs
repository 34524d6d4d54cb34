//! Haul runs durable download and extraction jobs.
//!
//! A download job fetches a remote payload to local storage, an extraction
//! job unpacks it into a destination directory. Both record their outcome in
//! a small status ledger stored next to the payload, so that what was
//! fetched, where it was unpacked and why it failed survives a restart.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use haul::{
//!     download::DownloadJobSpec, extractor::ExtractionJobSpec, jobs::JobRunnerBuilder, Error,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Error> {
//! let runner = JobRunnerBuilder::new().build()?;
//!
//! let spec = DownloadJobSpec::from_url("https://example.com/roms/game.zip", "roms/nes")?;
//! let job = runner.submit_download(spec)?;
//! let summary = runner.wait(job).await;
//!
//! if summary.is_some_and(|s| s.is_success()) {
//!     let spec = ExtractionJobSpec::new("roms/nes/game.zip", "roms/nes/game")
//!         .delete_archive_on_success(true);
//!     let job = runner.submit_extraction(spec)?;
//!     runner.wait(job).await;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`archive`] - Payload classification and ZIP extraction
//! - [`cancel`] - Cooperative cancellation tokens
//! - [`download`] - The `DownloadJobSpec` describing a download job
//! - [`downloader`] - The download executor and its builder
//! - [`error`] - Centralized error handling with the `Error` enum
//! - [`extractor`] - The extraction executor, its builder and job description
//! - [`http`] - HTTP client and browser-like session helpers
//! - [`jobs`] - The background `JobRunner`, job ids and summaries
//! - [`ledger`] - The on-disk status ledger
//! - [`progress`] - Progress sinks, throttling and progress bars
//! - [`utils`] - Shared utility functions

pub mod archive;
pub mod cancel;
pub mod download;
pub mod downloader;
pub mod error;
pub mod extractor;
pub mod http;
pub mod jobs;
pub mod ledger;
pub mod progress;
pub mod utils;

pub use archive::{classify, ArchiveKind};
pub use cancel::CancellationToken;
pub use download::DownloadJobSpec;
pub use downloader::{Downloader, DownloaderBuilder};
pub use error::{Error, PreconditionError, Result};
pub use extractor::{ExtractionJobSpec, Extractor, ExtractorBuilder};
pub use http::{create_http_client, HttpClientConfig};
pub use jobs::{JobId, JobKind, JobRunner, JobRunnerBuilder, Status, Summary};
pub use ledger::{DownloadTarget, StatusLedger};
pub use progress::{NoopProgress, ProgressBars, ProgressSink, StyleOptions};
