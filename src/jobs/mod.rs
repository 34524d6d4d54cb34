//! Background jobs.
//!
//! A [`JobRunner`] spawns download and extraction jobs on the tokio runtime,
//! hands out a [`JobId`] for each and refuses a second job on a target that
//! is still busy.
//!
//! ```rust,no_run
//! use haul::download::DownloadJobSpec;
//! use haul::jobs::{JobRunnerBuilder, Status};
//!
//! # async fn example() -> haul::Result<()> {
//! let runner = JobRunnerBuilder::new()
//!     .on_complete(|summary| println!("{} finished: {:?}", summary.title(), summary.status()))
//!     .build()?;
//!
//! let spec = DownloadJobSpec::from_url("https://example.com/game.zip", "/roms/nes")?;
//! let job = runner.submit_download(spec)?;
//! if let Some(summary) = runner.wait(job).await {
//!     assert_eq!(summary.status(), &Status::Success);
//! }
//! # Ok(())
//! # }
//! ```

pub mod runner;
pub mod summary;

pub use runner::{CompletionCallback, JobRunner, JobRunnerBuilder};
pub use summary::{JobOutput, Status, Summary};

use std::fmt;

/// Identifies one submitted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(u64);

impl JobId {
    /// Wraps a raw id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw id.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The two kinds of jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    Download,
    Extraction,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Download => write!(f, "download"),
            JobKind::Extraction => write!(f, "extraction"),
        }
    }
}
