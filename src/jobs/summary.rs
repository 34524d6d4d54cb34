//! Terminal reports of jobs.

use super::{JobId, JobKind};
use crate::downloader::Downloaded;
use crate::error::{Error, Result};
use crate::extractor::Extracted;

/// Terminal job status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Job failed with error message
    Fail(String),
    /// Job completed successfully
    Success,
    /// Job was cancelled before completion
    Cancelled,
}

/// What a successful job produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutput {
    /// A downloaded file.
    Downloaded(Downloaded),
    /// An extracted payload.
    Extracted(Extracted),
}

impl From<Downloaded> for JobOutput {
    fn from(value: Downloaded) -> Self {
        JobOutput::Downloaded(value)
    }
}

impl From<Extracted> for JobOutput {
    fn from(value: Extracted) -> Self {
        JobOutput::Extracted(value)
    }
}

/// Represents a job summary.
#[derive(Debug, Clone)]
pub struct Summary {
    job: JobId,
    kind: JobKind,
    title: String,
    status: Status,
    output: Option<JobOutput>,
}

impl Summary {
    /// Create a new [`Summary`] with the given status and no output.
    pub fn new(job: JobId, kind: JobKind, title: impl Into<String>, status: Status) -> Self {
        Self {
            job,
            kind,
            title: title.into(),
            status,
            output: None,
        }
    }

    /// Create a [`Summary`] from an executor result.
    pub fn from_result<T: Into<JobOutput>>(
        job: JobId,
        kind: JobKind,
        title: impl Into<String>,
        result: Result<T>,
    ) -> Self {
        let summary = Self::new(job, kind, title, Status::Success);
        match result {
            Ok(output) => Self {
                output: Some(output.into()),
                ..summary
            },
            Err(Error::Cancelled) => summary.with_status(Status::Cancelled),
            Err(e) => summary.fail(e),
        }
    }

    /// Attach a status to a [`Summary`].
    pub fn with_status(self, status: Status) -> Self {
        Self { status, ..self }
    }

    /// Mark the summary as failed with a message.
    pub fn fail(self, msg: impl std::fmt::Display) -> Self {
        Self {
            status: Status::Fail(format!("{}", msg)),
            ..self
        }
    }

    /// Get the job id.
    pub fn job(&self) -> JobId {
        self.job
    }

    /// Get the job kind.
    pub fn kind(&self) -> JobKind {
        self.kind
    }

    /// Get the job title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Get a reference to the summary's status.
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Get what the job produced, if it succeeded.
    pub fn output(&self) -> Option<&JobOutput> {
        self.output.as_ref()
    }

    /// Whether the job succeeded.
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}
