//! Error handling for the haul library.
//!
//! This module provides centralized error handling for both job executors and
//! the status ledger. Every terminal failure of a job maps to one [`Error`]
//! variant; cancellation is reported as [`Error::Cancelled`] so callers can
//! tell it apart from a recorded failure.

use reqwest::StatusCode;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can happen when running download and extraction jobs.
#[derive(Error, Debug)]
pub enum Error {
    /// Error from an underlying system.
    ///
    /// This variant captures internal errors that don't fit into other categories,
    /// such as a background task that panicked.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Error from the underlying URL parser or the expected URL format.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// I/O Error.
    ///
    /// This variant wraps standard I/O errors that can occur while writing the
    /// destination file, extracting entries or rewriting a ledger.
    #[error("I/O error: {source}")]
    IOError {
        #[from]
        source: io::Error,
    },

    /// The request never produced a response.
    ///
    /// Connection failures, timeouts and broken body streams all end up here.
    #[error("Transport error: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },

    /// Transport error raised by the middleware stack.
    #[error("Transport error: {source}")]
    Middleware {
        #[from]
        source: reqwest_middleware::Error,
    },

    /// The server answered with a non-success status.
    #[error("Server responded with {0}")]
    Server(StatusCode),

    /// An extraction precondition did not hold.
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// The archive is a recognized container that cannot be unpacked.
    #[error("Unsupported archive format: {0}")]
    UnsupportedFormat(String),

    /// The ZIP reader rejected the archive.
    #[error("Archive error: {source}")]
    Archive {
        #[from]
        source: zip::result::ZipError,
    },

    /// A value cannot be written to a ledger without breaking its line format.
    #[error("Invalid ledger value: {0:?}")]
    InvalidLedgerValue(String),

    /// Another job is already running against the same target.
    #[error("Target {0} already has an active job")]
    TargetBusy(String),

    /// The job was cancelled through its token.
    #[error("Job cancelled")]
    Cancelled,
}

impl Error {
    /// Whether this error is a cancellation rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

/// Reasons an extraction job refuses to start.
///
/// Each variant is a distinct failure reason and is recorded in the ledger
/// like any other failure. The archive is never touched.
#[derive(Error, Debug)]
pub enum PreconditionError {
    #[error("Archive does not exist: {}", .0.display())]
    ArchiveMissing(PathBuf),

    #[error("Archive is not readable: {}: {source}", .path.display())]
    ArchiveUnreadable { path: PathBuf, source: io::Error },

    #[error("Destination parent does not exist: {}", .0.display())]
    DestinationParentMissing(PathBuf),

    #[error("Destination parent is not writable: {}", .0.display())]
    DestinationParentNotWritable(PathBuf),

    #[error("Destination is not writable: {}", .0.display())]
    DestinationNotWritable(PathBuf),
}

/// Result type alias for operations that can fail with a haul error.
pub type Result<T> = std::result::Result<T, Error>;
