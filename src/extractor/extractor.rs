//! Extraction executor implementation.
//!
//! The [`Extractor`] validates its inputs, unpacks ZIP archives (or copies
//! anything that is not an archive) on the blocking thread pool, then records
//! the outcome in the ledger.

use super::config::ExtractorConfig;
use super::spec::ExtractionJobSpec;
use crate::archive::{classify, ArchiveKind, ZipExtractor};
use crate::cancel::CancellationToken;
use crate::error::{Error, PreconditionError, Result};
use crate::jobs::{JobId, JobKind};
use crate::ledger::StatusLedger;
use crate::progress::ProgressReporter;

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A finished extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// Directory holding the produced files.
    pub dest_dir: PathBuf,
    /// Number of files written.
    pub files_extracted: usize,
    /// What the payload turned out to be.
    pub kind: ArchiveKind,
}

/// Runs extraction jobs.
///
/// ```rust
/// use haul::extractor::ExtractorBuilder;
///
/// let extractor = ExtractorBuilder::new().build();
/// ```
#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractorConfig,
}

impl Extractor {
    pub(crate) fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Gets the size of a single write.
    pub fn chunk_size(&self) -> usize {
        self.config.chunk_size
    }

    /// Gets the ledger.
    pub fn ledger(&self) -> &StatusLedger {
        &self.config.ledger
    }

    /// Runs one extraction job to completion.
    ///
    /// Files written before a failure or a cancellation are left in place.
    /// On success the destination is recorded in the ledger and, when asked,
    /// the payload is deleted.
    pub async fn execute(
        &self,
        job: JobId,
        spec: &ExtractionJobSpec,
        cancel: &CancellationToken,
    ) -> Result<Extracted> {
        let target = spec.target();
        let progress = ProgressReporter::new(
            job,
            self.config.progress.clone(),
            self.config.progress_interval,
        );
        progress.started(JobKind::Extraction, &spec.title);

        let task_spec = spec.clone();
        let task_cancel = cancel.clone();
        let chunk_size = self.config.chunk_size;
        let mut task_progress = ProgressReporter::new(
            job,
            self.config.progress.clone(),
            self.config.progress_interval,
        );
        let outcome = tokio::task::spawn_blocking(move || {
            extract(&task_spec, &task_cancel, chunk_size, &mut task_progress)
        })
        .await
        .map_err(|e| Error::Internal(format!("Extraction task failed: {}", e)))
        .and_then(|result| result);

        let result = match outcome {
            Ok(extracted) => {
                info!(
                    logical_id = ?spec.logical_id,
                    "Extracted {} file(s) from {:?} to {:?}",
                    extracted.files_extracted,
                    spec.archive_path,
                    extracted.dest_dir
                );
                self.config
                    .ledger
                    .set_extraction_path(&target, &spec.dest_dir)
                    .map(|_| {
                        self.cleanup(spec, &extracted);
                        extracted
                    })
            }
            Err(Error::Cancelled) => {
                info!("Extraction of {:?} cancelled", spec.archive_path);
                Err(Error::Cancelled)
            }
            Err(e) => {
                warn!("Extraction of {:?} failed: {}", spec.archive_path, e);
                self.config.ledger.record_failure(&target, &e.to_string());
                Err(e)
            }
        };

        progress.finished();
        result
    }

    /// Deletes the payload when asked and when it is not the produced file.
    fn cleanup(&self, spec: &ExtractionJobSpec, extracted: &Extracted) {
        if !spec.delete_archive_on_success || extracted.files_extracted == 0 {
            return;
        }
        if extracted.kind == ArchiveKind::Unknown {
            if let Some(name) = spec.archive_path.file_name() {
                if same_file(&spec.archive_path, &spec.dest_dir.join(name)) {
                    debug!("Keeping {:?}, it is the extracted file", spec.archive_path);
                    return;
                }
            }
        }
        match fs::remove_file(&spec.archive_path) {
            Ok(()) => debug!("Deleted {:?}", spec.archive_path),
            Err(e) => warn!("Could not delete {:?}: {}", spec.archive_path, e),
        }
    }
}

/// Blocking part of a job: checks, classifies and unpacks.
fn extract(
    spec: &ExtractionJobSpec,
    cancel: &CancellationToken,
    chunk_size: usize,
    progress: &mut ProgressReporter,
) -> Result<Extracted> {
    check_preconditions(&spec.archive_path, &spec.dest_dir)?;

    let kind = classify(&spec.archive_path);
    debug!("{:?} classified as {}", spec.archive_path, kind);

    let files_extracted = match kind {
        ArchiveKind::Zip => {
            let mut archive = ZipExtractor::open(&spec.archive_path)?.chunk_size(chunk_size);
            let total = archive.file_count() as u64;
            let written = archive.extract_to(&spec.dest_dir, cancel, |name, done| {
                progress.entry(name);
                progress.report(done as u64, Some(total));
            })?;
            progress.report(written as u64, Some(total));
            written
        }
        ArchiveKind::Rar => return Err(Error::UnsupportedFormat(kind.to_string())),
        ArchiveKind::Unknown => copy_verbatim(spec, cancel, chunk_size, progress)?,
    };

    Ok(Extracted {
        dest_dir: spec.dest_dir.clone(),
        files_extracted,
        kind,
    })
}

/// Validates the payload and the destination before touching anything.
///
/// The destination's parent only has to be writable when the destination
/// itself still has to be created.
pub(crate) fn check_preconditions(
    archive: &Path,
    dest_dir: &Path,
) -> std::result::Result<(), PreconditionError> {
    if !archive.exists() {
        return Err(PreconditionError::ArchiveMissing(archive.to_path_buf()));
    }
    File::open(archive)
        .and_then(|mut file| file.read(&mut [0u8; 1]))
        .map_err(|source| PreconditionError::ArchiveUnreadable {
            path: archive.to_path_buf(),
            source,
        })?;

    if let Some(parent) = dest_dir.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            return Err(PreconditionError::DestinationParentMissing(
                parent.to_path_buf(),
            ));
        }
        if !dest_dir.exists() && tempfile::tempfile_in(parent).is_err() {
            return Err(PreconditionError::DestinationParentNotWritable(
                parent.to_path_buf(),
            ));
        }
    }

    fs::create_dir_all(dest_dir)
        .and_then(|_| tempfile::tempfile_in(dest_dir))
        .map_err(|_| PreconditionError::DestinationNotWritable(dest_dir.to_path_buf()))?;
    Ok(())
}

/// Copies a non-archive payload into the destination under its own name.
fn copy_verbatim(
    spec: &ExtractionJobSpec,
    cancel: &CancellationToken,
    chunk_size: usize,
    progress: &mut ProgressReporter,
) -> Result<usize> {
    let name = spec
        .archive_path
        .file_name()
        .ok_or_else(|| Error::Internal(format!("No file name in {:?}", spec.archive_path)))?;
    let output = spec.dest_dir.join(name);

    progress.entry(&name.to_string_lossy());
    if same_file(&spec.archive_path, &output) {
        debug!("{:?} is already in place", output);
        progress.report(1, Some(1));
        return Ok(1);
    }

    debug!("Copying {:?} to {:?}", spec.archive_path, output);
    let mut input = File::open(&spec.archive_path)?;
    let mut out = File::create(&output)?;
    let mut buffer = vec![0u8; chunk_size];
    loop {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let read = input.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        out.write_all(&buffer[..read])?;
    }
    out.flush()?;

    progress.report(1, Some(1));
    Ok(1)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
