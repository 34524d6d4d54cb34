//! Spawns jobs and tracks them until they reach a terminal state.

use super::summary::{JobOutput, Status, Summary};
use super::{JobId, JobKind};
use crate::cancel::CancellationToken;
use crate::download::DownloadJobSpec;
use crate::downloader::{Downloader, DownloaderBuilder};
use crate::error::{Error, Result};
use crate::extractor::{ExtractionJobSpec, Extractor, ExtractorBuilder};
use crate::ledger::{DownloadTarget, StatusLedger};
use crate::progress::ProgressSink;

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::debug;

/// Callback invoked with every terminal [`Summary`].
pub type CompletionCallback = Box<dyn Fn(&Summary) + Send + Sync>;

/// Default number of unclaimed summaries kept for [`JobRunner::wait`].
pub const DEFAULT_RETAIN_FINISHED: usize = 256;

struct ActiveJob {
    target: DownloadTarget,
    cancel: CancellationToken,
}

#[derive(Default)]
struct State {
    active: HashMap<JobId, ActiveJob>,
    /// Handles of jobs nobody is waiting for yet.
    handles: HashMap<JobId, (JobKind, JoinHandle<Summary>)>,
    /// Summaries of finished jobs nobody waited for, oldest first.
    finished: VecDeque<Summary>,
}

struct Inner {
    downloader: Downloader,
    extractor: Extractor,
    on_complete: Option<Arc<CompletionCallback>>,
    retain_finished: usize,
    next_id: AtomicU64,
    state: Mutex<State>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Releases the target and reports the summary.
    ///
    /// When no caller is waiting on the job, its handle is dropped and the
    /// summary is parked for a later [`JobRunner::wait`]. Only the most
    /// recent `retain_finished` summaries are parked.
    fn complete(&self, summary: Summary) -> Summary {
        self.lock().active.remove(&summary.job());
        debug!("Job {} finished: {:?}", summary.job(), summary.status());
        if let Some(ref callback) = self.on_complete {
            callback(&summary);
        }

        let mut state = self.lock();
        if state.handles.remove(&summary.job()).is_some() && self.retain_finished > 0 {
            if state.finished.len() >= self.retain_finished {
                state.finished.pop_front();
            }
            state.finished.push_back(summary.clone());
        }
        summary
    }
}

/// Runs download and extraction jobs in the background.
///
/// Cloning a runner is cheap and every clone shares the same jobs.
#[derive(Clone)]
pub struct JobRunner {
    inner: Arc<Inner>,
}

impl fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobRunner")
            .field("downloader", &self.inner.downloader)
            .field("extractor", &self.inner.extractor)
            .field("on_complete", &self.inner.on_complete.is_some())
            .finish()
    }
}

impl JobRunner {
    /// Gets the download executor.
    pub fn downloader(&self) -> &Downloader {
        &self.inner.downloader
    }

    /// Gets the extraction executor.
    pub fn extractor(&self) -> &Extractor {
        &self.inner.extractor
    }

    /// Starts a download job.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn submit_download(&self, spec: DownloadJobSpec) -> Result<JobId> {
        let (job, cancel) = self.reserve(spec.target())?;
        let inner = self.inner.clone();
        self.spawn(job, JobKind::Download, async move {
            let result = inner.downloader.execute(job, &spec, &cancel).await;
            let summary = Summary::from_result(
                job,
                JobKind::Download,
                spec.title.as_str(),
                result.map(JobOutput::from),
            );
            inner.complete(summary)
        });
        Ok(job)
    }

    /// Starts an extraction job.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn submit_extraction(&self, spec: ExtractionJobSpec) -> Result<JobId> {
        let (job, cancel) = self.reserve(spec.target())?;
        let inner = self.inner.clone();
        self.spawn(job, JobKind::Extraction, async move {
            let result = inner.extractor.execute(job, &spec, &cancel).await;
            let summary = Summary::from_result(
                job,
                JobKind::Extraction,
                spec.title.as_str(),
                result.map(JobOutput::from),
            );
            inner.complete(summary)
        });
        Ok(job)
    }

    /// Requests cancellation of a job. Returns `false` if the job is not
    /// running.
    pub fn cancel(&self, job: JobId) -> bool {
        match self.inner.lock().active.get(&job) {
            Some(active) => {
                debug!("Cancelling job {}", job);
                active.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Waits for a job to finish.
    ///
    /// Returns `None` for unknown ids, for jobs that were already waited for
    /// and for jobs whose summary was evicted after finishing unclaimed.
    pub async fn wait(&self, job: JobId) -> Option<Summary> {
        let (kind, handle) = {
            let mut state = self.inner.lock();
            if let Some(index) = state.finished.iter().position(|s| s.job() == job) {
                return state.finished.remove(index);
            }
            state.handles.remove(&job)?
        };
        match handle.await {
            Ok(summary) => Some(summary),
            Err(e) => {
                self.inner.lock().active.remove(&job);
                let status = Status::Fail(format!("Job task failed: {}", e));
                Some(Summary::new(job, kind, String::new(), status))
            }
        }
    }

    /// Whether a job is still running.
    pub fn is_active(&self, job: JobId) -> bool {
        self.inner.lock().active.contains_key(&job)
    }

    /// Allocates an id for a job on `target`, unless the target is busy.
    fn reserve(&self, target: DownloadTarget) -> Result<(JobId, CancellationToken)> {
        let mut state = self.inner.lock();
        if state.active.values().any(|active| active.target == target) {
            return Err(Error::TargetBusy(target.to_string()));
        }
        let job = JobId::new(self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let cancel = CancellationToken::new();
        state.active.insert(
            job,
            ActiveJob {
                target,
                cancel: cancel.clone(),
            },
        );
        Ok((job, cancel))
    }

    fn spawn<F>(&self, job: JobId, kind: JobKind, task: F)
    where
        F: Future<Output = Summary> + Send + 'static,
    {
        debug!("Spawning {} job {}", kind, job);
        // The lock is held until the handle is stored, so `complete` always
        // finds it.
        let mut state = self.inner.lock();
        let handle = tokio::spawn(task);
        state.handles.insert(job, (kind, handle));
    }
}

/// A builder used to create a [`JobRunner`].
///
/// Executors that are not given explicitly are built with the default
/// options, the builder's ledger and the builder's progress sink.
#[derive(Default)]
pub struct JobRunnerBuilder {
    downloader: Option<Downloader>,
    extractor: Option<Extractor>,
    ledger: Option<StatusLedger>,
    progress: Option<Arc<dyn ProgressSink>>,
    on_complete: Option<Arc<CompletionCallback>>,
    retain_finished: Option<usize>,
}

impl JobRunnerBuilder {
    /// Creates a builder with the default options.
    pub fn new() -> Self {
        JobRunnerBuilder::default()
    }

    /// Sets how many summaries of finished jobs nobody waited for are kept
    /// for [`JobRunner::wait`]. Older ones are dropped first.
    ///
    /// Defaults to [`DEFAULT_RETAIN_FINISHED`].
    pub fn retain_finished(mut self, count: usize) -> Self {
        self.retain_finished = Some(count);
        self
    }

    /// Uses `downloader` for download jobs.
    pub fn downloader(mut self, downloader: Downloader) -> Self {
        self.downloader = Some(downloader);
        self
    }

    /// Uses `extractor` for extraction jobs.
    pub fn extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Sets the ledger of the default executors.
    pub fn ledger(mut self, ledger: StatusLedger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Sets the progress sink of the default executors.
    pub fn progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Sets a callback invoked with the summary of every finished job.
    ///
    /// The callback runs on the job's task, after the ledger was updated.
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Summary) + Send + Sync + 'static,
    {
        self.on_complete = Some(Arc::new(Box::new(callback)));
        self
    }

    /// Create the [`JobRunner`] with the specified options.
    pub fn build(self) -> Result<JobRunner> {
        let downloader = match self.downloader {
            Some(downloader) => downloader,
            None => {
                let mut builder = DownloaderBuilder::new();
                if let Some(ref ledger) = self.ledger {
                    builder = builder.ledger(ledger.clone());
                }
                if let Some(ref sink) = self.progress {
                    builder = builder.progress(sink.clone());
                }
                builder.build()?
            }
        };
        let extractor = match self.extractor {
            Some(extractor) => extractor,
            None => {
                let mut builder = ExtractorBuilder::new();
                if let Some(ledger) = self.ledger {
                    builder = builder.ledger(ledger);
                }
                if let Some(sink) = self.progress {
                    builder = builder.progress(sink);
                }
                builder.build()
            }
        };

        Ok(JobRunner {
            inner: Arc::new(Inner {
                downloader,
                extractor,
                on_complete: self.on_complete,
                retain_finished: self.retain_finished.unwrap_or(DEFAULT_RETAIN_FINISHED),
                next_id: AtomicU64::new(0),
                state: Mutex::new(State::default()),
            }),
        })
    }
}
