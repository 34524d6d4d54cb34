//! Progress reporting from running jobs.

use crate::jobs::{JobId, JobKind};

use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Minimum delay between two numeric progress events of one job.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

/// Receives progress of running jobs.
///
/// Downloads report bytes, extractions report finished entries. `total` is
/// `None` when the server did not announce a size.
pub trait ProgressSink: Send + Sync + Debug {
    /// A job started running.
    fn on_started(&self, _job: JobId, _kind: JobKind, _title: &str) {}

    /// Numeric progress. Never called more often than the configured interval
    /// for one job, and `current` never decreases.
    fn on_progress(&self, job: JobId, current: u64, total: Option<u64>, percentage: Option<u8>);

    /// The entry an extraction job is working on. Called once per entry.
    fn on_current_entry(&self, job: JobId, name: &str);

    /// The job reached a terminal state.
    fn on_finished(&self, _job: JobId) {}
}

/// A sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_progress(&self, _: JobId, _: u64, _: Option<u64>, _: Option<u8>) {}

    fn on_current_entry(&self, _: JobId, _: &str) {}
}

/// Whole percent of `current` over `total`, capped at 100.
pub fn percentage(current: u64, total: Option<u64>) -> Option<u8> {
    match total {
        Some(0) | None => None,
        Some(total) => Some((current.saturating_mul(100) / total).min(100) as u8),
    }
}

/// Rate-limits progress events of one job.
#[derive(Debug)]
pub(crate) struct ProgressReporter {
    job: JobId,
    sink: Arc<dyn ProgressSink>,
    interval: Duration,
    last_emit: Option<Instant>,
    last_current: u64,
}

impl ProgressReporter {
    pub(crate) fn new(job: JobId, sink: Arc<dyn ProgressSink>, interval: Duration) -> Self {
        Self {
            job,
            sink,
            interval,
            last_emit: None,
            last_current: 0,
        }
    }

    /// Emits progress unless the last event is too recent or `current` went
    /// backwards. Returns whether an event was emitted.
    pub(crate) fn report(&mut self, current: u64, total: Option<u64>) -> bool {
        if current < self.last_current {
            return false;
        }
        let now = Instant::now();
        if let Some(last) = self.last_emit {
            if now.duration_since(last) < self.interval {
                return false;
            }
        }
        self.last_emit = Some(now);
        self.last_current = current;
        self.sink
            .on_progress(self.job, current, total, percentage(current, total));
        true
    }

    pub(crate) fn started(&self, kind: JobKind, title: &str) {
        self.sink.on_started(self.job, kind, title);
    }

    pub(crate) fn entry(&self, name: &str) {
        self.sink.on_current_entry(self.job, name);
    }

    pub(crate) fn finished(&self) {
        self.sink.on_finished(self.job);
    }
}
