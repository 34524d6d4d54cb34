//! Terminal rendering of job progress.
//!
//! [`ProgressBars`] is a [`ProgressSink`] that draws one `indicatif` bar per
//! running job inside a shared [`MultiProgress`].
//!
//! # Examples
//!
//! ```rust
//! use haul::progress::{ProgressBars, StyleOptions};
//! use std::sync::Arc;
//!
//! let bars = Arc::new(ProgressBars::new(StyleOptions::default()));
//! ```

use super::sink::ProgressSink;
use super::style::StyleOptions;
use crate::jobs::{JobId, JobKind};

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

struct JobBar {
    kind: JobKind,
    bar: ProgressBar,
}

/// Progress sink drawing terminal progress bars.
pub struct ProgressBars {
    /// The multi-progress instance coordinating every bar.
    multi: Arc<MultiProgress>,
    /// Style options for progress bars.
    style_options: StyleOptions,
    /// Bars of running jobs.
    bars: Mutex<HashMap<JobId, JobBar>>,
}

impl fmt::Debug for ProgressBars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressBars")
            .field("style_options", &self.style_options)
            .finish()
    }
}

impl ProgressBars {
    /// Create a new progress display.
    pub fn new(style_options: StyleOptions) -> Self {
        let multi = match style_options.is_enabled() {
            true => Arc::new(MultiProgress::new()),
            false => Arc::new(MultiProgress::with_draw_target(ProgressDrawTarget::hidden())),
        };

        Self {
            multi,
            style_options,
            bars: Mutex::new(HashMap::new()),
        }
    }

    /// Get the multi-progress instance, e.g. to print lines above the bars.
    pub fn multi(&self) -> Arc<MultiProgress> {
        self.multi.clone()
    }

    /// Number of bars currently displayed.
    pub fn active(&self) -> usize {
        self.bars.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn add_bar(&self, kind: JobKind, len: Option<u64>) -> ProgressBar {
        let opts = match kind {
            JobKind::Download => self.style_options.download(),
            JobKind::Extraction => self.style_options.extract(),
        };
        self.multi.add(opts.to_progress_bar(len))
    }
}

impl ProgressSink for ProgressBars {
    fn on_started(&self, job: JobId, kind: JobKind, title: &str) {
        let bar = self.add_bar(kind, None);
        bar.set_prefix(title.to_string());
        let mut bars = self.bars.lock().unwrap_or_else(|e| e.into_inner());
        bars.insert(job, JobBar { kind, bar });
    }

    fn on_progress(&self, job: JobId, current: u64, total: Option<u64>, _percentage: Option<u8>) {
        let mut bars = self.bars.lock().unwrap_or_else(|e| e.into_inner());
        let entry = bars.entry(job).or_insert_with(|| JobBar {
            kind: JobKind::Download,
            bar: self.add_bar(JobKind::Download, total),
        });
        if let Some(total) = total {
            entry.bar.set_length(total);
        }
        entry.bar.set_position(current);
    }

    fn on_current_entry(&self, job: JobId, name: &str) {
        let bars = self.bars.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = bars.get(&job) {
            entry.bar.set_message(name.to_string());
        }
    }

    fn on_finished(&self, job: JobId) {
        let removed = self
            .bars
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&job);
        if let Some(JobBar { kind, bar }) = removed {
            let clear = match kind {
                JobKind::Download => self.style_options.download().clear,
                JobKind::Extraction => self.style_options.extract().clear,
            };
            if clear {
                bar.finish_and_clear();
            } else {
                bar.finish();
            }
        }
    }
}
