//! Configuration and builder of the extraction executor.

use super::extractor::Extractor;
use crate::archive::zip::DEFAULT_CHUNK_SIZE;
use crate::ledger::StatusLedger;
use crate::progress::{NoopProgress, ProgressSink, DEFAULT_PROGRESS_INTERVAL};

use std::sync::Arc;
use std::time::Duration;

/// Configuration structure for the extraction executor.
#[derive(Clone, Debug)]
pub struct ExtractorConfig {
    /// Size of a single write.
    pub chunk_size: usize,
    /// Minimum delay between two numeric progress events.
    pub progress_interval: Duration,
    /// Where progress goes.
    pub progress: Arc<dyn ProgressSink>,
    /// Where outcomes are recorded.
    pub ledger: StatusLedger,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            progress: Arc::new(NoopProgress),
            ledger: StatusLedger::default(),
        }
    }
}

/// A builder used to create an [`Extractor`].
///
/// ```rust
/// use haul::extractor::ExtractorBuilder;
///
/// let extractor = ExtractorBuilder::new().chunk_size(16 * 1024).build();
/// ```
#[derive(Default)]
pub struct ExtractorBuilder {
    config: ExtractorConfig,
}

impl ExtractorBuilder {
    /// Creates a builder with the default options.
    pub fn new() -> Self {
        ExtractorBuilder::default()
    }

    /// Sets the size of a single write.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.config.chunk_size = chunk_size.max(1);
        self
    }

    /// Sets the minimum delay between two numeric progress events.
    pub fn progress_interval(mut self, interval: Duration) -> Self {
        self.config.progress_interval = interval;
        self
    }

    /// Sets the progress sink.
    pub fn progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.config.progress = sink;
        self
    }

    /// Sets the ledger recording outcomes.
    pub fn ledger(mut self, ledger: StatusLedger) -> Self {
        self.config.ledger = ledger;
        self
    }

    /// Create the [`Extractor`] with the specified options.
    pub fn build(self) -> Extractor {
        Extractor::new(self.config)
    }
}
