//! Configuration of the download executor.

use crate::http::{HttpClientConfig, MediaPageRule, BROWSER_USER_AGENT};
use crate::ledger::StatusLedger;
use crate::progress::{NoopProgress, ProgressSink, DEFAULT_PROGRESS_INTERVAL};

use std::sync::Arc;
use std::time::Duration;

/// Configuration structure for the download executor.
#[derive(Clone, Debug)]
pub struct DownloaderConfig {
    /// HTTP client setup, including extra default headers.
    pub http: HttpClientConfig,
    /// User-Agent of the browser-like header set.
    pub user_agent: String,
    /// Detail page rule for URLs carrying a media id. `None` disables it.
    pub media_page: Option<MediaPageRule>,
    /// Minimum delay between two progress events.
    pub progress_interval: Duration,
    /// Where progress goes.
    pub progress: Arc<dyn ProgressSink>,
    /// Where sources and failures are recorded.
    pub ledger: StatusLedger,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            http: HttpClientConfig::default(),
            user_agent: BROWSER_USER_AGENT.into(),
            media_page: Some(MediaPageRule::default()),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            progress: Arc::new(NoopProgress),
            ledger: StatusLedger::default(),
        }
    }
}
