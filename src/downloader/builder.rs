//! Builder pattern implementation for creating [`Downloader`] instances.
//!
//! # Examples
//!
//! ```rust
//! use haul::downloader::DownloaderBuilder;
//! use haul::http::MediaPageRule;
//! use std::time::Duration;
//!
//! # fn example() -> haul::Result<()> {
//! let downloader = DownloaderBuilder::new()
//!     .connect_timeout(Duration::from_secs(10))
//!     .media_page_rule(Some(MediaPageRule {
//!         param: "fid".into(),
//!         page_template: "{origin}/file/{id}".into(),
//!     }))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use super::{config::DownloaderConfig, downloader::Downloader};
use crate::error::Result;
use crate::http::MediaPageRule;
use crate::ledger::StatusLedger;
use crate::progress::ProgressSink;

use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName};
use reqwest::Proxy;
use std::sync::Arc;
use std::time::Duration;

/// A builder used to create a [`Downloader`].
///
/// ```rust
/// # fn main() -> haul::Result<()> {
/// use haul::downloader::DownloaderBuilder;
///
/// let d = DownloaderBuilder::new().user_agent("haul/0.1").build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct DownloaderBuilder {
    config: DownloaderConfig,
}

impl DownloaderBuilder {
    /// Creates a builder with the default options.
    pub fn new() -> Self {
        DownloaderBuilder::default()
    }

    /// Sets the User-Agent sent with the browser-like header set.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Route every request through `proxy`.
    pub fn proxy(mut self, proxy: Proxy) -> Self {
        self.config.http.proxy = Some(proxy);
        self
    }

    /// Sets the time allowed to establish a connection.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.http.connect_timeout = Some(timeout);
        self
    }

    /// Sets the detail page rule, or disables it with `None`.
    pub fn media_page_rule(mut self, rule: Option<MediaPageRule>) -> Self {
        self.config.media_page = rule;
        self
    }

    /// Sets the minimum delay between two progress events.
    pub fn progress_interval(mut self, interval: Duration) -> Self {
        self.config.progress_interval = interval;
        self
    }

    /// Sets the progress sink.
    pub fn progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.config.progress = sink;
        self
    }

    /// Sets the ledger recording sources and failures.
    pub fn ledger(mut self, ledger: StatusLedger) -> Self {
        self.config.ledger = ledger;
        self
    }

    /// Helper method to get or create a new HeaderMap.
    fn new_header(&self) -> HeaderMap {
        match self.config.http.headers {
            Some(ref h) => h.to_owned(),
            _ => HeaderMap::new(),
        }
    }

    /// Add extra http headers sent with every request.
    ///
    /// You can call `.headers()` multiple times and all `HeaderMap` will be
    /// merged into a single one. Headers set per request (User-Agent, Accept,
    /// Referer, Cookie) take precedence.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        let mut new = self.new_header();
        new.extend(headers);

        self.config.http.headers = Some(new);
        self
    }

    /// Add one extra http header.
    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        let mut new = self.new_header();

        new.insert(name, value);

        self.config.http.headers = Some(new);
        self
    }

    /// Create the [`Downloader`] with the specified options.
    pub fn build(self) -> Result<Downloader> {
        Downloader::new(self.config)
    }
}
