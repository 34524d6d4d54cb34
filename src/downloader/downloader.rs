//! Download executor implementation.
//!
//! This module contains the [`Downloader`], which runs one
//! [`DownloadJobSpec`] at a time: it prepares the session the server
//! expects, streams the body to disk, reports progress and records the
//! outcome in the ledger.

use super::config::DownloaderConfig;
use crate::cancel::{cancellable, CancellationToken};
use crate::download::DownloadJobSpec;
use crate::error::{Error, Result};
use crate::http::{browser_headers, create_http_client, origin_referer, MediaPageRule};
use crate::jobs::{JobId, JobKind};
use crate::ledger::StatusLedger;
use crate::progress::ProgressReporter;
use crate::utils::total_size;

use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, REFERER};
use reqwest::Url;
use reqwest_middleware::{ClientWithMiddleware, RequestBuilder};
use std::fmt;
use std::fmt::Debug;
use std::path::PathBuf;
use std::time::Duration;
use tokio::{fs, fs::OpenOptions, io::AsyncWriteExt};
use tracing::{debug, info, warn};

/// A finished download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downloaded {
    /// Path of the written file.
    pub path: PathBuf,
    /// Number of bytes written.
    pub size: u64,
}

/// Runs download jobs.
///
/// A downloader can be created via its builder:
///
/// ```rust
/// # fn main() -> haul::Result<()> {
/// use haul::downloader::DownloaderBuilder;
///
/// let d = DownloaderBuilder::new().build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Downloader {
    config: DownloaderConfig,
    client: ClientWithMiddleware,
}

impl Debug for Downloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Downloader")
            .field("config", &self.config)
            .finish()
    }
}

impl Downloader {
    /// Creates a new Downloader with the given configuration.
    pub(crate) fn new(config: DownloaderConfig) -> Result<Self> {
        let client = create_http_client(config.http.clone())?;
        Ok(Self { config, client })
    }

    /// Gets the User-Agent of the browser-like header set.
    pub fn user_agent(&self) -> &str {
        &self.config.user_agent
    }

    /// Gets the extra headers sent with every request.
    pub fn headers(&self) -> Option<&HeaderMap> {
        self.config.http.headers.as_ref()
    }

    /// Gets the detail page rule.
    pub fn media_page_rule(&self) -> Option<&MediaPageRule> {
        self.config.media_page.as_ref()
    }

    /// Gets the minimum delay between two progress events.
    pub fn progress_interval(&self) -> Duration {
        self.config.progress_interval
    }

    /// Gets the ledger.
    pub fn ledger(&self) -> &StatusLedger {
        &self.config.ledger
    }

    /// Runs one download job to completion.
    ///
    /// The destination file is truncated before any request is made and is
    /// not cleaned up on failure. On success the target and original URLs are
    /// appended to the ledger; on failure the error is recorded there; on
    /// cancellation the ledger is left untouched.
    pub async fn execute(
        &self,
        job: JobId,
        spec: &DownloadJobSpec,
        cancel: &CancellationToken,
    ) -> Result<Downloaded> {
        let target = spec.target();
        let mut progress = ProgressReporter::new(
            job,
            self.config.progress.clone(),
            self.config.progress_interval,
        );
        progress.started(JobKind::Download, &spec.title);

        let result = match self.transfer(spec, cancel, &mut progress).await {
            Ok(downloaded) => {
                info!(
                    "Downloaded {} ({} bytes) to {:?}",
                    spec.target_url, downloaded.size, downloaded.path
                );
                self.config
                    .ledger
                    .append_source_url(
                        &target,
                        spec.target_url.as_str(),
                        spec.distinct_original_url().map(Url::as_str),
                        spec.logical_id.as_deref(),
                    )
                    .map(|_| downloaded)
            }
            Err(Error::Cancelled) => {
                info!("Download of {} cancelled", spec.target_url);
                Err(Error::Cancelled)
            }
            Err(e) => {
                warn!("Download of {} failed: {}", spec.target_url, e);
                self.config.ledger.record_failure(&target, &e.to_string());
                Err(e)
            }
        };

        progress.finished();
        result
    }

    /// Fetches the file and writes it to disk.
    async fn transfer(
        &self,
        spec: &DownloadJobSpec,
        cancel: &CancellationToken,
        progress: &mut ProgressReporter,
    ) -> Result<Downloaded> {
        let output = spec.dest_path();

        debug!("Creating destination directory {:?}", spec.dest_dir);
        fs::create_dir_all(&spec.dest_dir).await?;

        debug!("Creating destination file {:?}", &output);
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&output)
            .await?;

        if let Some(ref warmup) = spec.warmup_url {
            self.visit(warmup, cancel).await?;
        }

        if let Some(delay) = spec.pre_roll_delay {
            debug!("Waiting {:?} before fetching {}", delay, spec.target_url);
            cancellable(cancel, tokio::time::sleep(delay)).await?;
        }

        let request = self.prepare_request(spec, cancel).await?;

        debug!("Fetching {}", &spec.target_url);
        let res = cancellable(cancel, request.send()).await??;

        let status = res.status();
        if !status.is_success() {
            return Err(Error::Server(status));
        }

        let total = total_size(&res);
        let mut size: u64 = 0;

        debug!("Retrieving chunks...");
        let mut stream = res.bytes_stream();
        while let Some(item) = cancellable(cancel, stream.next()).await? {
            let mut chunk = item?;
            size += chunk.len() as u64;
            file.write_all_buf(&mut chunk).await?;
            progress.report(size, total);
        }
        file.flush().await?;

        Ok(Downloaded { path: output, size })
    }

    /// Builds the real request, establishing whatever session the server needs.
    async fn prepare_request(
        &self,
        spec: &DownloadJobSpec,
        cancel: &CancellationToken,
    ) -> Result<RequestBuilder> {
        let mut headers = browser_headers(&self.config.user_agent);

        if let Some(ref cookies) = spec.session_cookies {
            let value = HeaderValue::from_str(cookies)
                .map_err(|e| Error::Internal(format!("Invalid session cookies: {}", e)))?;
            headers.insert(COOKIE, value);
            insert_referer(&mut headers, derived_referer(spec).as_deref());
        } else if let Some(page) = self
            .config
            .media_page
            .as_ref()
            .and_then(|rule| rule.detail_page(&spec.target_url))
        {
            self.visit(&page, cancel).await?;
            insert_referer(&mut headers, Some(page.as_str()));
        } else {
            insert_referer(&mut headers, derived_referer(spec).as_deref());
        }

        Ok(self.client.get(spec.target_url.clone()).headers(headers))
    }

    /// GETs `url` only for the cookies it sets. Failures are tolerated.
    async fn visit(&self, url: &Url, cancel: &CancellationToken) -> Result<()> {
        debug!("Visiting {} to establish a session", url);
        let request = self
            .client
            .get(url.clone())
            .headers(browser_headers(&self.config.user_agent));
        match cancellable(cancel, request.send()).await? {
            Ok(res) => debug!("{} answered {}", url, res.status()),
            Err(e) => warn!("Ignoring failed visit to {}: {}", url, e),
        }
        Ok(())
    }
}

/// Referer for a transfer: the warm-up origin, else the target origin.
fn derived_referer(spec: &DownloadJobSpec) -> Option<String> {
    spec.warmup_url
        .as_ref()
        .and_then(origin_referer)
        .or_else(|| origin_referer(&spec.target_url))
}

fn insert_referer(headers: &mut HeaderMap, referer: Option<&str>) {
    if let Some(value) = referer.and_then(|r| HeaderValue::from_str(r).ok()) {
        headers.insert(REFERER, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_referer_prefers_warmup() {
        let spec = DownloadJobSpec::new(
            Url::parse("https://cdn.example.com/x.zip").unwrap(),
            "/tmp",
            "x.zip",
        );
        assert_eq!(
            derived_referer(&spec).as_deref(),
            Some("https://cdn.example.com/")
        );

        let spec = spec.warmup_url(Url::parse("https://www.example.com/page").unwrap());
        assert_eq!(
            derived_referer(&spec).as_deref(),
            Some("https://www.example.com/")
        );
    }

    #[test]
    fn test_insert_referer_ignores_invalid() {
        let mut headers = HeaderMap::new();
        insert_referer(&mut headers, Some("bad\nvalue"));
        assert!(headers.get(REFERER).is_none());
        insert_referer(&mut headers, Some("https://a/"));
        assert_eq!(headers.get(REFERER).unwrap(), "https://a/");
    }
}
