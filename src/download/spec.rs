//! Description of one download job.
//!
//! # Examples
//!
//! ```rust
//! use haul::download::DownloadJobSpec;
//!
//! # fn example() -> haul::Result<()> {
//! // File name taken from the URL
//! let spec = DownloadJobSpec::from_url("https://example.com/roms/game.zip", "/roms/nes")?
//!     .logical_id("super-mario-bros")
//!     .pre_roll_delay_seconds(3);
//! assert_eq!(spec.file_name, "game.zip");
//! # Ok(())
//! # }
//! ```

use crate::error::Error;
use crate::ledger::DownloadTarget;

use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;

/// Everything the download executor needs to fetch one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJobSpec {
    /// URL actually transferred and recorded first in the ledger.
    pub target_url: Url,
    /// URL the caller started from, recorded too when it differs.
    pub original_url: Option<Url>,
    /// Page fetched first, only to collect session cookies.
    pub warmup_url: Option<Url>,
    /// Wait between the warm-up and the transfer.
    pub pre_roll_delay: Option<Duration>,
    /// Raw `Cookie` header value obtained elsewhere.
    pub session_cookies: Option<String>,
    /// Directory receiving the file and its ledger.
    pub dest_dir: PathBuf,
    /// File name inside `dest_dir`.
    pub file_name: String,
    /// Human readable name for progress display.
    pub title: String,
    /// Logical id written as the ledger SLUG.
    pub logical_id: Option<String>,
}

impl DownloadJobSpec {
    /// Creates a new [`DownloadJobSpec`] titled after its file name.
    pub fn new(target_url: Url, dest_dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        Self {
            target_url,
            original_url: None,
            warmup_url: None,
            pre_roll_delay: None,
            session_cookies: None,
            dest_dir: dest_dir.into(),
            title: file_name.clone(),
            file_name,
            logical_id: None,
        }
    }

    /// Creates a spec whose file name is the last path segment of `url`.
    pub fn from_url(url: &str, dest_dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let url = Url::parse(url)
            .map_err(|e| Error::InvalidUrl(format!("The url \"{}\" cannot be parsed: {}", url, e)))?;
        let segment = url
            .path_segments()
            .ok_or_else(|| {
                Error::InvalidUrl(format!("The url \"{}\" does not contain a valid path", url))
            })?
            .next_back()
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| {
                Error::InvalidUrl(format!("The url \"{}\" does not contain a filename", url))
            })?;
        let file_name: String = form_urlencoded::parse(segment.as_bytes())
            .map(|(key, val)| [key, val].concat())
            .collect();
        Ok(Self::new(url, dest_dir, file_name))
    }

    /// Sets the URL the caller started from.
    pub fn original_url(mut self, url: Url) -> Self {
        self.original_url = Some(url);
        self
    }

    /// Sets the warm-up page.
    pub fn warmup_url(mut self, url: Url) -> Self {
        self.warmup_url = Some(url);
        self
    }

    /// Sets the wait before the transfer, in seconds.
    pub fn pre_roll_delay_seconds(mut self, seconds: u64) -> Self {
        self.pre_roll_delay = Some(Duration::from_secs(seconds));
        self
    }

    /// Sets externally obtained session cookies.
    pub fn session_cookies(mut self, cookies: impl Into<String>) -> Self {
        self.session_cookies = Some(cookies.into());
        self
    }

    /// Sets the display title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the logical id.
    pub fn logical_id(mut self, id: impl Into<String>) -> Self {
        self.logical_id = Some(id.into());
        self
    }

    /// Ledger key of this download.
    pub fn target(&self) -> DownloadTarget {
        DownloadTarget::new(&self.dest_dir, &self.file_name)
    }

    /// Path of the downloaded file.
    pub fn dest_path(&self) -> PathBuf {
        self.dest_dir.join(&self.file_name)
    }

    /// The original URL when it differs from the target URL.
    pub fn distinct_original_url(&self) -> Option<&Url> {
        self.original_url
            .as_ref()
            .filter(|original| **original != self.target_url)
    }
}
