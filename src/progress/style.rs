//! Progress bar styling for terminal rendering of job progress.
//!
//! Download jobs count bytes and extraction jobs count entries, so each kind
//! of job gets its own bar style.
//!
//! # Examples
//!
//! ```rust
//! use haul::progress::{ProgressBarOpts, StyleOptions};
//!
//! let style_options = StyleOptions::new(
//!     ProgressBarOpts::with_pip_style(),
//!     ProgressBarOpts::new(
//!         Some("{bar:40.cyan/blue} {pos}/{len} {msg}".to_string()),
//!         Some(ProgressBarOpts::CHARS_FINE.to_string()),
//!         true,
//!         false,
//!     ),
//! );
//! assert!(style_options.is_enabled());
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

/// Style options for download and extraction bars.
///
/// By default download bars are cleared once complete, while extraction bars
/// stay on screen so the final entry count remains visible.
#[derive(Debug, Clone)]
pub struct StyleOptions {
    /// Style options for download bars.
    pub(crate) download: ProgressBarOpts,
    /// Style options for extraction bars.
    pub(crate) extract: ProgressBarOpts,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            download: ProgressBarOpts::with_pip_style(),
            extract: ProgressBarOpts {
                template: Some(ProgressBarOpts::TEMPLATE_ENTRIES.into()),
                progress_chars: Some(ProgressBarOpts::CHARS_FINE.into()),
                enabled: true,
                clear: false,
            },
        }
    }
}

impl StyleOptions {
    /// Create new [`StyleOptions`].
    pub fn new(download: ProgressBarOpts, extract: ProgressBarOpts) -> Self {
        Self { download, extract }
    }

    /// Hide every bar.
    pub fn hidden() -> Self {
        Self::new(ProgressBarOpts::hidden(), ProgressBarOpts::hidden())
    }

    /// Return `false` if neither bar kind is enabled.
    pub fn is_enabled(&self) -> bool {
        self.download.enabled || self.extract.enabled
    }

    /// Get a reference to the download bar options.
    pub fn download(&self) -> &ProgressBarOpts {
        &self.download
    }

    /// Get a reference to the extraction bar options.
    pub fn extract(&self) -> &ProgressBarOpts {
        &self.extract
    }
}

/// Define the options for a progress bar.
#[derive(Debug, Clone)]
pub struct ProgressBarOpts {
    /// Progress bar template string.
    template: Option<String>,
    /// Progression characters set.
    ///
    /// There must be at least 3 characters for the following states:
    /// "filled", "current", and "to do".
    progress_chars: Option<String>,
    /// Enable or disable the progress bar.
    pub(crate) enabled: bool,
    /// Clear the progress bar once completed.
    pub(crate) clear: bool,
}

impl Default for ProgressBarOpts {
    fn default() -> Self {
        Self {
            template: None,
            progress_chars: None,
            enabled: true,
            clear: true,
        }
    }
}

impl ProgressBarOpts {
    /// Template counting archive entries, with the current entry as message.
    ///
    /// `█████████████████████▌                  12/24 (50%) roms/game.nes`
    pub const TEMPLATE_ENTRIES: &'static str =
        "{bar:40.blue} {pos:>}/{len} ({percent}%) {wide_msg}";
    /// Template which looks like the Python package installer pip.
    ///
    /// `━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━ 211.23 KiB/211.23 KiB 1008.31 KiB/s eta 0s`
    pub const TEMPLATE_PIP: &'static str =
        "{bar:40.green/black} {bytes:>11.green}/{total_bytes:<11.green} {bytes_per_sec:>13.red} eta {eta:.blue}";
    /// Use fine blocks as progress characters: `"█▉▊▋▌▍▎▏  "`.
    pub const CHARS_FINE: &'static str = "█▉▊▋▌▍▎▏  ";
    /// Use a line as progress characters: `"━╾─"`.
    pub const CHARS_LINE: &'static str = "━╾╴─";

    /// Create a new [`ProgressBarOpts`].
    pub fn new(
        template: Option<String>,
        progress_chars: Option<String>,
        enabled: bool,
        clear: bool,
    ) -> Self {
        Self {
            template,
            progress_chars,
            enabled,
            clear,
        }
    }

    /// Create a [`ProgressStyle`] based on the provided options.
    ///
    /// An invalid template falls back to the default bar.
    pub fn to_progress_style(&self) -> ProgressStyle {
        let mut style = ProgressStyle::default_bar();
        if let Some(template) = &self.template {
            style = match ProgressStyle::default_bar().template(template) {
                Ok(s) => s,
                Err(e) => {
                    warn!("Ignoring invalid progress template {:?}: {}", template, e);
                    style
                }
            };
        }
        if let Some(progress_chars) = &self.progress_chars {
            style = style.progress_chars(progress_chars);
        }
        style
    }

    /// Create a [`ProgressBar`] based on the provided options.
    ///
    /// A length of `None` gives a spinner-like bar of unknown length.
    pub fn to_progress_bar(&self, len: Option<u64>) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let bar = match len {
            Some(len) => ProgressBar::new(len),
            None => ProgressBar::no_length(),
        };
        bar.with_style(self.to_progress_style())
    }

    /// Create a new [`ProgressBarOpts`] which looks like Python pip.
    pub fn with_pip_style() -> Self {
        Self {
            template: Some(ProgressBarOpts::TEMPLATE_PIP.into()),
            progress_chars: Some(ProgressBarOpts::CHARS_LINE.into()),
            enabled: true,
            clear: true,
        }
    }

    /// Set to `true` to clear the progress bar upon completion.
    pub fn set_clear(&mut self, clear: bool) {
        self.clear = clear;
    }

    /// Create a new [`ProgressBarOpts`] which hides the progress bars.
    pub fn hidden() -> Self {
        Self {
            enabled: false,
            ..ProgressBarOpts::default()
        }
    }
}
