//! Download executor, its builder and configuration.
//!
//! - `downloader` - The [`Downloader`] running one job at a time
//! - `builder` - [`DownloaderBuilder`] for configuring it
//! - `config` - [`DownloaderConfig`] and its defaults
//!
//! # Examples
//!
//! ```rust,no_run
//! use haul::cancel::CancellationToken;
//! use haul::download::DownloadJobSpec;
//! use haul::downloader::DownloaderBuilder;
//! use haul::jobs::JobId;
//!
//! # async fn example() -> haul::Result<()> {
//! let downloader = DownloaderBuilder::new().build()?;
//! let spec = DownloadJobSpec::from_url("https://example.com/game.zip", "/roms/nes")?;
//! let done = downloader
//!     .execute(JobId::new(1), &spec, &CancellationToken::new())
//!     .await?;
//! println!("{} bytes at {:?}", done.size, done.path);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod downloader;

pub use builder::DownloaderBuilder;
pub use config::DownloaderConfig;
pub use downloader::{Downloaded, Downloader};
