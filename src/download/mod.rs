//! Download job descriptions.
//!
//! A [`DownloadJobSpec`] names the URL to fetch, where the file lands and the
//! session quirks the server needs. It is consumed by
//! [`Downloader::execute`](crate::downloader::Downloader::execute).

pub mod spec;

pub use spec::DownloadJobSpec;
