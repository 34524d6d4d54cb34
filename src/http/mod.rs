//! HTTP client functionality.
//!
//! - [`client`] - HTTP client creation and middleware configuration
//! - [`headers`] - Browser-like headers, referer derivation and detail page rules

pub mod client;
pub mod headers;

pub use client::{create_http_client, HttpClientConfig, DEFAULT_CONNECT_TIMEOUT};
pub use headers::{browser_headers, origin_referer, MediaPageRule, BROWSER_USER_AGENT};
