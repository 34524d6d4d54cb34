//! Total size detection from HTTP responses.
//!
//! Servers announce the size of a transfer either in `Content-Length` or,
//! for partial responses, as the total in `Content-Range`. Neither is
//! guaranteed, so the result is optional and progress falls back to a byte
//! count without percentage.

use reqwest::header::CONTENT_RANGE;
use reqwest::Response;

/// Total size of the resource served by `response`, if announced.
///
/// A `Content-Range` total takes precedence over `Content-Length`.
pub fn total_size(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(CONTENT_RANGE)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_content_range_total)
        .or_else(|| response.content_length())
}

/// Parse Content-Range header to extract total size.
///
/// Content-Range header format: "bytes start-end/total". An unknown total
/// (`*`) yields `None`.
///
/// # Example
///
/// ```rust
/// use haul::utils::parse_content_range_total;
///
/// let total = parse_content_range_total("bytes 0-1023/2048");
/// assert_eq!(total, Some(2048));
/// ```
pub fn parse_content_range_total(content_range: &str) -> Option<u64> {
    let (_, total) = content_range.rsplit_once('/')?;
    total.trim().parse::<u64>().ok()
}
