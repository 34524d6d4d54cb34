//! Request headers for servers that check where a download comes from.
//!
//! Some hosts only serve a file to clients that look like a browser arriving
//! from one of their own pages. These helpers build that header set and
//! derive a plausible `Referer`.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Url;

/// User-Agent sent with every transfer unless overridden.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 13; Pixel 7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";
const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// The standard User-Agent / Accept / Accept-Language set.
///
/// An invalid `user_agent` falls back to [`BROWSER_USER_AGENT`].
pub fn browser_headers(user_agent: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let agent = HeaderValue::from_str(user_agent)
        .unwrap_or_else(|_| HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(USER_AGENT, agent);
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE));
    headers
}

/// `scheme://host[:port]/` of `url`, or `None` for URLs without a host.
pub fn origin_referer(url: &Url) -> Option<String> {
    let origin = url.origin();
    if !origin.is_tuple() {
        return None;
    }
    Some(format!("{}/", origin.ascii_serialization()))
}

/// Rule mapping a download URL with a media id parameter to the detail page
/// that must be visited first to establish a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPageRule {
    /// Name of the query parameter carrying the media id.
    pub param: String,
    /// Detail page URL. `{origin}` expands to the download URL's origin and
    /// `{id}` to the URL-encoded media id.
    pub page_template: String,
}

impl Default for MediaPageRule {
    fn default() -> Self {
        Self {
            param: "mediaId".into(),
            page_template: "{origin}/vault/?p=details&mediaId={id}".into(),
        }
    }
}

impl MediaPageRule {
    /// The media id carried by `url`, if any.
    pub fn media_id(&self, url: &Url) -> Option<String> {
        url.query_pairs()
            .find(|(key, value)| key == self.param.as_str() && !value.is_empty())
            .map(|(_, value)| value.into_owned())
    }

    /// The detail page for `url`, or `None` when it carries no media id.
    pub fn detail_page(&self, url: &Url) -> Option<Url> {
        let id = self.media_id(url)?;
        let origin = url.origin();
        if !origin.is_tuple() {
            return None;
        }
        let encoded: String = form_urlencoded::byte_serialize(id.as_bytes()).collect();
        let page = self
            .page_template
            .replace("{origin}", &origin.ascii_serialization())
            .replace("{id}", &encoded);
        Url::parse(&page).ok()
    }
}
