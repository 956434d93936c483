//! Source link validation.
//!
//! Only startit.rs search result pages are scraped. The link must be exactly
//! `https://startit.rs/poslovi/pretraga/<category>/` with a single non-empty
//! category segment and the trailing slash.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ScrapeError;

static RE_SEARCH_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https://startit\.rs/poslovi/pretraga/[^/]+/$").unwrap());

/// Returns the link unchanged if it is a valid search URL.
pub fn validate(url: &str) -> Result<&str, ScrapeError> {
    if RE_SEARCH_URL.is_match(url) {
        Ok(url)
    } else {
        Err(ScrapeError::InvalidLink(url.to_string()))
    }
}
