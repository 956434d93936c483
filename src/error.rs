//! Error kinds raised by the scraping core.
//!
//! Validation and extraction failures are fatal to a cycle: they propagate
//! to the driver unchanged and nothing is written for that cycle.

use thiserror::Error;

use crate::models::Tier;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The source link is not a startit.rs job search URL.
    #[error("invalid link: '{0}' (expected https://startit.rs/poslovi/pretraga/<category>/)")]
    InvalidLink(String),

    /// A posting node lacks an element its tier's markup shape requires.
    #[error("{tier} posting #{index}: missing {missing}")]
    Extraction {
        tier: Tier,
        /// Zero-based position of the posting within its tier.
        index: usize,
        missing: &'static str,
    },

    /// A posting was tagged with a tier the extractor has no shape for.
    #[error("unknown job type: {0}")]
    UnknownJobType(Tier),

    /// A built-in CSS selector failed to compile.
    #[error("invalid selector '{css}': {reason}")]
    Selector { css: String, reason: String },
}
