//! Core data models used throughout startit-watch.
//!
//! These types represent the job postings that flow from the listing page
//! through extraction and reconciliation into the job store.

use chrono::{DateTime, Utc};
use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Presentation tier of a job posting on the listing page.
///
/// Each tier has its own markup shape. Partitioning always yields tiers in
/// the order of [`Tier::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Premium,
    Standard,
    Mini,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Premium, Tier::Standard, Tier::Mini];

    /// CSS selector locating every posting node of this tier.
    pub fn marker(self) -> &'static str {
        match self {
            Tier::Premium => "div.listing-oglas-premium",
            Tier::Standard => "div.listing-oglas-standard",
            Tier::Mini => "div.oglas-mini",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Premium => "premium",
            Tier::Standard => "standard",
            Tier::Mini => "mini",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One normalized job posting.
///
/// Equality, hashing and ordering cover all four fields, so a `JobRecord`
/// is its own identity key: `(company_title, job_title, url, tags)` with
/// tags compared positionally. Two postings that differ only in tag order
/// are different records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobRecord {
    pub company_title: String,
    pub job_title: String,
    pub url: String,
    pub tags: Vec<String>,
}

/// A job record as persisted by a [`JobStore`](crate::store::JobStore).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredJobRecord {
    #[serde(flatten)]
    pub record: JobRecord,
    pub active: bool,
    pub first_crawled: DateTime<Utc>,
}

/// A posting node located on the page, tagged with its tier.
///
/// Borrowed from the parsed document; only lives for one extraction pass.
#[derive(Debug, Clone, Copy)]
pub struct RawPosting<'a> {
    pub tier: Tier,
    /// Position of the posting among the postings of its tier.
    pub index: usize,
    pub node: ElementRef<'a>,
}
