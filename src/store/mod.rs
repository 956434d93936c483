//! Storage abstraction for scraped jobs.
//!
//! The [`JobStore`] trait is the boundary between the scrape cycle and
//! durable state. Records are scoped by search URL: each search keeps its own
//! baseline and its own set of active jobs.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::StoredJobRecord;
use crate::reconcile::{PriorState, Reconciliation};

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

/// Durable job state.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`prior_state`](JobStore::prior_state) | Active jobs, or the cold-start signal |
/// | [`apply`](JobStore::apply) | Persist one cycle's outcome atomically |
/// | [`list_jobs`](JobStore::list_jobs) | Read stored jobs for display |
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Jobs currently active for `search_url`, or
    /// [`PriorState::Uninitialized`] if no baseline was ever recorded.
    async fn prior_state(&self, search_url: &str) -> Result<PriorState>;

    /// Persist a reconciliation outcome as a single unit.
    ///
    /// A baseline replaces whatever was stored for the search and marks it
    /// initialized. Changes insert every new record as active with
    /// `first_crawled = now` and deactivate every expired record. Either all
    /// writes land or none do.
    async fn apply(
        &self,
        search_url: &str,
        outcome: &Reconciliation,
        now: DateTime<Utc>,
    ) -> Result<()>;

    /// Stored jobs for `search_url` in insertion order.
    async fn list_jobs(
        &self,
        search_url: &str,
        include_inactive: bool,
    ) -> Result<Vec<StoredJobRecord>>;
}
