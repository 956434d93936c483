//! In-memory [`JobStore`] implementation for testing and dry runs.
//!
//! Uses a `HashMap` keyed by search URL behind `std::sync::RwLock`. A key is
//! present once a baseline has been applied for that search.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{JobRecord, StoredJobRecord};
use crate::reconcile::{PriorState, Reconciliation};

use super::JobStore;

/// In-memory store for testing.
pub struct InMemoryStore {
    searches: RwLock<HashMap<String, Vec<StoredJobRecord>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            searches: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("job store lock poisoned")
}

fn stored(record: &JobRecord, now: DateTime<Utc>) -> StoredJobRecord {
    StoredJobRecord {
        record: record.clone(),
        active: true,
        first_crawled: now,
    }
}

#[async_trait]
impl JobStore for InMemoryStore {
    async fn prior_state(&self, search_url: &str) -> Result<PriorState> {
        let searches = self.searches.read().map_err(poisoned)?;
        Ok(match searches.get(search_url) {
            None => PriorState::Uninitialized,
            Some(jobs) => PriorState::Active(
                jobs.iter()
                    .filter(|job| job.active)
                    .map(|job| job.record.clone())
                    .collect(),
            ),
        })
    }

    async fn apply(
        &self,
        search_url: &str,
        outcome: &Reconciliation,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut searches = self.searches.write().map_err(poisoned)?;
        match outcome {
            Reconciliation::Baseline(records) => {
                let jobs = records.iter().map(|record| stored(record, now)).collect();
                searches.insert(search_url.to_string(), jobs);
            }
            Reconciliation::Changes(diff) => {
                let Some(jobs) = searches.get_mut(search_url) else {
                    bail!("no baseline recorded for {}", search_url);
                };
                for job in jobs.iter_mut() {
                    if job.active && diff.expired.contains(&job.record) {
                        job.active = false;
                    }
                }
                jobs.extend(diff.new_records.iter().map(|record| stored(record, now)));
            }
        }
        Ok(())
    }

    async fn list_jobs(
        &self,
        search_url: &str,
        include_inactive: bool,
    ) -> Result<Vec<StoredJobRecord>> {
        let searches = self.searches.read().map_err(poisoned)?;
        Ok(searches
            .get(search_url)
            .map(|jobs| {
                jobs.iter()
                    .filter(|job| include_inactive || job.active)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
