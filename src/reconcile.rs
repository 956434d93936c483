//! Reconciliation of freshly scraped postings against stored state.
//!
//! Records are compared as sets keyed by their full identity
//! `(company_title, job_title, url, tags)`. There is no fuzzy matching: a
//! posting whose tags changed (even just their order) is reported as one new
//! record plus one expired record.

use std::collections::{BTreeSet, HashSet};

use crate::models::JobRecord;

/// What the store knows about a search before the current cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriorState {
    /// No baseline was ever recorded. Distinct from an initialized store
    /// with zero active jobs.
    Uninitialized,
    /// Identity keys of the jobs currently marked active.
    Active(HashSet<JobRecord>),
}

/// Records that appeared and disappeared since the previous cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    /// Present now, not previously active. In current page order.
    pub new_records: Vec<JobRecord>,
    /// Previously active, gone now. Sorted by identity key.
    pub expired: Vec<JobRecord>,
}

impl Diff {
    pub fn is_empty(&self) -> bool {
        self.new_records.is_empty() && self.expired.is_empty()
    }
}

/// Outcome of reconciling one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// Cold start: the current records become the baseline. Nothing is new
    /// and nothing expires.
    Baseline(Vec<JobRecord>),
    Changes(Diff),
}

/// Reconcile the current page against prior state, bypassing the diff on a
/// cold start.
pub fn reconcile(current: &[JobRecord], prior: &PriorState) -> Reconciliation {
    match prior {
        PriorState::Uninitialized => Reconciliation::Baseline(dedup(current)),
        PriorState::Active(stored) => Reconciliation::Changes(diff(current, stored)),
    }
}

/// Set difference in both directions between `current` and `stored`.
pub fn diff(current: &[JobRecord], stored: &HashSet<JobRecord>) -> Diff {
    let current_set: HashSet<&JobRecord> = current.iter().collect();

    let new_records = dedup(current)
        .into_iter()
        .filter(|record| !stored.contains(record))
        .collect();

    let expired = stored
        .iter()
        .filter(|record| !current_set.contains(record))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    Diff {
        new_records,
        expired,
    }
}

/// Drop repeated records, keeping the first occurrence.
fn dedup(records: &[JobRecord]) -> Vec<JobRecord> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|record| seen.insert(*record))
        .cloned()
        .collect()
}
