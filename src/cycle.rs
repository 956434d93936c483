//! Scrape cycle orchestration.
//!
//! One cycle: validate the link → fetch → extract → reconcile against the
//! store → persist → notify. Every fallible step before the store write can
//! abort the cycle without side effects. The store write is a single
//! transaction, and the notification goes out only after it commits.

use anyhow::{Context, Result};
use chrono::Utc;

use crate::config::Config;
use crate::extract::MarkupExtractor;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::models::JobRecord;
use crate::notify::{self, LogNotifier, Notifier, SmtpNotifier};
use crate::reconcile::{reconcile, Reconciliation};
use crate::store::{JobStore, SqliteStore};
use crate::validate;

/// Collaborators and settings for running cycles.
pub struct Cycle<'a> {
    pub fetcher: &'a dyn Fetcher,
    pub extractor: &'a MarkupExtractor,
    pub store: &'a dyn JobStore,
    pub notifier: &'a dyn Notifier,
    /// Recipient of the welcome message and digests.
    pub recipient: &'a str,
    /// Send a digest when postings only disappeared.
    pub include_expired: bool,
}

/// What one cycle found and did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub search_url: String,
    /// Postings extracted from the page, duplicates included.
    pub scraped: usize,
    pub outcome: Reconciliation,
    pub notified: bool,
    pub dry_run: bool,
}

impl Cycle<'_> {
    /// Run one full cycle for `url`.
    ///
    /// A recipient the notifier rejects aborts the cycle before the fetch.
    /// With `dry_run`, the cycle stops after reconciliation: nothing is
    /// written and nothing is sent.
    pub async fn run(&self, url: &str, dry_run: bool) -> Result<CycleReport> {
        let search_url = validate::validate(url)?;
        if !dry_run {
            self.notifier.check_recipient(self.recipient)?;
        }

        tracing::info!(url = search_url, "fetching listing page");
        let html = self.fetcher.fetch(search_url).await?;

        let current = self.extract(&html)?;
        tracing::info!(postings = current.len(), "extracted postings");

        let prior = self
            .store
            .prior_state(search_url)
            .await
            .context("Failed to load stored jobs")?;
        let outcome = reconcile(&current, &prior);
        log_outcome(&outcome);

        let mut report = CycleReport {
            search_url: search_url.to_string(),
            scraped: current.len(),
            outcome,
            notified: false,
            dry_run,
        };
        if dry_run {
            return Ok(report);
        }

        self.store
            .apply(search_url, &report.outcome, Utc::now())
            .await
            .context("Failed to persist cycle")?;

        let notification = match &report.outcome {
            Reconciliation::Baseline(records) => Some(notify::compose_welcome(
                self.recipient,
                search_url,
                records.len(),
            )),
            Reconciliation::Changes(diff) if notify::should_notify(diff, self.include_expired) => {
                Some(notify::compose_digest(self.recipient, search_url, diff))
            }
            Reconciliation::Changes(_) => None,
        };

        if let Some(notification) = notification {
            self.notifier.send(&notification).await?;
            report.notified = true;
        }

        Ok(report)
    }

    /// Parsing and extraction stay synchronous: the parsed tree is not
    /// `Send` and must not be held across an await point.
    fn extract(&self, html: &str) -> Result<Vec<JobRecord>> {
        Ok(self.extractor.extract(html)?)
    }
}

fn log_outcome(outcome: &Reconciliation) {
    match outcome {
        Reconciliation::Baseline(records) => {
            tracing::info!(baseline = records.len(), "no prior state, recording baseline");
        }
        Reconciliation::Changes(diff) => {
            tracing::info!(
                new = diff.new_records.len(),
                expired = diff.expired.len(),
                "reconciled against stored jobs"
            );
        }
    }
}

/// CLI entry point for `startit scrape`.
pub async fn run_scrape(
    config: &Config,
    url: Option<String>,
    to: Option<String>,
    dry_run: bool,
) -> Result<()> {
    let url = url
        .or_else(|| config.scrape.url.clone())
        .context("No search URL given and [scrape].url is not set")?;
    // Fail before touching the network or the database.
    validate::validate(&url)?;

    let recipient = to
        .or_else(|| config.notify.as_ref().map(|n| n.to.clone()))
        .unwrap_or_default();
    if config.notify.is_some() && !dry_run {
        notify::parse_mailbox(&recipient)?;
    }

    let fetcher = HttpFetcher::new(&config.fetch)?;
    let extractor = MarkupExtractor::new()?;
    let store = SqliteStore::open(config).await?;

    let smtp;
    let notifier: &dyn Notifier = match &config.notify {
        Some(notify_config) if !dry_run => {
            smtp = SmtpNotifier::new(notify_config)?;
            &smtp
        }
        _ => &LogNotifier,
    };

    let cycle = Cycle {
        fetcher: &fetcher,
        extractor: &extractor,
        store: &store,
        notifier,
        recipient: &recipient,
        include_expired: config
            .notify
            .as_ref()
            .map(|n| n.include_expired)
            .unwrap_or(true),
    };

    let result = cycle.run(&url, dry_run).await;
    store.close().await;
    let report = result?;

    print_report(&report);
    Ok(())
}

fn print_report(report: &CycleReport) {
    if report.dry_run {
        println!("scrape {} (dry-run)", report.search_url);
    } else {
        println!("scrape {}", report.search_url);
    }
    println!("  postings found: {}", report.scraped);
    match &report.outcome {
        Reconciliation::Baseline(records) => {
            println!("  first run: {} postings recorded as baseline", records.len());
        }
        Reconciliation::Changes(diff) => {
            println!("  new: {}", diff.new_records.len());
            for job in &diff.new_records {
                println!("    + {} ({})", job.job_title, job.company_title);
            }
            println!("  expired: {}", diff.expired.len());
            for job in &diff.expired {
                println!("    - {} ({})", job.job_title, job.company_title);
            }
        }
    }
    if report.notified {
        println!("  notification sent");
    }
    println!("ok");
}
