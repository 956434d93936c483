//! `startit jobs`: list stored jobs for a search.

use anyhow::{Context, Result};

use crate::config::Config;
use crate::store::{JobStore, SqliteStore};
use crate::validate;

pub async fn run_jobs(config: &Config, url: Option<String>, all: bool, json: bool) -> Result<()> {
    let url = url
        .or_else(|| config.scrape.url.clone())
        .context("No search URL given and [scrape].url is not set")?;
    validate::validate(&url)?;

    let store = SqliteStore::open(config).await?;
    let result = store.list_jobs(&url, all).await;
    store.close().await;
    let jobs = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&jobs)?);
        return Ok(());
    }

    println!("{:<8} {:<20} {:<40} COMPANY", "ACTIVE", "FIRST CRAWLED", "TITLE");
    for job in &jobs {
        println!(
            "{:<8} {:<20} {:<40} {}",
            if job.active { "yes" } else { "no" },
            job.first_crawled.format("%Y-%m-%d %H:%M:%S").to_string(),
            job.record.job_title,
            job.record.company_title
        );
    }
    println!("{} jobs", jobs.len());

    Ok(())
}
