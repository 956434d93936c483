//! `startit extract`: run the extractor over a saved listing page.
//!
//! Useful when startit.rs changes its markup: save the page, run this, and
//! the error names the tier, the posting and the element that went missing.

use anyhow::{Context, Result};
use std::path::Path;

use crate::extract::MarkupExtractor;

pub fn run_extract(path: &Path, json: bool) -> Result<()> {
    let html = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read page: {}", path.display()))?;

    let extractor = MarkupExtractor::new()?;
    let jobs = extractor
        .extract(&html)
        .with_context(|| format!("Failed to extract postings from {}", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&jobs)?);
        return Ok(());
    }

    println!("{} postings", jobs.len());
    for (i, job) in jobs.iter().enumerate() {
        println!();
        println!("[{}] {}", i, job.job_title);
        println!("  company: {}", job.company_title);
        println!("  url:     {}", job.url);
        println!("  tags:    {}", job.tags.join(", "));
    }

    Ok(())
}
