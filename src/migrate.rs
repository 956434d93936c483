use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Create all tables and indexes. Safe to run on every connect.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    // Create jobs table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS jobs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            search_url TEXT NOT NULL,
            company_title TEXT NOT NULL,
            job_title TEXT NOT NULL,
            url TEXT NOT NULL,
            tags TEXT NOT NULL DEFAULT '[]',
            active INTEGER NOT NULL DEFAULT 1,
            first_crawled INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create baselines table; a row marks the search as initialized
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS baselines (
            search_url TEXT PRIMARY KEY,
            established_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_jobs_search_active ON jobs(search_url, active)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_jobs_identity ON jobs(search_url, company_title, job_title, url)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
