//! SQLite-backed [`JobStore`] implementation.
//!
//! Tags are stored as a JSON array so their order survives the round trip;
//! identity comparisons happen on the decoded list, never on the text.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use std::collections::HashSet;

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::models::{JobRecord, StoredJobRecord};
use crate::reconcile::{PriorState, Reconciliation};

use super::JobStore;

/// SQLite implementation of the [`JobStore`] trait.
///
/// Wraps a [`SqlitePool`] over the `jobs` and `baselines` tables created by
/// [`migrate::apply_schema`].
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the configured database, creating the schema if needed.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        migrate::apply_schema(&pool).await?;
        Ok(Self::new(pool))
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

fn record_from_row(row: &SqliteRow) -> Result<JobRecord> {
    let tags_json: String = row.get("tags");
    let tags: Vec<String> = serde_json::from_str(&tags_json)
        .with_context(|| format!("corrupt tags column: {}", tags_json))?;
    Ok(JobRecord {
        company_title: row.get("company_title"),
        job_title: row.get("job_title"),
        url: row.get("url"),
        tags,
    })
}

async fn insert_job(
    tx: &mut Transaction<'_, Sqlite>,
    search_url: &str,
    record: &JobRecord,
    now: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO jobs (search_url, company_title, job_title, url, tags, active, first_crawled)
        VALUES (?, ?, ?, ?, ?, 1, ?)
        "#,
    )
    .bind(search_url)
    .bind(&record.company_title)
    .bind(&record.job_title)
    .bind(&record.url)
    .bind(serde_json::to_string(&record.tags)?)
    .bind(now)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn has_baseline(tx: &mut Transaction<'_, Sqlite>, search_url: &str) -> Result<bool> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT established_at FROM baselines WHERE search_url = ?")
            .bind(search_url)
            .fetch_optional(&mut **tx)
            .await?;
    Ok(found.is_some())
}

#[async_trait]
impl JobStore for SqliteStore {
    async fn prior_state(&self, search_url: &str) -> Result<PriorState> {
        let established: Option<i64> =
            sqlx::query_scalar("SELECT established_at FROM baselines WHERE search_url = ?")
                .bind(search_url)
                .fetch_optional(&self.pool)
                .await?;
        if established.is_none() {
            return Ok(PriorState::Uninitialized);
        }

        let rows = sqlx::query(
            "SELECT company_title, job_title, url, tags FROM jobs WHERE search_url = ? AND active = 1",
        )
        .bind(search_url)
        .fetch_all(&self.pool)
        .await?;

        let active = rows
            .iter()
            .map(record_from_row)
            .collect::<Result<HashSet<_>>>()?;
        Ok(PriorState::Active(active))
    }

    async fn apply(
        &self,
        search_url: &str,
        outcome: &Reconciliation,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let now = now.timestamp();
        let mut tx = self.pool.begin().await?;

        match outcome {
            Reconciliation::Baseline(records) => {
                sqlx::query("DELETE FROM jobs WHERE search_url = ?")
                    .bind(search_url)
                    .execute(&mut *tx)
                    .await?;
                for record in records {
                    insert_job(&mut tx, search_url, record, now).await?;
                }
                sqlx::query(
                    r#"
                    INSERT INTO baselines (search_url, established_at) VALUES (?, ?)
                    ON CONFLICT(search_url) DO UPDATE SET established_at = excluded.established_at
                    "#,
                )
                .bind(search_url)
                .bind(now)
                .execute(&mut *tx)
                .await?;
            }
            Reconciliation::Changes(diff) => {
                if !has_baseline(&mut tx, search_url).await? {
                    bail!("no baseline recorded for {}", search_url);
                }
                for record in &diff.expired {
                    sqlx::query(
                        r#"
                        UPDATE jobs SET active = 0
                        WHERE search_url = ? AND company_title = ? AND job_title = ?
                          AND url = ? AND tags = ? AND active = 1
                        "#,
                    )
                    .bind(search_url)
                    .bind(&record.company_title)
                    .bind(&record.job_title)
                    .bind(&record.url)
                    .bind(serde_json::to_string(&record.tags)?)
                    .execute(&mut *tx)
                    .await?;
                }
                for record in &diff.new_records {
                    insert_job(&mut tx, search_url, record, now).await?;
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_jobs(
        &self,
        search_url: &str,
        include_inactive: bool,
    ) -> Result<Vec<StoredJobRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT company_title, job_title, url, tags, active, first_crawled
            FROM jobs
            WHERE search_url = ? AND (? OR active = 1)
            ORDER BY id
            "#,
        )
        .bind(search_url)
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<StoredJobRecord> {
                let first_crawled: i64 = row.get("first_crawled");
                Ok(StoredJobRecord {
                    record: record_from_row(row)?,
                    active: row.get::<i64, _>("active") != 0,
                    first_crawled: DateTime::from_timestamp(first_crawled, 0)
                        .ok_or_else(|| anyhow!("invalid first_crawled: {}", first_crawled))?,
                })
            })
            .collect()
    }
}
