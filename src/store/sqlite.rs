//! SQLite-backed durable store.
//!
//! When no database path is configured (config or `LLMS_WATCH_DB`), or the
//! connection cannot be opened, the store runs detached: definition reads
//! serve the seed list, result reads serve the demo dataset, and writes are
//! logged and dropped. The rest of the system keeps working in a degraded,
//! read-mostly mode.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{error, info, warn};

use crate::models::{CheckResult, CheckStatus, EndpointDefinition};
use crate::store::Store;

pub struct SqliteStore {
    pool: Option<SqlitePool>,
    seed: Vec<EndpointDefinition>,
    demo: Vec<CheckResult>,
}

impl SqliteStore {
    pub async fn open(
        path: Option<&str>,
        seed: Vec<EndpointDefinition>,
        demo: Vec<CheckResult>,
    ) -> Self {
        let pool = match path {
            None => {
                warn!("No database configured, serving built-in demo data");
                None
            }
            Some(path) => match Self::connect(path).await {
                Ok(pool) => {
                    info!("SQLite store opened at {}", path);
                    Some(pool)
                }
                Err(e) => {
                    error!("Failed to open SQLite store at {}: {}", path, e);
                    None
                }
            },
        };

        Self { pool, seed, demo }
    }

    async fn connect(path: &str) -> Result<SqlitePool, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(path)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS endpoints (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                url TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS checks (
                id TEXT PRIMARY KEY,
                status TEXT NOT NULL,
                checked_at TEXT NOT NULL,
                response_time_ms INTEGER,
                error_message TEXT
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(pool)
    }

    async fn seed_if_empty(&self, pool: &SqlitePool) -> Result<(), sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM endpoints")
            .fetch_one(pool)
            .await?;
        if count > 0 {
            return Ok(());
        }

        let mut tx = pool.begin().await?;
        for def in &self.seed {
            sqlx::query("INSERT INTO endpoints (id, name, url) VALUES (?, ?, ?)")
                .bind(&def.id)
                .bind(&def.name)
                .bind(&def.url)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        info!("Seeded {} endpoint definitions", self.seed.len());
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct CheckRow {
    id: String,
    status: String,
    checked_at: String,
    response_time_ms: Option<i64>,
    error_message: Option<String>,
}

impl From<CheckRow> for CheckResult {
    fn from(row: CheckRow) -> Self {
        CheckResult {
            id: row.id,
            status: CheckStatus::parse(&row.status),
            checked_at: DateTime::parse_from_rfc3339(&row.checked_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_default(),
            response_time_ms: row.response_time_ms.map(|v| v as u64),
            error_message: row.error_message,
        }
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn ensure_seeded(&self) {
        let Some(pool) = &self.pool else { return };
        if let Err(e) = self.seed_if_empty(pool).await {
            error!("Failed to seed endpoint definitions: {}", e);
        }
    }

    async fn list_definitions(&self) -> Vec<EndpointDefinition> {
        let Some(pool) = &self.pool else {
            return self.seed.clone();
        };

        let rows = sqlx::query_as::<_, (String, String, String)>(
            "SELECT id, name, url FROM endpoints ORDER BY rowid",
        )
        .fetch_all(pool)
        .await;

        match rows {
            Ok(rows) if !rows.is_empty() => rows
                .into_iter()
                .map(|(id, name, url)| EndpointDefinition { id, name, url })
                .collect(),
            Ok(_) => self.seed.clone(),
            Err(e) => {
                error!("Failed to read endpoint definitions: {}", e);
                self.seed.clone()
            }
        }
    }

    async fn list_latest_results(&self) -> Vec<CheckResult> {
        let Some(pool) = &self.pool else {
            return self.demo.clone();
        };

        let rows = sqlx::query_as::<_, CheckRow>(
            r#"
            SELECT id, status, checked_at, response_time_ms, error_message
            FROM checks
            ORDER BY rowid
            "#,
        )
        .fetch_all(pool)
        .await;

        match rows {
            Ok(rows) => rows.into_iter().map(CheckResult::from).collect(),
            Err(e) => {
                error!("Failed to read check results: {}", e);
                Vec::new()
            }
        }
    }

    async fn upsert_result(&self, result: CheckResult) {
        let Some(pool) = &self.pool else {
            warn!("No database configured, dropping check result for {}", result.id);
            return;
        };

        // ON CONFLICT keeps the existing rowid, so an overwritten entry
        // stays at its original position in the listing order.
        let res = sqlx::query(
            r#"
            INSERT INTO checks (id, status, checked_at, response_time_ms, error_message)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                status = excluded.status,
                checked_at = excluded.checked_at,
                response_time_ms = excluded.response_time_ms,
                error_message = excluded.error_message
            "#,
        )
        .bind(&result.id)
        .bind(result.status.as_str())
        .bind(result.checked_at.to_rfc3339())
        .bind(result.response_time_ms.map(|v| v as i64))
        .bind(&result.error_message)
        .execute(pool)
        .await;

        if let Err(e) = res {
            error!("Failed to save check result for {}: {}", result.id, e);
        }
    }

    async fn replace_all_results(&self, results: Vec<CheckResult>) {
        let Some(pool) = &self.pool else {
            warn!("No database configured, dropping {} check results", results.len());
            return;
        };

        let res = async {
            let mut tx = pool.begin().await?;
            sqlx::query("DELETE FROM checks").execute(&mut *tx).await?;
            for result in &results {
                sqlx::query(
                    r#"
                    INSERT INTO checks (id, status, checked_at, response_time_ms, error_message)
                    VALUES (?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&result.id)
                .bind(result.status.as_str())
                .bind(result.checked_at.to_rfc3339())
                .bind(result.response_time_ms.map(|v| v as i64))
                .bind(&result.error_message)
                .execute(&mut *tx)
                .await?;
            }
            tx.commit().await
        }
        .await;

        if let Err(e) = res {
            error!("Failed to save check results: {}", e);
        }
    }
}
