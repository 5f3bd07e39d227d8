use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{Row, SqlitePool};

use crate::error::CoreResult;
use crate::models::{from_millis, CacheEntry};

use super::now_millis;

/// Latest-value cache keyed by source name.
///
/// Every write appends; reads return the row with the highest id for the
/// requested source. Older rows are history and are never read back.
#[derive(Clone)]
pub struct CacheStore {
    pool: SqlitePool,
}

impl CacheStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn write(&self, source: &str, payload: &Value) -> CoreResult<i64> {
        let result = sqlx::query("INSERT INTO source_cache (source, fetched_at, payload) VALUES (?, ?, ?)")
            .bind(source)
            .bind(now_millis())
            .bind(serde_json::to_string(payload)?)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// Newest entry for `source` (exact match), if any.
    pub async fn latest(&self, source: &str) -> CoreResult<Option<CacheEntry>> {
        let row = sqlx::query(
            "SELECT id, source, fetched_at, payload FROM source_cache WHERE source = ? ORDER BY id DESC LIMIT 1",
        )
        .bind(source)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let payload: String = row.get("payload");
        Ok(Some(CacheEntry {
            id: row.get("id"),
            source: row.get("source"),
            fetched_at: from_millis(row.get("fetched_at")),
            payload: serde_json::from_str(&payload)?,
        }))
    }

    /// Row count and newest fetch time per source, for status listings.
    pub async fn source_stats(&self) -> CoreResult<Vec<(String, i64, DateTime<Utc>)>> {
        let rows = sqlx::query(
            "SELECT source, COUNT(*) AS n, MAX(fetched_at) AS last FROM source_cache GROUP BY source ORDER BY source",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.get::<String, _>("source"),
                    row.get::<i64, _>("n"),
                    from_millis(row.get::<i64, _>("last")),
                )
            })
            .collect())
    }
}
