use serde_json::Value;
use sqlx::{Row, SqlitePool};

use crate::error::CoreResult;
use crate::models::{from_millis, PositionSample};

use super::now_millis;

/// Append-only log of position samples.
#[derive(Clone)]
pub struct PositionLog {
    pool: SqlitePool,
}

impl PositionLog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append one sample stamped with the current time. Returns its id.
    pub async fn insert(&self, source_url: &str, payload: &Value) -> CoreResult<i64> {
        let result =
            sqlx::query("INSERT INTO position_log (fetched_at, source_url, payload) VALUES (?, ?, ?)")
                .bind(now_millis())
                .bind(source_url)
                .bind(serde_json::to_string(payload)?)
                .execute(&self.pool)
                .await?;
        Ok(result.last_insert_rowid())
    }

    /// The newest sample, or `None` if nothing has been fetched yet.
    pub async fn latest(&self) -> CoreResult<Option<PositionSample>> {
        Ok(self.last_n(1).await?.into_iter().next())
    }

    /// Up to `n` newest samples, newest first.
    pub async fn last_n(&self, n: i64) -> CoreResult<Vec<PositionSample>> {
        let rows = sqlx::query(
            "SELECT id, fetched_at, source_url, payload FROM position_log ORDER BY id DESC LIMIT ?",
        )
        .bind(n.max(0))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let payload: String = row.get("payload");
                Ok(PositionSample {
                    id: row.get("id"),
                    fetched_at: from_millis(row.get("fetched_at")),
                    source_url: row.get("source_url"),
                    payload: serde_json::from_str(&payload)?,
                })
            })
            .collect()
    }

    pub async fn count(&self) -> CoreResult<i64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM position_log")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}
