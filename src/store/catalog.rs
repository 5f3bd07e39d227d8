use serde_json::Value;
use sha2::{Digest, Sha256};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::error::CoreResult;
use crate::models::{from_millis, CatalogEntry, CatalogFields};

use super::now_millis;

/// Catalog entries deduplicated by business key.
#[derive(Clone)]
pub struct CatalogStore {
    pool: SqlitePool,
}

impl CatalogStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or update one catalog item.
    ///
    /// With a business key this is a single `INSERT .. ON CONFLICT DO UPDATE`
    /// statement: a repeat key overwrites title, status, updated_at and the
    /// raw payload while `id` and `inserted_at` keep their original values.
    /// Without a key the row is always inserted.
    pub async fn upsert(&self, fields: &CatalogFields, raw: &Value) -> CoreResult<()> {
        let raw_text = serde_json::to_string(raw)?;
        let raw_hash = content_hash(&raw_text);
        let updated_at = fields.updated_at.map(|t| t.timestamp_millis());

        match &fields.business_key {
            Some(key) => {
                sqlx::query(
                    r#"
                    INSERT INTO catalog_items (business_key, title, status, updated_at, inserted_at, raw, raw_hash)
                    VALUES (?, ?, ?, ?, ?, ?, ?)
                    ON CONFLICT(business_key) DO UPDATE SET
                        title = excluded.title,
                        status = excluded.status,
                        updated_at = excluded.updated_at,
                        raw = excluded.raw,
                        raw_hash = excluded.raw_hash
                    "#,
                )
                .bind(key)
                .bind(&fields.title)
                .bind(&fields.status)
                .bind(updated_at)
                .bind(now_millis())
                .bind(&raw_text)
                .bind(&raw_hash)
                .execute(&self.pool)
                .await?;
            }
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO catalog_items (business_key, title, status, updated_at, inserted_at, raw, raw_hash)
                    VALUES (NULL, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&fields.title)
                .bind(&fields.status)
                .bind(updated_at)
                .bind(now_millis())
                .bind(&raw_text)
                .bind(&raw_hash)
                .execute(&self.pool)
                .await?;
            }
        }

        Ok(())
    }

    /// Up to `limit` most recently inserted entries, newest first.
    pub async fn list(&self, limit: i64) -> CoreResult<Vec<CatalogEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, business_key, title, status, updated_at, inserted_at, raw, raw_hash
            FROM catalog_items
            ORDER BY inserted_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(entry_from_row).collect()
    }

    /// Look up a single entry by business key.
    pub async fn get(&self, business_key: &str) -> CoreResult<Option<CatalogEntry>> {
        let row = sqlx::query(
            r#"
            SELECT id, business_key, title, status, updated_at, inserted_at, raw, raw_hash
            FROM catalog_items WHERE business_key = ?
            "#,
        )
        .bind(business_key)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(entry_from_row).transpose()
    }

    pub async fn count(&self) -> CoreResult<i64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM catalog_items")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    /// Entries without a business key. These accumulate on every sync.
    pub async fn count_unkeyed(&self) -> CoreResult<i64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM catalog_items WHERE business_key IS NULL")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}

fn entry_from_row(row: &SqliteRow) -> CoreResult<CatalogEntry> {
    let raw: String = row.get("raw");
    Ok(CatalogEntry {
        id: row.get("id"),
        business_key: row.get("business_key"),
        title: row.get("title"),
        status: row.get("status"),
        updated_at: row.get::<Option<i64>, _>("updated_at").map(from_millis),
        inserted_at: from_millis(row.get("inserted_at")),
        raw: serde_json::from_str(&raw)?,
        raw_hash: row.get("raw_hash"),
    })
}

fn content_hash(raw_text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_text.as_bytes());
    format!("{:x}", hasher.finalize())
}
