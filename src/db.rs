//! SQLite connection pool.
//!
//! One pool is created per process and cloned into every store. WAL mode
//! lets the request path read while the background refresh tasks write.
//! The six refresh tasks and request handlers can all write at once, so a
//! writer waits on the lock for up to [`BUSY_TIMEOUT`] instead of failing
//! with `SQLITE_BUSY`.

use anyhow::{Context, Result};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::time::Duration;

use crate::config::Config;

pub const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// Six refresh tasks plus request handlers.
const MAX_CONNECTIONS: u32 = 8;

/// Open the configured database, creating the file and its parent
/// directories if needed.
pub async fn connect(config: &Config) -> Result<SqlitePool> {
    let db_path = &config.db.path;

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(BUSY_TIMEOUT);

    SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn creates_parent_dirs_and_applies_pragmas() {
        let tmp = TempDir::new().unwrap();
        let text = format!(
            "[db]\npath = \"{}\"\n[server]\nbind = \"127.0.0.1:0\"\n",
            tmp.path().join("nested/dir/sky.sqlite").display()
        );
        let cfg: Config = toml::from_str(&text).unwrap();

        let pool = connect(&cfg).await.unwrap();
        assert!(cfg.db.path.exists());

        let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(mode, "wal");

        let busy: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(busy, BUSY_TIMEOUT.as_millis() as i64);

        pool.close().await;
    }
}
