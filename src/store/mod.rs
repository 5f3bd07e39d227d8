//! SQLite-backed stores.
//!
//! Each store wraps a clone of the one process-wide [`SqlitePool`]; cloning a
//! pool only clones a handle. Correctness under concurrent writers relies on
//! SQLite's single-statement atomicity, so no store takes locks of its own.
//!
//! | Store | Table | Write semantics |
//! |-------|-------|-----------------|
//! | [`PositionLog`] | `position_log` | append |
//! | [`CatalogStore`] | `catalog_items` | upsert by business key |
//! | [`CacheStore`] | `source_cache` | append, newest row wins on read |
//!
//! Timestamps are stored as Unix milliseconds and payloads as JSON text.

mod cache;
mod catalog;
mod position;

pub use cache::CacheStore;
pub use catalog::CatalogStore;
pub use position::PositionLog;

use sqlx::SqlitePool;

/// All stores built over one shared pool.
#[derive(Clone)]
pub struct Stores {
    pub positions: PositionLog,
    pub catalog: CatalogStore,
    pub cache: CacheStore,
}

impl Stores {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            positions: PositionLog::new(pool.clone()),
            catalog: CatalogStore::new(pool.clone()),
            cache: CacheStore::new(pool),
        }
    }
}

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
