//! Core data types: stored rows and the derived views assembled from them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// One observation from the position feed. Append-only.
#[derive(Debug, Clone, Serialize)]
pub struct PositionSample {
    pub id: i64,
    pub fetched_at: DateTime<Utc>,
    pub source_url: String,
    pub payload: Value,
}

/// A deduplicated dataset record from the catalog feed.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub id: i64,
    /// `None` for items with no recognizable identifier; those are never merged.
    pub business_key: Option<String>,
    pub title: Option<String>,
    pub status: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub inserted_at: DateTime<Utc>,
    pub raw: Value,
    /// SHA-256 of the serialized raw payload as last written.
    pub raw_hash: String,
}

/// Fields pulled out of one catalog item before it is upserted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogFields {
    pub business_key: Option<String>,
    pub title: Option<String>,
    pub status: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A cached payload for a named feed. Only the newest row per source is read.
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntry {
    pub id: i64,
    pub source: String,
    pub fetched_at: DateTime<Utc>,
    pub payload: Value,
}

/// Movement derived from the two newest position samples. Not persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrendResult {
    pub movement: bool,
    pub delta_km: f64,
    pub dt_sec: f64,
    pub velocity_kmh: Option<f64>,
    pub from_time: Option<DateTime<Utc>>,
    pub to_time: Option<DateTime<Utc>>,
    pub from_lat: Option<f64>,
    pub from_lon: Option<f64>,
    pub to_lat: Option<f64>,
    pub to_lon: Option<f64>,
}

/// Snapshot of everything the dashboard needs, read from the stores only.
///
/// Each feed field is `{}` when nothing is cached yet, otherwise
/// `{"at": <fetched_at>, "payload": <payload>}`.
#[derive(Debug, Clone, Serialize)]
pub struct SpaceSummary {
    pub apod: Value,
    pub neo: Value,
    pub flr: Value,
    pub cme: Value,
    pub spacex: Value,
    pub iss: Value,
    #[serde(rename = "osdr_count")]
    pub catalog_count: i64,
}

/// Build the `{at, payload}` snapshot used in [`SpaceSummary`].
pub fn snapshot(at: DateTime<Utc>, payload: &Value) -> Value {
    serde_json::json!({ "at": at, "payload": payload })
}

/// The placeholder for a feed with nothing cached.
pub fn empty_snapshot() -> Value {
    Value::Object(serde_json::Map::new())
}

pub(crate) fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}
