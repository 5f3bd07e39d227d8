//! Store behavior against a real SQLite file.

mod common;

use chrono::{TimeZone, Utc};
use serde_json::json;
use skycache::migrate;
use skycache::models::CatalogFields;
use skycache::store::Stores;
use tempfile::TempDir;

use common::{test_config, test_pool};

fn keyed(key: &str, title: &str) -> CatalogFields {
    CatalogFields {
        business_key: Some(key.to_string()),
        title: Some(title.to_string()),
        status: Some("public".to_string()),
        updated_at: None,
    }
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    migrate::run_migrations(&cfg).await.unwrap();
    migrate::run_migrations(&cfg).await.unwrap();
}

#[tokio::test]
async fn upsert_same_key_keeps_one_row_with_latest_values() {
    let tmp = TempDir::new().unwrap();
    let (_cfg, pool) = test_pool(&tmp).await;
    let stores = Stores::new(pool);

    stores
        .catalog
        .upsert(&keyed("OSD-1", "first"), &json!({"id": "OSD-1", "v": 1}))
        .await
        .unwrap();
    let before = stores.catalog.get("OSD-1").await.unwrap().unwrap();

    let second = CatalogFields {
        business_key: Some("OSD-1".to_string()),
        title: Some("second".to_string()),
        status: Some("archived".to_string()),
        updated_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()),
    };
    stores
        .catalog
        .upsert(&second, &json!({"id": "OSD-1", "v": 2}))
        .await
        .unwrap();

    assert_eq!(stores.catalog.count().await.unwrap(), 1);
    let after = stores.catalog.get("OSD-1").await.unwrap().unwrap();
    assert_eq!(after.id, before.id);
    assert_eq!(after.inserted_at, before.inserted_at);
    assert_eq!(after.title.as_deref(), Some("second"));
    assert_eq!(after.status.as_deref(), Some("archived"));
    assert_eq!(after.updated_at, second.updated_at);
    assert_eq!(after.raw, json!({"id": "OSD-1", "v": 2}));
    assert_ne!(after.raw_hash, before.raw_hash);
}

#[tokio::test]
async fn identical_upsert_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let (_cfg, pool) = test_pool(&tmp).await;
    let stores = Stores::new(pool);

    let raw = json!({"id": "OSD-7", "title": "same"});
    for _ in 0..3 {
        stores.catalog.upsert(&keyed("OSD-7", "same"), &raw).await.unwrap();
    }

    assert_eq!(stores.catalog.count().await.unwrap(), 1);
    let entry = stores.catalog.get("OSD-7").await.unwrap().unwrap();
    assert_eq!(entry.raw, raw);
    assert_eq!(entry.raw_hash.len(), 64);
}

#[tokio::test]
async fn unkeyed_items_accumulate() {
    let tmp = TempDir::new().unwrap();
    let (_cfg, pool) = test_pool(&tmp).await;
    let stores = Stores::new(pool);

    let raw = json!({"nothing": "identifying"});
    for _ in 0..4 {
        stores
            .catalog
            .upsert(&CatalogFields::default(), &raw)
            .await
            .unwrap();
    }

    assert_eq!(stores.catalog.count().await.unwrap(), 4);
    assert_eq!(stores.catalog.count_unkeyed().await.unwrap(), 4);
}

#[tokio::test]
async fn concurrent_upserts_of_one_key_never_duplicate() {
    let tmp = TempDir::new().unwrap();
    let (_cfg, pool) = test_pool(&tmp).await;
    let stores = Stores::new(pool);

    let mut handles = Vec::new();
    for i in 0..10 {
        let catalog = stores.catalog.clone();
        handles.push(tokio::spawn(async move {
            catalog
                .upsert(&keyed("OSD-99", &format!("t{}", i)), &json!({"i": i}))
                .await
        }));
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }

    assert_eq!(stores.catalog.count().await.unwrap(), 1);
}

#[tokio::test]
async fn list_is_newest_first_and_limited() {
    let tmp = TempDir::new().unwrap();
    let (_cfg, pool) = test_pool(&tmp).await;
    let stores = Stores::new(pool);

    for key in ["a", "b", "c"] {
        stores
            .catalog
            .upsert(&keyed(key, key), &json!({"id": key}))
            .await
            .unwrap();
    }

    let items = stores.catalog.list(2).await.unwrap();
    let keys: Vec<_> = items
        .iter()
        .map(|e| e.business_key.clone().unwrap())
        .collect();
    assert_eq!(keys, ["c", "b"]);
}

#[tokio::test]
async fn cache_returns_latest_write_per_source() {
    let tmp = TempDir::new().unwrap();
    let (_cfg, pool) = test_pool(&tmp).await;
    let stores = Stores::new(pool);

    for n in 1..=3 {
        stores.cache.write("apod", &json!({"n": n})).await.unwrap();
    }
    stores.cache.write("neo", &json!({"n": 100})).await.unwrap();

    let latest = stores.cache.latest("apod").await.unwrap().unwrap();
    assert_eq!(latest.payload, json!({"n": 3}));
    assert_eq!(latest.source, "apod");

    assert!(stores.cache.latest("APOD").await.unwrap().is_none());
    assert!(stores.cache.latest("spacex").await.unwrap().is_none());

    let stats = stores.cache.source_stats().await.unwrap();
    let counts: Vec<(String, i64)> = stats.into_iter().map(|(s, n, _)| (s, n)).collect();
    assert_eq!(counts, [("apod".to_string(), 3), ("neo".to_string(), 1)]);
}

#[tokio::test]
async fn position_log_orders_by_id_descending() {
    let tmp = TempDir::new().unwrap();
    let (_cfg, pool) = test_pool(&tmp).await;
    let stores = Stores::new(pool);

    assert!(stores.positions.latest().await.unwrap().is_none());
    assert!(stores.positions.last_n(2).await.unwrap().is_empty());

    for lat in [1.0, 2.0, 3.0] {
        stores
            .positions
            .insert("memory://iss", &json!({"latitude": lat, "longitude": 0.0}))
            .await
            .unwrap();
    }

    let last = stores.positions.last_n(2).await.unwrap();
    assert_eq!(last.len(), 2);
    assert_eq!(last[0].payload["latitude"], json!(3.0));
    assert_eq!(last[1].payload["latitude"], json!(2.0));
    assert!(last[0].id > last[1].id);
    assert_eq!(last[0].source_url, "memory://iss");
    assert_eq!(stores.positions.count().await.unwrap(), 3);
}
