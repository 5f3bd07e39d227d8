//! Background tasks over fake connectors.

mod common;

use serde_json::json;
use skycache::scheduler::{Job, Scheduler};
use skycache::sources::SourceName;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use common::{aggregator, ok_feeds, test_pool, FakeConnector};

#[tokio::test]
async fn jobs_run_immediately_and_stop_on_shutdown() {
    let tmp = TempDir::new().unwrap();
    let (_cfg, pool) = test_pool(&tmp).await;

    let position = FakeConnector::ok("position", vec![json!({"latitude": 0.0, "longitude": 0.0})]);
    let catalog = FakeConnector::failing("catalog", 503);
    let agg = Arc::new(aggregator(pool, position.clone(), catalog.clone(), ok_feeds()));

    let jobs = vec![
        (Job::Position, Duration::from_millis(50)),
        (Job::Catalog, Duration::from_secs(3600)),
        (
            Job::Feeds(vec![SourceName::Flr, SourceName::Cme]),
            Duration::from_secs(3600),
        ),
    ];
    let scheduler = Scheduler::start_jobs(agg.clone(), jobs, CancellationToken::new());
    assert_eq!(scheduler.len(), 3);

    tokio::time::sleep(Duration::from_millis(300)).await;
    scheduler.shutdown().await;

    // The catalog task fails on its first tick; the others are unaffected.
    assert_eq!(catalog.calls(), 1);
    assert!(position.calls() >= 2);

    let stores = agg.stores();
    assert!(stores.positions.count().await.unwrap() >= 2);
    assert!(stores.cache.latest("flr").await.unwrap().is_some());
    assert!(stores.cache.latest("cme").await.unwrap().is_some());
    assert!(stores.cache.latest("apod").await.unwrap().is_none());

    let calls_after_shutdown = position.calls();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(position.calls(), calls_after_shutdown);
}

#[tokio::test]
async fn cancelling_the_shared_token_stops_tasks() {
    let tmp = TempDir::new().unwrap();
    let (_cfg, pool) = test_pool(&tmp).await;
    let agg = Arc::new(aggregator(
        pool,
        FakeConnector::ok("position", vec![json!({})]),
        FakeConnector::ok("catalog", vec![json!([])]),
        ok_feeds(),
    ));

    let token = CancellationToken::new();
    let scheduler = Scheduler::start_jobs(
        agg,
        vec![(Job::Catalog, Duration::from_millis(20))],
        token.clone(),
    );
    token.cancel();
    tokio::time::timeout(Duration::from_secs(5), scheduler.shutdown())
        .await
        .unwrap();
}
