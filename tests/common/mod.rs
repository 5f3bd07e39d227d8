//! Helpers shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use skycache::aggregator::Aggregator;
use skycache::config::Config;
use skycache::error::{CoreError, CoreResult};
use skycache::sources::SourceName;
use skycache::store::Stores;
use skycache::traits::{Connector, FeedRegistry};
use skycache::{db, migrate};
use sqlx::SqlitePool;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub fn test_config(tmp: &TempDir) -> Config {
    let db_path = tmp.path().join("data").join("skycache.sqlite");
    let content = format!(
        r#"
[db]
path = "{}"

[server]
bind = "127.0.0.1:0"
"#,
        db_path.display()
    );
    toml::from_str(&content).unwrap()
}

/// Fresh migrated database in `tmp`.
pub async fn test_pool(tmp: &TempDir) -> (Config, SqlitePool) {
    let cfg = test_config(tmp);
    migrate::run_migrations(&cfg).await.unwrap();
    let pool = db::connect(&cfg).await.unwrap();
    (cfg, pool)
}

/// In-memory connector. Serves queued payloads in order and keeps
/// repeating the last one, or fails every call with a fixed status.
pub struct FakeConnector {
    name: String,
    payloads: Mutex<VecDeque<Value>>,
    fail_status: Option<u16>,
    calls: AtomicUsize,
}

impl FakeConnector {
    pub fn ok(name: &str, payloads: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            payloads: Mutex::new(payloads.into()),
            fail_status: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(name: &str, status: u16) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            payloads: Mutex::new(VecDeque::new()),
            fail_status: Some(status),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for FakeConnector {
    fn name(&self) -> &str {
        &self.name
    }

    fn source_url(&self) -> &str {
        "memory://fake"
    }

    async fn fetch(&self) -> CoreResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.fail_status {
            return Err(CoreError::fetch(&self.name, Some(status), "simulated failure"));
        }
        let mut queue = self.payloads.lock().unwrap();
        let value = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        value.ok_or_else(|| CoreError::fetch(&self.name, None, "no payload queued"))
    }
}

/// Registry where every feed answers `{"source": <name>}`.
pub fn ok_feeds() -> FeedRegistry {
    let mut feeds = FeedRegistry::new();
    for source in SourceName::ALL {
        feeds.register(
            source,
            FakeConnector::ok(source.as_str(), vec![serde_json::json!({ "source": source.as_str() })]),
        );
    }
    feeds
}

pub fn aggregator(
    pool: SqlitePool,
    position: Arc<dyn Connector>,
    catalog: Arc<dyn Connector>,
    feeds: FeedRegistry,
) -> Aggregator {
    Aggregator::new(Stores::new(pool), position, catalog, feeds)
}

pub fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

pub async fn wait_for_server(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Server did not become ready within 5 seconds");
}
