//! Dataset catalog connector.
//!
//! The catalog endpoint has no fixed response shape. [`catalog_items`]
//! normalizes whatever comes back into a list of items, trying in order:
//!
//! 1. a top-level array
//! 2. an object whose `items` field is an array
//! 3. an object whose `results` field is an array
//! 4. the whole body as a single item

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CoreResult;
use crate::traits::Connector;

pub struct CatalogConnector {
    client: reqwest::Client,
    url: String,
}

impl CatalogConnector {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl Connector for CatalogConnector {
    fn name(&self) -> &str {
        "catalog"
    }

    fn source_url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> CoreResult<Value> {
        crate::connector_http::get_json(self.name(), self.client.get(&self.url)).await
    }
}

/// Fetch through any connector and normalize the body into catalog items.
pub async fn fetch_items(connector: &dyn Connector) -> CoreResult<Vec<Value>> {
    Ok(catalog_items(connector.fetch().await?))
}

pub fn catalog_items(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            for key in ["items", "results"] {
                if matches!(map.get(key), Some(Value::Array(_))) {
                    if let Some(Value::Array(items)) = map.remove(key) {
                        return items;
                    }
                }
            }
            vec![Value::Object(map)]
        }
        other => vec![other],
    }
}
