//! Position feed connector (e.g. wheretheiss.at satellite endpoint).
//!
//! Returns the body as-is. The trend calculator later reads `latitude`,
//! `longitude` and `velocity` from it; a body without them is still stored.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CoreResult;
use crate::traits::Connector;

pub struct PositionConnector {
    client: reqwest::Client,
    url: String,
}

impl PositionConnector {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl Connector for PositionConnector {
    fn name(&self) -> &str {
        "position"
    }

    fn source_url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> CoreResult<Value> {
        crate::connector_http::get_json(self.name(), self.client.get(&self.url)).await
    }
}
