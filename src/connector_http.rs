//! Shared outbound HTTP plumbing for all connectors.
//!
//! One `reqwest::Client` is built per process with the configured timeout
//! and user agent, then cloned into each connector.

use anyhow::Result;
use reqwest::RequestBuilder;
use serde_json::Value;
use std::time::Duration;

use crate::config::HttpConfig;
use crate::error::{CoreError, CoreResult};

pub fn build_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(client)
}

/// Send `request` and decode the body as JSON.
///
/// Any status >= 400 is a fetch error carrying that status; so is a body
/// that is not JSON.
pub async fn get_json(feed: &str, request: RequestBuilder) -> CoreResult<Value> {
    let resp = request
        .send()
        .await
        .map_err(|e| CoreError::from_reqwest(feed, e))?;

    let status = resp.status();
    if status.is_client_error() || status.is_server_error() {
        let body = resp.text().await.unwrap_or_default();
        let excerpt: String = body.chars().take(200).collect();
        return Err(CoreError::fetch(
            feed,
            Some(status.as_u16()),
            format!("HTTP {}: {}", status, excerpt),
        ));
    }

    resp.json::<Value>()
        .await
        .map_err(|e| CoreError::from_reqwest(feed, e))
}
