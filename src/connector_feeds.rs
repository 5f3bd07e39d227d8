//! Connectors for the five cached feeds.
//!
//! Four of them live under one NASA base URL and differ only in path and
//! date window; SpaceX is a plain GET. Bodies are returned unparsed.
//!
//! | Source | Path | Query |
//! |--------|------|-------|
//! | `apod` | `/planetary/apod` | `thumbs=true` |
//! | `neo` | `/neo/rest/v1/feed` | `start_date` = today − 2d, `end_date` = today |
//! | `flr` | `/DONKI/FLR` | `startDate` = today − 5d, `endDate` = today |
//! | `cme` | `/DONKI/CME` | `startDate` = today − 5d, `endDate` = today |
//!
//! `api_key` is appended only when a key is configured.

use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use serde_json::Value;
use std::sync::Arc;

use crate::config::Config;
use crate::connector_http::get_json;
use crate::error::CoreResult;
use crate::sources::SourceName;
use crate::traits::{Connector, FeedRegistry};

const NEO_WINDOW_DAYS: u64 = 2;
const DONKI_WINDOW_DAYS: u64 = 5;

/// One of the NASA-hosted feeds.
pub struct NasaFeed {
    client: reqwest::Client,
    kind: SourceName,
    url: String,
    api_key: String,
}

impl NasaFeed {
    /// `kind` must be one of `Apod`, `Neo`, `Flr`, `Cme`.
    pub fn new(
        client: reqwest::Client,
        kind: SourceName,
        base_url: &str,
        api_key: impl Into<String>,
    ) -> Self {
        let url = format!("{}{}", base_url.trim_end_matches('/'), nasa_path(kind));
        Self {
            client,
            kind,
            url,
            api_key: api_key.into(),
        }
    }
}

fn nasa_path(kind: SourceName) -> &'static str {
    match kind {
        SourceName::Apod => "/planetary/apod",
        SourceName::Neo => "/neo/rest/v1/feed",
        SourceName::Flr => "/DONKI/FLR",
        SourceName::Cme => "/DONKI/CME",
        SourceName::Spacex => "",
    }
}

/// Query parameters for a NASA feed as of `today`.
pub fn nasa_query(kind: SourceName, today: NaiveDate, api_key: &str) -> Vec<(&'static str, String)> {
    let fmt = |d: NaiveDate| d.format("%Y-%m-%d").to_string();
    let days_back = |n: u64| today.checked_sub_days(Days::new(n)).unwrap_or(today);

    let mut query = match kind {
        SourceName::Apod => vec![("thumbs", "true".to_string())],
        SourceName::Neo => vec![
            ("start_date", fmt(days_back(NEO_WINDOW_DAYS))),
            ("end_date", fmt(today)),
        ],
        SourceName::Flr | SourceName::Cme => vec![
            ("startDate", fmt(days_back(DONKI_WINDOW_DAYS))),
            ("endDate", fmt(today)),
        ],
        SourceName::Spacex => Vec::new(),
    };
    if !api_key.is_empty() {
        query.push(("api_key", api_key.to_string()));
    }
    query
}

#[async_trait]
impl Connector for NasaFeed {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    fn source_url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> CoreResult<Value> {
        let query = nasa_query(self.kind, Utc::now().date_naive(), &self.api_key);
        get_json(self.name(), self.client.get(&self.url).query(&query)).await
    }
}

/// Next-launch feed.
pub struct SpaceXFeed {
    client: reqwest::Client,
    url: String,
}

impl SpaceXFeed {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl Connector for SpaceXFeed {
    fn name(&self) -> &str {
        SourceName::Spacex.as_str()
    }

    fn source_url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> CoreResult<Value> {
        get_json(self.name(), self.client.get(&self.url)).await
    }
}

/// Build the registry with a connector for every [`SourceName`].
pub fn build_feed_registry(config: &Config, client: &reqwest::Client) -> FeedRegistry {
    let upstream = &config.upstream;
    let api_key = upstream.resolved_nasa_api_key();

    let mut registry = FeedRegistry::new();
    for kind in SourceName::ALL {
        let connector: Arc<dyn Connector> = match kind {
            SourceName::Spacex => Arc::new(SpaceXFeed::new(client.clone(), &upstream.spacex_url)),
            _ => Arc::new(NasaFeed::new(
                client.clone(),
                kind,
                &upstream.nasa_base_url,
                api_key.clone(),
            )),
        };
        registry.register(kind, connector);
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn apod_without_key() {
        let q = nasa_query(SourceName::Apod, day("2024-03-10"), "");
        assert_eq!(q, vec![("thumbs", "true".to_string())]);
    }

    #[test]
    fn neo_window_is_two_days() {
        let q = nasa_query(SourceName::Neo, day("2024-03-01"), "KEY");
        assert_eq!(
            q,
            vec![
                ("start_date", "2024-02-28".to_string()),
                ("end_date", "2024-03-01".to_string()),
                ("api_key", "KEY".to_string()),
            ]
        );
    }

    #[test]
    fn donki_window_is_five_days() {
        let q = nasa_query(SourceName::Cme, day("2024-01-03"), "");
        assert_eq!(
            q,
            vec![
                ("startDate", "2023-12-29".to_string()),
                ("endDate", "2024-01-03".to_string()),
            ]
        );
    }

    #[test]
    fn nasa_url_joins_base_and_path() {
        let feed = NasaFeed::new(reqwest::Client::new(), SourceName::Flr, "http://localhost:9/", "");
        assert_eq!(feed.source_url(), "http://localhost:9/DONKI/FLR");
        assert_eq!(feed.name(), "flr");
    }
}
