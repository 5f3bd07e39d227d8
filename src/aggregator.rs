//! Orchestration of connectors and stores.
//!
//! The [`Aggregator`] is the single entry point used by the HTTP layer, the
//! scheduler and the one-shot CLI commands. Read operations only touch the
//! stores; write operations perform exactly one upstream fetch per source
//! and persist the result.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::connector_catalog::fetch_items;
use crate::error::{CoreError, CoreResult};
use crate::extract::catalog_fields;
use crate::models::{
    empty_snapshot, snapshot, CacheEntry, CatalogEntry, PositionSample, SpaceSummary, TrendResult,
};
use crate::sources::{parse_source_list, SourceName};
use crate::store::Stores;
use crate::traits::{Connector, FeedRegistry};
use crate::trend::compute_trend;

const DEFAULT_LIST_LIMIT: i64 = 20;

pub struct Aggregator {
    stores: Stores,
    position: Arc<dyn Connector>,
    catalog: Arc<dyn Connector>,
    feeds: FeedRegistry,
    list_limit: i64,
}

impl Aggregator {
    pub fn new(
        stores: Stores,
        position: Arc<dyn Connector>,
        catalog: Arc<dyn Connector>,
        feeds: FeedRegistry,
    ) -> Self {
        Self {
            stores,
            position,
            catalog,
            feeds,
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }

    /// Default page size for [`list_catalog`](Self::list_catalog).
    pub fn with_list_limit(mut self, limit: i64) -> Self {
        self.list_limit = limit.max(1);
        self
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub async fn latest_position(&self) -> CoreResult<Option<PositionSample>> {
        self.stores.positions.latest().await
    }

    /// Fetch one sample from the position feed, append it, and return the
    /// newest stored sample.
    pub async fn fetch_position(&self) -> CoreResult<Option<PositionSample>> {
        let payload = self.position.fetch().await?;
        let id = self
            .stores
            .positions
            .insert(self.position.source_url(), &payload)
            .await?;
        debug!(id, "position sample stored");
        self.stores.positions.latest().await
    }

    pub async fn position_trend(&self) -> CoreResult<TrendResult> {
        let samples = self.stores.positions.last_n(2).await?;
        Ok(compute_trend(&samples))
    }

    /// Fetch the catalog and upsert every item. Returns the number of
    /// items written.
    ///
    /// Only the fetch can fail the sync. A failed upsert is logged and the
    /// loop moves on to the next item.
    pub async fn sync_catalog(&self) -> CoreResult<usize> {
        let items = fetch_items(self.catalog.as_ref()).await?;
        let total = items.len();
        let mut written = 0;

        for item in &items {
            let fields = catalog_fields(item);
            match self.stores.catalog.upsert(&fields, item).await {
                Ok(()) => written += 1,
                Err(e) => warn!(
                    business_key = fields.business_key.as_deref().unwrap_or("-"),
                    code = e.code(),
                    "catalog upsert failed: {}",
                    e
                ),
            }
        }

        if written < total {
            warn!(written, total, "catalog sync skipped failed items");
        }
        Ok(written)
    }

    /// Newest catalog entries. `None` uses the configured default; any
    /// value is clamped to at least 1.
    pub async fn list_catalog(&self, limit: Option<i64>) -> CoreResult<Vec<CatalogEntry>> {
        let limit = limit.unwrap_or(self.list_limit).max(1);
        self.stores.catalog.list(limit).await
    }

    /// Newest cached payload for `source`. Any string is accepted; names
    /// outside the known set simply have nothing cached.
    pub async fn cached(&self, source: &str) -> CoreResult<Option<CacheEntry>> {
        self.stores.cache.latest(source).await
    }

    /// Fetch one feed and append the body to the cache.
    pub async fn refresh_source(&self, source: SourceName) -> CoreResult<()> {
        let connector = self.feeds.get(source).ok_or_else(|| {
            CoreError::fetch(source.as_str(), None, "no connector registered")
        })?;
        let payload = connector.fetch().await?;
        self.stores.cache.write(source.as_str(), &payload).await?;
        Ok(())
    }

    /// Refresh each source in turn and return the ones that succeeded,
    /// in request order. Failures are logged and left out.
    pub async fn refresh_sources(&self, sources: &[SourceName]) -> Vec<SourceName> {
        let mut refreshed = Vec::with_capacity(sources.len());
        for &source in sources {
            match self.refresh_source(source).await {
                Ok(()) => refreshed.push(source),
                Err(e) => warn!(source = source.as_str(), code = e.code(), "refresh failed: {}", e),
            }
        }
        refreshed
    }

    /// [`refresh_sources`](Self::refresh_sources) over a comma-separated
    /// list. `None` or a blank list means every source; unknown names are
    /// ignored.
    pub async fn refresh_list(&self, list: Option<&str>) -> Vec<SourceName> {
        let sources = match list.map(str::trim) {
            Some(s) if !s.is_empty() => parse_source_list(s),
            _ => SourceName::ALL.to_vec(),
        };
        self.refresh_sources(&sources).await
    }

    /// Assemble the dashboard summary from the stores. Never fails: any
    /// read error is logged and reported as an empty placeholder.
    pub async fn summary(&self) -> SpaceSummary {
        let iss = match self.stores.positions.latest().await {
            Ok(Some(sample)) => snapshot(sample.fetched_at, &sample.payload),
            Ok(None) => empty_snapshot(),
            Err(e) => {
                warn!("summary position read failed: {}", e);
                empty_snapshot()
            }
        };

        let catalog_count = self.stores.catalog.count().await.unwrap_or_else(|e| {
            warn!("summary catalog count failed: {}", e);
            0
        });

        SpaceSummary {
            apod: self.cached_snapshot(SourceName::Apod).await,
            neo: self.cached_snapshot(SourceName::Neo).await,
            flr: self.cached_snapshot(SourceName::Flr).await,
            cme: self.cached_snapshot(SourceName::Cme).await,
            spacex: self.cached_snapshot(SourceName::Spacex).await,
            iss,
            catalog_count,
        }
    }

    async fn cached_snapshot(&self, source: SourceName) -> Value {
        match self.stores.cache.latest(source.as_str()).await {
            Ok(Some(entry)) => snapshot(entry.fetched_at, &entry.payload),
            Ok(None) => empty_snapshot(),
            Err(e) => {
                warn!(source = source.as_str(), "summary read failed: {}", e);
                empty_snapshot()
            }
        }
    }
}
