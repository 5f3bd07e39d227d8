//! Wiring: config → pool → stores → connectors → aggregator.

use anyhow::Result;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::aggregator::Aggregator;
use crate::config::Config;
use crate::connector_catalog::CatalogConnector;
use crate::connector_feeds::build_feed_registry;
use crate::connector_http::build_client;
use crate::connector_position::PositionConnector;
use crate::store::Stores;

/// Build an [`Aggregator`] backed by the real upstream connectors.
pub fn build_aggregator(config: &Config, pool: SqlitePool) -> Result<Aggregator> {
    let client = build_client(&config.http)?;
    let upstream = &config.upstream;

    let position = Arc::new(PositionConnector::new(client.clone(), &upstream.position_url));
    let catalog = Arc::new(CatalogConnector::new(client.clone(), &upstream.catalog_url));
    let feeds = build_feed_registry(config, &client);

    Ok(
        Aggregator::new(Stores::new(pool), position, catalog, feeds)
            .with_list_limit(config.catalog.list_limit),
    )
}
