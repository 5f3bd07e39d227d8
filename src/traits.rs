//! The connector seam between upstream APIs and the stores.
//!
//! Every upstream (position feed, dataset catalog, the five cached feeds) is
//! a [`Connector`] that performs one GET and returns the JSON body. The
//! aggregator only sees trait objects, so tests and custom binaries can swap
//! in any implementation.
//!
//! ```text
//! ┌──────────────┐ ┌──────────────┐ ┌──────────────────────────┐
//! │  position    │ │   catalog    │ │ FeedRegistry             │
//! │  Connector   │ │  Connector   │ │ apod neo flr cme spacex  │
//! └──────┬───────┘ └──────┬───────┘ └────────────┬─────────────┘
//!        └────────────────┼──────────────────────┘
//!                         ▼
//!                    Aggregator → stores
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::CoreResult;
use crate::sources::SourceName;

/// One upstream API.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use serde_json::{json, Value};
/// use skycache::error::CoreResult;
/// use skycache::traits::Connector;
///
/// struct Fixed;
///
/// #[async_trait]
/// impl Connector for Fixed {
///     fn name(&self) -> &str { "fixed" }
///     fn source_url(&self) -> &str { "memory://fixed" }
///     async fn fetch(&self) -> CoreResult<Value> { Ok(json!({"ok": true})) }
/// }
/// ```
#[async_trait]
pub trait Connector: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Where the data comes from. Recorded on position samples.
    fn source_url(&self) -> &str;

    /// Perform one fetch and return the body unparsed beyond JSON.
    ///
    /// Network errors, timeouts and HTTP statuses >= 400 all come back as
    /// [`CoreError::Fetch`](crate::error::CoreError::Fetch). No retries.
    async fn fetch(&self) -> CoreResult<Value>;
}

/// The connectors behind the cached feeds, keyed by [`SourceName`].
#[derive(Clone, Default)]
pub struct FeedRegistry {
    feeds: HashMap<SourceName, Arc<dyn Connector>>,
}

impl FeedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the connector for `source`.
    pub fn register(&mut self, source: SourceName, connector: Arc<dyn Connector>) {
        self.feeds.insert(source, connector);
    }

    pub fn get(&self, source: SourceName) -> Option<&Arc<dyn Connector>> {
        self.feeds.get(&source)
    }
}
