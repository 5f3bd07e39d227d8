//! One-shot refresh for `skycache sync <target>`.
//!
//! Runs the same aggregator operations as the background tasks, once, and
//! prints a short report. Useful for seeding a fresh database or checking
//! upstream connectivity without starting the server.

use anyhow::{bail, Result};
use std::fmt;
use std::str::FromStr;

use crate::aggregator::Aggregator;
use crate::app::build_aggregator;
use crate::config::Config;
use crate::db;
use crate::sources::SourceName;

/// What a one-shot sync refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTarget {
    Position,
    Catalog,
    /// All five cached feeds.
    Feeds,
    /// Position, catalog, and every feed.
    All,
    Source(SourceName),
}

impl FromStr for SyncTarget {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "position" => Ok(SyncTarget::Position),
            "catalog" => Ok(SyncTarget::Catalog),
            "feeds" => Ok(SyncTarget::Feeds),
            "all" => Ok(SyncTarget::All),
            other => match other.parse::<SourceName>() {
                Ok(source) => Ok(SyncTarget::Source(source)),
                Err(_) => bail!(
                    "Unknown sync target: '{}'. Available: position, catalog, feeds, all, apod, neo, flr, cme, spacex",
                    other
                ),
            },
        }
    }
}

impl fmt::Display for SyncTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncTarget::Position => f.write_str("position"),
            SyncTarget::Catalog => f.write_str("catalog"),
            SyncTarget::Feeds => f.write_str("feeds"),
            SyncTarget::All => f.write_str("all"),
            SyncTarget::Source(s) => f.write_str(s.as_str()),
        }
    }
}

pub async fn run_sync(config: &Config, target: &str) -> Result<()> {
    let target: SyncTarget = target.parse()?;
    let pool = db::connect(config).await?;
    let aggregator = build_aggregator(config, pool.clone())?;

    println!("sync {}", target);
    let failures = sync_target(&aggregator, target).await;

    pool.close().await;
    if failures > 0 {
        bail!("{} refresh(es) failed", failures);
    }
    println!("ok");
    Ok(())
}

/// Run `target` once, printing one line per step. Returns the number of
/// steps that failed.
pub async fn sync_target(aggregator: &Aggregator, target: SyncTarget) -> usize {
    let mut failures = 0;

    if matches!(target, SyncTarget::Position | SyncTarget::All) {
        match aggregator.fetch_position().await {
            Ok(Some(sample)) => println!("  position: stored sample #{}", sample.id),
            Ok(None) => println!("  position: nothing stored"),
            Err(e) => {
                println!("  position: {} ({})", e, e.code());
                failures += 1;
            }
        }
    }

    if matches!(target, SyncTarget::Catalog | SyncTarget::All) {
        match aggregator.sync_catalog().await {
            Ok(written) => println!("  catalog: {} items written", written),
            Err(e) => {
                println!("  catalog: {} ({})", e, e.code());
                failures += 1;
            }
        }
    }

    let sources: Vec<SourceName> = match target {
        SyncTarget::Feeds | SyncTarget::All => SourceName::ALL.to_vec(),
        SyncTarget::Source(s) => vec![s],
        _ => Vec::new(),
    };
    for source in sources {
        match aggregator.refresh_source(source).await {
            Ok(()) => println!("  {}: cached", source),
            Err(e) => {
                println!("  {}: {} ({})", source, e, e.code());
                failures += 1;
            }
        }
    }

    failures
}
