//! The fixed set of cached feeds and the `skycache sources` listing.

use anyhow::Result;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::config::Config;
use crate::db;
use crate::store::CacheStore;

/// A feed cached in `source_cache`. The string form is the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceName {
    Apod,
    Neo,
    Flr,
    Cme,
    Spacex,
}

impl SourceName {
    pub const ALL: [SourceName; 5] = [
        SourceName::Apod,
        SourceName::Neo,
        SourceName::Flr,
        SourceName::Cme,
        SourceName::Spacex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceName::Apod => "apod",
            SourceName::Neo => "neo",
            SourceName::Flr => "flr",
            SourceName::Cme => "cme",
            SourceName::Spacex => "spacex",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SourceName::Apod => "Astronomy Picture of the Day",
            SourceName::Neo => "Near-earth object feed",
            SourceName::Flr => "Solar flares",
            SourceName::Cme => "Coronal mass ejections",
            SourceName::Spacex => "Next launch",
        }
    }

    /// Refresh interval of the background task that owns this feed.
    /// Flares and CMEs share one task.
    pub fn interval(&self, config: &Config) -> Duration {
        match self {
            SourceName::Apod => config.schedule.apod(),
            SourceName::Neo => config.schedule.neo(),
            SourceName::Flr | SourceName::Cme => config.schedule.donki(),
            SourceName::Spacex => config.schedule.spacex(),
        }
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceName::ALL
            .into_iter()
            .find(|n| n.as_str() == s)
            .ok_or_else(|| format!("unknown source: '{}'", s))
    }
}

/// Parse a comma-separated source list.
///
/// Names are trimmed, empties dropped, unknown names ignored and repeats
/// collapsed; order of first appearance is kept.
pub fn parse_source_list(list: &str) -> Vec<SourceName> {
    let mut out = Vec::new();
    for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if let Ok(source) = name.parse::<SourceName>() {
            if !out.contains(&source) {
                out.push(source);
            }
        }
    }
    out
}

/// Print every feed with its interval and the age of its newest cached row.
pub async fn list_sources(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let stats = CacheStore::new(pool.clone()).source_stats().await?;

    println!("{:<10} {:<32} {:>9}   LAST FETCH", "SOURCE", "DESCRIPTION", "EVERY");
    for source in SourceName::ALL {
        let last = stats
            .iter()
            .find(|(name, _, _)| name == source.as_str())
            .map(|(_, _, at)| crate::display::age_now(*at))
            .unwrap_or_else(|| "never".to_string());
        println!(
            "{:<10} {:<32} {:>8}s   {}",
            source.as_str(),
            source.description(),
            source.interval(config).as_secs(),
            last
        );
    }

    pool.close().await;
    Ok(())
}
