//! TOML configuration parsing and validation.
//!
//! Only `[db]` and `[server]` are required. Every other section falls back
//! to defaults that point at the public upstream APIs and the usual polling
//! cadence.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

/// Settings shared by every outbound request.
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    format!("skycache/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    #[serde(default = "default_position_url")]
    pub position_url: String,
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,
    #[serde(default = "default_nasa_base_url")]
    pub nasa_base_url: String,
    #[serde(default = "default_spacex_url")]
    pub spacex_url: String,
    #[serde(default)]
    pub nasa_api_key: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            position_url: default_position_url(),
            catalog_url: default_catalog_url(),
            nasa_base_url: default_nasa_base_url(),
            spacex_url: default_spacex_url(),
            nasa_api_key: String::new(),
        }
    }
}

fn default_position_url() -> String {
    "https://api.wheretheiss.at/v1/satellites/25544".to_string()
}
fn default_catalog_url() -> String {
    "https://visualization.osdr.nasa.gov/biodata/api/v2/datasets/?format=json".to_string()
}
fn default_nasa_base_url() -> String {
    "https://api.nasa.gov".to_string()
}
fn default_spacex_url() -> String {
    "https://api.spacexdata.com/v4/launches/next".to_string()
}

impl UpstreamConfig {
    /// The configured NASA key, or `NASA_API_KEY` from the environment when
    /// the config leaves it blank. An empty key means requests go out without one.
    pub fn resolved_nasa_api_key(&self) -> String {
        if !self.nasa_api_key.is_empty() {
            return self.nasa_api_key.clone();
        }
        std::env::var("NASA_API_KEY").unwrap_or_default()
    }
}

/// Refresh intervals, in seconds, one per background task.
#[derive(Debug, Deserialize, Clone)]
pub struct ScheduleConfig {
    #[serde(default = "default_position_secs")]
    pub position_secs: u64,
    #[serde(default = "default_catalog_secs")]
    pub catalog_secs: u64,
    #[serde(default = "default_apod_secs")]
    pub apod_secs: u64,
    #[serde(default = "default_neo_secs")]
    pub neo_secs: u64,
    #[serde(default = "default_donki_secs")]
    pub donki_secs: u64,
    #[serde(default = "default_spacex_secs")]
    pub spacex_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            position_secs: default_position_secs(),
            catalog_secs: default_catalog_secs(),
            apod_secs: default_apod_secs(),
            neo_secs: default_neo_secs(),
            donki_secs: default_donki_secs(),
            spacex_secs: default_spacex_secs(),
        }
    }
}

fn default_position_secs() -> u64 {
    120
}
fn default_catalog_secs() -> u64 {
    600
}
fn default_apod_secs() -> u64 {
    43200
}
fn default_neo_secs() -> u64 {
    7200
}
fn default_donki_secs() -> u64 {
    3600
}
fn default_spacex_secs() -> u64 {
    3600
}

impl ScheduleConfig {
    pub fn position(&self) -> Duration {
        Duration::from_secs(self.position_secs)
    }
    pub fn catalog(&self) -> Duration {
        Duration::from_secs(self.catalog_secs)
    }
    pub fn apod(&self) -> Duration {
        Duration::from_secs(self.apod_secs)
    }
    pub fn neo(&self) -> Duration {
        Duration::from_secs(self.neo_secs)
    }
    pub fn donki(&self) -> Duration {
        Duration::from_secs(self.donki_secs)
    }
    pub fn spacex(&self) -> Duration {
        Duration::from_secs(self.spacex_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    #[serde(default = "default_list_limit")]
    pub list_limit: i64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            list_limit: default_list_limit(),
        }
    }
}

fn default_list_limit() -> i64 {
    20
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Checks the invariants `load_config` enforces. Exposed so configs built in
/// code (tests, embedding binaries) go through the same rules.
pub fn validate(config: &Config) -> Result<()> {
    if config.http.timeout_secs == 0 {
        anyhow::bail!("http.timeout_secs must be > 0");
    }

    let s = &config.schedule;
    for (name, secs) in [
        ("position_secs", s.position_secs),
        ("catalog_secs", s.catalog_secs),
        ("apod_secs", s.apod_secs),
        ("neo_secs", s.neo_secs),
        ("donki_secs", s.donki_secs),
        ("spacex_secs", s.spacex_secs),
    ] {
        if secs == 0 {
            anyhow::bail!("schedule.{} must be > 0", name);
        }
    }

    if config.catalog.list_limit < 1 {
        anyhow::bail!("catalog.list_limit must be >= 1");
    }

    let u = &config.upstream;
    for (name, url) in [
        ("position_url", &u.position_url),
        ("catalog_url", &u.catalog_url),
        ("nasa_base_url", &u.nasa_base_url),
        ("spacex_url", &u.spacex_url),
    ] {
        if url.trim().is_empty() {
            anyhow::bail!("upstream.{} must not be empty", name);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[db]
path = "./data/skycache.sqlite"

[server]
bind = "127.0.0.1:3000"
"#;

    #[test]
    fn minimal_config_gets_defaults() {
        let cfg: Config = toml::from_str(MINIMAL).unwrap();
        validate(&cfg).unwrap();
        assert_eq!(cfg.http.timeout_secs, 30);
        assert_eq!(cfg.schedule.position_secs, 120);
        assert_eq!(cfg.schedule.catalog_secs, 600);
        assert_eq!(cfg.schedule.apod_secs, 43200);
        assert_eq!(cfg.catalog.list_limit, 20);
        assert!(cfg.upstream.position_url.contains("25544"));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let text = format!("{}\n[schedule]\nneo_secs = 0\n", MINIMAL);
        let cfg: Config = toml::from_str(&text).unwrap();
        let err = validate(&cfg).unwrap_err();
        assert!(err.to_string().contains("neo_secs"));
    }

    #[test]
    fn explicit_api_key_wins_over_env() {
        let text = format!("{}\n[upstream]\nnasa_api_key = \"abc\"\n", MINIMAL);
        let cfg: Config = toml::from_str(&text).unwrap();
        assert_eq!(cfg.upstream.resolved_nasa_api_key(), "abc");
    }

    #[test]
    fn load_config_reports_missing_file() {
        let err = load_config(Path::new("/nonexistent/skycache.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn example_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/skycache.example.toml");
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0:3000");
        assert_eq!(cfg.schedule.donki_secs, 3600);
    }
}
