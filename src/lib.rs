//! # skycache
//!
//! A polling cache for public space-data APIs.
//!
//! skycache periodically pulls the ISS position, the NASA OSDR dataset
//! catalog, and five event feeds (APOD, near-earth objects, solar flares,
//! coronal mass ejections, next SpaceX launch) into SQLite, and serves the
//! latest known values over a small JSON HTTP API. Reads never wait on an
//! upstream call.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌──────────────┐
//! │ Connectors  │──▶│ Aggregator  │──▶│    SQLite     │
//! │ pos/cat/feed│   │ sync/refresh│   │ log/catalog/  │
//! └─────────────┘   └──────┬──────┘   │ cache         │
//!        ▲                 │          └──────────────┘
//!        │          ┌──────┴──────┐
//!   ┌────┴─────┐    ▼             ▼
//!   │Scheduler │ ┌──────┐    ┌──────────┐
//!   │ 6 tasks  │ │ CLI  │    │ HTTP API │
//!   └──────────┘ └──────┘    └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! skycache init                 # create database
//! skycache sync all             # one-shot refresh of everything
//! skycache summary              # print the dashboard summary
//! skycache serve                # background tasks + HTTP API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`error`] | Core error taxonomy and envelope codes |
//! | [`extract`] | Field extraction from heterogeneous JSON |
//! | [`trend`] | Haversine distance and movement trend |
//! | [`traits`] | `Connector` trait and feed registry |
//! | [`connector_http`] | Shared HTTP client and GET helper |
//! | [`connector_position`] | Position feed connector |
//! | [`connector_catalog`] | Dataset catalog connector and normalization |
//! | [`connector_feeds`] | NASA and SpaceX feed connectors |
//! | [`store`] | Position log, catalog, and cache stores |
//! | [`aggregator`] | Sync, refresh, and summary orchestration |
//! | [`scheduler`] | Background refresh tasks |
//! | [`server`] | HTTP API |
//! | [`app`] | Wiring helpers |
//! | [`ingest`] | One-shot `sync` command |
//! | [`sources`] | Source names and `sources` command |
//! | [`stats`] | `stats` command |
//! | [`display`] | Byte and timestamp rendering for reports |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod aggregator;
pub mod app;
pub mod config;
pub mod connector_catalog;
pub mod connector_feeds;
pub mod connector_http;
pub mod connector_position;
pub mod db;
pub mod display;
pub mod error;
pub mod extract;
pub mod ingest;
pub mod migrate;
pub mod models;
pub mod scheduler;
pub mod server;
pub mod sources;
pub mod stats;
pub mod store;
pub mod traits;
pub mod trend;
