//! Database statistics overview for `skycache stats`.
//!
//! Row counts per table plus a per-feed breakdown of the cache, to confirm
//! that the background tasks are actually landing data.

use anyhow::Result;

use crate::config::Config;
use crate::db;
use crate::display;
use crate::store::Stores;

/// Run the stats command: query the database and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let stores = Stores::new(pool.clone());

    let positions = stores.positions.count().await?;
    let last_position = stores.positions.latest().await?;
    let catalog_total = stores.catalog.count().await?;
    let catalog_unkeyed = stores.catalog.count_unkeyed().await?;
    let cache = stores.cache.source_stats().await?;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("skycache — Database Stats");
    println!("=========================");
    println!();
    println!("  Database:    {}", config.db.path.display());
    println!("  Size:        {}", display::bytes(db_size));
    println!();
    println!(
        "  Positions:   {} (last: {})",
        positions,
        last_position
            .map(|s| display::age_now(s.fetched_at))
            .unwrap_or_else(|| "never".to_string())
    );
    println!(
        "  Catalog:     {} ({} keyed, {} without key)",
        catalog_total,
        catalog_total - catalog_unkeyed,
        catalog_unkeyed
    );

    if !cache.is_empty() {
        println!();
        println!("  Cache by source:");
        println!("  {:<12} {:>6}   {}", "SOURCE", "ROWS", "LAST FETCH");
        println!("  {}", "-".repeat(40));
        for (source, rows, last) in &cache {
            println!(
                "  {:<12} {:>6}   {}",
                source,
                rows,
                display::age_now(*last)
            );
        }
    }

    println!();

    pool.close().await;
    Ok(())
}
