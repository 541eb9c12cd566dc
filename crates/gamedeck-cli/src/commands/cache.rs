use crate::{
    CacheCommands, OutputFormat,
    output::{
        OutputStyle, create_table, format_age, format_muted, format_success, freshness_cell,
        header_cell, numeric_cell, print_section_header, regular_cell,
    },
};
use gamedeck_catalog::{CatalogConfig, TwoTierCache, entry::current_time_ms};
use serde::Serialize;
use std::time::Duration;

#[derive(Serialize)]
struct CacheListing {
    key: String,
    games: usize,
    providers: usize,
    total_pages: usize,
    age_secs: u64,
    fresh: bool,
}

pub async fn handle(
    cmd: CacheCommands,
    config: CatalogConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let cache = TwoTierCache::open(&config).await?;

    match cmd {
        CacheCommands::List => list(&cache, format).await,
        CacheCommands::Clear => {
            cache.clear().await?;
            report(format, "cleared", None)
        }
        CacheCommands::Sweep => {
            let removed = cache.sweep_expired().await?;
            report(format, "swept", Some(removed))
        }
    }
}

async fn list(cache: &TwoTierCache, format: OutputFormat) -> anyhow::Result<()> {
    let now = current_time_ms();
    let listings: Vec<CacheListing> = cache
        .persisted()
        .load_map()
        .await?
        .into_iter()
        .map(|(key, entry)| CacheListing {
            key,
            games: entry.games.len(),
            providers: entry.providers.len(),
            total_pages: entry.total_pages,
            age_secs: entry.age_at(now).as_secs(),
            fresh: entry.is_fresh_at(now, cache.expiry()),
        })
        .collect();

    if format.is_json() {
        println!("{}", format.to_json(&listings)?);
        return Ok(());
    }

    let style = OutputStyle::new();
    print_section_header("Cached catalogs", &style);

    if listings.is_empty() {
        println!("{}", format_muted("Cache is empty", &style));
        return Ok(());
    }

    let mut table = create_table(&style);
    table.set_header(vec![
        header_cell("Key", &style),
        header_cell("Games", &style),
        header_cell("Providers", &style),
        header_cell("Pages", &style),
        header_cell("Age", &style),
        header_cell("Status", &style),
    ]);
    for listing in &listings {
        table.add_row(vec![
            regular_cell(&listing.key),
            numeric_cell(listing.games),
            numeric_cell(listing.providers),
            numeric_cell(listing.total_pages),
            regular_cell(&format_age(Duration::from_secs(listing.age_secs))),
            freshness_cell(listing.fresh, &style),
        ]);
    }
    println!("{table}");

    Ok(())
}

fn report(format: OutputFormat, action: &str, removed: Option<usize>) -> anyhow::Result<()> {
    if format.is_json() {
        let result = serde_json::json!({
            "success": true,
            "action": action,
            "removed": removed,
        });
        println!("{}", format.to_json(&result)?);
    } else {
        let style = OutputStyle::new();
        let message = match removed {
            Some(count) => format!("Cache {action}: {count} expired entries removed"),
            None => format!("Cache {action}"),
        };
        println!("{}", format_success(&message, &style));
    }
    Ok(())
}
