use crate::{
    BrowseArgs, OutputFormat,
    output::{
        OutputStyle, create_table, format_muted, header_cell, numeric_cell, print_section_header,
        regular_cell,
    },
};
use anyhow::Context;
use gamedeck_catalog::{CatalogConfig, CatalogService, CatalogView, DeviceClass};
use std::sync::Arc;
use tracing::debug;

pub async fn handle(
    args: BrowseArgs,
    config: CatalogConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let scope = args.target.scope;
    let device = args.target.device();
    let service = Arc::new(CatalogService::open(config).await?);

    // Surface the load error itself; the browser only keeps a flag
    service
        .load(scope, device)
        .await
        .with_context(|| format!("failed to load {scope} catalog for {device}"))?;

    let browser = service.browser(scope, device);
    browser.load().await;
    browser.set_game_type(args.game_type);
    browser.set_provider(args.provider.as_deref());
    browser.recompute_now();

    if args.page != 1 {
        let page = browser.go_to_page(args.page);
        if page != args.page {
            debug!("Requested page {} clamped to {page}", args.page);
        }
        browser.recompute_now();
    }

    let view = browser.view();
    if format.is_json() {
        println!("{}", format.to_json(&view)?);
    } else {
        print_view(&view, device);
    }

    Ok(())
}

fn print_view(view: &CatalogView, device: DeviceClass) {
    let style = OutputStyle::new();

    let mut title = format!("Games for {device}: {}", view.game_type);
    if let Some(provider) = &view.provider {
        title.push_str(&format!(" / {provider}"));
    }
    print_section_header(&title, &style);

    if view.games.is_empty() {
        let message = format_muted("No games match the current filters", &style);
        println!("{message}");
        return;
    }

    let mut table = create_table(&style);
    table.set_header(vec![
        header_cell("ID", &style),
        header_cell("Name", &style),
        header_cell("Provider", &style),
        header_cell("Tags", &style),
        header_cell("Devices", &style),
    ]);

    for game in &view.games {
        let devices = match (game.mobile, game.desktop) {
            (true, true) => "mobile, desktop",
            (true, false) => "mobile",
            (false, true) => "desktop",
            (false, false) => "-",
        };
        table.add_row(vec![
            numeric_cell(&game.id),
            regular_cell(&game.name),
            regular_cell(&game.provider),
            regular_cell(&game.tags.join(", ")),
            regular_cell(devices),
        ]);
    }

    println!("{table}");
    println!(
        "Page {}/{} ({} matching games, {} providers)",
        view.page,
        view.total_pages,
        view.total_matches,
        view.providers.len()
    );
}
