use crate::{
    CatalogTarget, OutputFormat,
    output::{OutputStyle, print_section_header},
};
use anyhow::Context;
use gamedeck_catalog::{CatalogConfig, CatalogService};
use serde::Serialize;

#[derive(Serialize)]
struct ProvidersOutput<'a> {
    scope: String,
    device: String,
    providers: &'a [String],
}

pub async fn handle(
    target: CatalogTarget,
    config: CatalogConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let device = target.device();
    let service = CatalogService::open(config).await?;
    let entry = service
        .load(target.scope, device)
        .await
        .with_context(|| format!("failed to load {} catalog for {device}", target.scope))?;

    if format.is_json() {
        let output = ProvidersOutput {
            scope: target.scope.to_string(),
            device: device.to_string(),
            providers: &entry.providers,
        };
        println!("{}", format.to_json(&output)?);
        return Ok(());
    }

    let style = OutputStyle::new();
    let count = entry.providers.len();
    let scope = target.scope;
    print_section_header(&format!("Providers ({count} {scope}, {device})"), &style);
    for provider in &entry.providers {
        println!("  {provider}");
    }

    Ok(())
}
