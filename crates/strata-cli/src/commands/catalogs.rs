//! catalogs command - show registered catalogs

use super::CommandContext;
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

#[derive(Serialize)]
struct CatalogInfo {
    catalog: String,
    pattern: String,
}

pub fn execute(ctx: &CommandContext) -> Result<()> {
    let catalogs: Vec<CatalogInfo> = ctx
        .manager
        .registry()
        .catalogs()
        .into_iter()
        .map(|(catalog, pattern)| CatalogInfo {
            catalog: catalog.to_string(),
            pattern: pattern.to_string(),
        })
        .collect();

    if ctx.is_json() {
        println!("{}", serde_json::to_string_pretty(&catalogs)?);
        return Ok(());
    }

    let root = &ctx.manager.config().root_catalog;
    for info in &catalogs {
        println!(
            "{:<24} {}{}",
            info.catalog.blue().bold(),
            root,
            info.pattern
        );
    }
    ctx.info(&format!("\nTotal: {} catalog(s)", catalogs.len()));

    Ok(())
}
