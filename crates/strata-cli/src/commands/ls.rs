//! ls command - list object URLs under a prefix

use super::CommandContext;
use anyhow::Result;
use serde::Serialize;

#[derive(Serialize)]
struct ListResult<'a> {
    prefix: &'a str,
    urls: &'a [String],
    total_objects: usize,
}

pub async fn execute(ctx: &CommandContext, prefix: Option<&str>) -> Result<()> {
    let prefix = prefix.unwrap_or(&ctx.manager.config().root_catalog);
    let urls = ctx.manager.list_objects(prefix).await?;

    if ctx.is_json() {
        let result = ListResult {
            prefix,
            urls: &urls,
            total_objects: urls.len(),
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for url in &urls {
            println!("{}", url);
        }
        ctx.info(&format!("\nTotal: {} object(s)", urls.len()));
    }

    Ok(())
}
