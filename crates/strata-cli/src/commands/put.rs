//! put command - upload a local file into a catalog directory

use super::{CommandContext, PathArgs};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use strata_core::BucketFile;
use tokio::fs;

pub async fn execute(
    ctx: &CommandContext,
    path: &PathArgs,
    source: &Path,
    name: Option<&str>,
) -> Result<()> {
    let name = match name {
        Some(name) => name.to_string(),
        None => source
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Cannot derive a file name from {}", source.display()))?
            .to_string(),
    };

    let reader = fs::File::open(source)
        .await
        .with_context(|| format!("Failed to open {}", source.display()))?;
    let mut file = BucketFile::new(name, reader);

    let url = ctx
        .manager
        .put_file(&path.storage_path(), &mut file)
        .await
        .context("Upload failed")?;

    if ctx.is_json() {
        println!("{}", serde_json::json!({ "url": url }));
    } else if ctx.quiet {
        println!("{}", url);
    } else {
        println!("{}: {} -> {}", "upload".green(), source.display(), url);
    }

    Ok(())
}
