//! rm command - delete a file or a catalog directory

use super::{CommandContext, PathArgs};
use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::io::{self, Write};
use strata_core::StoragePath;
use strata_storage::StorageManager;

pub async fn execute(
    ctx: &CommandContext,
    path: &PathArgs,
    file: Option<&str>,
    force: bool,
) -> Result<()> {
    let storage_path = path.storage_path();
    let (file, target) = delete_target(&ctx.manager, &storage_path, file)?;

    if file.is_none() && !force && !ctx.quiet {
        let msg = format!("Delete every object under '{}'?", target);
        if !confirm(&msg)? {
            ctx.info("Cancelled");
            return Ok(());
        }
    }

    ctx.manager
        .delete_files(&storage_path, file)
        .await
        .context("Delete failed")?;

    ctx.info(&format!("{}: {}", "delete".red(), target));
    Ok(())
}

/// File to delete and the key or directory prefix it covers.
///
/// An empty file name means the directory, so it still goes through the prompt.
fn delete_target<'a>(
    manager: &StorageManager,
    path: &StoragePath,
    file: Option<&'a str>,
) -> Result<(Option<&'a str>, String)> {
    let file = file.filter(|name| !name.is_empty());

    let catalog = &path.catalog_type;
    if file.is_none() && !catalog.is_root() && !manager.registry().contains(catalog) {
        bail!("Catalog '{}' is not registered", catalog);
    }

    let target = manager.object_key(path, file.unwrap_or_default())?;
    Ok((file, target))
}

/// Confirm an action with the user
fn confirm(message: &str) -> Result<bool> {
    print!("{} [y/N]: ", message);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}
