//! presign command - generate presigned upload URLs

use super::{CommandContext, PathArgs};
use anyhow::Result;
use std::time::Duration;
use tracing::debug;

pub async fn execute(
    ctx: &CommandContext,
    path: &PathArgs,
    file_name: &str,
    expires: u64,
) -> Result<()> {
    debug!(
        "Generating presigned PUT URL for {} ({} seconds)",
        file_name, expires
    );

    let url = ctx
        .manager
        .get_upload_presigned_url(&path.storage_path(), file_name, Duration::from_secs(expires))
        .await?;

    if ctx.is_json() {
        println!("{}", serde_json::json!({ "url": url, "method": "PUT" }));
    } else {
        println!("{}", url);
    }

    Ok(())
}
