//! url command - print the public URL of a file

use super::{CommandContext, PathArgs};
use anyhow::Result;

pub fn execute(ctx: &CommandContext, path: &PathArgs, file_name: &str) -> Result<()> {
    let url = ctx.manager.get_object_url(&path.storage_path(), file_name)?;

    if ctx.is_json() {
        let key = ctx.manager.object_key(&path.storage_path(), file_name)?;
        println!("{}", serde_json::json!({ "key": key, "url": url }));
    } else {
        println!("{}", url);
    }

    Ok(())
}
