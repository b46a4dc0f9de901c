//! CLI command implementations

pub mod catalogs;
pub mod ls;
pub mod presign;
pub mod put;
pub mod rm;
pub mod url;

use crate::OutputFormat;
use clap::Args;
use strata_core::{CatalogType, StoragePath};
use strata_storage::StorageManager;

/// Context passed to all commands
pub struct CommandContext {
    pub manager: StorageManager,
    pub output_format: OutputFormat,
    pub quiet: bool,
}

impl CommandContext {
    /// Check if output should be JSON
    pub fn is_json(&self) -> bool {
        matches!(self.output_format, OutputFormat::Json)
    }

    /// Print info message if not quiet
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg);
        }
    }
}

/// Catalog address shared by the path-based commands
#[derive(Args, Debug, Clone)]
pub struct PathArgs {
    /// Catalog type; omit to address the root catalog
    #[arg(long)]
    pub catalog: Option<String>,

    /// Entity id substituted into the catalog pattern
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub id: i64,

    /// Custom directory under the root catalog (uses the custom catalog)
    #[arg(long, conflicts_with_all = ["catalog", "id"])]
    pub custom: Option<String>,
}

impl PathArgs {
    pub fn storage_path(&self) -> StoragePath {
        match &self.custom {
            Some(dir) => StoragePath::custom(dir.as_str()),
            None => StoragePath::entity(
                self.catalog.clone().map(CatalogType::from).unwrap_or_default(),
                self.id,
            ),
        }
    }
}
