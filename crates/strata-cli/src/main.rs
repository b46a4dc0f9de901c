//! Strata CLI
//!
//! Operator commands over the catalog storage facade: upload, list, delete,
//! presign and URL lookup by catalog path.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use commands::{CommandContext, PathArgs};
use std::path::PathBuf;
use strata_core::StorageConfig;
use strata_storage::StorageManager;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "strata")]
#[command(author = "Strata Team")]
#[command(version = strata_core::VERSION)]
#[command(about = "Catalog-aware S3 object storage", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, env = "STRATA_CONFIG")]
    config: Option<PathBuf>,

    /// Namespace every key under an extra `test/` segment
    #[arg(long, global = true, env = "STRATA_TEST_MODE")]
    test_mode: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Suppress informational output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "STRATA_LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a local file into a catalog directory
    Put {
        #[command(flatten)]
        path: PathArgs,

        /// Local file to upload
        file: PathBuf,

        /// Object file name (defaults to the local file name)
        #[arg(long)]
        name: Option<String>,
    },

    /// List object URLs under a key prefix
    Ls {
        /// Key prefix (defaults to the root catalog)
        prefix: Option<String>,
    },

    /// Delete a file, or a whole catalog directory
    Rm {
        #[command(flatten)]
        path: PathArgs,

        /// File name inside the directory; omit to delete the directory
        #[arg(long)]
        file: Option<String>,

        /// Do not ask for confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Generate a presigned upload URL
    Presign {
        #[command(flatten)]
        path: PathArgs,

        /// Object file name
        file_name: String,

        /// Expiry in seconds (0 uses the configured default)
        #[arg(long, default_value_t = 0)]
        expires: u64,
    },

    /// Print the public URL of a file
    Url {
        #[command(flatten)]
        path: PathArgs,

        /// Object file name
        file_name: String,
    },

    /// Show registered catalogs and their path patterns
    Catalogs,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = load_config(cli.config.as_ref())?;
    let manager =
        StorageManager::connect(config, cli.test_mode).context("Failed to create storage client")?;

    let ctx = CommandContext {
        manager,
        output_format: cli.output,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Put { path, file, name } => {
            commands::put::execute(&ctx, &path, &file, name.as_deref()).await
        }
        Commands::Ls { prefix } => commands::ls::execute(&ctx, prefix.as_deref()).await,
        Commands::Rm { path, file, force } => {
            commands::rm::execute(&ctx, &path, file.as_deref(), force).await
        }
        Commands::Presign {
            path,
            file_name,
            expires,
        } => commands::presign::execute(&ctx, &path, &file_name, expires).await,
        Commands::Url { path, file_name } => commands::url::execute(&ctx, &path, &file_name),
        Commands::Catalogs => commands::catalogs::execute(&ctx),
    }
}

/// Config file when given, with environment variables layered on top
fn load_config(path: Option<&PathBuf>) -> Result<StorageConfig> {
    let mut config = match path {
        Some(path) => {
            debug!("Loading config from {:?}", path);
            StorageConfig::from_file(path)
                .with_context(|| format!("Failed to load config file: {:?}", path))?
        }
        None => StorageConfig::default(),
    };
    config.apply_env();
    Ok(config)
}
