//! Strata Core Library
//!
//! Catalog types, path resolution, configuration and errors shared by the
//! Strata storage facade and CLI.

pub mod config;
pub mod error;
pub mod links;
pub mod registry;
pub mod resolver;
pub mod types;

pub use config::StorageConfig;
pub use error::{Error, Result};
pub use registry::CatalogRegistry;
pub use resolver::{resolve, resolve_catalog_path, CatalogResolution};
pub use types::{BucketFile, BucketFilesData, CatalogType, PathPattern, PathSelector, StoragePath};

/// Strata version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default S3 region
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default lifetime of a presigned upload URL (15 minutes)
pub const DEFAULT_PRESIGN_EXPIRE_SECS: u64 = 15 * 60;

/// Segment appended to the root catalog when running against a non-production deployment
pub const TEST_ROOT_SEGMENT: &str = "test/";
