//! Strata Storage
//!
//! Catalog-aware facade over S3-compatible object storage: resolves
//! catalog paths to object keys, then uploads, lists, deletes and presigns
//! through an [`ObjectStore`].
//!
//! ```no_run
//! use strata_core::{BucketFile, StorageConfig, StoragePath};
//! use strata_storage::StorageManager;
//!
//! # async fn example() -> strata_core::Result<()> {
//! let config = StorageConfig::from_file("strata.toml")?;
//! let manager = StorageManager::connect(config, false)?;
//! manager.add_catalog("product", "products/%d/");
//!
//! let data = tokio::fs::File::open("cert.pdf").await?;
//! let mut file = BucketFile::new("cert.pdf", data);
//! let url = manager.put_file(&StoragePath::entity("product", 42), &mut file).await?;
//! println!("{}", url);
//! # Ok(())
//! # }
//! ```

mod manager;
pub mod memory;
mod s3;
mod store;

pub use manager::StorageManager;
pub use memory::{MemoryObjectStore, StoreCall, StoredObject};
pub use s3::S3ObjectStore;
pub use store::{ObjectAcl, ObjectStore};
