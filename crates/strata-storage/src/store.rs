//! Object store client interface
//!
//! The facade only composes keys; every network call goes through this trait.

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use strata_core::Result;

/// Canned access control applied to uploaded objects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectAcl {
    Private,
    PublicRead,
}

/// Operations the storage facade needs from an S3-compatible client.
///
/// Failures are reported as [`strata_core::Error::Client`] named after the
/// client call (`ListObjectsV2`, `PutObject`, `DeleteObjects`, `PresignPutObject`).
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Keys under `prefix` from a single listing call. Implementations do not paginate.
    async fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>>;

    /// Upload `body` to `key`
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
        acl: ObjectAcl,
    ) -> Result<()>;

    /// Bulk delete in quiet mode: only failures are reported back
    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<()>;

    /// Presigned URL for a later PUT of `key`
    async fn presign_put(&self, bucket: &str, key: &str, expires_in: Duration) -> Result<String>;
}
