//! In-process object store
//!
//! Keeps objects in a map and records every call, so facade behaviour can be
//! checked without a running S3 endpoint.

use crate::store::{ObjectAcl, ObjectStore};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use strata_core::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: String,
    pub acl: ObjectAcl,
}

/// A call received by [`MemoryObjectStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    List { bucket: String, prefix: String },
    Put { bucket: String, key: String },
    Delete { bucket: String, keys: Vec<String> },
    Presign { bucket: String, key: String, expires_in: Duration },
}

#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<BTreeMap<(String, String), StoredObject>>,
    calls: Mutex<Vec<StoreCall>>,
    failing: Mutex<HashSet<&'static str>>,
    page_size: Option<usize>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of keys a single listing returns, like a one-page S3 response
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Make every call of `operation` (`"PutObject"`, `"ListObjectsV2"`, ...) fail
    pub fn fail_operation(&self, operation: &'static str) {
        self.failing.lock().insert(operation);
    }

    pub fn clear_failures(&self) {
        self.failing.lock().clear();
    }

    /// Store an object directly, bypassing the call log
    pub fn insert(&self, bucket: &str, key: &str, body: impl Into<Bytes>) {
        self.objects.lock().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body: body.into(),
                content_type: "application/octet-stream".to_string(),
                acl: ObjectAcl::Private,
            },
        );
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.objects
            .lock()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, key)| key.clone())
            .collect()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn delete_calls(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, StoreCall::Delete { .. }))
            .count()
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().push(call);
    }

    fn check(&self, operation: &'static str) -> Result<()> {
        if self.failing.lock().contains(operation) {
            return Err(Error::client(operation, "injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        self.record(StoreCall::List {
            bucket: bucket.to_string(),
            prefix: prefix.to_string(),
        });
        self.check("ListObjectsV2")?;

        let keys = self
            .objects
            .lock()
            .keys()
            .filter(|(b, key)| b == bucket && key.starts_with(prefix))
            .map(|(_, key)| key.clone())
            .take(self.page_size.unwrap_or(usize::MAX))
            .collect();
        Ok(keys)
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
        acl: ObjectAcl,
    ) -> Result<()> {
        self.record(StoreCall::Put {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
        self.check("PutObject")?;

        self.objects.lock().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body,
                content_type: content_type.to_string(),
                acl,
            },
        );
        Ok(())
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<()> {
        self.record(StoreCall::Delete {
            bucket: bucket.to_string(),
            keys: keys.to_vec(),
        });
        self.check("DeleteObjects")?;

        let mut objects = self.objects.lock();
        for key in keys {
            objects.remove(&(bucket.to_string(), key.clone()));
        }
        Ok(())
    }

    async fn presign_put(&self, bucket: &str, key: &str, expires_in: Duration) -> Result<String> {
        self.record(StoreCall::Presign {
            bucket: bucket.to_string(),
            key: key.to_string(),
            expires_in,
        });
        self.check("PresignPutObject")?;

        Ok(format!(
            "memory://{}/{}?X-Amz-Expires={}",
            bucket,
            key.trim_start_matches('/'),
            expires_in.as_secs()
        ))
    }
}
