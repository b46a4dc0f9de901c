//! Configuration for Strata
//!
//! Example `strata.toml`:
//! ```toml
//! endpoint = "https://s3.example.com"
//! region = "us-east-1"
//! access_key = "AKIA..."
//! secret_key = "..."
//! bucket = "mybucket"
//! root_catalog = "/examplesiteservice/"
//! cdn = "https://cdn.example.com"
//! presigned_url_expire_secs = 900
//!
//! [catalogs]
//! user = "users/%d/"
//! product_certificate = "products/%d/certificates/"
//! ```

use crate::error::{Error, Result};
use crate::{DEFAULT_PRESIGN_EXPIRE_SECS, DEFAULT_REGION, TEST_ROOT_SEGMENT};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::warn;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// S3 endpoint URL
    pub endpoint: String,

    pub region: String,

    pub access_key: String,

    pub secret_key: String,

    /// Bucket name
    #[serde(alias = "name")]
    pub bucket: String,

    /// Service directory inside the bucket, e.g. `/examplesiteservice/`. Empty means bucket root.
    pub root_catalog: String,

    /// CDN base URL. Replaces `{endpoint}/{bucket}` in object URLs when set.
    pub cdn: Option<String>,

    /// Default lifetime of presigned upload URLs
    pub presigned_url_expire_secs: u64,

    /// Path style access (use path instead of virtual hosted style)
    pub path_style: bool,

    /// Upper bound on a single client operation, including the transfer
    pub request_timeout_secs: Option<u64>,

    /// Catalog types registered at startup, catalog -> path pattern
    pub catalogs: BTreeMap<String, String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            region: DEFAULT_REGION.to_string(),
            access_key: String::new(),
            secret_key: String::new(),
            bucket: String::new(),
            root_catalog: String::new(),
            cdn: None,
            presigned_url_expire_secs: DEFAULT_PRESIGN_EXPIRE_SECS,
            path_style: true,
            request_timeout_secs: None,
            catalogs: BTreeMap::new(),
        }
    }
}

impl StorageConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidConfig(format!("Failed to read config {:?}: {}", path, e))
        })?;

        toml::from_str(&content)
            .map_err(|e| Error::InvalidConfig(format!("Failed to parse config: {}", e)))
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields from `STRATA_*` variables, falling back to the AWS names
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    pub fn apply_env_with(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = first_var(&var, &["STRATA_ENDPOINT", "AWS_ENDPOINT_URL"]) {
            self.endpoint = endpoint;
        }
        if let Some(region) = first_var(&var, &["STRATA_REGION", "AWS_REGION"]) {
            self.region = region;
        }
        if let Some(key) = first_var(&var, &["STRATA_ACCESS_KEY", "AWS_ACCESS_KEY_ID"]) {
            self.access_key = key;
        }
        if let Some(secret) = first_var(&var, &["STRATA_SECRET_KEY", "AWS_SECRET_ACCESS_KEY"]) {
            self.secret_key = secret;
        }
        if let Some(bucket) = var("STRATA_BUCKET") {
            self.bucket = bucket;
        }
        if let Some(root) = var("STRATA_ROOT_CATALOG") {
            self.root_catalog = root;
        }
        if let Some(cdn) = var("STRATA_CDN") {
            self.cdn = Some(cdn);
        }
        if let Some(secs) = var("STRATA_PRESIGN_EXPIRE_SECS") {
            match secs.parse() {
                Ok(secs) => self.presigned_url_expire_secs = secs,
                Err(_) => warn!("Ignoring invalid STRATA_PRESIGN_EXPIRE_SECS: {}", secs),
            }
        }
        if let Some(secs) = var("STRATA_REQUEST_TIMEOUT_SECS") {
            match secs.parse() {
                Ok(secs) => self.request_timeout_secs = Some(secs),
                Err(_) => warn!("Ignoring invalid STRATA_REQUEST_TIMEOUT_SECS: {}", secs),
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(Error::InvalidConfig(
                "Endpoint not configured. Set STRATA_ENDPOINT or `endpoint`".into(),
            ));
        }
        Url::parse(&self.endpoint)
            .map_err(|e| Error::InvalidConfig(format!("Invalid endpoint '{}': {}", self.endpoint, e)))?;

        if self.bucket.is_empty() {
            return Err(Error::InvalidConfig(
                "Bucket not configured. Set STRATA_BUCKET or `bucket`".into(),
            ));
        }
        if self.access_key.is_empty() || self.secret_key.is_empty() {
            return Err(Error::InvalidConfig(
                "Credentials not configured. Set STRATA_ACCESS_KEY and STRATA_SECRET_KEY".into(),
            ));
        }
        if let Some(cdn) = self.cdn() {
            Url::parse(cdn)
                .map_err(|e| Error::InvalidConfig(format!("Invalid CDN URL '{}': {}", cdn, e)))?;
        }

        Ok(())
    }

    /// Finalise the root catalog for the deployment: a non-empty root gets a
    /// trailing `/`, and test mode appends a single `test/` segment.
    pub fn for_deployment(mut self, test_mode: bool) -> Self {
        if !self.root_catalog.is_empty() && !self.root_catalog.ends_with('/') {
            self.root_catalog.push('/');
        }
        if test_mode {
            self.root_catalog.push_str(TEST_ROOT_SEGMENT);
        }
        self
    }

    /// CDN base URL, treating an empty string as unset
    pub fn cdn(&self) -> Option<&str> {
        self.cdn.as_deref().filter(|cdn| !cdn.is_empty())
    }

    pub fn presigned_url_expire(&self) -> Duration {
        Duration::from_secs(self.presigned_url_expire_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Value of the first variable in `names` that is set
fn first_var(var: &impl Fn(&str) -> Option<String>, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| var(name))
}
