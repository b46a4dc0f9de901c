//! Storage facade
//!
//! Composes `{root catalog}{catalog path}{file name}` object keys and forwards
//! them to an [`ObjectStore`]. Every call that touches the network is an
//! async fn; dropping the future (or wrapping it in `tokio::time::timeout`)
//! cancels the request. Nothing is retried here.

use crate::s3::S3ObjectStore;
use crate::store::{ObjectAcl, ObjectStore};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use strata_core::links::{object_url, raw_object_url};
use strata_core::resolver::{self, CatalogResolution};
use strata_core::{
    BucketFile, BucketFilesData, CatalogRegistry, CatalogType, Error, PathPattern, Result,
    StorageConfig, StoragePath,
};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info};

#[derive(Clone)]
pub struct StorageManager {
    store: Arc<dyn ObjectStore>,
    config: StorageConfig,
    registry: Arc<CatalogRegistry>,
}

impl StorageManager {
    /// Connect to the configured S3 endpoint.
    ///
    /// In test mode a `test/` segment is appended to the root catalog so
    /// non-production keys never mix with production ones.
    pub fn connect(config: StorageConfig, test_mode: bool) -> Result<Self> {
        let store = S3ObjectStore::from_config(&config)?;
        Ok(Self::new(config, test_mode, Arc::new(store)))
    }

    /// Facade over an existing store with a fresh registry
    pub fn new(config: StorageConfig, test_mode: bool, store: Arc<dyn ObjectStore>) -> Self {
        Self::with_registry(config, test_mode, store, Arc::new(CatalogRegistry::new()))
    }

    /// Facade sharing `registry`. Catalogs listed in the configuration are registered into it.
    pub fn with_registry(
        config: StorageConfig,
        test_mode: bool,
        store: Arc<dyn ObjectStore>,
        registry: Arc<CatalogRegistry>,
    ) -> Self {
        let config = config.for_deployment(test_mode);
        for (catalog, pattern) in &config.catalogs {
            registry.register(catalog.as_str(), pattern.as_str());
        }

        info!(
            "Storage facade ready: bucket '{}', root catalog '{}'{}",
            config.bucket,
            config.root_catalog,
            if test_mode { " (test mode)" } else { "" }
        );

        Self {
            store,
            config,
            registry,
        }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<CatalogRegistry> {
        &self.registry
    }

    /// Register a catalog type, overwriting any previous pattern
    pub fn add_catalog(&self, catalog_type: impl Into<CatalogType>, pattern: impl Into<PathPattern>) {
        self.registry.register(catalog_type, pattern);
    }

    /// Directory of `path` with the configured root; `""` for an unregistered catalog
    pub fn get_catalog_pattern(&self, path: &StoragePath) -> Result<String> {
        resolver::resolve_catalog_path(&self.registry, &self.rooted(path))
    }

    /// Full object key of `file_name` under `path`
    pub fn object_key(&self, path: &StoragePath, file_name: &str) -> Result<String> {
        let (prefix, _) = self.object_prefix(path)?;
        Ok(format!("{}{}", prefix, file_name))
    }

    /// URLs of every object under `prefix`, in `{endpoint}/{bucket}/{key}` form.
    ///
    /// The CDN host is not applied here, unlike [`StorageManager::get_object_url`].
    /// Only the first listing page is returned.
    pub async fn list_objects(&self, prefix: &str) -> Result<Vec<String>> {
        let keys = self
            .store
            .list_keys(&self.config.bucket, prefix)
            .await
            .map_err(|e| e.in_operation("list_objects"))?;

        Ok(keys
            .iter()
            .map(|key| raw_object_url(&self.config.endpoint, &self.config.bucket, key))
            .collect())
    }

    /// Upload a file under `path` with public-read access and return its URL.
    ///
    /// The stream is read to the end once the key resolves; an empty name or
    /// an empty stream is rejected before anything is sent. The content type
    /// is guessed from the file extension.
    pub async fn put_file<R>(&self, path: &StoragePath, file: &mut BucketFile<R>) -> Result<String>
    where
        R: AsyncRead + Unpin + Send,
    {
        if file.name.is_empty() {
            return Err(Error::InvalidInput("file name is empty".into()));
        }

        // Resolve first so a bad path leaves the caller's stream unread
        let key = self.object_key(path, &file.name)?;

        let mut body = Vec::new();
        file.reader.read_to_end(&mut body).await?;
        if body.is_empty() {
            return Err(Error::InvalidInput(format!(
                "file stream for '{}' is empty",
                file.name
            )));
        }

        let size = body.len();
        let content_type = mime_guess::from_path(&file.name).first_or_octet_stream();
        self.store
            .put_object(
                &self.config.bucket,
                &key,
                Bytes::from(body),
                content_type.as_ref(),
                ObjectAcl::PublicRead,
            )
            .await
            .map_err(|e| e.in_operation("put_file"))?;

        info!("Uploaded {} ({} bytes)", key, size);
        self.get_object_url(path, &file.name)
    }

    /// Upload every file of `data` under its shared path, stopping at the first failure
    pub async fn put_files<R>(&self, data: &mut BucketFilesData<R>) -> Result<Vec<String>>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut urls = Vec::with_capacity(data.files.len());
        for file in data.files.iter_mut() {
            urls.push(self.put_file(&data.path, file).await?);
        }
        Ok(urls)
    }

    /// Delete one file under `path`, or the whole directory when `file_name` is `None`.
    ///
    /// `Some("")` is rejected rather than read as a directory delete. The
    /// directory of the root catalog type is the configured root catalog;
    /// directory deletion is refused for other unregistered catalogs, whose
    /// prefix would otherwise widen to the entire root catalog.
    pub async fn delete_files(&self, path: &StoragePath, file_name: Option<&str>) -> Result<()> {
        let (prefix, resolution) = self.object_prefix(path)?;

        match file_name {
            Some("") => {
                return Err(Error::InvalidInput("file name is empty".into()));
            }
            Some(name) => {
                self.delete_exact(&format!("{}{}", prefix, name)).await?;
            }
            None if resolution.is_unregistered() && !path.catalog_type.is_root() => {
                return Err(Error::InvalidInput(format!(
                    "refusing to delete the directory of unregistered catalog '{}'",
                    path.catalog_type
                )));
            }
            None => {
                self.delete_prefix(&prefix).await?;
            }
        }

        Ok(())
    }

    /// Delete the object stored at exactly `key`. Returns the number of objects removed.
    pub async fn delete_exact(&self, key: &str) -> Result<usize> {
        let listed = self
            .store
            .list_keys(&self.config.bucket, key)
            .await
            .map_err(|e| e.in_operation("delete_exact"))?;

        if !listed.iter().any(|k| k == key) {
            debug!("Nothing to delete at {}", key);
            return Ok(0);
        }

        self.store
            .delete_objects(&self.config.bucket, &[key.to_string()])
            .await
            .map_err(|e| e.in_operation("delete_exact"))?;

        info!("Deleted {}", key);
        Ok(1)
    }

    /// Delete every object listed under `prefix`. Returns the number of objects removed.
    pub async fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        if prefix.is_empty() {
            return Err(Error::InvalidInput(
                "refusing to delete with an empty prefix".into(),
            ));
        }

        let keys = self
            .store
            .list_keys(&self.config.bucket, prefix)
            .await
            .map_err(|e| e.in_operation("delete_prefix"))?;

        if keys.is_empty() {
            debug!("Nothing to delete under {}", prefix);
            return Ok(0);
        }

        self.store
            .delete_objects(&self.config.bucket, &keys)
            .await
            .map_err(|e| e.in_operation("delete_prefix"))?;

        info!("Deleted {} object(s) under {}", keys.len(), prefix);
        Ok(keys.len())
    }

    /// Presigned PUT URL for `file_name` under `path`.
    ///
    /// A zero `expire_time` selects the configured default lifetime.
    pub async fn get_upload_presigned_url(
        &self,
        path: &StoragePath,
        file_name: &str,
        expire_time: Duration,
    ) -> Result<String> {
        if file_name.is_empty() {
            return Err(Error::InvalidInput("file name is empty".into()));
        }

        let key = self.object_key(path, file_name)?;
        let expires_in = if expire_time.is_zero() {
            self.config.presigned_url_expire()
        } else {
            expire_time
        };

        self.store
            .presign_put(&self.config.bucket, &key, expires_in)
            .await
            .map_err(|e| e.in_operation("get_upload_presigned_url"))
    }

    /// Public URL of `file_name` under `path`: `{cdn}/{key}` when a CDN is
    /// configured, `{endpoint}/{bucket}/{key}` otherwise. No I/O.
    pub fn get_object_url(&self, path: &StoragePath, file_name: &str) -> Result<String> {
        if file_name.is_empty() {
            return Err(Error::InvalidInput("file name is empty".into()));
        }

        let key = self.object_key(path, file_name)?;
        Ok(object_url(
            &self.config.endpoint,
            &self.config.bucket,
            self.config.cdn(),
            &key,
        ))
    }

    /// The root catalog is always taken from configuration, never from the caller
    fn rooted(&self, path: &StoragePath) -> StoragePath {
        StoragePath {
            root_catalog: self.config.root_catalog.clone(),
            ..path.clone()
        }
    }

    fn object_prefix(&self, path: &StoragePath) -> Result<(String, CatalogResolution)> {
        let resolution = resolver::resolve(&self.registry, &self.rooted(path))?;
        let prefix = match &resolution {
            CatalogResolution::Resolved(prefix) => prefix.clone(),
            CatalogResolution::Unregistered => self.config.root_catalog.clone(),
        };
        Ok((prefix, resolution))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryObjectStore, StoreCall};
    use strata_core::PathSelector;

    fn config() -> StorageConfig {
        StorageConfig {
            endpoint: "https://s3.example.com".into(),
            access_key: "ak".into(),
            secret_key: "sk".into(),
            bucket: "mybucket".into(),
            root_catalog: "/svc/".into(),
            ..Default::default()
        }
    }

    fn manager() -> (StorageManager, Arc<MemoryObjectStore>) {
        let store = Arc::new(MemoryObjectStore::new());
        let manager = StorageManager::new(config(), false, store.clone());
        manager.add_catalog("product", "products/%d/");
        manager.add_catalog("product_certificate", "products/%d/certificates/");
        (manager, store)
    }

    #[test]
    fn test_caller_root_is_overwritten() {
        let (manager, _) = manager();
        let path = StoragePath::entity("product", 42).with_root_catalog("/elsewhere/");
        assert_eq!(
            manager.object_key(&path, "cert.pdf").unwrap(),
            "/svc/products/42/cert.pdf"
        );
        assert_eq!(manager.get_catalog_pattern(&path).unwrap(), "/svc/products/42/");
    }

    #[test]
    fn test_unregistered_catalog_falls_back_to_root() {
        let (manager, _) = manager();
        let path = StoragePath::entity("warehouse", 1);
        assert_eq!(manager.get_catalog_pattern(&path).unwrap(), "");
        assert_eq!(manager.object_key(&path, "a.txt").unwrap(), "/svc/a.txt");
    }

    #[test]
    fn test_custom_catalog_key() {
        let (manager, _) = manager();
        let path = StoragePath::custom("landing/banners/");
        assert_eq!(
            manager.object_key(&path, "hero.webp").unwrap(),
            "/svc/landing/banners/hero.webp"
        );
    }

    #[test]
    fn test_object_url_requires_file_name() {
        let (manager, store) = manager();
        let err = manager
            .get_object_url(&StoragePath::entity("product", 1), "")
            .unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_put_file_uploads_public_object() {
        let (manager, store) = manager();
        let path = StoragePath::entity("product_certificate", 9);
        let mut file = BucketFile::new("iso.pdf", &b"%PDF-1.7"[..]);

        let url = manager.put_file(&path, &mut file).await.unwrap();
        assert_eq!(
            url,
            "https://s3.example.com/mybucket/svc/products/9/certificates/iso.pdf"
        );

        let stored = store
            .get("mybucket", "/svc/products/9/certificates/iso.pdf")
            .unwrap();
        assert_eq!(&stored.body[..], b"%PDF-1.7");
        assert_eq!(stored.acl, ObjectAcl::PublicRead);
        assert_eq!(stored.content_type, "application/pdf");
    }

    #[tokio::test]
    async fn test_put_file_rejects_invalid_input_without_io() {
        let (manager, store) = manager();
        let path = StoragePath::entity("product", 1);

        let mut unnamed = BucketFile::new("", &b"data"[..]);
        let err = manager.put_file(&path, &mut unnamed).await.unwrap_err();
        assert!(err.is_invalid_input());

        let mut empty = BucketFile::new("empty.txt", &b""[..]);
        let err = manager.put_file(&path, &mut empty).await.unwrap_err();
        assert!(err.is_invalid_input());

        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_put_file_wraps_client_failure() {
        let (manager, store) = manager();
        store.fail_operation("PutObject");

        let mut file = BucketFile::new("a.txt", &b"a"[..]);
        let err = manager
            .put_file(&StoragePath::entity("product", 1), &mut file)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "ClientError");
        assert_eq!(err.to_string(), "put_file/PutObject: injected failure");
        assert_eq!(store.call_count(), 1);
    }

    #[tokio::test]
    async fn test_put_file_selector_mismatch_is_not_sent() {
        let (manager, store) = manager();
        let path = StoragePath {
            selector: PathSelector::Custom("x/".into()),
            ..StoragePath::entity("product", 1)
        };
        let mut file = BucketFile::new("a.txt", &b"a"[..]);
        let err = manager.put_file(&path, &mut file).await.unwrap_err();
        assert_eq!(err.code(), "SelectorMismatch");
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_put_files_shares_path() {
        let (manager, store) = manager();
        let mut data = BucketFilesData {
            path: StoragePath::custom("video/17/"),
            files: vec![
                BucketFile::new("master.m3u8", &b"#EXTM3U"[..]),
                BucketFile::new("seg0.ts", &b"\x47"[..]),
            ],
        };

        let urls = manager.put_files(&mut data).await.unwrap();
        assert_eq!(urls.len(), 2);
        assert_eq!(
            store.keys("mybucket"),
            vec!["/svc/video/17/master.m3u8", "/svc/video/17/seg0.ts"]
        );
    }

    #[tokio::test]
    async fn test_list_objects_uses_raw_urls_even_with_cdn() {
        let store = Arc::new(MemoryObjectStore::new());
        let mut config = config();
        config.cdn = Some("https://cdn.example.com".into());
        let manager = StorageManager::new(config, false, store.clone());

        store.insert("mybucket", "svc/a.txt", "a");
        store.insert("mybucket", "svc/b.txt", "b");
        store.insert("mybucket", "other/c.txt", "c");

        let urls = manager.list_objects("svc/").await.unwrap();
        assert_eq!(
            urls,
            vec![
                "https://s3.example.com/mybucket/svc/a.txt",
                "https://s3.example.com/mybucket/svc/b.txt",
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_exact_leaves_siblings() {
        let (manager, store) = manager();
        store.insert("mybucket", "/svc/products/1/a.pdf", "a");
        store.insert("mybucket", "/svc/products/1/a.pdf.bak", "b");

        manager
            .delete_files(&StoragePath::entity("product", 1), Some("a.pdf"))
            .await
            .unwrap();

        assert_eq!(store.keys("mybucket"), vec!["/svc/products/1/a.pdf.bak"]);
    }

    #[tokio::test]
    async fn test_delete_directory() {
        let (manager, store) = manager();
        store.insert("mybucket", "/svc/products/1/a.pdf", "a");
        store.insert("mybucket", "/svc/products/1/certificates/b.pdf", "b");
        store.insert("mybucket", "/svc/products/10/c.pdf", "c");

        manager
            .delete_files(&StoragePath::entity("product", 1), None)
            .await
            .unwrap();

        assert_eq!(store.keys("mybucket"), vec!["/svc/products/10/c.pdf"]);
        assert_eq!(store.delete_calls(), 1);
    }

    #[tokio::test]
    async fn test_delete_nothing_is_noop() {
        let (manager, store) = manager();

        manager
            .delete_files(&StoragePath::entity("product", 5), None)
            .await
            .unwrap();
        manager
            .delete_files(&StoragePath::entity("product", 5), Some("missing.pdf"))
            .await
            .unwrap();

        assert_eq!(store.delete_calls(), 0);
        assert_eq!(store.call_count(), 2);
    }

    #[tokio::test]
    async fn test_delete_directory_of_unregistered_catalog_refused() {
        let (manager, store) = manager();
        store.insert("mybucket", "/svc/a.txt", "a");

        let err = manager
            .delete_files(&StoragePath::entity("warehouse", 1), None)
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(store.call_count(), 0);

        let err = manager.delete_prefix("").await.unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[tokio::test]
    async fn test_delete_empty_file_name_is_rejected() {
        let (manager, store) = manager();
        store.insert("mybucket", "/svc/products/1/a.pdf", "a");
        store.insert("mybucket", "/svc/products/1/b.pdf", "b");

        let err = manager
            .delete_files(&StoragePath::entity("product", 1), Some(""))
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(
            store.keys("mybucket"),
            vec!["/svc/products/1/a.pdf", "/svc/products/1/b.pdf"]
        );
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_root_directory() {
        let (manager, store) = manager();
        store.insert("mybucket", "/svc/a.txt", "a");
        store.insert("mybucket", "/svc/products/1/b.pdf", "b");
        store.insert("mybucket", "/other/c.txt", "c");

        manager.delete_files(&StoragePath::root(), None).await.unwrap();

        assert_eq!(store.keys("mybucket"), vec!["/other/c.txt"]);
        assert_eq!(store.delete_calls(), 1);
    }

    #[tokio::test]
    async fn test_delete_root_directory_without_root_catalog_refused() {
        let store = Arc::new(MemoryObjectStore::new());
        let mut config = config();
        config.root_catalog.clear();
        let manager = StorageManager::new(config, false, store.clone());
        store.insert("mybucket", "a.txt", "a");

        let err = manager
            .delete_files(&StoragePath::root(), None)
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(store.keys("mybucket"), vec!["a.txt"]);
    }

    #[tokio::test]
    async fn test_put_file_resolve_error_leaves_stream_unread() {
        let (manager, store) = manager();
        manager.add_catalog("broken", "broken/");

        let mut file = BucketFile::new("a.txt", &b"payload"[..]);
        let err = manager
            .put_file(&StoragePath::entity("broken", 1), &mut file)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "MalformedPattern");
        assert_eq!(file.reader, &b"payload"[..]);
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_put_file_content_type_from_extension() {
        let (manager, store) = manager();
        let path = StoragePath::custom("media/");

        for (name, expected) in [
            ("hero.png", "image/png"),
            ("cert.pdf", "application/pdf"),
            ("notes", "application/octet-stream"),
        ] {
            let mut file = BucketFile::new(name, &b"x"[..]);
            manager.put_file(&path, &mut file).await.unwrap();
            let stored = store.get("mybucket", &format!("/svc/media/{}", name)).unwrap();
            assert_eq!(stored.content_type, expected, "{}", name);
        }
    }

    #[tokio::test]
    async fn test_presign_expiry() {
        let (manager, store) = manager();
        let path = StoragePath::entity("product", 42);

        manager
            .get_upload_presigned_url(&path, "cert.pdf", Duration::ZERO)
            .await
            .unwrap();
        let url = manager
            .get_upload_presigned_url(&path, "cert.pdf", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(url, "memory://mybucket/svc/products/42/cert.pdf?X-Amz-Expires=60");

        let expiries: Vec<_> = store
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::Presign { key, expires_in, .. } => Some((key, expires_in)),
                _ => None,
            })
            .collect();
        assert_eq!(
            expiries,
            vec![
                ("/svc/products/42/cert.pdf".to_string(), Duration::from_secs(900)),
                ("/svc/products/42/cert.pdf".to_string(), Duration::from_secs(60)),
            ]
        );
    }

    #[tokio::test]
    async fn test_presign_requires_file_name() {
        let (manager, store) = manager();
        let err = manager
            .get_upload_presigned_url(&StoragePath::entity("product", 1), "", Duration::ZERO)
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(store.call_count(), 0);
    }

    #[test]
    fn test_config_catalogs_registered() {
        let mut config = config();
        config
            .catalogs
            .insert("user".into(), "users/%d/".into());
        let manager = StorageManager::new(config, false, Arc::new(MemoryObjectStore::new()));

        assert_eq!(
            manager.object_key(&StoragePath::entity("user", 3), "avatar.png").unwrap(),
            "/svc/users/3/avatar.png"
        );
    }
}
