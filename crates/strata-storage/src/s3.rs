//! aws-sdk-s3 backed object store

use crate::store::{ObjectAcl, ObjectStore};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectCannedAcl, ObjectIdentifier};
use aws_sdk_s3::Client;
use bytes::Bytes;
use std::time::Duration;
use strata_core::{Error, Result, StorageConfig};
use tracing::{debug, warn};

/// Maximum number of keys in one DeleteObjects request
const DELETE_BATCH_SIZE: usize = 1000;

pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from static credentials.
    ///
    /// Retries are disabled so a failed request surfaces on the first attempt.
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        config.validate()?;

        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "strata",
        );

        let mut builder = S3ConfigBuilder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(&config.endpoint)
            .force_path_style(config.path_style)
            .retry_config(RetryConfig::disabled());

        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(timeout)
                    .build(),
            );
        }

        Ok(Self::new(Client::from_conf(builder.build())))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

fn sdk_error<E>(operation: &str, err: E) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    let message = DisplayErrorContext(&err).to_string();
    Error::client_with_message(operation, message, err)
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        debug!("ListObjectsV2 s3://{}/{}", bucket, prefix);

        let resp = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .send()
            .await
            .map_err(|e| sdk_error("ListObjectsV2", e))?;

        if resp.is_truncated().unwrap_or(false) {
            warn!(
                "Listing of s3://{}/{} is truncated, only the first page is returned",
                bucket, prefix
            );
        }

        Ok(resp
            .contents()
            .iter()
            .filter_map(|obj| obj.key().map(str::to_string))
            .collect())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
        acl: ObjectAcl,
    ) -> Result<()> {
        debug!("PutObject s3://{}/{} ({} bytes)", bucket, key, body.len());

        let acl = match acl {
            ObjectAcl::Private => ObjectCannedAcl::Private,
            ObjectAcl::PublicRead => ObjectCannedAcl::PublicRead,
        };

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .acl(acl)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| sdk_error("PutObject", e))?;

        Ok(())
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<()> {
        for chunk in keys.chunks(DELETE_BATCH_SIZE) {
            debug!("DeleteObjects s3://{} ({} keys)", bucket, chunk.len());

            let objects = chunk
                .iter()
                .map(|key| {
                    ObjectIdentifier::builder()
                        .key(key)
                        .build()
                        .map_err(|e| sdk_error("DeleteObjects", e))
                })
                .collect::<Result<Vec<_>>>()?;

            let delete = Delete::builder()
                .set_objects(Some(objects))
                .quiet(true)
                .build()
                .map_err(|e| sdk_error("DeleteObjects", e))?;

            let resp = self
                .client
                .delete_objects()
                .bucket(bucket)
                .delete(delete)
                .send()
                .await
                .map_err(|e| sdk_error("DeleteObjects", e))?;

            let errors = resp.errors();
            if !errors.is_empty() {
                for err in errors {
                    warn!(
                        "Failed to delete s3://{}/{}: {}",
                        bucket,
                        err.key().unwrap_or(""),
                        err.message().unwrap_or("")
                    );
                }
                return Err(Error::client(
                    "DeleteObjects",
                    format!("{} of {} object(s) not deleted", errors.len(), chunk.len()),
                ));
            }
        }

        Ok(())
    }

    async fn presign_put(&self, bucket: &str, key: &str, expires_in: Duration) -> Result<String> {
        debug!(
            "PresignPutObject s3://{}/{} ({} seconds)",
            bucket,
            key,
            expires_in.as_secs()
        );

        let presign_config =
            PresigningConfig::expires_in(expires_in).map_err(|e| sdk_error("PresignPutObject", e))?;

        let req = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .presigned(presign_config)
            .await
            .map_err(|e| sdk_error("PresignPutObject", e))?;

        Ok(req.uri().to_string())
    }
}
