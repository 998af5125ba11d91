//! Object storage for listing photos

mod types;

use async_trait::async_trait;
use reqwest::Client;

use crate::auth::TokenProvider;
use crate::config::{ClientOptions, FirebaseConfig};
use crate::error::Error;
use crate::fetch::Fetch;
use crate::gateway::ObjectStorage;

pub use types::*;

/// Client for Cloud Storage for Firebase
pub struct StorageClient {
    /// The default bucket
    bucket: String,

    /// HTTP client used for requests
    client: Client,

    /// Source of the bearer token
    tokens: TokenProvider,

    /// Client options
    options: ClientOptions,
}

impl StorageClient {
    /// Create a new StorageClient
    pub(crate) fn new(
        config: &FirebaseConfig,
        client: Client,
        tokens: TokenProvider,
        options: ClientOptions,
    ) -> Self {
        Self {
            bucket: config.storage_bucket.clone(),
            client,
            tokens,
            options,
        }
    }

    /// Get the base URL for the bucket's objects
    fn objects_url(&self) -> String {
        format!("{}/v0/b/{}/o", self.options.storage_url, self.bucket)
    }

    fn object_url(&self, reference: &StorageRef) -> String {
        format!("{}/{}", self.objects_url(), reference.encoded_path())
    }

    /// Upload raw bytes to `path`
    pub async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<ObjectMetadata, Error> {
        let reference = StorageRef::new(path);
        let token = self.tokens.bearer().await?;

        Fetch::post(&self.client, &self.objects_url())
            .query("uploadType", "media")
            .query("name", reference.full_path())
            .maybe_bearer_auth(token.as_deref())
            .timeout(self.options.request_timeout)
            .body(bytes, content_type)
            .execute::<ObjectMetadata>()
            .await
            .map_err(storage_error)
    }

    /// Read an object's metadata
    pub async fn metadata(&self, reference: &StorageRef) -> Result<ObjectMetadata, Error> {
        let token = self.tokens.bearer().await?;

        Fetch::get(&self.client, &self.object_url(reference))
            .maybe_bearer_auth(token.as_deref())
            .timeout(self.options.request_timeout)
            .execute::<ObjectMetadata>()
            .await
            .map_err(storage_error)
    }

    /// Tokenized download URL of an object
    pub async fn download_url(&self, reference: &StorageRef) -> Result<String, Error> {
        let metadata = self.metadata(reference).await?;
        let token = metadata.first_download_token().ok_or_else(|| {
            Error::storage(format!("no download token for {}", reference.full_path()))
        })?;

        Ok(format!(
            "{}?alt=media&token={}",
            self.object_url(reference),
            token
        ))
    }

    /// Delete an object
    pub async fn delete(&self, reference: &StorageRef) -> Result<(), Error> {
        let token = self.tokens.bearer().await?;

        Fetch::delete(&self.client, &self.object_url(reference))
            .maybe_bearer_auth(token.as_deref())
            .timeout(self.options.request_timeout)
            .execute_empty()
            .await
            .map_err(storage_error)
    }
}

fn storage_error(err: Error) -> Error {
    match err {
        Error::Api { status, message } => Error::storage(format!("{} ({})", message, status)),
        other => other,
    }
}

#[async_trait]
impl ObjectStorage for StorageClient {
    async fn upload_bytes(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StorageRef, Error> {
        let metadata = self.upload(path, bytes, content_type).await?;
        Ok(StorageRef::new(&metadata.name))
    }

    async fn get_download_url(&self, reference: &StorageRef) -> Result<String, Error> {
        self.download_url(reference).await
    }

    async fn delete_object(&self, reference: &StorageRef) -> Result<(), Error> {
        self.delete(reference).await
    }
}
