//! Google Cloud Storage implementation of the store capability.

use anyhow::{Context, Result};
use google_cloud_storage::client::{Client, ClientConfig};
use google_cloud_storage::http::objects::download::Range;
use google_cloud_storage::http::objects::get::GetObjectRequest;
use google_cloud_storage::http::objects::upload::{Media, UploadObjectRequest, UploadType};
use tracing::info;

use crate::store::ObjectStore;

pub struct GcsStore {
    client: Client,
}

impl GcsStore {
    /// Build a client from application-default credentials.
    pub async fn new() -> Result<Self> {
        let config = ClientConfig::default()
            .with_auth()
            .await
            .context("initializing GCS client config")?;
        Ok(Self {
            client: Client::new(config),
        })
    }
}

impl ObjectStore for GcsStore {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let request = GetObjectRequest {
            bucket: bucket.to_string(),
            object: key.to_string(),
            ..Default::default()
        };

        let bytes = self
            .client
            .download_object(&request, &Range::default())
            .await
            .with_context(|| format!("downloading gs://{}/{}", bucket, key))?;

        Ok(bytes)
    }

    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()> {
        let upload_type = UploadType::Simple(Media::new(key.to_string()));
        let request = UploadObjectRequest {
            bucket: bucket.to_string(),
            ..Default::default()
        };

        self.client
            .upload_object(&request, body, &upload_type)
            .await
            .with_context(|| format!("uploading gs://{}/{}", bucket, key))?;

        info!("uploaded gs://{}/{}", bucket, key);
        Ok(())
    }
}
