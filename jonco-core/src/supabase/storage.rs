use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::media_store::{MediaStore, StorageError};

/// Browser caching for stored media, in seconds.
const CACHE_MAX_AGE_SECS: u32 = 3600;

/// Object storage in a hosted bucket, through its REST API.
pub struct SupabaseStorage {
    client: Client,
    storage_url: String,
    key: String,
    bucket: String,
}

#[derive(Deserialize)]
struct SignedUploadResponse {
    url: String,
}

impl SupabaseStorage {
    pub fn new(client: Client, base_url: &str, key: &str, bucket: &str) -> Self {
        Self {
            client,
            storage_url: format!("{}/storage/v1", base_url.trim_end_matches('/')),
            key: key.to_string(),
            bucket: bucket.to_string(),
        }
    }

    /// Map a non-success response to a `StorageError` carrying status and body.
    async fn map_error(path: &str, resp: reqwest::Response) -> StorageError {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        StorageError::Storage(format!("{path} ({status}): {body}"))
    }
}

#[async_trait]
impl MediaStore for SupabaseStorage {
    async fn put(&self, path: &str, data: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        let resp = self
            .client
            .post(format!("{}/object/{}/{path}", self.storage_url, self.bucket))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header("Content-Type", content_type)
            .header("cache-control", format!("max-age={CACHE_MAX_AGE_SECS}"))
            .header("x-upsert", "false")
            .body(data)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Self::map_error(path, resp).await);
        }
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/object/public/{}/{path}", self.storage_url, self.bucket)
    }

    async fn signed_upload_url(&self, path: &str) -> Result<String, StorageError> {
        let resp = self
            .client
            .post(format!(
                "{}/object/upload/sign/{}/{path}",
                self.storage_url, self.bucket
            ))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Self::map_error(path, resp).await);
        }

        let signed: SignedUploadResponse = resp.json().await?;
        // The API answers with a path relative to the storage root.
        Ok(format!("{}{}", self.storage_url, signed.url))
    }
}
