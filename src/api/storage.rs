// src/api/storage.rs
//! Direct upload to the storage service's object API.

use super::client::AdminHttpClient;
use super::responses::ErrorBody;
use super::{ObjectStorage, ObjectUpload};
use crate::config::StorageConfig;
use crate::constants::{
    ERROR_BODY_PREVIEW_LENGTH, SERVICE_REQUEST_TIMEOUT, STORAGE_CACHE_CONTROL_SECS,
};
use crate::error::{truncate_message, AppError, ServiceErrorCode};
use crate::types::{ApiKey, ValidatedUrl};
use reqwest::{header, Client};

/// Client for `POST {storage_url}/object/{bucket}/{key}`.
#[derive(Clone)]
pub struct StorageHttpClient {
    client: Client,
    storage_url: ValidatedUrl,
    bucket: String,
    api_key: ApiKey,
}

impl StorageHttpClient {
    pub fn new(storage: &StorageConfig, api_key: &ApiKey) -> Result<Self, AppError> {
        let client = Client::builder().timeout(SERVICE_REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            storage_url: storage.url.clone(),
            bucket: storage.bucket.clone(),
            api_key: api_key.clone(),
        })
    }

    /// Where the object API accepts `key`.
    pub fn object_url(&self, key: &str) -> String {
        self.storage_url
            .join_path(&format!("object/{}/{}", self.bucket, key))
    }

    /// Where the stored object is publicly readable.
    pub fn public_url(&self, key: &str) -> String {
        public_object_url(&self.storage_url, &self.bucket, key)
    }
}

pub fn public_object_url(storage_url: &ValidatedUrl, bucket: &str, key: &str) -> String {
    storage_url.join_path(&format!("object/public/{}/{}", bucket, key))
}

#[async_trait::async_trait]
impl ObjectStorage for StorageHttpClient {
    async fn put_object(&self, object: &ObjectUpload) -> Result<String, AppError> {
        let url = self.object_url(&object.key);
        log::debug!("POST object {} ({} bytes)", url, object.bytes.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.as_str())
            .header(header::CONTENT_TYPE, &object.content_type)
            .header(
                header::CACHE_CONTROL,
                format!("max-age={}", STORAGE_CACHE_CONTROL_SECS),
            )
            .header("x-upsert", "false")
            .body(object.bytes.clone())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(self.public_url(&object.key));
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| truncate_message(text.trim(), ERROR_BODY_PREVIEW_LENGTH));
        Err(AppError::Storage {
            code: ServiceErrorCode::from_http_status(status.as_u16()),
            message,
        })
    }
}

/// Both upload paths from one config: direct storage when configured, and
/// the admin client for the fallback.
pub fn clients_from_config(
    config: &crate::config::AdminConfig,
) -> Result<(Option<StorageHttpClient>, AdminHttpClient), AppError> {
    let storage = config
        .storage
        .as_ref()
        .map(|s| StorageHttpClient::new(s, &config.api_key))
        .transpose()?;
    Ok((storage, AdminHttpClient::new(config)?))
}
