// src/api/fetcher.rs
//! Downloads images referenced by imported posts.

use super::{FetchedImage, ImageFetcher};
use crate::constants::{MAX_UPLOAD_BYTES, SERVICE_REQUEST_TIMEOUT};
use crate::error::{AppError, ServiceErrorCode};
use reqwest::{header, Client};

#[derive(Clone)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new() -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(SERVICE_REQUEST_TIMEOUT)
            .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch_image(&self, url: &str) -> Result<FetchedImage, AppError> {
        log::debug!("GET image {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Storage {
                code: ServiceErrorCode::from_http_status(status.as_u16()),
                message: format!("image host answered {} for {}", status, url),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());

        let bytes = response.bytes().await?;
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::ImageProcessing(format!(
                "{} is {} bytes, more than the {} byte upload limit",
                url,
                bytes.len(),
                MAX_UPLOAD_BYTES
            )));
        }

        Ok(FetchedImage {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}
