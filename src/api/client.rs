// src/api/client.rs
//! HTTP client for the admin functions.
//!
//! A thin wrapper around reqwest that carries the bearer key and the admin
//! token on every request and maps non-2xx answers to typed errors.

use super::responses::{created_record_id, news_list, ErrorBody, UploadResponse};
use super::{AdminApi, ObjectUpload, Suggestion, SuggestionKind, SuggestionRequest, UploadFallback};
use crate::config::AdminConfig;
use crate::constants::{ERROR_BODY_PREVIEW_LENGTH, SERVICE_REQUEST_TIMEOUT};
use crate::error::{truncate_message, AppError, ServiceErrorCode};
use crate::model::RecordKind;
use crate::types::{AdminToken, ApiKey, RecordId, ValidatedUrl};
use reqwest::{header, multipart, Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;

const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

/// Authenticated client for `.../functions/v1/admin`.
#[derive(Clone)]
pub struct AdminHttpClient {
    client: Client,
    base_url: ValidatedUrl,
}

impl AdminHttpClient {
    pub fn new(config: &AdminConfig) -> Result<Self, AppError> {
        Self::with_credentials(
            config.admin_url.clone(),
            &config.api_key,
            &config.admin_token,
        )
    }

    pub fn with_credentials(
        base_url: ValidatedUrl,
        api_key: &ApiKey,
        admin_token: &AdminToken,
    ) -> Result<Self, AppError> {
        let client = Client::builder()
            .default_headers(Self::create_headers(api_key, admin_token)?)
            .timeout(SERVICE_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, base_url })
    }

    /// Default headers for admin requests. The content type is set per
    /// request because uploads are multipart.
    fn create_headers(
        api_key: &ApiKey,
        admin_token: &AdminToken,
    ) -> Result<header::HeaderMap, AppError> {
        let mut headers = header::HeaderMap::new();

        let auth_header = format!("Bearer {}", api_key.as_str());
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&auth_header).map_err(|e| {
                AppError::MissingConfiguration(format!("Invalid API key format: {}", e))
            })?,
        );

        let mut token = header::HeaderValue::from_str(admin_token.as_str()).map_err(|e| {
            AppError::MissingConfiguration(format!("Invalid admin token format: {}", e))
        })?;
        token.set_sensitive(true);
        headers.insert(ADMIN_TOKEN_HEADER, token);

        Ok(headers)
    }

    pub fn base_url(&self) -> &ValidatedUrl {
        &self.base_url
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = self.base_url.join_path(endpoint);
        log::debug!("{} {}", method, url);
        self.client.request(method, url)
    }

    pub async fn get(&self, endpoint: &str) -> Result<Response, AppError> {
        send(endpoint, self.request(Method::GET, endpoint)).await
    }

    pub async fn post<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<Response, AppError> {
        send(endpoint, self.request(Method::POST, endpoint).json(body)).await
    }

    pub async fn put<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<Response, AppError> {
        send(endpoint, self.request(Method::PUT, endpoint).json(body)).await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<Response, AppError> {
        send(endpoint, self.request(Method::DELETE, endpoint)).await
    }

    pub async fn post_multipart(
        &self,
        endpoint: &str,
        form: multipart::Form,
    ) -> Result<Response, AppError> {
        send(endpoint, self.request(Method::POST, endpoint).multipart(form)).await
    }
}

/// Sends a request, mapping transport timeouts to [`AppError::Timeout`].
async fn send(endpoint: &str, request: RequestBuilder) -> Result<Response, AppError> {
    match request.send().await {
        Ok(response) => Ok(response),
        Err(e) if e.is_timeout() => Err(AppError::Timeout {
            endpoint: endpoint.to_string(),
            seconds: SERVICE_REQUEST_TIMEOUT.as_secs(),
        }),
        Err(e) => Err(e.into()),
    }
}

/// Reads the body of a successful response, or turns an error status into
/// [`AppError::AdminService`] carrying the server's `error`/`message`.
pub async fn extract_response_text(endpoint: &str, response: Response) -> Result<String, AppError> {
    let status = response.status();
    let text = response.text().await?;

    if status.is_success() {
        return Ok(text);
    }

    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| {
            if text.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                truncate_message(text.trim(), ERROR_BODY_PREVIEW_LENGTH)
            }
        });

    log::debug!("{} answered {}: {}", endpoint, status, message);
    Err(AppError::AdminService {
        code: ServiceErrorCode::from_http_status(status.as_u16()),
        message,
        endpoint: endpoint.to_string(),
    })
}

#[async_trait::async_trait]
impl UploadFallback for AdminHttpClient {
    async fn upload_via_admin(
        &self,
        object: &ObjectUpload,
        folder: &str,
    ) -> Result<String, AppError> {
        let part = multipart::Part::bytes(object.bytes.clone())
            .file_name(object.file_name.clone())
            .mime_str(&object.content_type)?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("folder", folder.to_string());

        let response = self.post_multipart("upload", form).await?;
        let body = extract_response_text("upload", response).await?;
        let uploaded: UploadResponse = serde_json::from_str(&body)?;
        if uploaded.url.trim().is_empty() {
            return Err(AppError::MalformedResponse(
                "upload response has an empty url".into(),
            ));
        }
        Ok(uploaded.url)
    }
}

#[async_trait::async_trait]
impl AdminApi for AdminHttpClient {
    async fn list_news(&self) -> Result<Vec<super::NewsRecord>, AppError> {
        let response = self.get("news").await?;
        let body = extract_response_text("news", response).await?;
        news_list(&body)
    }

    async fn create_record(
        &self,
        kind: RecordKind,
        payload: &Value,
    ) -> Result<RecordId, AppError> {
        let endpoint = kind.endpoint();
        let response = self.post(endpoint, payload).await?;
        let body = extract_response_text(endpoint, response).await?;
        let id = created_record_id(&body)?;
        log::info!("Created {} {}", kind, id);
        Ok(id)
    }

    async fn update_record(
        &self,
        kind: RecordKind,
        id: &RecordId,
        payload: &Value,
    ) -> Result<(), AppError> {
        let endpoint = format!("{}/{}", kind.endpoint(), id);
        let response = self.put(&endpoint, payload).await?;
        extract_response_text(&endpoint, response).await?;
        Ok(())
    }

    async fn delete_news(&self, id: &RecordId) -> Result<(), AppError> {
        let endpoint = format!("news/{}", id);
        let response = self.delete(&endpoint).await?;
        extract_response_text(&endpoint, response).await?;
        Ok(())
    }

    async fn suggest(
        &self,
        kind: SuggestionKind,
        request: &SuggestionRequest,
    ) -> Result<Suggestion, AppError> {
        let endpoint = kind.endpoint();
        let response = self.post(endpoint, request).await?;
        let body = extract_response_text(endpoint, response).await?;
        let value: Value = serde_json::from_str(&body)?;
        Suggestion::from_response(kind, &value)
    }
}
