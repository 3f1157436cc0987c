//! Network transport for translation requests

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::config::REQUEST_TIMEOUT;
use crate::core::request::{ChatCompletionResponse, WirePayload};
use crate::shared::error::{AppError, AppResult};

/// Capability boundary for issuing one chat-completion call.
///
/// The pipeline only sees this trait; tests substitute stubs with call
/// counters and scripted responses.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        endpoint: &Url,
        api_key: &str,
        payload: &WirePayload,
    ) -> AppResult<ChatCompletionResponse>;
}

/// reqwest-backed transport.
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> AppResult<Self> {
        let http = Client::builder()
            .user_agent("lingua-widget/translator")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Network(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        endpoint: &Url,
        api_key: &str,
        payload: &WirePayload,
    ) -> AppResult<ChatCompletionResponse> {
        let response = self
            .http
            .post(endpoint.clone())
            .bearer_auth(api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Api { status, body });
        }

        response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| AppError::Decode(e.to_string()))
    }
}
