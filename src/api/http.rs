//! HTTP implementation of [`BlocksApi`] on `reqwest`.
//!
//! Thin wrapper: each call POSTs a JSON filter body and decodes the JSON
//! response. Status and body are read before decoding so non-success
//! responses keep the server's error text.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::BlocksApi;
use super::types::{ApiError, BlockDocument, BlockDocumentFilterBody, BlockType, BlockTypeFilterBody};
use crate::config::ClientConfig;

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpBlocksApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBlocksApi {
    /// Build a client against `config.api_url` with the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.api_url.trim_end_matches('/').to_owned() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path);
        tracing::debug!(%url, "block api request");

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::Status { status: status.as_u16(), body: text });
        }

        parse_body(&text)
    }
}

#[async_trait::async_trait]
impl BlocksApi for HttpBlocksApi {
    async fn filter_block_types(&self, filter: &BlockTypeFilterBody) -> Result<Vec<BlockType>, ApiError> {
        self.post_json("block_types/filter", filter).await
    }

    async fn filter_block_documents(&self, filter: &BlockDocumentFilterBody) -> Result<Vec<BlockDocument>, ApiError> {
        self.post_json("block_documents/filter", filter).await
    }

    async fn count_block_documents(&self, filter: &BlockDocumentFilterBody) -> Result<u64, ApiError> {
        self.post_json("block_documents/count", filter).await
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_body<R: DeserializeOwned>(text: &str) -> Result<R, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}
