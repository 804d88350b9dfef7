//! Block API types: wire schema for block types, block documents, filters,
//! and the API error.
//!
//! Field names follow the Prefect REST schema so request bodies serialize
//! as-is and responses decode without renaming. Unknown response fields are
//! ignored.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ErrorCode;

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by block API calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, transport).
    #[error("API request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("API response error: status {status}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected schema.
    #[error("API response parse failed: {0}")]
    Decode(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_API_REQUEST",
            Self::Status { .. } => "E_API_RESPONSE",
            Self::Decode(_) => "E_API_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// RESOURCES
// =============================================================================

/// A registered block type (e.g. "AWS Credentials", "Slack Webhook").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockType {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub documentation_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub code_example: Option<String>,
    #[serde(default)]
    pub is_protected: bool,
}

/// A saved block document: a configured instance of a block type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDocument {
    pub id: Uuid,
    /// Anonymous documents have no name.
    #[serde(default)]
    pub name: Option<String>,
    pub block_type_id: Uuid,
    #[serde(default)]
    pub block_type_name: Option<String>,
    #[serde(default)]
    pub block_type: Option<BlockType>,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
}

impl BlockDocument {
    /// Human label for the document's block type, preferring the embedded
    /// type over the denormalized name.
    #[must_use]
    pub fn type_label(&self) -> &str {
        self.block_type
            .as_ref()
            .map(|t| t.name.as_str())
            .or(self.block_type_name.as_deref())
            .unwrap_or("unknown")
    }
}

// =============================================================================
// FILTERS
// =============================================================================

/// `{ "any_": [...] }` match clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnyOf<T> {
    pub any_: Vec<T>,
}

/// `{ "eq_": value }` match clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EqualTo<T> {
    pub eq_: T,
}

/// `{ "like_": pattern }` substring clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub like_: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTypeFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Like>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<AnyOf<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDocumentFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_anonymous: Option<EqualTo<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_type_id: Option<AnyOf<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Like>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockDocumentSort {
    #[default]
    NameAsc,
    NameDesc,
    BlockTypeAndNameAsc,
}

/// Body for `POST /block_types/filter`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTypeFilterBody {
    pub offset: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_types: Option<BlockTypeFilter>,
}

/// Body for `POST /block_documents/filter` and `POST /block_documents/count`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDocumentFilterBody {
    pub offset: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    pub sort: BlockDocumentSort,
    pub include_secrets: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_documents: Option<BlockDocumentFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_types: Option<BlockTypeFilter>,
}
