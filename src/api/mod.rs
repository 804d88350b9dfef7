//! Block API: remote data behind the blocks page.
//!
//! SYSTEM CONTEXT
//! ==============
//! `types` defines the wire schema, `http` talks to the server, and
//! `block_types` / `block_documents` build the query descriptors (key +
//! fetch) that route loaders hand to the query cache.

pub mod block_documents;
pub mod block_types;
pub mod http;
pub mod types;

#[cfg(test)]
pub mod test_helpers;

pub use http::HttpBlocksApi;
pub use types::{
    ApiError, BlockDocument, BlockDocumentFilter, BlockDocumentFilterBody, BlockDocumentSort, BlockType,
    BlockTypeFilter, BlockTypeFilterBody,
};

/// Remote operations the blocks queries depend on.
///
/// Implemented over HTTP by [`HttpBlocksApi`]; tests substitute in-memory
/// implementations.
#[async_trait::async_trait]
pub trait BlocksApi: Send + Sync {
    /// `POST /block_types/filter`
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-success status, or an
    /// undecodable body.
    async fn filter_block_types(&self, filter: &BlockTypeFilterBody) -> Result<Vec<BlockType>, ApiError>;

    /// `POST /block_documents/filter`
    ///
    /// # Errors
    ///
    /// Same as [`BlocksApi::filter_block_types`].
    async fn filter_block_documents(&self, filter: &BlockDocumentFilterBody) -> Result<Vec<BlockDocument>, ApiError>;

    /// `POST /block_documents/count`
    ///
    /// # Errors
    ///
    /// Same as [`BlocksApi::filter_block_types`].
    async fn count_block_documents(&self, filter: &BlockDocumentFilterBody) -> Result<u64, ApiError>;
}
