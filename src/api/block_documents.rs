//! Block document queries: filtered list and filtered count.
//!
//! The list and count share one filter body so a page showing "N documents"
//! next to the list always describes the same selection.

use std::sync::Arc;

use futures::FutureExt;

use super::BlocksApi;
use super::types::{BlockDocument, BlockDocumentFilterBody};
use crate::query::{QueryDescriptor, QueryKey};

#[cfg(test)]
#[path = "block_documents_test.rs"]
mod tests;

/// Query keys for block documents.
///
/// ```text
/// all         => ["block-documents"]
/// lists       => ["block-documents", "list"]
/// listFilter  => ["block-documents", "list", "filter", <filter>]
/// counts      => ["block-documents", "count"]
/// countFilter => ["block-documents", "count", "filter", <filter>]
/// ```
pub mod keys {
    use super::{BlockDocumentFilterBody, QueryKey};

    #[must_use]
    pub fn all() -> QueryKey {
        QueryKey::new().segment("block-documents")
    }

    #[must_use]
    pub fn lists() -> QueryKey {
        all().segment("list")
    }

    #[must_use]
    pub fn list_filter(filter: &BlockDocumentFilterBody) -> QueryKey {
        lists().segment("filter").json_segment(filter)
    }

    #[must_use]
    pub fn counts() -> QueryKey {
        all().segment("count")
    }

    #[must_use]
    pub fn count_filter(filter: &BlockDocumentFilterBody) -> QueryKey {
        counts().segment("filter").json_segment(filter)
    }
}

/// Default document selection: first page, sorted by name, secrets hidden.
#[must_use]
pub fn default_filter() -> BlockDocumentFilterBody {
    BlockDocumentFilterBody::default()
}

/// Descriptor for the block document list under [`default_filter`].
pub fn build_list_filter_block_documents_query(api: &Arc<dyn BlocksApi>) -> QueryDescriptor<Vec<BlockDocument>> {
    build_list_filter_block_documents_query_with(api, default_filter())
}

pub fn build_list_filter_block_documents_query_with(
    api: &Arc<dyn BlocksApi>,
    filter: BlockDocumentFilterBody,
) -> QueryDescriptor<Vec<BlockDocument>> {
    let api = Arc::clone(api);
    let key = keys::list_filter(&filter);
    QueryDescriptor::new(key, move || {
        let api = Arc::clone(&api);
        let filter = filter.clone();
        async move { api.filter_block_documents(&filter).await }.boxed()
    })
}

/// Descriptor for the block document count under [`default_filter`].
pub fn build_count_filter_block_documents_query(api: &Arc<dyn BlocksApi>) -> QueryDescriptor<u64> {
    build_count_filter_block_documents_query_with(api, default_filter())
}

pub fn build_count_filter_block_documents_query_with(
    api: &Arc<dyn BlocksApi>,
    filter: BlockDocumentFilterBody,
) -> QueryDescriptor<u64> {
    let api = Arc::clone(api);
    let key = keys::count_filter(&filter);
    QueryDescriptor::new(key, move || {
        let api = Arc::clone(&api);
        let filter = filter.clone();
        async move { api.count_block_documents(&filter).await }.boxed()
    })
}
