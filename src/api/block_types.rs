//! Block type queries.

use std::sync::Arc;

use futures::FutureExt;

use super::BlocksApi;
use super::types::{BlockType, BlockTypeFilterBody};
use crate::query::{QueryDescriptor, QueryKey};

#[cfg(test)]
#[path = "block_types_test.rs"]
mod tests;

/// Query keys for block types.
///
/// ```text
/// all        => ["block-types"]
/// lists      => ["block-types", "list"]
/// listFilter => ["block-types", "list", "filter", <filter>]
/// ```
pub mod keys {
    use super::{BlockTypeFilterBody, QueryKey};

    #[must_use]
    pub fn all() -> QueryKey {
        QueryKey::new().segment("block-types")
    }

    #[must_use]
    pub fn lists() -> QueryKey {
        all().segment("list")
    }

    #[must_use]
    pub fn list_filter(filter: &BlockTypeFilterBody) -> QueryKey {
        lists().segment("filter").json_segment(filter)
    }
}

/// Descriptor for the block type list under the default filter (`offset = 0`).
pub fn build_list_filter_block_types_query(api: &Arc<dyn BlocksApi>) -> QueryDescriptor<Vec<BlockType>> {
    build_list_filter_block_types_query_with(api, BlockTypeFilterBody::default())
}

pub fn build_list_filter_block_types_query_with(
    api: &Arc<dyn BlocksApi>,
    filter: BlockTypeFilterBody,
) -> QueryDescriptor<Vec<BlockType>> {
    let api = Arc::clone(api);
    let key = keys::list_filter(&filter);
    QueryDescriptor::new(key, move || {
        let api = Arc::clone(&api);
        let filter = filter.clone();
        async move { api.filter_block_types(&filter).await }.boxed()
    })
}
