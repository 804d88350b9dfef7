//! `/blocks`: block documents overview.
//!
//! The loader makes sure the three datasets the page reads are in the query
//! cache before the page mounts: every block type, the block documents under
//! the default filter, and their count. The three requests run concurrently
//! and the loader fails on the first error.

use std::sync::Arc;

use crate::api::block_documents::{build_count_filter_block_documents_query, build_list_filter_block_documents_query};
use crate::api::block_types::build_list_filter_block_types_query;
use crate::api::{BlockDocument, BlockType, BlocksApi};
use crate::pages::blocks::{BlocksPage, PENDING_TEXT};
use crate::query::{QueryClient, QueryError};
use crate::router::{RouteDefinition, RouterContext, View};

#[cfg(test)]
#[path = "blocks_test.rs"]
mod tests;

pub const PATH: &str = "/blocks";

/// Loader result, in request order: types, documents, count.
pub type BlocksLoaderData = (Vec<BlockType>, Vec<BlockDocument>, u64);

/// Ensure the blocks page's data is cached.
///
/// # Errors
///
/// Returns the first [`QueryError`] produced by any of the three queries.
pub async fn load_blocks(client: &QueryClient, api: &Arc<dyn BlocksApi>) -> Result<BlocksLoaderData, QueryError> {
    let types = build_list_filter_block_types_query(api);
    let documents = build_list_filter_block_documents_query(api);
    let count = build_count_filter_block_documents_query(api);

    futures::try_join!(
        client.ensure_query_data(&types),
        client.ensure_query_data(&documents),
        client.ensure_query_data(&count)
    )
}

pub fn route(api: &Arc<dyn BlocksApi>) -> RouteDefinition {
    let api = Arc::clone(api);
    RouteDefinition::new(PATH, BlocksPage::render)
        .loader(move |ctx: RouterContext| {
            let api = Arc::clone(&api);
            async move { load_blocks(&ctx.query_client, &api).await }
        })
        .pending_view(|_: &RouterContext| View::Fallback(PENDING_TEXT.to_owned()))
        .wrap_in_suspense(true)
}
