//! Blocks page: block documents with their types.
//!
//! Reads everything from the query cache. The `/blocks` loader has already
//! populated the three entries by the time this renders, so a missing entry
//! means the page was mounted outside its route and renders the pending
//! placeholder instead of partial data.

use crate::api::block_documents::{self, default_filter};
use crate::api::block_types;
use crate::api::{BlockDocument, BlockType, BlockTypeFilterBody};
use crate::router::{RouterContext, View};

#[cfg(test)]
#[path = "blocks_test.rs"]
mod tests;

pub const TITLE: &str = "Blocks";
pub const EMPTY_TEXT: &str = "No blocks yet. Add a block to get started.";
pub const PENDING_TEXT: &str = "Loading blocks...";

pub struct BlocksPage;

impl BlocksPage {
    /// Mount the page from cache-resident data.
    #[must_use]
    pub fn render(ctx: &RouterContext) -> View {
        let client = &ctx.query_client;
        let filter = default_filter();

        let types = client.get_query_data::<Vec<BlockType>>(&block_types::keys::list_filter(&BlockTypeFilterBody::default()));
        let documents = client.get_query_data::<Vec<BlockDocument>>(&block_documents::keys::list_filter(&filter));
        let count = client.get_query_data::<u64>(&block_documents::keys::count_filter(&filter));

        let (Some(types), Some(documents), Some(count)) = (types, documents, count) else {
            tracing::debug!("blocks page rendered without cached data");
            return View::Fallback(PENDING_TEXT.to_owned());
        };

        View::Page { title: TITLE.to_owned(), body: body_lines(&types, &documents, count) }
    }
}

fn body_lines(types: &[BlockType], documents: &[BlockDocument], count: u64) -> Vec<String> {
    if count == 0 {
        return vec![EMPTY_TEXT.to_owned()];
    }

    let mut lines = Vec::with_capacity(documents.len() + 2);
    lines.push(count_label(count));
    lines.push(format!("{} block types available", types.len()));
    lines.extend(documents.iter().map(document_line));
    lines
}

fn count_label(count: u64) -> String {
    if count == 1 { "1 Block".to_owned() } else { format!("{count} Blocks") }
}

fn document_line(doc: &BlockDocument) -> String {
    let name = doc.name.as_deref().unwrap_or("(anonymous)");
    format!("- {name} [{}]", doc.type_label())
}
