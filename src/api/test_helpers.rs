//! In-memory [`BlocksApi`] for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Barrier;
use uuid::Uuid;

use super::BlocksApi;
use super::types::{ApiError, BlockDocument, BlockDocumentFilterBody, BlockType, BlockTypeFilterBody};

pub const TYPES: &str = "block_types/filter";
pub const DOCUMENTS: &str = "block_documents/filter";
pub const COUNT: &str = "block_documents/count";

/// Serves canned data, records every call, and can fail or rendezvous on
/// chosen endpoints.
pub struct StubBlocksApi {
    pub types: Vec<BlockType>,
    pub documents: Vec<BlockDocument>,
    pub count: u64,
    failures: HashMap<&'static str, ApiError>,
    barrier: Option<Arc<Barrier>>,
    delays: HashMap<&'static str, Duration>,
    hanging: Vec<&'static str>,
    calls: Mutex<Vec<&'static str>>,
    document_filters: Mutex<Vec<BlockDocumentFilterBody>>,
}

impl StubBlocksApi {
    pub fn new() -> Self {
        let slack = sample_block_type("Slack Webhook", "slack-webhook");
        let aws = sample_block_type("AWS Credentials", "aws-credentials");
        let documents = vec![sample_document("alerts", &slack), sample_document("prod", &aws)];
        Self {
            types: vec![aws, slack],
            documents,
            count: 42,
            failures: HashMap::new(),
            barrier: None,
            delays: HashMap::new(),
            hanging: Vec::new(),
            calls: Mutex::new(Vec::new()),
            document_filters: Mutex::new(Vec::new()),
        }
    }

    /// Make `endpoint` fail with `error`.
    pub fn failing(mut self, endpoint: &'static str, error: ApiError) -> Self {
        self.failures.insert(endpoint, error);
        self
    }

    /// Hold every call until `parties` calls are waiting at once.
    pub fn rendezvous(mut self, parties: usize) -> Self {
        self.barrier = Some(Arc::new(Barrier::new(parties)));
        self
    }

    /// Answer `endpoint` only after `delay`.
    pub fn delayed(mut self, endpoint: &'static str, delay: Duration) -> Self {
        self.delays.insert(endpoint, delay);
        self
    }

    /// Never answer `endpoint`.
    pub fn hanging(mut self, endpoint: &'static str) -> Self {
        self.hanging.push(endpoint);
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, endpoint: &str) -> usize {
        self.calls().iter().filter(|c| **c == endpoint).count()
    }

    pub fn document_filters(&self) -> Vec<BlockDocumentFilterBody> {
        self.document_filters.lock().unwrap().clone()
    }

    async fn respond<T>(&self, endpoint: &'static str, value: T) -> Result<T, ApiError> {
        self.calls.lock().unwrap().push(endpoint);
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        if self.hanging.contains(&endpoint) {
            futures::future::pending::<()>().await;
        }
        if let Some(delay) = self.delays.get(endpoint) {
            tokio::time::sleep(*delay).await;
        }
        match self.failures.get(endpoint) {
            Some(err) => Err(err.clone()),
            None => Ok(value),
        }
    }
}

#[async_trait::async_trait]
impl BlocksApi for StubBlocksApi {
    async fn filter_block_types(&self, _filter: &BlockTypeFilterBody) -> Result<Vec<BlockType>, ApiError> {
        self.respond(TYPES, self.types.clone()).await
    }

    async fn filter_block_documents(&self, filter: &BlockDocumentFilterBody) -> Result<Vec<BlockDocument>, ApiError> {
        self.document_filters.lock().unwrap().push(filter.clone());
        self.respond(DOCUMENTS, self.documents.clone()).await
    }

    async fn count_block_documents(&self, filter: &BlockDocumentFilterBody) -> Result<u64, ApiError> {
        self.document_filters.lock().unwrap().push(filter.clone());
        self.respond(COUNT, self.count).await
    }
}

pub fn sample_block_type(name: &str, slug: &str) -> BlockType {
    BlockType {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        slug: slug.to_owned(),
        logo_url: None,
        documentation_url: None,
        description: Some(format!("{name} block")),
        code_example: None,
        is_protected: false,
    }
}

pub fn sample_document(name: &str, block_type: &BlockType) -> BlockDocument {
    BlockDocument {
        id: Uuid::new_v4(),
        name: Some(name.to_owned()),
        block_type_id: block_type.id,
        block_type_name: Some(block_type.name.clone()),
        block_type: Some(block_type.clone()),
        is_anonymous: false,
        data: serde_json::json!({}),
        created: None,
        updated: None,
    }
}
