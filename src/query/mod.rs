//! Query layer: descriptors, keys, and the shared query cache.
//!
//! SYSTEM CONTEXT
//! ==============
//! `key` defines cache identities, `QueryDescriptor` pairs a key with the
//! async fetch that produces its value, and `client` owns the cache every
//! route loader and page reads through.

pub mod client;
pub mod key;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;

pub use client::{QueryClient, QueryClientOptions};
pub use key::QueryKey;

use crate::api::ApiError;
use crate::error::ErrorCode;

// =============================================================================
// ERROR
// =============================================================================

/// Errors surfaced by query cache operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum QueryError {
    /// The descriptor's fetch function failed. Nothing was cached.
    #[error("query {key} failed: {source}")]
    Fetch { key: QueryKey, source: ApiError },

    /// The cache holds a value of another type under this key.
    #[error("query {key} does not hold a value of type {expected}")]
    TypeMismatch { key: QueryKey, expected: &'static str },
}

impl QueryError {
    #[must_use]
    pub fn key(&self) -> &QueryKey {
        match self {
            Self::Fetch { key, .. } | Self::TypeMismatch { key, .. } => key,
        }
    }
}

impl ErrorCode for QueryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Fetch { source, .. } => source.error_code(),
            Self::TypeMismatch { .. } => "E_QUERY_TYPE_MISMATCH",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Fetch { source, .. } => source.retryable(),
            Self::TypeMismatch { .. } => false,
        }
    }
}

// =============================================================================
// DESCRIPTOR
// =============================================================================

/// Future returned by a descriptor's fetch function.
pub type QueryFuture<T> = BoxFuture<'static, Result<T, ApiError>>;

/// Fetch function stored in a descriptor. Called once per actual network fetch.
pub type QueryFn<T> = Arc<dyn Fn() -> QueryFuture<T> + Send + Sync>;

/// A fetchable resource: cache key, fetch function, and cache policy.
pub struct QueryDescriptor<T> {
    key: QueryKey,
    fetch: QueryFn<T>,
    stale_time: Option<Duration>,
}

impl<T> QueryDescriptor<T> {
    pub fn new<F>(key: QueryKey, fetch: F) -> Self
    where
        F: Fn() -> QueryFuture<T> + Send + Sync + 'static,
    {
        Self { key, fetch: Arc::new(fetch), stale_time: None }
    }

    /// Override the client's default stale time for this resource.
    #[must_use]
    pub fn stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = Some(stale_time);
        self
    }

    #[must_use]
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    #[must_use]
    pub fn stale_time_override(&self) -> Option<Duration> {
        self.stale_time
    }

    pub(crate) fn start_fetch(&self) -> QueryFuture<T> {
        (self.fetch)()
    }
}

impl<T> Clone for QueryDescriptor<T> {
    fn clone(&self) -> Self {
        Self { key: self.key.clone(), fetch: Arc::clone(&self.fetch), stale_time: self.stale_time }
    }
}

impl<T> fmt::Debug for QueryDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryDescriptor")
            .field("key", &self.key)
            .field("stale_time", &self.stale_time)
            .finish_non_exhaustive()
    }
}
