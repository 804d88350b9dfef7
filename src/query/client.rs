//! Shared query cache.
//!
//! DESIGN
//! ======
//! `QueryClient` is a cheap-to-clone handle over one `Mutex`-guarded map of
//! cache entries plus a map of in-flight fetches. Values are stored
//! type-erased (`Arc<dyn Any>`) and recovered by the typed descriptor that
//! requested them.
//!
//! DEDUPLICATION
//! =============
//! A fetch is wrapped in a `Shared` future so every caller asking for the same
//! key while it runs awaits the same result. The in-flight map only keeps a
//! `WeakShared` handle: when every waiter is dropped (the user navigated
//! away) the fetch is abandoned and the next request starts a new one.
//!
//! The fetch future itself writes the result into the cache, so the write
//! happens exactly once no matter which waiter drives it to completion. A
//! fetch only writes if it is still the registered fetch for its key, which
//! keeps `remove_queries`/`clear` from being undone by a late response.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared, WeakShared};

use super::{QueryDescriptor, QueryError, QueryKey};
use crate::error::ErrorCode;

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(1);

type ErasedValue = Arc<dyn Any + Send + Sync>;
type ErasedFetch = BoxFuture<'static, Result<ErasedValue, QueryError>>;

// =============================================================================
// OPTIONS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryClientOptions {
    /// How long fetched data counts as fresh when the descriptor sets no
    /// stale time of its own.
    pub stale_time: Duration,
}

impl Default for QueryClientOptions {
    fn default() -> Self {
        Self { stale_time: DEFAULT_STALE_TIME }
    }
}

// =============================================================================
// CACHE STATE
// =============================================================================

struct CacheEntry {
    data: ErasedValue,
    updated_at: Instant,
    invalidated: bool,
}

impl CacheEntry {
    fn is_fresh(&self, stale_time: Duration, now: Instant) -> bool {
        !self.invalidated && now.saturating_duration_since(self.updated_at) < stale_time
    }
}

struct InFlight {
    id: u64,
    fetch: WeakShared<ErasedFetch>,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<QueryKey, CacheEntry>,
    in_flight: HashMap<QueryKey, InFlight>,
    next_fetch_id: u64,
}

// =============================================================================
// CLIENT
// =============================================================================

/// Handle to the shared query cache. Clones share the same cache.
#[derive(Clone, Default)]
pub struct QueryClient {
    inner: Arc<Mutex<CacheInner>>,
    options: QueryClientOptions,
}

impl QueryClient {
    #[must_use]
    pub fn new(options: QueryClientOptions) -> Self {
        Self { inner: Arc::new(Mutex::new(CacheInner::default())), options }
    }

    /// Return cached data when fresh, otherwise fetch, cache, and return it.
    ///
    /// Concurrent calls for the same key share one fetch.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Fetch`] when the fetch fails and
    /// [`QueryError::TypeMismatch`] when the key holds another type.
    pub async fn ensure_query_data<T>(&self, descriptor: &QueryDescriptor<T>) -> Result<T, QueryError>
    where
        T: Clone + Send + Sync + 'static,
    {
        let stale_time = self.stale_time_for(descriptor);
        let fetch = {
            let mut inner = self.lock();
            if let Some(entry) = inner.entries.get(descriptor.key()) {
                if entry.is_fresh(stale_time, Instant::now()) {
                    tracing::debug!(key = %descriptor.key(), "query cache hit");
                    return downcast(descriptor.key(), &entry.data);
                }
            }
            self.join_or_start(&mut inner, descriptor)
        };
        let data = fetch.await?;
        downcast(descriptor.key(), &data)
    }

    /// Fetch regardless of freshness and cache the result. Joins a fetch that
    /// is already in flight for the key.
    ///
    /// # Errors
    ///
    /// Same as [`QueryClient::ensure_query_data`].
    pub async fn fetch_query<T>(&self, descriptor: &QueryDescriptor<T>) -> Result<T, QueryError>
    where
        T: Clone + Send + Sync + 'static,
    {
        let fetch = {
            let mut inner = self.lock();
            self.join_or_start(&mut inner, descriptor)
        };
        let data = fetch.await?;
        downcast(descriptor.key(), &data)
    }

    /// Warm the cache for a descriptor. Failures are logged, never returned.
    pub async fn prefetch_query<T>(&self, descriptor: &QueryDescriptor<T>)
    where
        T: Clone + Send + Sync + 'static,
    {
        if let Err(e) = self.ensure_query_data(descriptor).await {
            tracing::warn!(key = %descriptor.key(), code = e.error_code(), error = %e, "prefetch failed");
        }
    }

    /// Synchronous cache read. `None` when absent or stored under another type.
    #[must_use]
    pub fn get_query_data<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let inner = self.lock();
        let entry = inner.entries.get(key)?;
        let value = entry.data.downcast_ref::<T>().cloned();
        if value.is_none() {
            tracing::debug!(key = %key, expected = std::any::type_name::<T>(), "cached value has another type");
        }
        value
    }

    /// Write a value directly into the cache, marking it fresh.
    pub fn set_query_data<T>(&self, key: QueryKey, value: T)
    where
        T: Send + Sync + 'static,
    {
        let mut inner = self.lock();
        inner
            .entries
            .insert(key, CacheEntry { data: Arc::new(value), updated_at: Instant::now(), invalidated: false });
    }

    /// Mark every entry under `prefix` stale. Data stays readable until the
    /// next ensure/fetch replaces it. Returns how many entries were marked.
    pub fn invalidate_queries(&self, prefix: &QueryKey) -> usize {
        let mut inner = self.lock();
        let mut count = 0;
        for (key, entry) in &mut inner.entries {
            if key.starts_with(prefix) {
                entry.invalidated = true;
                count += 1;
            }
        }
        tracing::debug!(prefix = %prefix, count, "invalidated queries");
        count
    }

    /// Drop every entry (and in-flight registration) under `prefix`.
    /// Returns how many cached entries were removed.
    pub fn remove_queries(&self, prefix: &QueryKey) -> usize {
        let mut inner = self.lock();
        let before = inner.entries.len();
        inner.entries.retain(|key, _| !key.starts_with(prefix));
        inner.in_flight.retain(|key, _| !key.starts_with(prefix));
        before - inner.entries.len()
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.in_flight.clear();
    }

    /// True when a live fetch is registered for `key`.
    #[must_use]
    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        let inner = self.lock();
        inner
            .in_flight
            .get(key)
            .is_some_and(|f| f.fetch.upgrade().is_some())
    }

    #[must_use]
    pub fn contains(&self, key: &QueryKey) -> bool {
        self.lock().entries.contains_key(key)
    }

    // -------------------------------------------------------------------------
    // internals
    // -------------------------------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stale_time_for<T>(&self, descriptor: &QueryDescriptor<T>) -> Duration {
        descriptor
            .stale_time_override()
            .unwrap_or(self.options.stale_time)
    }

    fn join_or_start<T>(&self, inner: &mut CacheInner, descriptor: &QueryDescriptor<T>) -> Shared<ErasedFetch>
    where
        T: Send + Sync + 'static,
    {
        let key = descriptor.key();
        if let Some(existing) = inner.in_flight.get(key).and_then(|f| f.fetch.upgrade()) {
            tracing::debug!(key = %key, "joining in-flight fetch");
            return existing;
        }

        inner.next_fetch_id += 1;
        let fetch_id = inner.next_fetch_id;
        tracing::debug!(key = %key, fetch_id, "query cache miss, fetching");

        let client = self.clone();
        let owned_key = key.clone();
        // Called with the cache locked: fetch functions only build the future.
        let request = descriptor.start_fetch();
        let fetch: ErasedFetch = async move {
            let result = request.await;
            client.settle(&owned_key, fetch_id, result)
        }
        .boxed();

        let shared = fetch.shared();
        if let Some(weak) = shared.downgrade() {
            inner
                .in_flight
                .insert(key.clone(), InFlight { id: fetch_id, fetch: weak });
        }
        shared
    }

    fn settle<T>(
        &self,
        key: &QueryKey,
        fetch_id: u64,
        result: Result<T, crate::api::ApiError>,
    ) -> Result<ErasedValue, QueryError>
    where
        T: Send + Sync + 'static,
    {
        let mut inner = self.lock();
        let current = inner
            .in_flight
            .get(key)
            .is_some_and(|f| f.id == fetch_id);
        if current {
            inner.in_flight.remove(key);
        }

        match result {
            Ok(value) => {
                let data: ErasedValue = Arc::new(value);
                if current {
                    inner.entries.insert(
                        key.clone(),
                        CacheEntry { data: Arc::clone(&data), updated_at: Instant::now(), invalidated: false },
                    );
                }
                tracing::debug!(key = %key, fetch_id, cached = current, "fetch settled");
                Ok(data)
            }
            Err(source) => {
                tracing::warn!(key = %key, fetch_id, error = %source, "fetch failed");
                Err(QueryError::Fetch { key: key.clone(), source })
            }
        }
    }
}

fn downcast<T>(key: &QueryKey, data: &ErasedValue) -> Result<T, QueryError>
where
    T: Clone + 'static,
{
    data.downcast_ref::<T>()
        .cloned()
        .ok_or_else(|| QueryError::TypeMismatch { key: key.clone(), expected: std::any::type_name::<T>() })
}
