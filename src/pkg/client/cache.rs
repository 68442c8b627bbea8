//! Keyed query cache sitting between views and the API client.
//!
//! Entries are fresh for `stale_after`, then refetched on next read.
//! Mutations invalidate keys explicitly; `refocus` marks everything stale
//! the way a window regaining focus would. Concurrent reads of the same
//! key share one fetch.

use std::{
    collections::HashMap,
    future::Future,
    sync::Arc,
    time::{Duration, Instant},
};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::pkg::{
    client::api::ClientError,
    internal::{lifecycle::ListingStatus, listing::ListQuery},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Status(ListingStatus),
    Query(ListQuery),
    Id(Uuid),
    /// Sub-resource of a record, e.g. its applications or comments.
    Sub(Uuid, &'static str),
    Named(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub entity: &'static str,
    pub scope: Scope,
}

impl QueryKey {
    pub fn new(entity: &'static str, scope: Scope) -> Self {
        QueryKey { entity, scope }
    }
}

#[derive(Debug)]
struct Entry {
    value: Value,
    fetched_at: Instant,
    stale: bool,
}

#[derive(Debug)]
pub struct QueryCache {
    stale_after: Duration,
    entries: RwLock<HashMap<QueryKey, Entry>>,
    inflight: Mutex<HashMap<QueryKey, Arc<Mutex<()>>>>,
}

impl QueryCache {
    pub fn new(stale_after: Duration) -> Self {
        QueryCache {
            stale_after,
            entries: RwLock::new(HashMap::new()),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    pub fn stale_after(&self) -> Duration {
        self.stale_after
    }

    async fn fresh(&self, key: &QueryKey) -> Option<Value> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|e| !e.stale && e.fetched_at.elapsed() < self.stale_after)
            .map(|e| e.value.clone())
    }

    /// Returns the cached value for `key` while fresh, otherwise runs
    /// `fetcher` and caches its result. Failed fetches are not cached.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<T, ClientError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        if let Some(value) = self.fresh(&key).await {
            return Ok(serde_json::from_value(value)?);
        }
        let gate = {
            let mut inflight = self.inflight.lock().await;
            inflight.entry(key.clone()).or_default().clone()
        };
        let result = {
            let _guard = gate.lock().await;
            self.fill(&key, fetcher).await
        };
        let mut inflight = self.inflight.lock().await;
        // the map and this caller hold the only references once nobody waits
        if Arc::strong_count(&gate) == 2 {
            inflight.remove(&key);
        }
        result
    }

    async fn fill<T, F, Fut>(&self, key: &QueryKey, fetcher: F) -> Result<T, ClientError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        // a concurrent caller may have filled the entry while we waited
        if let Some(value) = self.fresh(key).await {
            return Ok(serde_json::from_value(value)?);
        }
        tracing::debug!("cache miss for {:?}", key);
        let fetched = fetcher().await?;
        let value = serde_json::to_value(&fetched)?;
        self.entries.write().await.insert(
            key.clone(),
            Entry {
                value,
                fetched_at: Instant::now(),
                stale: false,
            },
        );
        Ok(fetched)
    }

    pub async fn contains_fresh(&self, key: &QueryKey) -> bool {
        self.fresh(key).await.is_some()
    }

    pub async fn invalidate(&self, key: &QueryKey) {
        self.entries.write().await.remove(key);
    }

    /// Drops every entry of `entity` for which `matches` holds.
    pub async fn invalidate_where<P>(&self, entity: &str, matches: P)
    where
        P: Fn(&Scope) -> bool,
    {
        self.entries
            .write()
            .await
            .retain(|key, _| !(key.entity == entity && matches(&key.scope)));
    }

    pub async fn invalidate_entity(&self, entity: &str) {
        self.invalidate_where(entity, |_| true).await;
    }

    pub async fn refocus(&self) {
        for entry in self.entries.write().await.values_mut() {
            entry.stale = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counting_fetch(
        calls: &Arc<AtomicUsize>,
        value: u32,
    ) -> impl Future<Output = Result<u32, ClientError>> {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(value)
        }
    }

    #[tokio::test]
    async fn fresh_entries_skip_the_network() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("jobs", Scope::Status(ListingStatus::Live));

        let first: u32 = cache.fetch(key.clone(), || counting_fetch(&calls, 1)).await.unwrap();
        let second: u32 = cache.fetch(key.clone(), || counting_fetch(&calls, 2)).await.unwrap();
        assert_eq!((first, second), (1, 1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.invalidate(&key).await;
        let third: u32 = cache.fetch(key.clone(), || counting_fetch(&calls, 3)).await.unwrap();
        assert_eq!(third, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fetch_gates_are_released() {
        let cache = Arc::new(QueryCache::new(Duration::from_secs(60)));
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("jobs", Scope::Status(ListingStatus::Draft));
        let tasks: Vec<_> = (0..4)
            .map(|n| {
                let cache = cache.clone();
                let calls = calls.clone();
                let key = key.clone();
                tokio::spawn(async move {
                    cache.fetch(key, || counting_fetch(&calls, n)).await.unwrap()
                })
            })
            .collect();
        for task in tasks {
            let _: u32 = task.await.unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let failing = QueryKey::new("jobs", Scope::Id(Uuid::new_v4()));
        let failed: Result<u32, _> = cache
            .fetch(failing, || async { Err(ClientError::Network("offline".into())) })
            .await;
        assert!(failed.is_err());
        assert!(cache.inflight.lock().await.is_empty());
    }

    #[tokio::test]
    async fn refocus_and_expiry_force_refetch() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("jobs", Scope::Id(Uuid::new_v4()));
        let _: u32 = cache.fetch(key.clone(), || counting_fetch(&calls, 1)).await.unwrap();
        cache.refocus().await;
        assert!(!cache.contains_fresh(&key).await);
        let _: u32 = cache.fetch(key.clone(), || counting_fetch(&calls, 1)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let instant = QueryCache::new(Duration::ZERO);
        let _: u32 = instant.fetch(key.clone(), || counting_fetch(&calls, 1)).await.unwrap();
        let _: u32 = instant.fetch(key.clone(), || counting_fetch(&calls, 1)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn entity_invalidation_is_scoped() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));
        let jobs = QueryKey::new("jobs", Scope::Status(ListingStatus::Draft));
        let grants = QueryKey::new("scholarships", Scope::Status(ListingStatus::Draft));
        let _: u32 = cache.fetch(jobs.clone(), || counting_fetch(&calls, 1)).await.unwrap();
        let _: u32 = cache.fetch(grants.clone(), || counting_fetch(&calls, 1)).await.unwrap();

        cache.invalidate_entity("jobs").await;
        assert!(!cache.contains_fresh(&jobs).await);
        assert!(cache.contains_fresh(&grants).await);
    }

    #[tokio::test]
    async fn concurrent_reads_share_one_fetch() {
        let cache = Arc::new(QueryCache::new(Duration::from_secs(60)));
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("jobs", Scope::Query(ListQuery::default()));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            let key = key.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .fetch(key, || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::task::yield_now().await;
                        Ok::<_, ClientError>(7u32)
                    })
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let key = QueryKey::new("jobs", Scope::Named("mine"));
        let failed: Result<u32, _> = cache
            .fetch(key.clone(), || async { Err(ClientError::Network("down".into())) })
            .await;
        assert!(failed.is_err());
        assert!(!cache.contains_fresh(&key).await);
    }
}
