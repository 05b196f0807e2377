//! Process-wide query cache.
//!
//! Every list or record a screen renders lives here under a semantic key
//! tuple (e.g. `["ministry_messages", <id>]`). Reads are
//! stale-while-revalidate: the cached value is returned immediately and a
//! background refetch is spawned when the entry is stale, with at most one
//! fetch in flight per key. Realtime callbacks and mutation success handlers
//! patch entries imperatively through [`QueryCache::set_query_data`].

pub mod merge;

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Ordered tuple of string segments identifying one cached query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new(segments: &[&str]) -> Self {
        Self(segments.iter().map(|s| s.to_string()).collect())
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }
}

#[derive(Default)]
struct Entry {
    value: Option<Arc<dyn Any + Send + Sync>>,
    error: Option<String>,
    is_fetching: bool,
    is_stale: bool,
}

/// Point-in-time view of one cache entry
pub struct QuerySnapshot<T> {
    pub data: Option<Arc<T>>,
    pub error: Option<String>,
    pub is_fetching: bool,
}

impl<T> QuerySnapshot<T> {
    /// First load: nothing to show yet and a fetch is running
    pub fn is_loading(&self) -> bool {
        self.data.is_none() && self.is_fetching
    }
}

#[derive(Clone, Default)]
pub struct QueryCache {
    inner: Arc<RwLock<HashMap<QueryKey, Entry>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get<T: Send + Sync + 'static>(&self, key: &QueryKey) -> QuerySnapshot<T> {
        let map = self.inner.read().await;
        match map.get(key) {
            Some(entry) => QuerySnapshot {
                data: entry
                    .value
                    .clone()
                    .and_then(|v| v.downcast::<T>().ok()),
                error: entry.error.clone(),
                is_fetching: entry.is_fetching,
            },
            None => QuerySnapshot {
                data: None,
                error: None,
                is_fetching: false,
            },
        }
    }

    /// Claim the fetch for `key`. Returns true when the caller should fetch:
    /// the entry is missing or stale and nobody else is fetching it.
    pub async fn begin_fetch(&self, key: &QueryKey) -> bool {
        let mut map = self.inner.write().await;
        let entry = map.entry(key.clone()).or_default();
        let needs_fetch = entry.value.is_none() || entry.is_stale;
        if needs_fetch && !entry.is_fetching {
            entry.is_fetching = true;
            true
        } else {
            false
        }
    }

    /// Store a fetch result. Errors keep any stale value in place so the
    /// screen can keep rendering it.
    pub async fn complete_fetch<T: Send + Sync + 'static>(
        &self,
        key: &QueryKey,
        result: Result<T, String>,
    ) {
        let mut map = self.inner.write().await;
        let entry = map.entry(key.clone()).or_default();
        entry.is_fetching = false;
        match result {
            Ok(value) => {
                entry.value = Some(Arc::new(value));
                entry.error = None;
                entry.is_stale = false;
            }
            Err(message) => {
                entry.error = Some(message);
            }
        }
    }

    /// Imperative patch, no network round-trip. The closure sees the current
    /// value (if its type matches) and returns the replacement; returning
    /// None leaves the entry untouched.
    pub async fn set_query_data<T, F>(&self, key: &QueryKey, patch: F)
    where
        T: Send + Sync + 'static,
        F: FnOnce(Option<&T>) -> Option<T>,
    {
        let mut map = self.inner.write().await;
        let entry = map.entry(key.clone()).or_default();
        let old = entry
            .value
            .clone()
            .and_then(|v| v.downcast::<T>().ok());
        if let Some(new) = patch(old.as_deref()) {
            entry.value = Some(Arc::new(new));
            entry.error = None;
            entry.is_stale = false;
        }
    }

    /// Mark one entry stale; the next read refetches in the background
    pub async fn invalidate(&self, key: &QueryKey) {
        if let Some(entry) = self.inner.write().await.get_mut(key) {
            entry.is_stale = true;
        }
    }

    /// Mark every entry under a key prefix stale
    pub async fn invalidate_prefix(&self, prefix: &QueryKey) {
        for (key, entry) in self.inner.write().await.iter_mut() {
            if key.starts_with(prefix) {
                entry.is_stale = true;
            }
        }
    }

    /// Drop everything (sign-out)
    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    /// Frame-driven read for immediate-mode screens: snapshot the entry and,
    /// when it is stale with no fetch in flight, spawn `fetch` to refresh it.
    pub fn ensure<T, F, Fut>(
        &self,
        runtime: &tokio::runtime::Runtime,
        key: QueryKey,
        fetch: F,
    ) -> QuerySnapshot<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        runtime.block_on(async {
            if self.begin_fetch(&key).await {
                let cache = self.clone();
                let key_for_task = key.clone();
                let fut = fetch();
                tokio::spawn(async move {
                    let result = fut.await.map_err(|e| e.to_string());
                    cache.complete_fetch(&key_for_task, result).await;
                });
            }
            self.get(&key).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(segments: &[&str]) -> QueryKey {
        QueryKey::new(segments)
    }

    #[tokio::test]
    async fn concurrent_reads_dedupe_to_one_fetch() {
        let cache = QueryCache::new();
        let k = key(&["ministries"]);

        assert!(cache.begin_fetch(&k).await);
        // Second reader while the first fetch is in flight
        assert!(!cache.begin_fetch(&k).await);

        cache.complete_fetch(&k, Ok(vec!["Louvor".to_string()])).await;

        let snap = cache.get::<Vec<String>>(&k).await;
        assert_eq!(snap.data.as_deref(), Some(&vec!["Louvor".to_string()]));
        assert!(!snap.is_fetching);

        // Fresh entry: no refetch
        assert!(!cache.begin_fetch(&k).await);
    }

    #[tokio::test]
    async fn stale_entries_serve_old_data_while_refetching() {
        let cache = QueryCache::new();
        let k = key(&["events"]);

        cache.complete_fetch(&k, Ok(1u32)).await;
        cache.invalidate(&k).await;

        assert!(cache.begin_fetch(&k).await);
        let snap = cache.get::<u32>(&k).await;
        assert_eq!(snap.data.as_deref(), Some(&1));
        assert!(snap.is_fetching);
        assert!(!snap.is_loading());
    }

    #[tokio::test]
    async fn failed_fetch_keeps_stale_value_and_records_error() {
        let cache = QueryCache::new();
        let k = key(&["profile", "x"]);

        cache.complete_fetch(&k, Ok("old".to_string())).await;
        cache.invalidate(&k).await;
        assert!(cache.begin_fetch(&k).await);
        cache
            .complete_fetch::<String>(&k, Err("network down".to_string()))
            .await;

        let snap = cache.get::<String>(&k).await;
        assert_eq!(snap.data.as_deref().map(String::as_str), Some("old"));
        assert_eq!(snap.error.as_deref(), Some("network down"));
    }

    #[tokio::test]
    async fn set_query_data_patches_without_fetch() {
        let cache = QueryCache::new();
        let k = key(&["thread", "42"]);

        cache.complete_fetch(&k, Ok(vec![1u32, 2])).await;
        cache
            .set_query_data::<Vec<u32>, _>(&k, |old| {
                let mut list = old.cloned().unwrap_or_default();
                list.push(3);
                Some(list)
            })
            .await;

        let snap = cache.get::<Vec<u32>>(&k).await;
        assert_eq!(snap.data.as_deref(), Some(&vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn patch_returning_none_leaves_entry_untouched() {
        let cache = QueryCache::new();
        let k = key(&["thread", "7"]);

        cache
            .set_query_data::<Vec<u32>, _>(&k, |old| old.map(|_| vec![9]))
            .await;

        let snap = cache.get::<Vec<u32>>(&k).await;
        assert!(snap.data.is_none());
    }

    #[tokio::test]
    async fn prefix_invalidation_marks_children_stale() {
        let cache = QueryCache::new();
        let parent = key(&["events"]);
        let child = key(&["events", "abc", "attendees"]);
        let other = key(&["ministries"]);

        cache.complete_fetch(&child, Ok(0u8)).await;
        cache.complete_fetch(&other, Ok(0u8)).await;
        cache.invalidate_prefix(&parent).await;

        assert!(cache.begin_fetch(&child).await);
        assert!(!cache.begin_fetch(&other).await);
    }
}
