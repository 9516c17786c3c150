use crate::table::ResultTable;
use std::{collections::HashMap, future::Future, sync::Arc, time::Duration};
use tokio::{sync::Mutex, time::Instant};
use tracing::debug;

struct CacheEntry {
    table: Arc<ResultTable>,
    fetched_at: Instant,
}

/// Time-bounded cache of result tables keyed by endpoint.
///
/// The lock is only held for lookups and inserts, never across a fetch, so
/// two concurrent misses on one key both fetch and the later insert wins.
#[derive(Default)]
pub struct TableCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached table for `key` if it is younger than `ttl`,
    /// otherwise runs `fetch` and caches what it returns. Errors are passed
    /// through and leave nothing behind.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
    ) -> Result<Arc<ResultTable>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ResultTable, E>>,
    {
        if let Some(table) = self.fresh(key, ttl).await {
            debug!(key, "cache hit");
            return Ok(table);
        }

        debug!(key, "cache miss");
        let table = Arc::new(fetch().await?);
        self.entries.lock().await.insert(
            key.to_string(),
            CacheEntry {
                table: Arc::clone(&table),
                fetched_at: Instant::now(),
            },
        );
        Ok(table)
    }

    async fn fresh(&self, key: &str, ttl: Duration) -> Option<Arc<ResultTable>> {
        let mut entries = self.entries.lock().await;
        let stale = match entries.get(key) {
            Some(entry) if entry.fetched_at.elapsed() < ttl => {
                return Some(Arc::clone(&entry.table));
            }
            Some(_) => true,
            None => false,
        };
        if stale {
            entries.remove(key);
        }
        None
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.lock().await;
        let dropped = entries.len();
        entries.clear();
        debug!(dropped, "cache cleared");
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn table_with(value: i64) -> ResultTable {
        ResultTable {
            columns: vec!["total_edits".to_string()],
            rows: vec![vec![Cell::Int(value)]],
        }
    }

    async fn counted_fetch(
        cache: &TableCache,
        calls: &AtomicUsize,
        ttl: Duration,
    ) -> Arc<ResultTable> {
        cache
            .get_or_fetch("edits", ttl, || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) as i64;
                Ok::<_, String>(table_with(n))
            })
            .await
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn second_fetch_within_window_hits_cache() {
        let cache = TableCache::new();
        let calls = AtomicUsize::new(0);
        let ttl = Duration::from_secs(60);

        let first = counted_fetch(&cache, &calls, ttl).await;
        tokio::time::advance(Duration::from_secs(59)).await;
        let second = counted_fetch(&cache, &calls, ttl).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_entry_is_refetched() {
        let cache = TableCache::new();
        let calls = AtomicUsize::new(0);
        let ttl = Duration::from_secs(60);

        counted_fetch(&cache, &calls, ttl).await;
        tokio::time::advance(Duration::from_secs(61)).await;
        let refreshed = counted_fetch(&cache, &calls, ttl).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(refreshed.rows[0][0], Cell::Int(1));
    }

    #[tokio::test]
    async fn clear_forces_refetch() {
        let cache = TableCache::new();
        let calls = AtomicUsize::new(0);
        let ttl = Duration::from_secs(60);

        counted_fetch(&cache, &calls, ttl).await;
        cache.clear().await;
        assert!(cache.is_empty().await);
        counted_fetch(&cache, &calls, ttl).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache = TableCache::new();
        let ttl = Duration::from_secs(60);

        let failed = cache
            .get_or_fetch("edits", ttl, || async { Err::<ResultTable, _>("boom") })
            .await;
        assert_eq!(failed.unwrap_err(), "boom");
        assert!(cache.is_empty().await);

        let ok = cache
            .get_or_fetch("edits", ttl, || async { Ok::<_, &str>(table_with(3)) })
            .await
            .unwrap();
        assert_eq!(ok.len(), 1);
    }
}
