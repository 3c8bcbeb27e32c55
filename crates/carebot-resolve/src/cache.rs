//! TTL-bounded snapshot cache for bulk entity listings.

use moka::future::Cache;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// A single-slot cache holding one listing snapshot with a fixed TTL.
///
/// One instance exists per entity kind, each with its own TTL (doctors cache
/// long, patients short). A snapshot older than its TTL is never returned;
/// the next read refetches.
///
/// Concurrent misses are not coalesced: two simultaneous readers may both
/// fetch, and the last insert wins. Snapshots are replaced wholesale as
/// `Arc`s, so readers never observe a partial listing.
pub struct ListingCache<T> {
    inner: Cache<(), Arc<Vec<T>>>,
}

impl<T: Send + Sync + 'static> ListingCache<T> {
    /// Create a cache whose snapshot expires after `ttl`.
    pub fn new(ttl: Duration) -> Self {
        let inner = Cache::builder().max_capacity(1).time_to_live(ttl).build();
        Self { inner }
    }

    /// Return the snapshot while it is within its TTL; otherwise run `fetch`,
    /// store the result, and return it.
    pub async fn get_or_fetch<F, Fut, E>(&self, fetch: F) -> Result<Arc<Vec<T>>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
    {
        if let Some(snapshot) = self.inner.get(&()).await {
            return Ok(snapshot);
        }
        let fresh = Arc::new(fetch().await?);
        self.inner.insert((), Arc::clone(&fresh)).await;
        Ok(fresh)
    }

    /// Drop the snapshot so the next read refetches regardless of TTL.
    ///
    /// Must be called after any write that changes the mirrored listing,
    /// e.g. patient registration.
    pub async fn invalidate(&self) {
        self.inner.invalidate(&()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_fetch(
        counter: &Arc<AtomicUsize>,
    ) -> impl Future<Output = Result<Vec<String>, &'static str>> {
        let counter = Arc::clone(counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(vec!["a".to_string(), "b".to_string()])
        }
    }

    #[tokio::test]
    async fn second_read_within_ttl_hits_the_snapshot() {
        let cache = ListingCache::new(Duration::from_secs(60));
        let fetches = Arc::new(AtomicUsize::new(0));

        let first = cache.get_or_fetch(|| counting_fetch(&fetches)).await.unwrap();
        let second = cache.get_or_fetch(|| counting_fetch(&fetches)).await.unwrap();

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn expired_snapshot_triggers_exactly_one_refetch() {
        let cache = ListingCache::new(Duration::from_millis(50));
        let fetches = Arc::new(AtomicUsize::new(0));

        cache.get_or_fetch(|| counting_fetch(&fetches)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;
        cache.get_or_fetch(|| counting_fetch(&fetches)).await.unwrap();
        cache.get_or_fetch(|| counting_fetch(&fetches)).await.unwrap();

        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch_before_ttl() {
        let cache = ListingCache::new(Duration::from_secs(60));
        let fetches = Arc::new(AtomicUsize::new(0));

        cache.get_or_fetch(|| counting_fetch(&fetches)).await.unwrap();
        cache.invalidate().await;
        cache.get_or_fetch(|| counting_fetch(&fetches)).await.unwrap();

        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fetch_error_is_not_cached() {
        let cache: ListingCache<String> = ListingCache::new(Duration::from_secs(60));
        let err = cache
            .get_or_fetch(|| async { Err::<Vec<String>, _>("backend down") })
            .await
            .unwrap_err();
        assert_eq!(err, "backend down");

        // A later successful fetch fills the slot normally.
        let snapshot = cache
            .get_or_fetch(|| async { Ok::<_, &str>(vec!["a".to_string()]) })
            .await
            .unwrap();
        assert_eq!(snapshot.len(), 1);
    }
}
