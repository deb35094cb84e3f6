use std::future::Future;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use crate::utils::Result;

/// Single-value cache that refetches once the entry is older than `ttl`
pub struct TtlCache<T> {
    ttl: Duration,
    entry: RwLock<Option<(T, Instant)>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: RwLock::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached value if still fresh
    pub async fn fresh(&self) -> Option<T> {
        let entry = self.entry.read().await;
        match &*entry {
            Some((value, stored)) if stored.elapsed() < self.ttl => Some(value.clone()),
            _ => None,
        }
    }

    /// Cached value, or the result of `fetch` stored for next time.
    /// Failures are not cached. Concurrent misses share one fetch: the write
    /// lock is held across it and freshness is checked again once acquired.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.fresh().await {
            return Ok(value);
        }

        let mut entry = self.entry.write().await;
        if let Some((value, stored)) = &*entry {
            if stored.elapsed() < self.ttl {
                return Ok(value.clone());
            }
        }
        let value = fetch().await?;
        *entry = Some((value.clone(), Instant::now()));
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use crate::utils::DappError;

    #[tokio::test(start_paused = true)]
    async fn test_serves_cached_until_ttl() {
        let cache = TtlCache::new(Duration::from_secs(30));
        assert_eq!(cache.get_or_fetch(|| async { Ok(1) }).await.unwrap(), 1);
        assert_eq!(cache.get_or_fetch(|| async { Ok(2) }).await.unwrap(), 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(cache.get_or_fetch(|| async { Ok(3) }).await.unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_misses_fetch_once() {
        let cache = TtlCache::new(Duration::from_secs(30));
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let fetch = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(5u32)
        };

        let (a, b, c) = tokio::join!(
            cache.get_or_fetch(fetch),
            cache.get_or_fetch(fetch),
            cache.get_or_fetch(fetch)
        );

        assert_eq!((a.unwrap(), b.unwrap(), c.unwrap()), (5, 5, 5));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_not_cached() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(30));
        let err = cache
            .get_or_fetch(|| async { Err(DappError::UpstreamError("timeout".into())) })
            .await;
        assert!(err.is_err());
        assert_eq!(cache.fresh().await, None);
        assert_eq!(cache.get_or_fetch(|| async { Ok(7) }).await.unwrap(), 7);
    }
}
