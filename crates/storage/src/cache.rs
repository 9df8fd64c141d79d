use std::future::Future;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};

use crate::clock::Clock;

/// Single-entry, process-wide result cache with a time-to-live.
///
/// Shared across concurrent requests through an `Arc`. Losing or
/// duplicating a refresh is harmless: two concurrent misses both compute and
/// the last writer wins.
pub struct TtlCache<T> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    slot: RwLock<Option<Cached<T>>>,
}

struct Cached<T> {
    stored_at: DateTime<Utc>,
    value: Arc<T>,
}

impl<T> TtlCache<T> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            slot: RwLock::new(None),
        }
    }

    /// The cached value if it is younger than the TTL.
    pub fn get(&self) -> Option<Arc<T>> {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        let cached = slot.as_ref()?;

        (self.clock.now() - cached.stored_at < self.ttl).then(|| cached.value.clone())
    }

    pub fn put(&self, value: T) -> Arc<T> {
        let value = Arc::new(value);
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = Some(Cached {
            stored_at: self.clock.now(),
            value: value.clone(),
        });
        value
    }

    pub fn invalidate(&self) {
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Returns the fresh cached value, or computes, stores and returns a new one.
    /// Errors are passed through and leave the cache untouched.
    pub async fn get_or_try_refresh<F, Fut, E>(&self, compute: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get() {
            tracing::debug!("Serving cached value");
            return Ok(value);
        }

        let value = compute().await?;
        Ok(self.put(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache(ttl_secs: i64) -> (TtlCache<u32>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        ));
        (TtlCache::new(Duration::seconds(ttl_secs), clock.clone()), clock)
    }

    #[tokio::test]
    async fn test_fresh_value_is_not_recomputed() {
        let (cache, clock) = cache(300);
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_try_refresh(|| async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>(7)
                })
                .await
                .unwrap();
            assert_eq!(*value, 7);
            clock.advance(Duration::seconds(60));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_value_is_recomputed() {
        let (cache, clock) = cache(300);
        cache.put(1);

        clock.advance(Duration::seconds(300));
        assert!(cache.get().is_none());

        let value = cache
            .get_or_try_refresh(|| async { Ok::<_, ()>(2) })
            .await
            .unwrap();
        assert_eq!(*value, 2);
    }

    #[tokio::test]
    async fn test_errors_keep_previous_state() {
        let (cache, _) = cache(300);

        let result = cache
            .get_or_try_refresh(|| async { Err::<u32, _>("upstream down") })
            .await;
        assert!(result.is_err());
        assert!(cache.get().is_none());

        cache.put(3);
        cache.invalidate();
        assert!(cache.get().is_none());
    }
}
