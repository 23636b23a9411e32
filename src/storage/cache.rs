use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::utils::Clock;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    payload: V,
    stored_at: DateTime<Local>,
}

/// String-keyed map whose entries go stale once they are older than the TTL.
///
/// Stale entries are not evicted on read; they are simply reported as misses and overwritten by
/// the next `put`.
pub struct ExpiringCache<V> {
    name: &'static str,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> ExpiringCache<V> {
    pub fn new(name: &'static str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            name,
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let entries = self.lock();
        let entry = entries.get(key)?;
        // A negative age means the clock moved backwards; keep serving the entry.
        let fresh = (now - entry.stored_at)
            .to_std()
            .map(|age| age < self.ttl)
            .unwrap_or(true);

        if fresh {
            log::debug!("{} cache hit for `{}`", self.name, key);
            Some(entry.payload.clone())
        } else {
            log::debug!("{} cache entry for `{}` expired", self.name, key);
            None
        }
    }

    pub fn put(&self, key: impl Into<String>, payload: V) {
        let entry = CacheEntry {
            payload,
            stored_at: self.clock.now(),
        };
        self.lock().insert(key.into(), entry);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ManualClock;

    fn cache_with_clock(ttl_secs: u64) -> (ExpiringCache<f64>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let cache = ExpiringCache::new("test", Duration::from_secs(ttl_secs), clock.clone());
        (cache, clock)
    }

    #[test]
    fn serves_entries_within_ttl() {
        let (cache, clock) = cache_with_clock(60);
        cache.put("AAPL", 189.5);

        clock.advance(chrono::Duration::seconds(59));
        assert_eq!(cache.get("AAPL"), Some(189.5));
        assert_eq!(cache.get("MSFT"), None);
    }

    #[test]
    fn reports_miss_once_ttl_elapses() {
        let (cache, clock) = cache_with_clock(60);
        cache.put("AAPL", 189.5);

        clock.advance(chrono::Duration::seconds(60));
        assert_eq!(cache.get("AAPL"), None);
        assert_eq!(cache.len(), 1);

        cache.put("AAPL", 190.0);
        assert_eq!(cache.get("AAPL"), Some(190.0));
    }

    #[test]
    fn clear_drops_everything() {
        let (cache, _clock) = cache_with_clock(300);
        cache.put("a", 1.0);
        cache.put("b", 2.0);
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }
}
