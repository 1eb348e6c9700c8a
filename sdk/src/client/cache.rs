//! TTL-checked cache cell.
//!
//! A small explicit cache value object: value plus fetch timestamp,
//! checked against a time-to-live on every read. Used for the recent
//! blockhash, which stays valid for a short window between submissions.

use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Entry<T> {
    value: T,
    fetched_at: Instant,
}

/// A single cached value with a time-to-live.
pub struct Cached<T> {
    entry: Mutex<Option<Entry<T>>>,
    ttl: Duration,
}

impl<T: Clone> Cached<T> {
    /// Creates an empty cache cell with the given time-to-live.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entry: Mutex::new(None),
            ttl,
        }
    }

    /// Returns the cached value if it is still fresh.
    #[must_use]
    pub fn get(&self) -> Option<T> {
        let guard = self.entry.lock().ok()?;
        let entry = guard.as_ref()?;
        if entry.fetched_at.elapsed() < self.ttl {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Stores a freshly fetched value.
    pub fn put(&self, value: T) {
        if let Ok(mut guard) = self.entry.lock() {
            *guard = Some(Entry {
                value,
                fetched_at: Instant::now(),
            });
        }
    }

    /// Drops the cached value.
    pub fn invalidate(&self) {
        if let Ok(mut guard) = self.entry.lock() {
            *guard = None;
        }
    }
}

impl<T> std::fmt::Debug for Cached<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cached").field("ttl", &self.ttl).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_empty() {
        let cache: Cached<u64> = Cached::new(Duration::from_secs(10));
        assert_eq!(cache.get(), None);
    }

    #[test]
    fn test_cached_put_get() {
        let cache = Cached::new(Duration::from_secs(10));
        cache.put(42u64);
        assert_eq!(cache.get(), Some(42));
    }

    #[test]
    fn test_cached_expired() {
        let cache = Cached::new(Duration::ZERO);
        cache.put(42u64);
        assert_eq!(cache.get(), None);
    }

    #[test]
    fn test_cached_invalidate() {
        let cache = Cached::new(Duration::from_secs(10));
        cache.put(42u64);
        cache.invalidate();
        assert_eq!(cache.get(), None);
    }
}
