//! In-memory image cache.
//!
//! Holds raw encoded image bytes keyed by URL under a total-size budget.
//! Least recently used entries are evicted first. Entries are short-lived
//! and may be dropped at any time without data loss.

use bytes::Bytes;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;

/// Default size budget: 200 MiB.
pub const DEFAULT_CAPACITY_BYTES: u64 = 200 * 1024 * 1024;

struct CacheEntry {
    bytes: Bytes,
    /// Position in `CacheState::order`.
    tick: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    /// Access order, oldest first.
    order: BTreeMap<u64, String>,
    next_tick: u64,
    total_bytes: u64,
    /// Bumped by `clear`. Fetches started before a clear do not store.
    generation: u64,
}

impl CacheState {
    fn touch(&mut self, key: &str) -> Option<Bytes> {
        let tick = self.next_tick;
        let entry = self.entries.get_mut(key)?;
        self.order.remove(&entry.tick);
        entry.tick = tick;
        self.order.insert(tick, key.to_string());
        self.next_tick += 1;
        Some(entry.bytes.clone())
    }

    fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.order.remove(&entry.tick);
        self.total_bytes -= entry.bytes.len() as u64;
        Some(entry)
    }

    fn store(&mut self, key: &str, bytes: Bytes, capacity_bytes: u64) -> bool {
        let size = bytes.len() as u64;
        self.remove(key);

        if size > capacity_bytes {
            tracing::debug!(key, size, "Image larger than cache budget, not cached");
            return false;
        }

        while self.total_bytes + size > capacity_bytes {
            if !self.evict_oldest() {
                break;
            }
        }

        let tick = self.next_tick;
        self.next_tick += 1;
        self.order.insert(tick, key.to_string());
        self.entries.insert(key.to_string(), CacheEntry { bytes, tick });
        self.total_bytes += size;
        true
    }

    fn evict_oldest(&mut self) -> bool {
        let oldest = self.order.first_key_value().map(|(_, key)| key.clone());
        match oldest {
            Some(key) => {
                self.remove(&key);
                true
            }
            None => false,
        }
    }
}

/// Thread-safe, size-bounded LRU cache for image bytes.
pub struct ImageCache {
    state: Mutex<CacheState>,
    capacity_bytes: u64,
    /// One async lock per key currently being fetched.
    in_flight: DashMap<String, Arc<tokio::sync::Mutex<()>>>,
}

impl ImageCache {
    /// Create a cache holding at most `capacity_bytes` of image data.
    pub fn new(capacity_bytes: u64) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            capacity_bytes,
            in_flight: DashMap::new(),
        }
    }

    /// Get cached bytes, marking the entry as recently used.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.state.lock().touch(key)
    }

    /// Whether `key` is cached. Does not affect recency.
    pub fn contains(&self, key: &str) -> bool {
        self.state.lock().entries.contains_key(key)
    }

    /// Store `bytes` under `key`, replacing any previous value and evicting
    /// least recently used entries until the budget is met.
    ///
    /// Returns false when the value alone exceeds the budget; it is then not
    /// stored and any previous value for `key` is dropped.
    pub fn insert(&self, key: &str, bytes: Bytes) -> bool {
        self.state.lock().store(key, bytes, self.capacity_bytes)
    }

    /// Remove an entry from the cache.
    pub fn remove(&self, key: &str) -> Option<Bytes> {
        self.state.lock().remove(key).map(|entry| entry.bytes)
    }

    /// Clear all entries. Fetches already in flight still return their
    /// bytes to their callers but do not store them.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.order.clear();
        state.total_bytes = 0;
        state.generation += 1;
    }

    /// Get the number of cached entries.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes currently held.
    pub fn total_bytes(&self) -> u64 {
        self.state.lock().total_bytes
    }

    pub fn capacity_bytes(&self) -> u64 {
        self.capacity_bytes
    }

    /// Return the cached value for `key`, or run `fetch` and cache its result.
    ///
    /// Concurrent misses for the same key wait on one another, so only the
    /// first caller fetches; the rest read the value it stored. A failed
    /// fetch is not cached and the next waiter tries again.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<Bytes, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Bytes, E>>,
    {
        if let Some(bytes) = self.get(key) {
            tracing::debug!(key, "Image cache hit");
            return Ok(bytes);
        }

        let in_flight = InFlight::enter(&self.in_flight, key);
        let _guard = in_flight.lock.lock().await;
        if let Some(bytes) = self.get(key) {
            tracing::debug!(key, "Image fetched by concurrent caller");
            return Ok(bytes);
        }

        tracing::debug!(key, "Image cache miss");
        let generation = self.state.lock().generation;
        let result = fetch().await;
        if let Ok(bytes) = &result {
            let mut state = self.state.lock();
            if state.generation == generation {
                state.store(key, bytes.clone(), self.capacity_bytes);
            } else {
                tracing::debug!(key, "Cache cleared during fetch, not storing");
            }
        }
        result
    }
}

/// A caller's claim on a key's fetch lock. Dropping it, including when the
/// caller's future is cancelled, removes the lock once nobody else is queued
/// on it.
struct InFlight<'a> {
    map: &'a DashMap<String, Arc<tokio::sync::Mutex<()>>>,
    key: &'a str,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl<'a> InFlight<'a> {
    fn enter(map: &'a DashMap<String, Arc<tokio::sync::Mutex<()>>>, key: &'a str) -> Self {
        let lock = Arc::clone(&map.entry(key.to_string()).or_default());
        Self { map, key, lock }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        // One reference in the map, one here.
        self.map
            .remove_if(self.key, |_, l| Arc::strong_count(l) <= 2);
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY_BYTES)
    }
}
