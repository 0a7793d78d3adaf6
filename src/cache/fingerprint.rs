//! Vector → query-text correlation cache.
//!
//! Bounded (strict LRU), time-expiring and shared by the embeddings and search handlers.
//! Every operation runs inside one `parking_lot` critical section that covers the expiry
//! sweep, the lookup and the mutation, and no lock is ever held across an `.await`.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use tracing::debug;

use super::types::{CacheEntry, CacheStats};
use crate::constants::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_SECS};
use crate::hashing::{Fingerprint, fingerprint_vector};
use crate::payload::preview;

struct CacheState {
    entries: LruCache<Fingerprint, CacheEntry>,
    hits: u64,
    misses: u64,
}

impl CacheState {
    /// Drops every entry older than `ttl`. Returns how many were removed.
    fn evict_expired(&mut self, now: Instant, ttl: Duration) -> usize {
        let expired: Vec<Fingerprint> = self
            .entries
            .iter()
            .filter(|(_, entry)| now.saturating_duration_since(entry.inserted_at) > ttl)
            .map(|(fingerprint, _)| *fingerprint)
            .collect();

        for fingerprint in &expired {
            self.entries.pop(fingerprint);
        }

        expired.len()
    }
}

/// Shared fingerprint cache. Wrap in an `Arc` at the composition root.
pub struct FingerprintCache {
    state: Mutex<CacheState>,
    capacity: usize,
    ttl: Duration,
}

impl FingerprintCache {
    /// Creates a cache with the default capacity (1000) and TTL (60s).
    pub fn new() -> Self {
        Self::with_limits(
            DEFAULT_CACHE_CAPACITY,
            Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        )
    }

    /// Creates a cache holding at most `capacity` entries (minimum 1), each living `ttl`.
    pub fn with_limits(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                hits: 0,
                misses: 0,
            }),
            capacity: capacity.get(),
            ttl,
        }
    }

    /// Records that `query_text` produced `vector`.
    ///
    /// Overwrites any entry with the same fingerprint and marks it most recently used. When
    /// the cache is full the least recently used entry is evicted.
    pub fn store(&self, vector: &[f64], query_text: impl Into<String>) {
        self.store_at(vector, query_text.into(), Instant::now());
    }

    /// Returns the query text correlated with `vector`, if a live entry exists.
    pub fn get(&self, vector: &[f64]) -> Option<String> {
        self.get_at(vector, Instant::now())
    }

    /// Returns occupancy and hit/miss counters.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        let lookups = state.hits + state.misses;
        let hit_rate = if lookups > 0 {
            state.hits as f64 / lookups as f64
        } else {
            0.0
        };

        CacheStats {
            size: state.entries.len(),
            capacity: self.capacity,
            ttl_seconds: self.ttl.as_secs(),
            hits: state.hits,
            misses: state.misses,
            hit_rate,
        }
    }

    pub(crate) fn store_at(&self, vector: &[f64], query_text: String, now: Instant) {
        let fingerprint = fingerprint_vector(vector);
        let mut state = self.state.lock();

        let expired = state.evict_expired(now, self.ttl);
        if expired > 0 {
            debug!(evicted = expired, "Evicted expired cache entries");
        }

        let query = preview(&query_text).into_owned();
        let entry = CacheEntry {
            fingerprint,
            query_text,
            inserted_at: now,
        };

        if let Some((evicted, _)) = state.entries.push(fingerprint, entry)
            && evicted != fingerprint
        {
            debug!(
                capacity = self.capacity,
                fingerprint = %evicted,
                "LRU eviction triggered"
            );
        }

        debug!(%query, size = state.entries.len(), "Cached query");
    }

    pub(crate) fn get_at(&self, vector: &[f64], now: Instant) -> Option<String> {
        let fingerprint = fingerprint_vector(vector);
        let mut state = self.state.lock();

        state.evict_expired(now, self.ttl);

        let text = state
            .entries
            .get(&fingerprint)
            .map(|entry| entry.query_text.clone());

        match text {
            Some(text) => {
                state.hits += 1;
                debug!(hits = state.hits, misses = state.misses, "Cache hit");
                Some(text)
            }
            None => {
                state.misses += 1;
                debug!(hits = state.hits, misses = state.misses, "Cache miss");
                None
            }
        }
    }

    /// Returns the number of entries, including ones that expired but were not swept yet.
    #[inline]
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Returns `true` if the cache holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the configured capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the configured TTL.
    #[inline]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for FingerprintCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FingerprintCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FingerprintCache")
            .field("entries", &self.len())
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .finish()
    }
}
