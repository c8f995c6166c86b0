//! In-memory backend using moka.
//!
//! This provider wraps `moka::sync::Cache` to provide a thread-safe,
//! size-bounded in-memory backend with per-entry expiration.
//!
//! # Expiration
//!
//! Every entry carries the lifetime it was saved with. A custom [`Expiry`]
//! hands that lifetime to moka on insert and again on overwrite, so a key
//! re-saved with a different TTL picks up the new one. A lifetime of zero
//! never expires.
//!
//! # Eviction
//!
//! Entries are weighed by their byte size and moka evicts once the total
//! exceeds the configured capacity. Eviction and expiry are eventually
//! consistent; [`MemoryBackend::run_pending_tasks`] forces maintenance.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::sync::Cache as MokaCache;
use moka::Expiry;

use crate::cache::traits::{Backend, BackendError, BackendStats, Flushable};

/// A stored value together with the lifetime it was saved with.
struct MemoryEntry {
    data: Vec<u8>,
    ttl: Option<Duration>,
}

impl MemoryEntry {
    fn new(data: Vec<u8>, ttl_secs: u64) -> Self {
        let ttl = (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs));
        Self { data, ttl }
    }
}

/// Per-entry expiry policy driven by the saved lifetime.
struct EntryExpiry;

impl Expiry<String, Arc<MemoryEntry>> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Arc<MemoryEntry>,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Arc<MemoryEntry>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// In-memory backend using moka.
///
/// Safe to share across threads. Supports the flush capability.
pub struct MemoryBackend {
    /// The underlying moka cache.
    cache: MokaCache<String, Arc<MemoryEntry>>,

    /// Maximum size in bytes.
    max_size_bytes: u64,

    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryBackend {
    /// Create a new memory backend.
    ///
    /// # Arguments
    ///
    /// * `max_size_bytes` - Maximum total size of stored values in bytes
    pub fn new(max_size_bytes: u64) -> Self {
        let cache = MokaCache::builder()
            // Weight each entry by its data size
            .weigher(|_key: &String, value: &Arc<MemoryEntry>| -> u32 {
                // moka uses u32 for weights, cap at u32::MAX for very large entries
                value.data.len().min(u32::MAX as usize) as u32
            })
            .max_capacity(max_size_bytes)
            .expire_after(EntryExpiry)
            .build();

        Self {
            cache,
            max_size_bytes,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Get the maximum configured size in bytes.
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    /// Run pending eviction and expiration work.
    pub fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks();
    }
}

impl Backend for MemoryBackend {
    fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        match self.cache.get(key) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(Some(entry.data.clone()))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    fn save(&self, key: &str, data: Vec<u8>, ttl_secs: u64) -> Result<bool, BackendError> {
        self.cache
            .insert(key.to_string(), Arc::new(MemoryEntry::new(data, ttl_secs)));
        Ok(true)
    }

    fn delete(&self, key: &str) -> Result<bool, BackendError> {
        self.cache.invalidate(key);
        Ok(true)
    }

    fn contains(&self, key: &str) -> Result<bool, BackendError> {
        Ok(self.cache.contains_key(key))
    }

    fn stats(&self) -> Option<BackendStats> {
        Some(BackendStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count: self.cache.entry_count(),
            size_bytes: self.cache.weighted_size(),
        })
    }

    fn as_flushable(&self) -> Option<&dyn Flushable> {
        Some(self)
    }
}

impl Flushable for MemoryBackend {
    fn flush_all(&self) -> Result<bool, BackendError> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks();
        Ok(true)
    }
}
