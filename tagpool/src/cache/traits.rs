//! Core traits for key/value cache backends.
//!
//! The `Backend` trait is the minimal surface a storage library has to offer
//! for a [`TaggedPool`](crate::pool::TaggedPool) to run on top of it. It knows
//! nothing about items, tags or expiration timestamps; those live in the
//! adapter layer.
//!
//! # Design Principles
//!
//! - **String keys**: Human-readable for debugging, flexible for any domain
//! - **Vec<u8> values**: Raw bytes, the adapter owns the payload encoding
//! - **Boolean results**: `save`/`delete`/`flush_all` report success the way
//!   classic cache libraries do; I/O failures are errors, not `false`
//! - **Optional capabilities**: flushing is exposed through
//!   [`Backend::as_flushable`] instead of being required of every backend
//! - **Dyn-compatible**: backends can be used as `Box<dyn Backend>`
//!
//! # Example
//!
//! ```ignore
//! use tagpool::cache::{Backend, MemoryBackend};
//!
//! let backend = MemoryBackend::new(64 * 1024 * 1024);
//! backend.save("key", vec![1, 2, 3], 0)?;
//! assert_eq!(backend.fetch("key")?, Some(vec![1, 2, 3]));
//! ```

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur inside a backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// I/O error during cache operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A backend-private record could not be encoded or decoded.
    #[error("Record codec error: {0}")]
    Codec(#[from] bincode::Error),

    /// Key exceeds maximum allowed size.
    #[error("Key too large: {size} bytes (max: {max})")]
    KeyTooLarge { size: usize, max: usize },

    /// Provider-specific error.
    #[error("Provider error: {0}")]
    Provider(String),
}

/// Usage statistics reported by a backend.
///
/// Mirrors the optional statistics classic cache libraries expose; backends
/// that cannot count something report zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendStats {
    /// Number of fetches that found a live entry.
    pub hits: u64,
    /// Number of fetches that found nothing.
    pub misses: u64,
    /// Number of entries currently stored.
    pub entry_count: u64,
    /// Approximate stored size in bytes.
    pub size_bytes: u64,
}

impl BackendStats {
    /// Fraction of fetches that were hits (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl fmt::Display for BackendStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entries, {} bytes, {} hits / {} misses",
            self.entry_count, self.size_bytes, self.hits, self.misses
        )
    }
}

/// Generic key/value cache backend.
///
/// # Time To Live
///
/// `save` takes a lifetime in whole seconds. A lifetime of `0` means the
/// entry never expires. Expiration is enforced by the backend: once the
/// lifetime has elapsed `fetch` must report a miss.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. No operation is required to be
/// atomic with respect to another; callers that read, modify and write back
/// an entry race with each other.
pub trait Backend: Send + Sync {
    /// Fetch the raw bytes stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(data))` if a live entry exists
    /// - `Ok(None)` if the key is not found or has expired
    /// - `Err(_)` if an error occurs
    fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError>;

    /// Store `data` under `key`, replacing any existing entry.
    ///
    /// # Arguments
    ///
    /// * `key` - The cache key
    /// * `data` - The bytes to store
    /// * `ttl_secs` - Lifetime in seconds, `0` for no expiration
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the entry was stored, `Ok(false)` if the backend declined.
    fn save(&self, key: &str, data: Vec<u8>, ttl_secs: u64) -> Result<bool, BackendError>;

    /// Delete the entry under `key`.
    ///
    /// Deleting a key that does not exist is a success.
    fn delete(&self, key: &str) -> Result<bool, BackendError>;

    /// Check if a live entry exists for `key`.
    fn contains(&self, key: &str) -> Result<bool, BackendError> {
        Ok(self.fetch(key)?.is_some())
    }

    /// Usage statistics, if the backend tracks them.
    fn stats(&self) -> Option<BackendStats> {
        None
    }

    /// The flush capability, for backends that can drop every entry at once.
    fn as_flushable(&self) -> Option<&dyn Flushable> {
        None
    }
}

/// Capability of removing every entry of a backend in one call.
pub trait Flushable: Send + Sync {
    /// Remove all entries.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the backend is now empty.
    fn flush_all(&self) -> Result<bool, BackendError>;
}

impl<B: Backend + ?Sized> Backend for &B {
    fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        (**self).fetch(key)
    }

    fn save(&self, key: &str, data: Vec<u8>, ttl_secs: u64) -> Result<bool, BackendError> {
        (**self).save(key, data, ttl_secs)
    }

    fn delete(&self, key: &str) -> Result<bool, BackendError> {
        (**self).delete(key)
    }

    fn contains(&self, key: &str) -> Result<bool, BackendError> {
        (**self).contains(key)
    }

    fn stats(&self) -> Option<BackendStats> {
        (**self).stats()
    }

    fn as_flushable(&self) -> Option<&dyn Flushable> {
        (**self).as_flushable()
    }
}

impl<B: Backend + ?Sized> Backend for Arc<B> {
    fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        (**self).fetch(key)
    }

    fn save(&self, key: &str, data: Vec<u8>, ttl_secs: u64) -> Result<bool, BackendError> {
        (**self).save(key, data, ttl_secs)
    }

    fn delete(&self, key: &str) -> Result<bool, BackendError> {
        (**self).delete(key)
    }

    fn contains(&self, key: &str) -> Result<bool, BackendError> {
        (**self).contains(key)
    }

    fn stats(&self) -> Option<BackendStats> {
        (**self).stats()
    }

    fn as_flushable(&self) -> Option<&dyn Flushable> {
        (**self).as_flushable()
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        (**self).fetch(key)
    }

    fn save(&self, key: &str, data: Vec<u8>, ttl_secs: u64) -> Result<bool, BackendError> {
        (**self).save(key, data, ttl_secs)
    }

    fn delete(&self, key: &str) -> Result<bool, BackendError> {
        (**self).delete(key)
    }

    fn contains(&self, key: &str) -> Result<bool, BackendError> {
        (**self).contains(key)
    }

    fn stats(&self) -> Option<BackendStats> {
        (**self).stats()
    }

    fn as_flushable(&self) -> Option<&dyn Flushable> {
        (**self).as_flushable()
    }
}
