//! Storage hooks the pool is built on.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{CacheItem, CachedObject, PoolError};

/// Storage hooks driven by [`TaggedPool`](super::TaggedPool).
///
/// The pool owns item semantics (validation, expiration, deferred saves, tag
/// bookkeeping); an implementor only translates these calls to its storage.
/// [`BackendAdapter`](crate::cache::BackendAdapter) implements them for any
/// [`Backend`](crate::cache::Backend).
///
/// Boolean results are the storage's own success report and are passed
/// through unchanged. None of the list operations are required to be atomic.
pub trait PoolStore {
    /// Load what is stored under `key`.
    ///
    /// A missing entry is [`CachedObject::Miss`]; an undecodable one is
    /// [`PoolError::Corrupt`].
    fn fetch_object<V: DeserializeOwned>(&self, key: &str) -> Result<CachedObject<V>, PoolError>;

    /// Remove everything. `Ok(false)` when the storage cannot do that.
    fn clear_all_objects(&self) -> Result<bool, PoolError>;

    /// Remove the entry under `key`.
    fn clear_one_object(&self, key: &str) -> Result<bool, PoolError>;

    /// Store `item` with a lifetime of `ttl` seconds; `None` means no expiration.
    fn store_item<V: Serialize>(&self, item: &CacheItem<V>, ttl: Option<u64>) -> Result<bool, PoolError>;

    /// The keys recorded in list `name`, empty if the list does not exist.
    fn get_list(&self, name: &str) -> Result<Vec<String>, PoolError>;

    /// Remove list `name`.
    fn remove_list(&self, name: &str) -> Result<bool, PoolError>;

    /// Append `key` to list `name`. Duplicates are not checked.
    fn append_list_item(&self, name: &str, key: &str) -> Result<bool, PoolError>;

    /// Remove every occurrence of `key` from list `name`.
    fn remove_list_item(&self, name: &str, key: &str) -> Result<bool, PoolError>;
}
