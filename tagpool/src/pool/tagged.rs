//! The pool implementation.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::key::{tag_key, validate_key, validate_tag};
use super::{CacheItem, PoolError, PoolStore};
use crate::cache::{Backend, BackendAdapter};

fn now() -> i64 {
    Utc::now().timestamp()
}

/// Cache pool with tag support over a [`PoolStore`].
///
/// All methods take `&self`; the pool can be shared between threads when the
/// store can. Deferred items are kept in memory until [`commit`](Self::commit)
/// or until the pool is dropped.
pub struct TaggedPool<S, V>
where
    S: PoolStore,
    V: Serialize + DeserializeOwned + Clone,
{
    store: S,

    /// Items queued by `save_deferred`, keyed by cache key.
    deferred: Mutex<HashMap<String, CacheItem<V>>>,
}

impl<B, V> TaggedPool<BackendAdapter<B>, V>
where
    B: Backend,
    V: Serialize + DeserializeOwned + Clone,
{
    /// Create a pool directly on top of a backend.
    pub fn with_backend(backend: B) -> Self {
        Self::new(BackendAdapter::new(backend))
    }

    /// The backend under the adapter.
    pub fn backend(&self) -> &B {
        self.store.backend()
    }
}

impl<S, V> TaggedPool<S, V>
where
    S: PoolStore,
    V: Serialize + DeserializeOwned + Clone,
{
    /// Create a pool driving `store`.
    pub fn new(store: S) -> Self {
        Self {
            store,
            deferred: Mutex::new(HashMap::new()),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Look up `key`.
    ///
    /// Deferred items are returned before anything stored. An item whose
    /// expiration has passed is a miss.
    pub fn get_item(&self, key: &str) -> Result<CacheItem<V>, PoolError> {
        validate_key(key)?;
        let now = now();

        if let Some(pending) = self.deferred.lock().get(key) {
            let mut item = pending.clone();
            item.set_hit(!item.is_expired_at(now));
            return Ok(item);
        }

        let object = self.store.fetch_object::<V>(key)?;
        let item = CacheItem::from_cached(key.to_string(), object, now);
        debug!(key = %key, hit = item.is_hit(), "Pool lookup");
        Ok(item)
    }

    /// Look up several keys, in order.
    pub fn get_items<I, K>(&self, keys: I) -> Result<Vec<CacheItem<V>>, PoolError>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        keys.into_iter()
            .map(|key| self.get_item(key.as_ref()))
            .collect()
    }

    /// Whether a live item exists for `key`.
    pub fn has_item(&self, key: &str) -> Result<bool, PoolError> {
        Ok(self.get_item(key)?.is_hit())
    }

    /// Persist `item` now.
    ///
    /// An item whose expiration is not in the future is deleted instead.
    /// Tag lists are updated for tags added or removed since the item was
    /// loaded or last saved. On success the item remembers its tags as
    /// stored.
    pub fn save(&self, item: &mut CacheItem<V>) -> Result<bool, PoolError> {
        validate_key(item.key())?;
        self.deferred.lock().remove(item.key());

        let ttl = match item.expiration_timestamp() {
            Some(ts) => {
                let remaining = ts.saturating_sub(now());
                if remaining <= 0 {
                    debug!(key = %item.key(), "Item already expired, deleting instead of saving");
                    let deleted = self.remove_object(item.key())?;
                    item.mark_removed();
                    return Ok(deleted);
                }
                Some(remaining as u64)
            }
            None => None,
        };

        let previous = match item.previous_tags() {
            Some(tags) => tags.clone(),
            None => self.stored_tags(item.key())?,
        };

        // Link new tags before storing, unlink dropped ones only once stored.
        for tag in item.tags().difference(&previous) {
            self.append_to_tag(tag, item.key())?;
        }

        let stored = self.store.store_item(item, ttl)?;
        if !stored {
            return Ok(false);
        }

        for tag in previous.difference(item.tags()) {
            self.remove_from_tag(tag, item.key())?;
        }
        item.mark_stored();
        Ok(true)
    }

    /// Queue `item` to be saved on [`commit`](Self::commit).
    pub fn save_deferred(&self, item: CacheItem<V>) -> Result<bool, PoolError> {
        validate_key(item.key())?;
        self.deferred.lock().insert(item.key().to_string(), item);
        Ok(true)
    }

    /// Number of items waiting for [`commit`](Self::commit).
    pub fn deferred_count(&self) -> usize {
        self.deferred.lock().len()
    }

    /// Save every deferred item.
    ///
    /// Returns `true` only if all of them were stored. Failures are logged
    /// and the remaining items are still attempted.
    pub fn commit(&self) -> bool {
        let pending: Vec<CacheItem<V>> = self
            .deferred
            .lock()
            .drain()
            .map(|(_, item)| item)
            .collect();

        let mut success = true;
        for mut item in pending {
            match self.save(&mut item) {
                Ok(saved) => success &= saved,
                Err(e) => {
                    warn!(key = %item.key(), error = %e, "Deferred save failed");
                    success = false;
                }
            }
        }
        success
    }

    /// Delete `key`, including its tag list memberships.
    pub fn delete_item(&self, key: &str) -> Result<bool, PoolError> {
        validate_key(key)?;
        self.remove_object(key)
    }

    /// Delete several keys. All keys are validated before anything is deleted.
    pub fn delete_items<I, K>(&self, keys: I) -> Result<bool, PoolError>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let keys: Vec<K> = keys.into_iter().collect();
        for key in &keys {
            validate_key(key.as_ref())?;
        }

        let mut success = true;
        for key in &keys {
            success &= self.remove_object(key.as_ref())?;
        }
        Ok(success)
    }

    /// Drop deferred items and everything in the store.
    ///
    /// `false` when the store cannot clear everything.
    pub fn clear(&self) -> Result<bool, PoolError> {
        self.deferred.lock().clear();
        self.store.clear_all_objects()
    }

    /// Delete every item saved with `tag`.
    pub fn invalidate_tag(&self, tag: &str) -> Result<bool, PoolError> {
        self.invalidate_tags([tag])
    }

    /// Delete every item saved with any of `tags`, then the tag lists.
    ///
    /// Deferred items carrying one of the tags are dropped as well. A tag
    /// list is kept while any of its keys could not be deleted.
    pub fn invalidate_tags<I, T>(&self, tags: I) -> Result<bool, PoolError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let tags: Vec<T> = tags.into_iter().collect();
        for tag in &tags {
            validate_tag(tag.as_ref())?;
        }

        let mut success = true;
        for tag in &tags {
            let tag = tag.as_ref();
            let list_key = tag_key(tag);
            let keys = self.store.get_list(&list_key)?;
            debug!(tag = %tag, keys = keys.len(), "Invalidating tag");

            let mut all_removed = true;
            for key in &keys {
                all_removed &= self.remove_object(key)?;
            }
            self.deferred
                .lock()
                .retain(|_, item| !item.tags().contains(tag));

            if all_removed {
                success &= self.store.remove_list(&list_key)?;
            } else {
                warn!(tag = %tag, "Keeping tag list, some keys could not be deleted");
                success = false;
            }
        }
        Ok(success)
    }

    /// Keys recorded under `tag`, in insertion order.
    pub fn tagged_keys(&self, tag: &str) -> Result<Vec<String>, PoolError> {
        validate_tag(tag)?;
        self.store.get_list(&tag_key(tag))
    }

    /// The value stored under `key`, if it is a hit.
    pub fn get_value(&self, key: &str) -> Result<Option<V>, PoolError> {
        let item = self.get_item(key)?;
        if item.is_hit() {
            Ok(item.into_value())
        } else {
            Ok(None)
        }
    }

    /// Store `value` under `key`, keeping the tags already stored with it.
    ///
    /// `ttl` of `None` means no expiration.
    pub fn set_value(&self, key: &str, value: V, ttl: Option<Duration>) -> Result<bool, PoolError> {
        let mut item = self.get_item(key)?;
        item.set(value).expires_after(ttl);
        self.save(&mut item)
    }

    /// Delete the stored entry for `key` and its tag list memberships.
    ///
    /// Memberships stay in place when the store keeps the entry.
    fn remove_object(&self, key: &str) -> Result<bool, PoolError> {
        self.deferred.lock().remove(key);
        let tags = self.stored_tags(key)?;
        if !self.store.clear_one_object(key)? {
            return Ok(false);
        }
        for tag in &tags {
            self.remove_from_tag(tag, key)?;
        }
        Ok(true)
    }

    /// Tags currently stored with `key`. A corrupt entry has none.
    fn stored_tags(&self, key: &str) -> Result<BTreeSet<String>, PoolError> {
        match self.store.fetch_object::<V>(key) {
            Ok(object) => Ok(object.into_tags()),
            Err(PoolError::Corrupt { source, .. }) => {
                warn!(key = %key, error = %source, "Ignoring tags of corrupt entry");
                Ok(BTreeSet::new())
            }
            Err(e) => Err(e),
        }
    }

    fn append_to_tag(&self, tag: &str, key: &str) -> Result<(), PoolError> {
        if !self.store.append_list_item(&tag_key(tag), key)? {
            warn!(key = %key, tag = %tag, "Backend declined tag list append");
        }
        Ok(())
    }

    fn remove_from_tag(&self, tag: &str, key: &str) -> Result<(), PoolError> {
        if !self.store.remove_list_item(&tag_key(tag), key)? {
            warn!(key = %key, tag = %tag, "Backend declined tag list removal");
        }
        Ok(())
    }
}

impl<S, V> Drop for TaggedPool<S, V>
where
    S: PoolStore,
    V: Serialize + DeserializeOwned + Clone,
{
    fn drop(&mut self) {
        if self.deferred.get_mut().is_empty() {
            return;
        }
        if !self.commit() {
            warn!("Some deferred items could not be saved when the pool was dropped");
        }
    }
}
