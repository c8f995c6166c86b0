//! Pool storage hooks on top of a plain key/value backend.
//!
//! Items are stored as an encoded `(exists, value, tags, expires_at)` payload
//! under their own key. Tag lists are ordinary entries whose value is the
//! encoded sequence of member keys.
//!
//! # Concurrency
//!
//! `append_list_item` and `remove_list_item` read the whole list, change it
//! and write it back. Two callers doing this at the same time race and the
//! last write wins, so a concurrently appended key can be lost. Nothing here
//! coordinates writers.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::traits::{Backend, BackendError};
use crate::pool::payload::{decode_entry, decode_list, encode_entry, encode_list};
use crate::pool::{CacheItem, CachedObject, PoolError, PoolStore};

/// Adapter implementing [`PoolStore`] for any [`Backend`].
///
/// Stateless per call; all durable state lives in the backend.
pub struct BackendAdapter<B> {
    /// The wrapped backend.
    backend: B,
}

impl<B: Backend> BackendAdapter<B> {
    /// Wrap `backend`.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Unwrap the backend.
    pub fn into_backend(self) -> B {
        self.backend
    }

    fn save_list(&self, name: &str, list: &[String]) -> Result<bool, PoolError> {
        let data = encode_list(list).map_err(|source| PoolError::Encode {
            key: name.to_string(),
            source,
        })?;
        Ok(self.backend.save(name, data, 0)?)
    }
}

impl<B: Backend> PoolStore for BackendAdapter<B> {
    fn fetch_object<V: DeserializeOwned>(&self, key: &str) -> Result<CachedObject<V>, PoolError> {
        // A record the backend itself cannot decode is as corrupt as a bad payload.
        let data = match self.backend.fetch(key) {
            Ok(Some(data)) => data,
            Ok(None) => return Ok(CachedObject::Miss),
            Err(BackendError::Codec(source)) => {
                return Err(PoolError::Corrupt {
                    key: key.to_string(),
                    source,
                })
            }
            Err(e) => return Err(e.into()),
        };

        decode_entry(&data).map_err(|source| PoolError::Corrupt {
            key: key.to_string(),
            source,
        })
    }

    fn clear_all_objects(&self) -> Result<bool, PoolError> {
        match self.backend.as_flushable() {
            Some(flushable) => Ok(flushable.flush_all()?),
            None => {
                debug!("Backend cannot flush, clear reports failure");
                Ok(false)
            }
        }
    }

    fn clear_one_object(&self, key: &str) -> Result<bool, PoolError> {
        Ok(self.backend.delete(key)?)
    }

    fn store_item<V: Serialize>(&self, item: &CacheItem<V>, ttl: Option<u64>) -> Result<bool, PoolError> {
        let ttl = ttl.unwrap_or(0);
        let data = encode_entry(item.get(), item.tags(), item.expiration_timestamp()).map_err(
            |source| PoolError::Encode {
                key: item.key().to_string(),
                source,
            },
        )?;

        let saved = self.backend.save(item.key(), data, ttl)?;
        if !saved {
            warn!(key = %item.key(), "Backend declined to store item");
        }
        Ok(saved)
    }

    fn get_list(&self, name: &str) -> Result<Vec<String>, PoolError> {
        let Some(data) = self.backend.fetch(name)? else {
            return Ok(Vec::new());
        };

        decode_list(&data).map_err(|source| PoolError::Corrupt {
            key: name.to_string(),
            source,
        })
    }

    fn remove_list(&self, name: &str) -> Result<bool, PoolError> {
        Ok(self.backend.delete(name)?)
    }

    fn append_list_item(&self, name: &str, key: &str) -> Result<bool, PoolError> {
        let mut list = self.get_list(name)?;
        list.push(key.to_string());
        self.save_list(name, &list)
    }

    fn remove_list_item(&self, name: &str, key: &str) -> Result<bool, PoolError> {
        let mut list = self.get_list(name)?;
        list.retain(|member| member != key);
        self.save_list(name, &list)
    }
}
