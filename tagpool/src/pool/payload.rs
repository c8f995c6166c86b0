//! Stored payload encoding.
//!
//! An item is stored as the bincode encoding of the tuple
//! `(exists, value, tags, expires_at)`. `exists` is always `true` on disk;
//! a record carrying `false` decodes to [`CachedObject::Miss`]. Tag lists are
//! stored as a bincode sequence of keys.

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// What the backend holds for a key.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedObject<V> {
    /// Nothing is stored under the key.
    Miss,
    /// A stored item.
    Found {
        /// The stored value; `None` when an item was saved without one.
        value: Option<V>,
        /// Tags the item was saved with.
        tags: BTreeSet<String>,
        /// Unix timestamp (seconds) after which the item is stale.
        expires_at: Option<i64>,
    },
}

impl<V> CachedObject<V> {
    /// Whether something was stored.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// The stored tags, empty on a miss.
    pub fn into_tags(self) -> BTreeSet<String> {
        match self {
            Self::Miss => BTreeSet::new(),
            Self::Found { tags, .. } => tags,
        }
    }
}

/// Encode a stored item.
pub(crate) fn encode_entry<V: Serialize>(
    value: Option<&V>,
    tags: &BTreeSet<String>,
    expires_at: Option<i64>,
) -> Result<Vec<u8>, bincode::Error> {
    bincode::serialize(&(true, value, tags, expires_at))
}

/// Decode a stored item.
pub(crate) fn decode_entry<V: DeserializeOwned>(bytes: &[u8]) -> Result<CachedObject<V>, bincode::Error> {
    let (exists, value, tags, expires_at): (bool, Option<V>, BTreeSet<String>, Option<i64>) =
        bincode::deserialize(bytes)?;

    if !exists {
        return Ok(CachedObject::Miss);
    }
    Ok(CachedObject::Found {
        value,
        tags,
        expires_at,
    })
}

/// Encode a tag list.
pub(crate) fn encode_list(keys: &[String]) -> Result<Vec<u8>, bincode::Error> {
    bincode::serialize(keys)
}

/// Decode a tag list.
pub(crate) fn decode_list(bytes: &[u8]) -> Result<Vec<String>, bincode::Error> {
    bincode::deserialize(bytes)
}
