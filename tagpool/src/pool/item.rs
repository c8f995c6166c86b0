//! Cache items handed out and accepted by the pool.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::key::validate_tag;
use super::payload::CachedObject;
use super::PoolError;

/// A single cache entry as seen by pool callers.
///
/// Items are obtained from [`TaggedPool::get_item`](super::TaggedPool::get_item)
/// or created with [`CacheItem::new`], modified, and handed back to
/// [`TaggedPool::save`](super::TaggedPool::save).
#[derive(Debug, Clone, PartialEq)]
pub struct CacheItem<V> {
    key: String,
    value: Option<V>,
    hit: bool,
    tags: BTreeSet<String>,
    /// Tags currently recorded in the backend for this key, if known.
    previous_tags: Option<BTreeSet<String>>,
    expires_at: Option<i64>,
}

impl<V> CacheItem<V> {
    /// Create an empty, unsaved item for `key`.
    ///
    /// The key is validated when the item reaches the pool.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
            hit: false,
            tags: BTreeSet::new(),
            previous_tags: None,
            expires_at: None,
        }
    }

    /// Create an unsaved item holding `value`.
    pub fn with_value(key: impl Into<String>, value: V) -> Self {
        let mut item = Self::new(key);
        item.value = Some(value);
        item
    }

    /// Build an item from what the backend returned.
    ///
    /// An object whose expiration is at or before `now` is a miss but keeps
    /// its stored tags as previous tags, so a later save can clean them up.
    pub(crate) fn from_cached(key: String, object: CachedObject<V>, now: i64) -> Self {
        match object {
            CachedObject::Miss => Self {
                previous_tags: Some(BTreeSet::new()),
                ..Self::new(key)
            },
            CachedObject::Found {
                value,
                tags,
                expires_at,
            } => {
                let expired = expires_at.is_some_and(|ts| ts <= now);
                if expired {
                    Self {
                        previous_tags: Some(tags),
                        ..Self::new(key)
                    }
                } else {
                    Self {
                        key,
                        value,
                        hit: true,
                        previous_tags: Some(tags.clone()),
                        tags,
                        expires_at,
                    }
                }
            }
        }
    }

    /// The cache key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The value, if one is set.
    pub fn get(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// Consume the item and return its value.
    pub fn into_value(self) -> Option<V> {
        self.value
    }

    /// Set the value.
    pub fn set(&mut self, value: V) -> &mut Self {
        self.value = Some(value);
        self
    }

    /// Whether the lookup that produced this item found a live entry.
    pub fn is_hit(&self) -> bool {
        self.hit
    }

    pub(crate) fn set_hit(&mut self, hit: bool) {
        self.hit = hit;
    }

    /// Expire at an absolute point in time, or never with `None`.
    pub fn expires_at(&mut self, at: Option<DateTime<Utc>>) -> &mut Self {
        self.expires_at = at.map(|at| at.timestamp());
        self
    }

    /// Expire after `ttl` from now, or never with `None`.
    pub fn expires_after(&mut self, ttl: Option<Duration>) -> &mut Self {
        self.expires_at = ttl.map(|ttl| {
            let secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
            Utc::now().timestamp().saturating_add(secs)
        });
        self
    }

    /// Unix timestamp (seconds) at which the item goes stale.
    pub fn expiration_timestamp(&self) -> Option<i64> {
        self.expires_at
    }

    /// Whether the item is stale at unix time `now`.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|ts| ts <= now)
    }

    /// Tags the item will be saved with.
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Tags recorded in the backend when this item was loaded or last saved.
    ///
    /// `None` for items created with [`CacheItem::new`] that were never saved.
    pub fn previous_tags(&self) -> Option<&BTreeSet<String>> {
        self.previous_tags.as_ref()
    }

    /// Add one tag.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> Result<&mut Self, PoolError> {
        let tag = tag.into();
        validate_tag(&tag)?;
        self.tags.insert(tag);
        Ok(self)
    }

    /// Add several tags.
    pub fn add_tags<I, T>(&mut self, tags: I) -> Result<&mut Self, PoolError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        for tag in tags {
            self.add_tag(tag)?;
        }
        Ok(self)
    }

    /// Replace all tags. Nothing changes if any tag is invalid.
    pub fn set_tags<I, T>(&mut self, tags: I) -> Result<&mut Self, PoolError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let tags = tags.into_iter().map(Into::into).collect::<BTreeSet<String>>();
        for tag in &tags {
            validate_tag(tag)?;
        }
        self.tags = tags;
        Ok(self)
    }

    /// Remove one tag.
    pub fn remove_tag(&mut self, tag: &str) -> &mut Self {
        self.tags.remove(tag);
        self
    }

    /// Record that the backend now holds this item's current tags.
    pub(crate) fn mark_stored(&mut self) {
        self.previous_tags = Some(self.tags.clone());
    }

    /// Record that the backend no longer holds anything for this key.
    pub(crate) fn mark_removed(&mut self) {
        self.previous_tags = Some(BTreeSet::new());
        self.hit = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_item_is_miss_without_history() {
        let item: CacheItem<String> = CacheItem::new("k");
        assert_eq!(item.key(), "k");
        assert!(!item.is_hit());
        assert!(item.get().is_none());
        assert!(item.previous_tags().is_none());
        assert!(item.expiration_timestamp().is_none());
    }

    #[test]
    fn test_from_cached_found() {
        let object = CachedObject::Found {
            value: Some(7u32),
            tags: tags(&["a"]),
            expires_at: Some(2_000),
        };
        let item = CacheItem::from_cached("k".to_string(), object, 1_000);

        assert!(item.is_hit());
        assert_eq!(item.get(), Some(&7));
        assert_eq!(item.tags(), &tags(&["a"]));
        assert_eq!(item.previous_tags(), Some(&tags(&["a"])));
        assert_eq!(item.expiration_timestamp(), Some(2_000));
    }

    #[test]
    fn test_from_cached_expired_is_miss_with_previous_tags() {
        let object = CachedObject::Found {
            value: Some(7u32),
            tags: tags(&["a"]),
            expires_at: Some(1_000),
        };
        let item = CacheItem::from_cached("k".to_string(), object, 1_000);

        assert!(!item.is_hit());
        assert!(item.get().is_none());
        assert!(item.tags().is_empty());
        assert_eq!(item.previous_tags(), Some(&tags(&["a"])));
    }

    #[test]
    fn test_from_cached_miss_knows_nothing_is_stored() {
        let item = CacheItem::<u32>::from_cached("k".to_string(), CachedObject::Miss, 0);
        assert!(!item.is_hit());
        assert_eq!(item.previous_tags(), Some(&BTreeSet::new()));
    }

    #[test]
    fn test_expires_after() {
        let mut item = CacheItem::with_value("k", 1u8);
        let before = Utc::now().timestamp();
        item.expires_after(Some(Duration::from_secs(60)));

        let ts = item.expiration_timestamp().unwrap();
        assert!(ts >= before + 60 && ts <= before + 61);
        assert!(!item.is_expired_at(before));
        assert!(item.is_expired_at(ts));

        item.expires_after(None);
        assert!(item.expiration_timestamp().is_none());
    }

    #[test]
    fn test_expires_at() {
        let mut item = CacheItem::with_value("k", 1u8);
        let at = DateTime::<Utc>::from_timestamp(1_800_000_000, 0).unwrap();
        item.expires_at(Some(at));
        assert_eq!(item.expiration_timestamp(), Some(1_800_000_000));
    }

    #[test]
    fn test_tag_editing() {
        let mut item = CacheItem::with_value("k", 1u8);
        item.add_tag("a").unwrap().add_tags(["b", "c"]).unwrap();
        assert_eq!(item.tags(), &tags(&["a", "b", "c"]));

        item.remove_tag("b");
        assert_eq!(item.tags(), &tags(&["a", "c"]));

        item.set_tags(["z"]).unwrap();
        assert_eq!(item.tags(), &tags(&["z"]));
    }

    #[test]
    fn test_invalid_tag_rejected_without_partial_update() {
        let mut item = CacheItem::with_value("k", 1u8);
        item.add_tag("keep").unwrap();

        assert!(item.add_tag("bad:tag").is_err());
        assert!(item.set_tags(["ok", "bad/tag"]).is_err());
        assert_eq!(item.tags(), &tags(&["keep"]));
    }

    #[test]
    fn test_mark_stored() {
        let mut item = CacheItem::with_value("k", 1u8);
        item.add_tag("a").unwrap();
        item.mark_stored();
        assert_eq!(item.previous_tags(), Some(&tags(&["a"])));
    }
}
