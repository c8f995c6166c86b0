//! Tag-aware cache pool.
//!
//! The pool exposes item-level operations (get, save, deferred saves,
//! deletion, tag invalidation) and drives a [`PoolStore`] to persist them.
//!
//! # Tags
//!
//! Each tag has a list entry in the store (`tag!<name>`) recording the keys
//! saved with that tag. Invalidating a tag deletes every recorded key and then
//! the list. Lists are maintained with plain read-modify-write, so concurrent
//! writers from different processes can lose list updates.
//!
//! # Example
//!
//! ```ignore
//! use tagpool::cache::MemoryBackend;
//! use tagpool::pool::{CacheItem, TaggedPool};
//!
//! let pool: TaggedPool<_, String> = TaggedPool::with_backend(MemoryBackend::new(1 << 20));
//!
//! let mut item = CacheItem::with_value("user.1", "alice".to_string());
//! item.add_tag("users")?;
//! pool.save(&mut item)?;
//!
//! pool.invalidate_tag("users")?;
//! assert!(!pool.has_item("user.1")?);
//! ```

mod error;
mod item;
pub mod key;
pub(crate) mod payload;
mod store;
mod tagged;

pub use error::PoolError;
pub use item::CacheItem;
pub use key::{tag_key, validate_key, validate_tag};
pub use payload::CachedObject;
pub use store::PoolStore;
pub use tagged::TaggedPool;
