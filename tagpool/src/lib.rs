//! TagPool - tag-aware cache pool over plain key/value backends
//!
//! This library turns any cache backend offering fetch, save and delete (and
//! optionally flush) into a cache pool with items, deferred saves and
//! tag-based bulk invalidation. The backend stays in charge of storage and
//! expiration; tags are kept as ordinary backend entries listing their keys.
//!
//! - [`cache`]: the [`Backend`](cache::Backend) trait, memory and disk
//!   backends, and the adapter fitting a backend to the pool
//! - [`pool`]: [`TaggedPool`](pool::TaggedPool) and its items
//! - [`config`]: INI configuration

pub mod cache;
pub mod config;
pub mod pool;

pub use cache::{Backend, BackendAdapter, BackendConfig, BackendError, Flushable};
pub use pool::{CacheItem, PoolError, TaggedPool};
