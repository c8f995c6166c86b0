//! Backend implementations.
//!
//! Each provider implements the `Backend` trait and owns its own storage,
//! eviction and expiration.
//!
//! # Available Providers
//!
//! - [`MemoryBackend`]: In-memory size-bounded cache using moka
//! - [`DiskBackend`]: One file per key under a directory
//!
//! Both expose the flush capability. Providers are usually created through
//! [`open_backend`](crate::cache::open_backend) from a
//! [`BackendConfig`](crate::cache::BackendConfig).

mod disk;
mod memory;

pub use disk::{DiskBackend, MAX_KEY_BYTES};
pub use memory::MemoryBackend;
