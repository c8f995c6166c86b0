//! Integration tests for the tagged pool on real backends.
//!
//! These tests verify the full path from pool through adapter to backend:
//! - Items and tag lists survive reopening a disk backend
//! - Tag invalidation across pool instances sharing a backend
//! - Clear behavior with and without the flush capability
//!
//! Run with: `cargo test --test pool_integration`

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::TempDir;

use tagpool::cache::{open_backend, BackendConfig, DiskBackend, MemoryBackend};
use tagpool::{Backend, BackendError, CacheItem, PoolError, TaggedPool};

// ============================================================================
// Helpers
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Product {
    sku: String,
    price_cents: u64,
}

fn product(sku: &str, price_cents: u64) -> Product {
    Product {
        sku: sku.to_string(),
        price_cents,
    }
}

fn tagged_item(key: &str, value: Product, tags: &[&str]) -> CacheItem<Product> {
    let mut item = CacheItem::with_value(key, value);
    item.add_tags(tags.iter().copied()).unwrap();
    item
}

/// Cut the disk entry for `key` down to a few bytes.
fn truncate_disk_entry(directory: &std::path::Path, key: &str) {
    let path = directory.join(format!("{:x}.entry", Sha256::digest(key.as_bytes())));
    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..3]).unwrap();
}

/// Backend that stores nothing durable and cannot flush.
struct Unflushable(MemoryBackend);

impl Backend for Unflushable {
    fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        self.0.fetch(key)
    }

    fn save(&self, key: &str, data: Vec<u8>, ttl_secs: u64) -> Result<bool, BackendError> {
        self.0.save(key, data, ttl_secs)
    }

    fn delete(&self, key: &str) -> Result<bool, BackendError> {
        self.0.delete(key)
    }
}

// ============================================================================
// Integration Tests
// ============================================================================

#[test]
fn test_disk_pool_survives_reopen() {
    let dir = TempDir::new().unwrap();

    {
        let pool: TaggedPool<_, Product> =
            TaggedPool::with_backend(DiskBackend::open(dir.path()).unwrap());
        pool.save(&mut tagged_item("product.1", product("A-1", 999), &["catalog"]))
            .unwrap();
        pool.save(&mut tagged_item("product.2", product("B-2", 1999), &["catalog", "sale"]))
            .unwrap();
    }

    let pool: TaggedPool<_, Product> =
        TaggedPool::with_backend(DiskBackend::open(dir.path()).unwrap());

    let item = pool.get_item("product.2").unwrap();
    assert!(item.is_hit());
    assert_eq!(item.get(), Some(&product("B-2", 1999)));
    assert_eq!(
        pool.tagged_keys("catalog").unwrap(),
        vec!["product.1", "product.2"]
    );

    assert!(pool.invalidate_tag("sale").unwrap());
    assert!(pool.has_item("product.1").unwrap());
    assert!(!pool.has_item("product.2").unwrap());
    assert_eq!(pool.tagged_keys("catalog").unwrap(), vec!["product.1"]);
}

#[test]
fn test_pools_sharing_a_backend_see_each_others_tags() {
    let backend = Arc::new(MemoryBackend::new(10_000_000));
    let writer: TaggedPool<_, Product> = TaggedPool::with_backend(Arc::clone(&backend));
    let invalidator: TaggedPool<_, Product> = TaggedPool::with_backend(Arc::clone(&backend));

    for i in 0..10 {
        let key = format!("product.{}", i);
        writer
            .save(&mut tagged_item(&key, product("X", i), &["bulk"]))
            .unwrap();
    }

    assert!(invalidator.invalidate_tag("bulk").unwrap());

    for i in 0..10 {
        assert!(!writer.has_item(&format!("product.{}", i)).unwrap());
    }
}

#[test]
fn test_deferred_items_committed_on_drop_reach_disk() {
    let dir = TempDir::new().unwrap();

    {
        let pool: TaggedPool<_, Product> =
            TaggedPool::with_backend(DiskBackend::open(dir.path()).unwrap());
        pool.save_deferred(tagged_item("later", product("L", 1), &["queued"]))
            .unwrap();
    }

    let backend = DiskBackend::open(dir.path()).unwrap();
    let pool: TaggedPool<_, Product> = TaggedPool::with_backend(backend);
    assert_eq!(pool.get_value("later").unwrap(), Some(product("L", 1)));
    assert_eq!(pool.tagged_keys("queued").unwrap(), vec!["later"]);
}

#[test]
fn test_clear_depends_on_flush_capability() {
    let dir = TempDir::new().unwrap();
    let flushable: TaggedPool<_, Product> =
        TaggedPool::with_backend(DiskBackend::open(dir.path()).unwrap());
    flushable
        .save(&mut tagged_item("a", product("A", 1), &["t"]))
        .unwrap();
    assert!(flushable.clear().unwrap());
    assert!(!flushable.has_item("a").unwrap());
    assert!(flushable.tagged_keys("t").unwrap().is_empty());

    let unflushable: TaggedPool<_, Product> =
        TaggedPool::with_backend(Unflushable(MemoryBackend::new(1_000_000)));
    unflushable
        .save(&mut tagged_item("a", product("A", 1), &[]))
        .unwrap();
    assert!(!unflushable.clear().unwrap());
    assert!(unflushable.has_item("a").unwrap());
}

#[test]
fn test_expiring_item_on_disk() {
    let dir = TempDir::new().unwrap();
    let pool: TaggedPool<_, Product> =
        TaggedPool::with_backend(DiskBackend::open(dir.path()).unwrap());

    let mut item = tagged_item("flash", product("F", 5), &[]);
    item.expires_after(Some(Duration::from_secs(2)));
    assert!(pool.save(&mut item).unwrap());
    assert!(pool.has_item("flash").unwrap());

    std::thread::sleep(Duration::from_millis(3100));
    assert!(!pool.has_item("flash").unwrap());
}

#[test]
fn test_value_type_mismatch_is_corruption() {
    let backend = Arc::new(MemoryBackend::new(1_000_000));
    let strings: TaggedPool<_, String> = TaggedPool::with_backend(Arc::clone(&backend));
    strings
        .set_value("k", "not a product".to_string(), None)
        .unwrap();

    let products: TaggedPool<_, Product> = TaggedPool::with_backend(backend);
    assert!(matches!(
        products.get_item("k"),
        Err(PoolError::Corrupt { .. })
    ));
}

#[test]
fn test_boxed_backend_from_config() {
    let dir = TempDir::new().unwrap();
    let backend = open_backend(&BackendConfig::disk(dir.path().join("boxed"))).unwrap();
    let pool: TaggedPool<_, String> = TaggedPool::with_backend(backend);

    pool.set_value("k", "v".to_string(), None).unwrap();
    assert_eq!(pool.get_value("k").unwrap(), Some("v".to_string()));
    assert!(pool.backend().stats().unwrap().entry_count >= 1);
}

#[test]
fn test_truncated_disk_entry_can_be_deleted_and_invalidated() {
    let dir = TempDir::new().unwrap();
    let directory = dir.path().join("cache");
    let pool: TaggedPool<_, Product> =
        TaggedPool::with_backend(DiskBackend::open(&directory).unwrap());
    pool.save(&mut tagged_item("a", product("A-1", 100), &["sale"]))
        .unwrap();
    pool.save(&mut tagged_item("b", product("B-1", 200), &["sale"]))
        .unwrap();

    truncate_disk_entry(&directory, "a");
    assert!(matches!(pool.get_item("a"), Err(PoolError::Corrupt { .. })));
    assert!(pool.delete_item("a").unwrap());
    assert!(!pool.has_item("a").unwrap());

    truncate_disk_entry(&directory, "b");
    assert!(pool.invalidate_tag("sale").unwrap());
    assert!(!pool.has_item("b").unwrap());
    assert!(pool.tagged_keys("sale").unwrap().is_empty());
}
