//! Key/value cache backends and the adapter that fits them to the pool.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                     TaggedPool                         │
//! │                                                        │
//! │  items, deferred saves, tag invalidation               │
//! └───────────────────────────┬────────────────────────────┘
//!                             │ PoolStore hooks
//!                             ▼
//! ┌───────────────────────────────────────────────────────┐
//! │                   BackendAdapter                       │
//! │                                                        │
//! │  payload encoding, tag lists as plain entries          │
//! └───────────────────────────┬────────────────────────────┘
//!                             │ Backend (+ Flushable)
//!                             ▼
//! ┌───────────────────────────────────────────────────────┐
//! │        MemoryBackend │ DiskBackend │ your own          │
//! └───────────────────────────────────────────────────────┘
//! ```

pub mod adapters;
pub mod providers;
mod traits;

use std::path::PathBuf;

pub use adapters::BackendAdapter;
pub use providers::{DiskBackend, MemoryBackend};
pub use traits::{Backend, BackendError, BackendStats, Flushable};

/// Default capacity for the memory backend (256 MB).
pub const DEFAULT_MEMORY_SIZE_BYTES: u64 = 256 * 1024 * 1024;

/// Which backend to open and how.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendConfig {
    /// In-memory backend, lost when the process exits.
    Memory {
        /// Maximum total size of stored values.
        max_size_bytes: u64,
    },
    /// On-disk backend rooted at a directory.
    Disk {
        /// Directory holding the entry files.
        directory: PathBuf,
    },
}

impl BackendConfig {
    /// Memory backend with the given capacity.
    pub fn memory(max_size_bytes: u64) -> Self {
        Self::Memory { max_size_bytes }
    }

    /// Disk backend rooted at `directory`.
    pub fn disk(directory: impl Into<PathBuf>) -> Self {
        Self::Disk {
            directory: directory.into(),
        }
    }

    /// Short name used in logs and config files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory { .. } => "memory",
            Self::Disk { .. } => "disk",
        }
    }
}

/// Open the backend described by `config`.
pub fn open_backend(config: &BackendConfig) -> Result<Box<dyn Backend>, BackendError> {
    tracing::debug!(backend = config.name(), "Opening cache backend");
    match config {
        BackendConfig::Memory { max_size_bytes } => Ok(Box::new(MemoryBackend::new(*max_size_bytes))),
        BackendConfig::Disk { directory } => Ok(Box::new(DiskBackend::open(directory.clone())?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_config_names() {
        assert_eq!(BackendConfig::memory(1024).name(), "memory");
        assert_eq!(BackendConfig::disk("/tmp/x").name(), "disk");
    }

    #[test]
    fn test_open_memory_backend() {
        let backend = open_backend(&BackendConfig::memory(1024 * 1024)).unwrap();
        backend.save("k", vec![1], 0).unwrap();
        assert_eq!(backend.fetch("k").unwrap(), Some(vec![1]));
        assert!(backend.as_flushable().is_some());
    }

    #[test]
    fn test_open_disk_backend() {
        let dir = tempfile::TempDir::new().unwrap();
        let backend = open_backend(&BackendConfig::disk(dir.path().join("cache"))).unwrap();
        backend.save("k", vec![2], 0).unwrap();
        assert_eq!(backend.fetch("k").unwrap(), Some(vec![2]));
    }
}
