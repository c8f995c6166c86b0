//! On-disk backend storing one file per key.
//!
//! # Layout
//!
//! ```text
//! <directory>/
//!   3f0a...c1.entry     SHA-256 of the key, hex encoded
//!   9b2e...07.entry
//! ```
//!
//! Each file holds a bincode record of the original key, the absolute
//! expiration timestamp and the raw data. The key is kept so that a hash
//! collision reads as a miss instead of someone else's data.
//!
//! Writes go to a temporary file in the same directory and are renamed into
//! place, so a reader never sees a half-written entry. Expired entries are
//! removed lazily when they are read.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::cache::traits::{Backend, BackendError, BackendStats, Flushable};

/// Extension used for committed entry files.
const ENTRY_EXTENSION: &str = "entry";

/// Extension used for in-flight writes.
const TEMP_EXTENSION: &str = "tmp";

/// Longest key accepted, in bytes.
pub const MAX_KEY_BYTES: usize = 4096;

#[derive(Serialize, Deserialize)]
struct DiskRecord {
    key: String,
    expires_at: Option<i64>,
    data: Vec<u8>,
}

impl DiskRecord {
    fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|ts| ts <= now)
    }
}

/// On-disk backend storing one file per key.
///
/// Supports the flush capability, which removes every entry file in the
/// directory and leaves foreign files alone.
pub struct DiskBackend {
    directory: PathBuf,
    write_seq: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl DiskBackend {
    /// Open a disk backend rooted at `directory`, creating it if needed.
    pub fn open(directory: impl Into<PathBuf>) -> Result<Self, BackendError> {
        let directory = directory.into();
        fs::create_dir_all(&directory)?;
        debug!(directory = %directory.display(), "Opened disk backend");

        Ok(Self {
            directory,
            write_seq: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    /// Root directory of this backend.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.directory
            .join(format!("{:x}.{}", digest, ENTRY_EXTENSION))
    }

    fn read_record(&self, path: &Path) -> Result<Option<DiskRecord>, BackendError> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remove_file(path: &Path) -> Result<(), BackendError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn entry_files(&self) -> Result<Vec<PathBuf>, BackendError> {
        let mut files = Vec::new();
        for dir_entry in fs::read_dir(&self.directory)? {
            let path = dir_entry?.path();
            if path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION) {
                files.push(path);
            }
        }
        Ok(files)
    }
}

impl Backend for DiskBackend {
    fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let path = self.entry_path(key);
        let record = match self.read_record(&path)? {
            Some(record) if record.key == key => record,
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return Ok(None);
            }
        };

        if record.is_expired(Utc::now().timestamp()) {
            debug!(key = %key, "Removing expired disk entry");
            Self::remove_file(&path)?;
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Ok(None);
        }

        self.hits.fetch_add(1, Ordering::Relaxed);
        Ok(Some(record.data))
    }

    fn save(&self, key: &str, data: Vec<u8>, ttl_secs: u64) -> Result<bool, BackendError> {
        if key.len() > MAX_KEY_BYTES {
            return Err(BackendError::KeyTooLarge {
                size: key.len(),
                max: MAX_KEY_BYTES,
            });
        }

        let expires_at = (ttl_secs > 0).then(|| {
            Utc::now()
                .timestamp()
                .saturating_add(i64::try_from(ttl_secs).unwrap_or(i64::MAX))
        });
        let record = DiskRecord {
            key: key.to_string(),
            expires_at,
            data,
        };
        let bytes = bincode::serialize(&record)?;

        let path = self.entry_path(key);
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        let temp = path.with_extension(format!("{}.{}.{}", std::process::id(), seq, TEMP_EXTENSION));

        if let Err(e) = fs::write(&temp, &bytes).and_then(|()| fs::rename(&temp, &path)) {
            warn!(error = %e, key = %key, "Failed to write disk entry");
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }

        Ok(true)
    }

    fn delete(&self, key: &str) -> Result<bool, BackendError> {
        Self::remove_file(&self.entry_path(key))?;
        Ok(true)
    }

    fn stats(&self) -> Option<BackendStats> {
        let files = match self.entry_files() {
            Ok(files) => files,
            Err(e) => {
                warn!(error = %e, directory = %self.directory.display(), "Disk stats scan failed");
                return None;
            }
        };

        let size_bytes = files
            .iter()
            .filter_map(|path| fs::metadata(path).ok())
            .map(|meta| meta.len())
            .sum();

        Some(BackendStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count: files.len() as u64,
            size_bytes,
        })
    }

    fn as_flushable(&self) -> Option<&dyn Flushable> {
        Some(self)
    }
}

impl Flushable for DiskBackend {
    fn flush_all(&self) -> Result<bool, BackendError> {
        let files = self.entry_files()?;
        let count = files.len();
        for path in files {
            Self::remove_file(&path)?;
        }
        debug!(files = count, directory = %self.directory.display(), "Flushed disk backend");
        Ok(true)
    }
}
