//! Pool error types.

use thiserror::Error;

use crate::cache::BackendError;

/// Errors that can occur during pool operations.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The key is empty, uses a reserved character or a reserved prefix.
    #[error("Invalid cache key '{key}': {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// The tag name is empty or uses a reserved character.
    #[error("Invalid tag '{tag}': {reason}")]
    InvalidTag { tag: String, reason: &'static str },

    /// The backend failed to perform the operation.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// A stored payload could not be decoded.
    ///
    /// This is corruption (or a value type mismatch), never a cache miss.
    #[error("Corrupt cache entry '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: bincode::Error,
    },

    /// A value could not be encoded for storage.
    #[error("Failed to encode cache entry '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: bincode::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_error_display() {
        let err = PoolError::InvalidKey {
            key: "a:b".to_string(),
            reason: "contains a reserved character",
        };
        assert_eq!(
            format!("{}", err),
            "Invalid cache key 'a:b': contains a reserved character"
        );
    }

    #[test]
    fn test_pool_error_from_backend() {
        let err: PoolError = BackendError::Provider("down".to_string()).into();
        assert!(matches!(err, PoolError::Backend(_)));
        assert!(format!("{}", err).contains("down"));
    }
}
