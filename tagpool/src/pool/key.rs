//! Key and tag validation.
//!
//! Keys and tags follow the usual cache-pool rules: non-empty and free of the
//! reserved characters `{}()/\@:`. Keys additionally may not start with the
//! prefix used for tag list entries, so an item can never overwrite a tag
//! index.

use super::PoolError;

/// Characters that may not appear in keys or tags.
pub const RESERVED_CHARACTERS: &str = "{}()/\\@:";

/// Prefix of the backend entries holding tag lists.
pub const TAG_PREFIX: &str = "tag!";

/// Validate a cache key.
pub fn validate_key(key: &str) -> Result<(), PoolError> {
    let invalid = |reason| PoolError::InvalidKey {
        key: key.to_string(),
        reason,
    };

    if key.is_empty() {
        return Err(invalid("key is empty"));
    }
    if key.contains(|c: char| RESERVED_CHARACTERS.contains(c)) {
        return Err(invalid("contains a reserved character"));
    }
    if key.starts_with(TAG_PREFIX) {
        return Err(invalid("uses the reserved tag list prefix"));
    }
    Ok(())
}

/// Validate a tag name.
pub fn validate_tag(tag: &str) -> Result<(), PoolError> {
    let invalid = |reason| PoolError::InvalidTag {
        tag: tag.to_string(),
        reason,
    };

    if tag.is_empty() {
        return Err(invalid("tag is empty"));
    }
    if tag.contains(|c: char| RESERVED_CHARACTERS.contains(c)) {
        return Err(invalid("contains a reserved character"));
    }
    Ok(())
}

/// Backend key of the list holding the members of `tag`.
pub fn tag_key(tag: &str) -> String {
    format!("{}{}", TAG_PREFIX, tag)
}
