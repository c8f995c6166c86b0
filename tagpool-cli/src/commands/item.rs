//! Item-level commands: get, set, delete, has.

use std::time::Duration;

use crate::commands::CliPool;
use crate::error::CliError;

/// Print the value stored under `key`.
///
/// With `details`, also print tags and expiration.
pub fn get(pool: &CliPool, key: &str, details: bool) -> Result<(), CliError> {
    let item = pool.get_item(key)?;
    if !item.is_hit() {
        return Err(CliError::NotFound(key.to_string()));
    }

    println!("{}", item.get().map(String::as_str).unwrap_or_default());
    if details {
        let tags: Vec<&str> = item.tags().iter().map(String::as_str).collect();
        println!("tags:    {}", tags.join(", "));
        match item.expiration_timestamp() {
            Some(ts) => println!("expires: {}", ts),
            None => println!("expires: never"),
        }
    }
    Ok(())
}

/// Store `value` under `key`.
///
/// Tags given on the command line replace the stored ones; without any the
/// stored tags are kept. `ttl` of `None` falls back to `default_ttl`, and a
/// resulting zero means no expiration.
pub fn set(
    pool: &CliPool,
    key: &str,
    value: String,
    tags: &[String],
    ttl: Option<u64>,
    default_ttl: u64,
) -> Result<(), CliError> {
    let mut item = pool.get_item(key)?;
    item.set(value);
    if !tags.is_empty() {
        item.set_tags(tags.iter().cloned())?;
    }

    let ttl = ttl.unwrap_or(default_ttl);
    item.expires_after((ttl > 0).then(|| Duration::from_secs(ttl)));

    if !pool.save(&mut item)? {
        return Err(CliError::Declined("store item"));
    }
    Ok(())
}

/// Delete `keys`.
pub fn delete(pool: &CliPool, keys: &[String]) -> Result<(), CliError> {
    if !pool.delete_items(keys)? {
        return Err(CliError::Declined("delete item"));
    }
    Ok(())
}

/// Print whether `key` has a live value.
pub fn has(pool: &CliPool, key: &str) -> Result<(), CliError> {
    println!("{}", pool.has_item(key)?);
    Ok(())
}
