//! Configuration file support.
//!
//! Settings live in an INI file, by default `<config dir>/tagpool/config.ini`:
//!
//! ```ini
//! [cache]
//! backend = disk
//! directory = ~/.cache/tagpool
//! memory_size = 256MB
//! default_ttl = 0
//!
//! [logging]
//! level = info
//! file = /var/log/tagpool.log
//! ```
//!
//! A missing file means defaults. Every setting is addressable as
//! `section.key` through [`ConfigKey`].

mod file;
mod size;

pub use file::{
    config_file_path, BackendKind, CacheSettings, ConfigError, ConfigFile, ConfigKey,
    LoggingSettings,
};
pub use size::{format_size, format_size_exact, parse_size};
