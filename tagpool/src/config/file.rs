//! INI configuration file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;

use super::size::{format_size_exact, parse_size};
use crate::cache::{BackendConfig, DEFAULT_MEMORY_SIZE_BYTES};

/// Errors that can occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or parsed.
    #[error("Failed to read config file: {0}")]
    Read(#[from] ini::Error),

    /// In-memory INI text could not be parsed.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] ini::ParseError),

    /// The file could not be written.
    #[error("Failed to write config file: {0}")]
    Write(#[from] std::io::Error),

    /// A setting has a value that does not fit it.
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },

    /// No setting has this name.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// Default location of the configuration file.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tagpool")
        .join("config.ini")
}

fn default_cache_directory() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tagpool")
}

/// Expand a leading `~/` to the home directory.
fn expand_home(value: &str) -> PathBuf {
    match (value.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(value),
    }
}

/// Which backend the pool runs on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    Disk,
}

impl FromStr for BackendKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "disk" => Ok(Self::Disk),
            _ => Err(()),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Disk => write!(f, "disk"),
        }
    }
}

/// `[cache]` section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheSettings {
    pub backend: BackendKind,
    /// Root directory of the disk backend.
    pub directory: PathBuf,
    /// Capacity of the memory backend in bytes.
    pub memory_size: u64,
    /// Lifetime in seconds for values stored without an explicit one; 0 = none.
    pub default_ttl: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::Disk,
            directory: default_cache_directory(),
            memory_size: DEFAULT_MEMORY_SIZE_BYTES,
            default_ttl: 0,
        }
    }
}

/// `[logging]` section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Default filter level when `RUST_LOG` is not set.
    pub level: String,
    /// Also write logs to this file.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// The whole configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub cache: CacheSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Load from the default path, or defaults if there is no file.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load from `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path)?;
        Self::from_ini(&ini)
    }

    /// Parse INI text.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text)?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for key in ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.key_name()) {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Render as INI, skipping unset values.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section()))
                    .set(key.key_name(), value);
            }
        }
        ini
    }

    /// Write to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        self.to_ini().write_to_file(path)?;
        Ok(())
    }

    /// Write to the default path.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Backend described by the `[cache]` section.
    pub fn backend_config(&self) -> BackendConfig {
        match self.cache.backend {
            BackendKind::Memory => BackendConfig::memory(self.cache.memory_size),
            BackendKind::Disk => BackendConfig::disk(self.cache.directory.clone()),
        }
    }
}

/// Every addressable setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigKey {
    CacheBackend,
    CacheDirectory,
    CacheMemorySize,
    CacheDefaultTtl,
    LoggingLevel,
    LoggingFile,
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl ConfigKey {
    /// All keys, grouped by section.
    pub fn all() -> &'static [ConfigKey] {
        &[
            Self::CacheBackend,
            Self::CacheDirectory,
            Self::CacheMemorySize,
            Self::CacheDefaultTtl,
            Self::LoggingLevel,
            Self::LoggingFile,
        ]
    }

    /// Full name, `section.key`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CacheBackend => "cache.backend",
            Self::CacheDirectory => "cache.directory",
            Self::CacheMemorySize => "cache.memory_size",
            Self::CacheDefaultTtl => "cache.default_ttl",
            Self::LoggingLevel => "logging.level",
            Self::LoggingFile => "logging.file",
        }
    }

    /// INI section name.
    pub fn section(&self) -> &'static str {
        self.split().0
    }

    /// Key name within the section.
    pub fn key_name(&self) -> &'static str {
        self.split().1
    }

    fn split(&self) -> (&'static str, &'static str) {
        let name = self.name();
        name.split_once('.').unwrap_or(("", name))
    }

    /// Current value as text; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            Self::CacheBackend => config.cache.backend.to_string(),
            Self::CacheDirectory => config.cache.directory.display().to_string(),
            Self::CacheMemorySize => format_size_exact(config.cache.memory_size),
            Self::CacheDefaultTtl => config.cache.default_ttl.to_string(),
            Self::LoggingLevel => config.logging.level.clone(),
            Self::LoggingFile => config
                .logging
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Parse `value` and store it in `config`.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let invalid = |reason| ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason,
        };
        let value = value.trim();

        match self {
            Self::CacheBackend => {
                config.cache.backend = value
                    .parse()
                    .map_err(|_| invalid("expected 'memory' or 'disk'"))?;
            }
            Self::CacheDirectory => {
                if value.is_empty() {
                    return Err(invalid("directory cannot be empty"));
                }
                config.cache.directory = expand_home(value);
            }
            Self::CacheMemorySize => {
                config.cache.memory_size =
                    parse_size(value).ok_or_else(|| invalid("expected a size like 256MB"))?;
            }
            Self::CacheDefaultTtl => {
                config.cache.default_ttl = value
                    .parse()
                    .map_err(|_| invalid("expected whole seconds"))?;
            }
            Self::LoggingLevel => {
                let level = value.to_lowercase();
                if !LOG_LEVELS.contains(&level.as_str()) {
                    return Err(invalid("expected trace, debug, info, warn or error"));
                }
                config.logging.level = level;
            }
            Self::LoggingFile => {
                config.logging.file = (!value.is_empty()).then(|| expand_home(value));
            }
        }
        Ok(())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ConfigFile::default();
        assert_eq!(config.cache.backend, BackendKind::Disk);
        assert_eq!(config.cache.memory_size, DEFAULT_MEMORY_SIZE_BYTES);
        assert_eq!(config.cache.default_ttl, 0);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_from_ini_str() {
        let config = ConfigFile::from_ini_str(
            "[cache]\nbackend = memory\nmemory_size = 64MB\ndefault_ttl = 300\n\
             [logging]\nlevel = DEBUG\nfile = /tmp/tagpool.log\n",
        )
        .unwrap();

        assert_eq!(config.cache.backend, BackendKind::Memory);
        assert_eq!(config.cache.memory_size, 64 * 1024 * 1024);
        assert_eq!(config.cache.default_ttl, 300);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/tagpool.log")));
        assert_eq!(
            config.backend_config(),
            BackendConfig::memory(64 * 1024 * 1024)
        );
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = ConfigFile::from_ini_str("[cache]\ndefault_ttl = 5\n").unwrap();
        assert_eq!(config.cache.default_ttl, 5);
        assert_eq!(config.cache.backend, BackendKind::Disk);
        assert_eq!(config.logging, LoggingSettings::default());
    }

    #[test]
    fn test_invalid_value_is_reported() {
        let err = ConfigFile::from_ini_str("[cache]\nbackend = redis\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "cache.backend",
                ..
            }
        ));

        assert!(ConfigFile::from_ini_str("[logging]\nlevel = loud\n").is_err());
        assert!(ConfigFile::from_ini_str("[cache]\nmemory_size = lots\n").is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.cache.backend = BackendKind::Memory;
        config.cache.directory = dir.path().join("cache");
        config.cache.memory_size = 32 * 1024 * 1024;
        config.logging.level = "warn".to_string();
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_key_names() {
        let key: ConfigKey = "cache.default_ttl".parse().unwrap();
        assert_eq!(key, ConfigKey::CacheDefaultTtl);
        assert_eq!(key.section(), "cache");
        assert_eq!(key.key_name(), "default_ttl");

        assert!(matches!(
            "cache.nope".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_config_key_get_set() {
        let mut config = ConfigFile::default();
        ConfigKey::CacheMemorySize.set(&mut config, "1GB").unwrap();
        assert_eq!(ConfigKey::CacheMemorySize.get(&config), "1GB");

        ConfigKey::LoggingFile.set(&mut config, "").unwrap();
        assert_eq!(ConfigKey::LoggingFile.get(&config), "");
    }

    #[test]
    fn test_disk_backend_config() {
        let mut config = ConfigFile::default();
        config.cache.directory = PathBuf::from("/srv/cache");
        assert_eq!(config.backend_config(), BackendConfig::disk("/srv/cache"));
    }
}
