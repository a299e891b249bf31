//! Startup configuration, read from an optional TOML file.
//!
//! Every key has a default, so the service runs with no config file at all.
//! Keys the service does not recognize are logged and skipped rather than
//! failing startup; malformed TOML and wrongly typed values are hard errors.
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The file exceeded `Config::MAX_FILE_SIZE` bytes.
    #[error("Config file too large: {0} bytes")]
    TooLarge(u64),
}

// ============================================================================
// Configuration
// ============================================================================

/// Top-level application configuration.
///
/// `#[serde(default)]` lets the file supply any subset of keys; absent keys
/// take the values from `Config::default()`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path of the SQLite database file.
    pub database_path: String,

    /// Address the HTTP API listens on.
    pub bind_addr: String,

    /// Interval between background refreshes of every registered feed, in
    /// minutes. 0 = refresh only when a feed is registered.
    pub refresh_interval_minutes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "pressbox.db".to_string(),
            bind_addr: "127.0.0.1:8000".to_string(),
            refresh_interval_minutes: 0,
        }
    }
}

impl Config {
    /// Size cap on the config file (1 MB). No legitimate config comes close;
    /// anything bigger is corrupt or not actually a config file, and the cap
    /// keeps it from being read into memory at all.
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// The keys `Config` deserializes, used for the typo warning in `load`.
    const KNOWN_KEYS: [&'static str; 3] =
        ["database_path", "bind_addr", "refresh_interval_minutes"];

    /// Read configuration from `path`.
    ///
    /// A missing or empty file is not an error; the service starts on
    /// defaults. Unrecognized keys produce a warning and are skipped, so a
    /// typo degrades one setting instead of taking the whole service down.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let size = match std::fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, starting on defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        if size > Self::MAX_FILE_SIZE {
            return Err(ConfigError::TooLarge(size));
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            // The file can vanish between the metadata call and the read;
            // treat that the same as it never having existed.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Empty config file, starting on defaults");
            return Ok(Self::default());
        }

        let config: Config = toml::from_str(&content)?;
        Self::warn_unknown_keys(&content);
        tracing::info!(
            path = %path.display(),
            database = %config.database_path,
            bind = %config.bind_addr,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Re-probe the raw TOML table for keys serde quietly skipped.
    fn warn_unknown_keys(content: &str) {
        let Ok(table) = content.parse::<toml::Table>() else {
            return;
        };
        for key in table.keys() {
            if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                tracing::warn!(key = %key, "Ignoring unknown config key");
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
