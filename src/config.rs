//! Configuration loading and management
//!
//! Handles parsing of `.taskboard.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::storage::StoreOptions;

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE: &str = ".taskboard.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Snapshot file configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// View history configuration
    #[serde(default)]
    pub history: HistoryConfig,
}

/// Snapshot file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backing file, relative to the directory holding the config
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,

    /// How long to wait for another process to release the file
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("tasks.csv")
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// View history configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Keep at most this many entries (unbounded when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl Config {
    /// Load configuration from a `.taskboard.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `dir`, or return defaults when the file is missing
    pub fn load_from_dir(dir: &Path) -> crate::error::Result<Self> {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Options for opening the file-backed store
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            lock_timeout_ms: self.storage.lock_timeout_ms,
            history_limit: self.history.limit,
        }
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.storage.path.as_os_str().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "storage.path cannot be empty".to_string(),
            ));
        }
        if self.storage.lock_timeout_ms == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "storage.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        if self.history.limit == Some(0) {
            return Err(crate::error::Error::InvalidConfig(
                "history.limit must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_expected() {
        let cfg = Config::default();
        assert_eq!(cfg.storage.path, PathBuf::from("tasks.csv"));
        assert_eq!(cfg.storage.lock_timeout_ms, 5000);
        assert_eq!(cfg.history.limit, None);
    }

    #[test]
    fn load_parses_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        let content = r#"
[storage]
path = "data/board.csv"
lock_timeout_ms = 250

[history]
limit = 10
"#;
        fs::write(&path, content.trim()).expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.storage.path, PathBuf::from("data/board.csv"));
        assert_eq!(cfg.storage.lock_timeout_ms, 250);
        assert_eq!(cfg.history.limit, Some(10));

        let options = cfg.store_options();
        assert_eq!(options.lock_timeout_ms, 250);
        assert_eq!(options.history_limit, Some(10));
    }

    #[test]
    fn zero_history_limit_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[history]\nlimit = 0").expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        match err {
            crate::error::Error::InvalidConfig(_) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn zero_lock_timeout_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[storage]\nlock_timeout_ms = 0").expect("write config");

        assert!(matches!(
            Config::load(&path),
            Err(crate::error::Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn load_from_dir_defaults_when_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_from_dir(dir.path()).expect("defaults");
        assert_eq!(cfg.storage.path, PathBuf::from("tasks.csv"));
    }

    #[test]
    fn load_from_dir_reads_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join(CONFIG_FILE),
            "[storage]\npath = \"other.csv\"",
        )
        .expect("write config");

        let cfg = Config::load_from_dir(dir.path()).expect("load");
        assert_eq!(cfg.storage.path, PathBuf::from("other.csv"));
    }

    #[test]
    fn save_writes_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.toml");
        let cfg = Config::default();
        cfg.save(&path).expect("save config");

        let written = fs::read_to_string(&path).expect("read config");
        assert!(written.contains("path = \"tasks.csv\""));
        assert!(Config::load(&path).is_ok());
    }
}
