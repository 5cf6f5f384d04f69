//! Application configuration loaded from `config.toml`.
//!
//! The file lives in the platform config directory (or wherever
//! `SAVINGS_JARS_CONFIG` points). Every key is optional:
//!
//! ```toml
//! data_dir = "/home/me/.local/share/savings-jars"
//! shared_dir = "/home/me/.local/share/savings-jars/shared"
//! store = "json"          # or "sqlite"
//! history_limit = 50      # omit to keep every transaction
//! log_level = "warn"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub(crate) const CONFIG_ENV: &str = "SAVINGS_JARS_CONFIG";
pub(crate) const LOG_ENV: &str = "SAVINGS_JARS_LOG";
const CONFIG_FILE: &str = "config.toml";
const SHARED_DIR: &str = "shared";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum StoreKind {
    /// `jars.json` in the data directory.
    #[default]
    Json,
    /// Key-value table in `jars.db`.
    Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub(crate) data_dir: Option<PathBuf>,
    pub(crate) shared_dir: Option<PathBuf>,
    pub(crate) store: StoreKind,
    pub(crate) history_limit: Option<usize>,
    pub(crate) log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            shared_dir: None,
            store: StoreKind::Json,
            history_limit: None,
            log_level: "warn".into(),
        }
    }
}

impl AppConfig {
    /// Load the config file, falling back to defaults when it does not exist.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub(crate) fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        if config.history_limit == Some(0) {
            anyhow::bail!("history_limit must be at least 1");
        }
        Ok(config)
    }

    pub(crate) fn resolve_data_dir(&self, default: &Path) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| default.to_path_buf())
    }

    pub(crate) fn resolve_shared_dir(&self, data_dir: &Path) -> PathBuf {
        self.shared_dir
            .clone()
            .unwrap_or_else(|| data_dir.join(SHARED_DIR))
    }
}

/// Platform directories for the app.
pub(crate) struct ProjectPaths {
    pub(crate) config_file: PathBuf,
    pub(crate) data_dir: PathBuf,
}

impl ProjectPaths {
    pub(crate) fn discover() -> Result<Self> {
        let proj_dirs = directories::ProjectDirs::from("com", "savingsjars", "SavingsJars")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let config_file = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| proj_dirs.config_dir().join(CONFIG_FILE));
        Ok(Self {
            config_file,
            data_dir: proj_dirs.data_dir().to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.store, StoreKind::Json);
        assert_eq!(config.history_limit, None);
        assert_eq!(config.log_level, "warn");
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let config = AppConfig::from_toml(
            r#"
            data_dir = "/tmp/jars"
            store = "sqlite"
            history_limit = 10
            log_level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.store, StoreKind::Sqlite);
        assert_eq!(config.history_limit, Some(10));
        assert_eq!(config.log_level, "debug");

        let data_dir = config.resolve_data_dir(Path::new("/default"));
        assert_eq!(data_dir, PathBuf::from("/tmp/jars"));
        assert_eq!(
            config.resolve_shared_dir(&data_dir),
            PathBuf::from("/tmp/jars/shared")
        );
    }

    #[test]
    fn test_zero_history_limit_rejected() {
        assert!(AppConfig::from_toml("history_limit = 0").is_err());
    }

    #[test]
    fn test_unknown_store_rejected() {
        assert!(AppConfig::from_toml(r#"store = "cloud""#).is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.store, StoreKind::Json);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "store = [").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }
}
