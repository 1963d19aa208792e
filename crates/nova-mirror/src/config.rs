use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_CACHE_ENTRIES: usize = 4096;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CacheConfig {
    /// Memoize resolved invocation plans per (type, name, argument shape).
    pub enabled: bool,
    /// Soft bound; the cache is emptied before inserting past it.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: DEFAULT_CACHE_ENTRIES,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive string.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "nova.mirror=info".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct MirrorConfig {
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

impl MirrorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Install a global `fmt` subscriber filtered by `logging.filter`.
    ///
    /// Returns `false` when a global subscriber was already set.
    pub fn install_tracing(&self) -> bool {
        let filter = match EnvFilter::try_new(&self.logging.filter) {
            Ok(filter) => filter,
            Err(err) => {
                tracing::warn!(
                    target: crate::TRACE_TARGET,
                    filter = %self.logging.filter,
                    error = %err,
                    "invalid logging filter; falling back to `info`"
                );
                EnvFilter::new("info")
            }
        };
        let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
        tracing::subscriber::set_global_default(subscriber).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn empty_config_uses_defaults() {
        let config = MirrorConfig::from_toml_str("").unwrap();
        assert_eq!(config, MirrorConfig::default());
        assert!(config.cache.enabled);
        assert_eq!(config.cache.max_entries, DEFAULT_CACHE_ENTRIES);
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let config = MirrorConfig::from_toml_str(
            r#"
            [cache]
            enabled = false
            "#,
        )
        .unwrap();
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.max_entries, DEFAULT_CACHE_ENTRIES);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = MirrorConfig::from_toml_str("[cache]\nsize = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)), "{err}");
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirror.toml");
        std::fs::write(&path, "[logging]\nfilter = \"nova.mirror=debug\"\n").unwrap();

        let config = MirrorConfig::load(&path).unwrap();
        assert_eq!(config.logging.filter, "nova.mirror=debug");

        let missing = MirrorConfig::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
