//! Cache configuration with precedence and validation
//!
//! Values are resolved from defaults, then the JSON config file, then
//! `CACHEXT_*` environment variables. Later sources only override the fields
//! they actually set.

use cachext_core::{
    Error, Result, CACHEXT_CACHE_NAME_VAR, CACHEXT_CONFIG_DIR_VAR, CACHEXT_ENABLED_VAR,
    CACHEXT_LOCK_TIMEOUT_MS_VAR, CACHEXT_MAX_RETRIES_VAR, CACHEXT_RETRY_FREQUENCY_VAR,
    CACHEXT_SLEEP_MS_VAR, CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_CACHE_NAME,
    DEFAULT_LOCK_TIMEOUT_SECS,
};
use cachext_utils::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Resolved cache configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Whether a real cache is used; a disabled cache stores nothing
    pub enabled: bool,
    /// Name of the shared cache namespace
    pub cache_name: String,
    /// Retry and backoff schedule for lock-guarded updates
    pub retry: RetryPolicy,
    /// Per-acquisition lock timeout used by `update`
    pub lock_timeout: Duration,
    /// Where the last applied values came from
    pub source: ConfigSource,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_name: DEFAULT_CACHE_NAME.to_string(),
            retry: RetryPolicy::default(),
            lock_timeout: Duration::from_secs(DEFAULT_LOCK_TIMEOUT_SECS),
            source: ConfigSource::Default,
        }
    }
}

/// Source of configuration for debugging and precedence tracking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Built-in defaults
    Default,
    /// Configuration file
    ConfigFile(PathBuf),
    /// Environment variables
    EnvironmentVariable(String),
    /// Set in code through the builder
    Programmatic,
}

/// Fields a config file or the environment may set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheOverrides {
    pub enabled: Option<bool>,
    pub cache_name: Option<String>,
    pub max_retries: Option<u32>,
    pub retry_frequency: Option<u32>,
    pub sleep_ms: Option<u64>,
    pub lock_timeout_ms: Option<u64>,
}

impl CacheOverrides {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    cache: CacheOverrides,
}

/// Builder for creating cache configurations in code
#[derive(Debug, Clone)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: CacheConfig {
                source: ConfigSource::Programmatic,
                ..CacheConfig::default()
            },
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    pub fn with_cache_name(mut self, name: impl Into<String>) -> Self {
        self.config.cache_name = name.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.config.lock_timeout = timeout;
        self
    }

    /// Build the configuration, rejecting an empty cache name
    pub fn build(self) -> Result<CacheConfig> {
        if self.config.cache_name.trim().is_empty() {
            return Err(Error::configuration("cache name must not be empty"));
        }
        Ok(self.config)
    }
}

impl Default for CacheConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration loader that handles precedence
pub struct CacheConfigLoader;

impl CacheConfigLoader {
    /// Load configuration from defaults, the config file and the environment
    pub fn load() -> Result<CacheConfig> {
        let config = Self::load_from_path(&Self::config_file_path()?)?;
        let config = Self::apply_env(config)?;
        info!(
            cache = %config.cache_name,
            enabled = config.enabled,
            source = ?config.source,
            "cache configuration loaded"
        );
        Ok(config)
    }

    /// Load defaults overridden by the file at `path`, if it exists
    pub fn load_from_path(path: &Path) -> Result<CacheConfig> {
        let config = CacheConfig::default();
        match Self::read_config_file(path)? {
            Some(overrides) => Self::merge(
                config,
                &overrides,
                ConfigSource::ConfigFile(path.to_path_buf()),
            ),
            None => Ok(config),
        }
    }

    /// Apply `CACHEXT_*` environment variables on top of `config`
    pub fn apply_env(config: CacheConfig) -> Result<CacheConfig> {
        let overrides = Self::load_from_env()?;
        if overrides.is_empty() {
            return Ok(config);
        }
        Self::merge(
            config,
            &overrides,
            ConfigSource::EnvironmentVariable("CACHEXT_*".to_string()),
        )
    }

    /// Read overrides from the environment
    pub fn load_from_env() -> Result<CacheOverrides> {
        Ok(CacheOverrides {
            enabled: env_value(CACHEXT_ENABLED_VAR, parse_bool)?,
            cache_name: std::env::var(CACHEXT_CACHE_NAME_VAR).ok(),
            max_retries: env_value(CACHEXT_MAX_RETRIES_VAR, parse_number)?,
            retry_frequency: env_value(CACHEXT_RETRY_FREQUENCY_VAR, parse_number)?,
            sleep_ms: env_value(CACHEXT_SLEEP_MS_VAR, parse_number)?,
            lock_timeout_ms: env_value(CACHEXT_LOCK_TIMEOUT_MS_VAR, parse_number)?,
        })
    }

    /// Location of the JSON config file
    pub fn config_file_path() -> Result<PathBuf> {
        let config_dir = match std::env::var(CACHEXT_CONFIG_DIR_VAR) {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::config_dir().ok_or_else(|| {
                Error::configuration(
                    "could not determine config directory, set XDG_CONFIG_HOME or HOME",
                )
            })?,
        };
        Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    fn read_config_file(path: &Path) -> Result<Option<CacheOverrides>> {
        if !path.exists() {
            debug!(path = %path.display(), "no cache config file");
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::file_system(path, "read config file", e))?;
        let file: ConfigFile = serde_json::from_str(&content).map_err(|e| {
            Error::configuration(format!("invalid config file '{}': {e}", path.display()))
        })?;
        Ok(Some(file.cache))
    }

    /// Apply every field `overrides` sets, revalidating the retry policy
    pub fn merge(
        base: CacheConfig,
        overrides: &CacheOverrides,
        source: ConfigSource,
    ) -> Result<CacheConfig> {
        let retry = RetryPolicy::new(
            overrides.max_retries.unwrap_or(base.retry.max_attempts()),
            overrides
                .retry_frequency
                .unwrap_or(base.retry.retry_frequency()),
            overrides
                .sleep_ms
                .map(Duration::from_millis)
                .unwrap_or(base.retry.sleep_unit()),
        )?;

        let cache_name = match &overrides.cache_name {
            Some(name) if name.trim().is_empty() => {
                return Err(Error::configuration("cache name must not be empty"))
            }
            Some(name) => name.clone(),
            None => base.cache_name,
        };

        Ok(CacheConfig {
            enabled: overrides.enabled.unwrap_or(base.enabled),
            cache_name,
            retry,
            lock_timeout: overrides
                .lock_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(base.lock_timeout),
            source,
        })
    }
}

fn env_value<T>(var: &str, parse: fn(&str, &str) -> Result<T>) -> Result<Option<T>> {
    match std::env::var(var) {
        Ok(raw) => parse(var, raw.trim()).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_bool(var: &str, raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::configuration(format!(
            "{var} must be a boolean, got '{raw}'"
        ))),
    }
}

fn parse_number<T: FromStr>(var: &str, raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| Error::configuration(format!("{var} must be a number, got '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachext_core::ErrorKind;
    use serial_test::serial;
    use tempfile::TempDir;

    const ALL_VARS: [&str; 6] = [
        CACHEXT_ENABLED_VAR,
        CACHEXT_CACHE_NAME_VAR,
        CACHEXT_MAX_RETRIES_VAR,
        CACHEXT_RETRY_FREQUENCY_VAR,
        CACHEXT_SLEEP_MS_VAR,
        CACHEXT_LOCK_TIMEOUT_MS_VAR,
    ];

    fn clear_env() {
        for var in ALL_VARS {
            std::env::remove_var(var);
        }
    }

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.cache_name, "myCache");
        assert_eq!(config.retry.max_attempts(), 100);
        assert_eq!(config.retry.retry_frequency(), 10);
        assert_eq!(config.retry.sleep_unit(), Duration::from_millis(20));
        assert_eq!(config.lock_timeout, Duration::from_secs(60));
        assert_eq!(config.source, ConfigSource::Default);
    }

    #[test]
    fn test_builder() {
        let config = CacheConfigBuilder::new()
            .with_enabled(false)
            .with_cache_name("sessions")
            .with_lock_timeout(Duration::from_millis(250))
            .build()
            .unwrap();

        assert!(!config.enabled);
        assert_eq!(config.cache_name, "sessions");
        assert_eq!(config.lock_timeout, Duration::from_millis(250));
        assert_eq!(config.source, ConfigSource::Programmatic);

        let err = CacheConfigBuilder::new()
            .with_cache_name("  ")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_missing_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let config = CacheConfigLoader::load_from_path(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, CacheConfig::default());
    }

    #[test]
    fn test_file_overrides_only_set_fields() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{ "cache": { "cache_name": "orders", "max_retries": 5, "lock_timeout_ms": 1500 } }"#,
        );

        let config = CacheConfigLoader::load_from_path(&path).unwrap();
        assert!(config.enabled);
        assert_eq!(config.cache_name, "orders");
        assert_eq!(config.retry.max_attempts(), 5);
        assert_eq!(config.retry.retry_frequency(), 10);
        assert_eq!(config.lock_timeout, Duration::from_millis(1500));
        assert_eq!(config.source, ConfigSource::ConfigFile(path));
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{ "cache": { "max_retries": "lots" } }"#);
        let err = CacheConfigLoader::load_from_path(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let path = write_config(&dir, r#"{ "cache": { "retry_frequency": 0 } }"#);
        let err = CacheConfigLoader::load_from_path(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{ "cache": { "enabled": true, "cache_name": "orders", "sleep_ms": 5 } }"#,
        );
        std::env::set_var(CACHEXT_ENABLED_VAR, "false");
        std::env::set_var(CACHEXT_RETRY_FREQUENCY_VAR, "4");

        let config = CacheConfigLoader::load_from_path(&path).unwrap();
        let config = CacheConfigLoader::apply_env(config).unwrap();
        clear_env();

        assert!(!config.enabled);
        assert_eq!(config.cache_name, "orders");
        assert_eq!(config.retry.retry_frequency(), 4);
        assert_eq!(config.retry.sleep_unit(), Duration::from_millis(5));
        assert!(matches!(
            config.source,
            ConfigSource::EnvironmentVariable(_)
        ));
    }

    #[test]
    #[serial]
    fn test_env_rejects_bad_numbers() {
        clear_env();
        std::env::set_var(CACHEXT_MAX_RETRIES_VAR, "-3");
        let result = CacheConfigLoader::load_from_env();
        clear_env();

        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains(CACHEXT_MAX_RETRIES_VAR));
    }

    #[test]
    #[serial]
    fn test_no_env_leaves_source_alone() {
        clear_env();
        let config = CacheConfigLoader::apply_env(CacheConfig::default()).unwrap();
        assert_eq!(config.source, ConfigSource::Default);
    }

    #[test]
    #[serial]
    fn test_load_uses_xdg_config_home() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let app_dir = dir.path().join(CONFIG_DIR_NAME);
        std::fs::create_dir_all(&app_dir).unwrap();
        std::fs::write(
            app_dir.join(CONFIG_FILE_NAME),
            r#"{ "cache": { "cache_name": "from-xdg" } }"#,
        )
        .unwrap();

        let previous = std::env::var(CACHEXT_CONFIG_DIR_VAR).ok();
        std::env::set_var(CACHEXT_CONFIG_DIR_VAR, dir.path());
        let config = CacheConfigLoader::load();
        match previous {
            Some(value) => std::env::set_var(CACHEXT_CONFIG_DIR_VAR, value),
            None => std::env::remove_var(CACHEXT_CONFIG_DIR_VAR),
        }

        assert_eq!(config.unwrap().cache_name, "from-xdg");
    }
}
