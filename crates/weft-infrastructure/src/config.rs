//! Settings loaded from `~/.config/weft/config.toml`.
//!
//! ```toml
//! [archive]
//! path = "/home/me/archive.json"
//! asynchronous = true
//! retry_delay_ms = 70
//! max_attempts = 6
//! exponential_backoff = false
//! max_retry_delay_ms = 2000
//! chunk_threshold = 100
//! validate_credentials = false
//!
//! [logging]
//! level = "info"
//! json = false
//! ```
//!
//! Every field is optional; a missing or empty file yields the defaults.

use crate::archive::{Archive, ArchiveOptions};
use crate::loader::{DEFAULT_CHUNK_THRESHOLD, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, RetryPolicy};
use crate::paths::WeftPaths;
use crate::probe::HttpLivenessProbe;
use crate::storage::AtomicTextFile;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use weft_core::{CredentialValidator, ModelCatalog, Result, ValidationCache};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeftSettings {
    pub archive: ArchiveSettings,
    pub logging: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveSettings {
    /// Archive file; the data directory's `archive.json` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub asynchronous: bool,
    pub retry_delay_ms: u64,
    pub max_attempts: u32,
    pub exponential_backoff: bool,
    /// Upper bound for exponential back-off.
    pub max_retry_delay_ms: u64,
    pub chunk_threshold: usize,
    /// Probe every loaded credential against the provider.
    pub validate_credentials: bool,
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            path: None,
            asynchronous: true,
            retry_delay_ms: DEFAULT_RETRY_DELAY.as_millis() as u64,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            exponential_backoff: false,
            max_retry_delay_ms: 2_000,
            chunk_threshold: DEFAULT_CHUNK_THRESHOLD,
            validate_credentials: false,
        }
    }
}

impl ArchiveSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        let delay = Duration::from_millis(self.retry_delay_ms);
        let policy = if self.exponential_backoff {
            RetryPolicy::exponential(delay, Duration::from_millis(self.max_retry_delay_ms))
        } else {
            RetryPolicy::fixed(delay)
        };
        policy.with_max_attempts(self.max_attempts)
    }

    pub fn archive_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => WeftPaths::default_archive_file(),
        }
    }

    /// Opens the configured archive. Nothing is read until first access.
    pub fn open_archive(&self) -> Result<Archive> {
        Ok(Archive::with_options(self.archive_path()?, self.into()))
    }

    /// Like [`ArchiveSettings::open_archive`], but credential checks share
    /// `cache` so a key already probed by another archive is not probed again.
    pub fn open_archive_with_cache(&self, cache: Arc<ValidationCache>) -> Result<Archive> {
        Ok(Archive::with_options(
            self.archive_path()?,
            self.options_with_cache(Some(cache)),
        ))
    }

    /// Load options for these settings. Without a shared `cache` the
    /// validator starts with an empty one of its own.
    pub fn options_with_cache(&self, cache: Option<Arc<ValidationCache>>) -> ArchiveOptions {
        let validator = self.validate_credentials.then(|| {
            let validator =
                CredentialValidator::new(ModelCatalog::default(), Arc::new(HttpLivenessProbe::new()));
            Arc::new(match cache {
                Some(cache) => validator.with_cache(cache),
                None => validator,
            })
        });

        ArchiveOptions {
            asynchronous: self.asynchronous,
            retry: self.retry_policy(),
            chunk_threshold: self.chunk_threshold,
            validator,
        }
    }
}

impl From<&ArchiveSettings> for ArchiveOptions {
    fn from(settings: &ArchiveSettings) -> Self {
        settings.options_with_cache(None)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Level for weft's own targets; `RUST_LOG` overrides it.
    pub level: String,
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Loads settings from the default config file.
pub fn load_settings() -> Result<WeftSettings> {
    load_settings_from(WeftPaths::config_file()?)
}

pub fn load_settings_from(path: impl AsRef<Path>) -> Result<WeftSettings> {
    let path = path.as_ref();
    match AtomicTextFile::new(path).load()? {
        Some(text) => {
            let settings = toml::from_str(&text)?;
            tracing::debug!(path = %path.display(), "Loaded settings");
            Ok(settings)
        }
        None => Ok(WeftSettings::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::Backoff;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = load_settings_from(dir.path().join("config.toml")).unwrap();
        assert_eq!(settings, WeftSettings::default());
        assert_eq!(settings.archive.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[archive]\nasynchronous = false\nmax_attempts = 3\n\n[logging]\njson = true\n",
        )
        .unwrap();

        let settings = load_settings_from(&path).unwrap();
        assert!(!settings.archive.asynchronous);
        assert_eq!(settings.archive.max_attempts, 3);
        assert_eq!(settings.archive.chunk_threshold, DEFAULT_CHUNK_THRESHOLD);
        assert!(settings.logging.json);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_exponential_policy() {
        let settings = ArchiveSettings {
            exponential_backoff: true,
            retry_delay_ms: 10,
            max_retry_delay_ms: 40,
            ..Default::default()
        };
        let policy = settings.retry_policy();
        assert_eq!(
            policy.backoff(),
            Backoff::Exponential {
                base: Duration::from_millis(10),
                max: Duration::from_millis(40)
            }
        );
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[archive\n").unwrap();

        let err = load_settings_from(&path).unwrap_err();
        assert!(matches!(err, weft_core::WeftError::Config(_)));
    }

    #[test]
    fn test_options_follow_settings() {
        let dir = TempDir::new().unwrap();
        let settings = ArchiveSettings {
            path: Some(dir.path().join("a.json")),
            asynchronous: false,
            validate_credentials: true,
            ..Default::default()
        };

        let options = ArchiveOptions::from(&settings);
        assert!(!options.asynchronous);
        assert!(options.validator.is_some());

        let archive = settings.open_archive().unwrap();
        assert_eq!(archive.path(), dir.path().join("a.json").as_path());
        assert!(!archive.is_asynchronous());
    }

    #[test]
    fn test_archives_can_share_one_validation_cache() {
        let settings = ArchiveSettings {
            validate_credentials: true,
            ..Default::default()
        };
        let cache = Arc::new(ValidationCache::new());

        let first = settings.options_with_cache(Some(cache.clone())).validator.unwrap();
        let second = settings.options_with_cache(Some(cache.clone())).validator.unwrap();
        assert!(Arc::ptr_eq(first.cache(), &cache));
        assert!(Arc::ptr_eq(second.cache(), &cache));

        let own = ArchiveOptions::from(&settings).validator.unwrap();
        assert!(!Arc::ptr_eq(own.cache(), &cache));
    }

    #[tokio::test]
    async fn test_shared_cache_skips_known_key() {
        let dir = TempDir::new().unwrap();
        let settings = ArchiveSettings {
            path: Some(dir.path().join("a.json")),
            validate_credentials: true,
            ..Default::default()
        };
        let cache = Arc::new(ValidationCache::new());
        cache.insert_api_key("sk-test-0000000000000000").await;

        let mut archive = settings.open_archive_with_cache(cache.clone()).unwrap();
        archive
            .add(weft_core::ConfigRecord::new("sk-test-0000000000000000", "o1"))
            .await
            .unwrap();
        archive.save().unwrap();

        // Loading validates the key; the shared cache answers without a request.
        let mut reopened = settings.open_archive_with_cache(cache).unwrap();
        assert_eq!(reopened.len().await.unwrap(), 1);
    }
}
