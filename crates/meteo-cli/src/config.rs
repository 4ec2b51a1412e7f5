//! Configuration file management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use meteo_archive::DEFAULT_PAGE_SIZE;
use meteo_watch::{DEFAULT_BRANCH, DEFAULT_REMOTE, WatchOptions};
use serde::{Deserialize, Serialize};

/// Shortest accepted poll interval in seconds.
pub const MIN_POLL_INTERVAL: u64 = 1;
/// Longest accepted poll interval in seconds (one day).
pub const MAX_POLL_INTERVAL: u64 = 86_400;

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Local archive and its upstream repository.
    pub archive: ArchiveConfig,
    /// Query defaults.
    pub query: QueryConfig,
    /// Watcher settings.
    pub watch: WatchConfig,
}

/// Where the archive lives and how to keep it current.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Local clone of the archive.
    pub path: PathBuf,
    /// Git remote to clone and pull from.
    pub remote: String,
    /// Branch to track.
    pub branch: String,
    /// IANA zone the station records local times in.
    pub time_zone: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            path: meteo_archive::default_archive_path(),
            remote: DEFAULT_REMOTE.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            time_zone: meteo_archive::DEFAULT_TIME_ZONE.name().to_string(),
        }
    }
}

impl ArchiveConfig {
    /// The configured zone, parsed.
    pub fn tz(&self) -> meteo_archive::Result<Tz> {
        meteo_archive::parse_time_zone(&self.time_zone)
    }

    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.path.as_os_str().is_empty() {
            errors.push(ValidationError::new("archive.path", "path cannot be empty"));
        }
        if self.remote.trim().is_empty() {
            errors.push(ValidationError::new("archive.remote", "remote cannot be empty"));
        }
        if self.branch.trim().is_empty() {
            errors.push(ValidationError::new("archive.branch", "branch cannot be empty"));
        }
        if let Err(e) = self.tz() {
            errors.push(ValidationError::new("archive.time_zone", e.to_string()));
        }

        errors
    }
}

/// Query defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Values per page; 0 disables pagination.
    pub page_size: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Watcher settings, in seconds where a duration is expected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub poll_interval: u64,
    pub sync_timeout: Option<u64>,
    pub max_consecutive_failures: Option<u32>,
    pub buffer_size: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        let options = WatchOptions::default();
        Self {
            poll_interval: options.poll_interval.as_secs(),
            sync_timeout: None,
            max_consecutive_failures: None,
            buffer_size: options.buffer_size,
        }
    }
}

impl WatchConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !(MIN_POLL_INTERVAL..=MAX_POLL_INTERVAL).contains(&self.poll_interval) {
            errors.push(ValidationError::new(
                "watch.poll_interval",
                format!(
                    "poll interval {}s is out of range ({}..={})",
                    self.poll_interval, MIN_POLL_INTERVAL, MAX_POLL_INTERVAL
                ),
            ));
        }
        if self.sync_timeout == Some(0) {
            errors.push(ValidationError::new(
                "watch.sync_timeout",
                "sync timeout cannot be 0",
            ));
        }
        if self.max_consecutive_failures == Some(0) {
            errors.push(ValidationError::new(
                "watch.max_consecutive_failures",
                "must allow at least one failure",
            ));
        }
        if self.buffer_size == 0 {
            errors.push(ValidationError::new(
                "watch.buffer_size",
                "buffer size cannot be 0",
            ));
        }

        errors
    }

    /// Watcher options for these settings.
    pub fn to_options(&self) -> WatchOptions {
        let mut builder = WatchOptions::builder()
            .poll_interval(Duration::from_secs(self.poll_interval))
            .buffer_size(self.buffer_size);
        if let Some(secs) = self.sync_timeout {
            builder = builder.sync_timeout(Duration::from_secs(secs));
        }
        if let Some(max) = self.max_consecutive_failures {
            builder = builder.max_consecutive_failures(max);
        }
        builder.build()
    }
}

impl Config {
    /// Load configuration from the default path, or defaults if there is no file.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration, reporting every problem at once.
    ///
    /// ```
    /// use meteo_cli::config::Config;
    ///
    /// Config::default().validate().expect("defaults are valid");
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = self.archive.validate();
        errors.extend(self.watch.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load from `path` (or the default location) and validate.
    pub fn load_validated(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::load_default()?,
        };
        config.validate()?;
        Ok(config)
    }
}

/// `<config_dir>/meteo/config.toml`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("meteo")
        .join("config.toml")
}

/// Errors loading or saving the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field path (e.g., `watch.poll_interval`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.archive.time_zone, "Europe/Rome");
        assert_eq!(config.archive.branch, "main");
        assert_eq!(config.query.page_size, 100);
        assert_eq!(config.watch.poll_interval, 60);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [archive]
            path = "/srv/meteo"

            [watch]
            sync_timeout = 120
            "#,
        )
        .unwrap();

        assert_eq!(config.archive.path, PathBuf::from("/srv/meteo"));
        assert_eq!(config.archive.remote, DEFAULT_REMOTE);
        assert_eq!(config.watch.sync_timeout, Some(120));
        assert_eq!(config.watch.poll_interval, 60);
        assert_eq!(config.query, QueryConfig::default());
    }

    #[test]
    fn test_validation_collects_every_error() {
        let mut config = Config::default();
        config.archive.time_zone = "Mars/Olympus".to_string();
        config.watch.poll_interval = 0;
        config.watch.buffer_size = 0;

        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(
                    fields,
                    vec!["archive.time_zone", "watch.poll_interval", "watch.buffer_size"]
                );
            }
            other => panic!("expected validation errors, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_message_lists_fields() {
        let mut config = Config::default();
        config.watch.poll_interval = MAX_POLL_INTERVAL + 1;
        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains("  - watch.poll_interval: poll interval 86401s"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.query.page_size = 0;
        config.watch.max_consecutive_failures = Some(5);

        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[watch]\npoll_interval = \"soon\"\n").unwrap();
        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_watch_options_from_config() {
        let watch = WatchConfig {
            poll_interval: 30,
            sync_timeout: Some(90),
            max_consecutive_failures: Some(4),
            buffer_size: 8,
        };
        let options = watch.to_options();
        assert_eq!(options.poll_interval, Duration::from_secs(30));
        assert_eq!(options.sync_timeout, Some(Duration::from_secs(90)));
        assert_eq!(options.max_consecutive_failures, Some(4));
        assert_eq!(options.buffer_size, 8);
        assert!(options.validate().is_ok());
    }
}
