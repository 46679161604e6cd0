//! Configuration loading from YAML files with environment variable overrides.

use crate::schema::{Config, CsvLayout};
use kwtrends_common::TrendsError;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable pointing at a configuration file.
pub const CONFIG_PATH_ENV: &str = "KWTRENDS_CONFIG_PATH";

/// File names probed in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["kwtrends.yaml", "kwtrends.yml"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file {path}: {source}")]
    IoError {
        /// File that was read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        /// Variable name
        var: String,
        /// Parse failure of the value
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[source] TrendsError),
}

impl From<ConfigError> for TrendsError {
    fn from(err: ConfigError) -> Self {
        TrendsError::config_with_source("could not load configuration", err)
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration, looking in order at `explicit`, the
    /// `KWTRENDS_CONFIG_PATH` variable, and the default file names.
    /// Falls back to defaults when no file is found. Environment overrides
    /// are applied and the result is validated.
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
            .or_else(|| {
                DEFAULT_CONFIG_FILES
                    .iter()
                    .map(PathBuf::from)
                    .find(|p| p.exists())
            });

        let mut config = match path {
            Some(path) => Self::read_file(&path)?,
            None => {
                debug!("No configuration file found, using defaults");
                Config::default()
            }
        };

        Self::apply_env_overrides(&mut config)?;
        config.validate().map_err(ConfigError::ValidationError)?;
        Ok(config)
    }

    /// Load and validate a specific file without environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let config = Self::read_file(path.as_ref())?;
        config.validate().map_err(ConfigError::ValidationError)?;
        Ok(config)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Config, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    fn read_file(path: &Path) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded configuration from {}", path.display());
        Self::from_yaml(&content)
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        Self::apply_overrides(config, |var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(geo) = lookup("KWTRENDS_GEO") {
            config.provider.geo = geo;
        }

        if let Some(timeframe) = lookup("KWTRENDS_TIMEFRAME") {
            config.provider.timeframe = timeframe;
        }

        if let Some(language) = lookup("KWTRENDS_LANGUAGE") {
            config.provider.language = language;
        }

        if let Some(tz) = lookup("KWTRENDS_TZ_OFFSET") {
            config.provider.tz_offset = parse_var("KWTRENDS_TZ_OFFSET", &tz)?;
        }

        if let Some(size) = lookup("KWTRENDS_BATCH_SIZE") {
            config.batching.batch_size = parse_var("KWTRENDS_BATCH_SIZE", &size)?;
        }

        if let Some(interval) = lookup("KWTRENDS_REQUEST_INTERVAL_SECS") {
            config.provider.request_interval_seconds =
                parse_var("KWTRENDS_REQUEST_INTERVAL_SECS", &interval)?;
        }

        if let Some(layout) = lookup("KWTRENDS_CSV_LAYOUT") {
            config.export.csv_layout =
                layout
                    .parse::<CsvLayout>()
                    .map_err(|e| ConfigError::EnvParseError {
                        var: "KWTRENDS_CSV_LAYOUT".to_string(),
                        source: Box::new(e),
                    })?;
        }

        if let Some(level) = lookup("KWTRENDS_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(())
    }
}

fn parse_var<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse().map_err(|e| ConfigError::EnvParseError {
        var: var.to_string(),
        source: Box::new(e),
    })
}
