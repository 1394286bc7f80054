//! Configuration management.
//!
//! Settings come from a TOML file, then environment variables override
//! individual values:
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `SPOTWATCH_CONFIG_PATH` | config file location |
//! | `SPOTWATCH_WINDOW_SECS` | `window_secs` |
//! | `SPOTWATCH_HOME_REGIONS` | `home_regions` (comma-separated codes) |
//! | `SPOTWATCH_DIRECTORY` | `directory_path` |
//! | `SPOTWATCH_MAX_TRACKED_PAIRS` | `max_tracked_pairs` |

use crate::directory::EntityDirectory;
use crate::io::OutputFormat;
use crate::models::EntityCode;
use crate::services::{DEFAULT_HOME_REGIONS, HomeRegions, SuppressionConfig, TimeBase};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration for spotwatch.
#[derive(Debug, Clone)]
pub struct SpotwatchConfig {
    /// Suppression window settings.
    pub suppression: SuppressionConfig,
    /// Home region entity codes.
    pub home_regions: Vec<EntityCode>,
    /// Entity directory CSV; the built-in table when unset.
    pub directory_path: Option<PathBuf>,
    /// Period of the expired-record sweep; no sweep when unset.
    pub sweep_interval: Option<Duration>,
    /// Band used in broker topic filters.
    pub band: String,
    /// Mode used in broker topic filters.
    pub mode: String,
    /// Clock that drives the suppression window.
    pub time_base: TimeBase,
    /// Notification format.
    pub output: OutputFormat,
    /// Logging and metrics settings.
    pub observability: ObservabilitySettings,
}

/// Observability section of the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservabilitySettings {
    /// Logging settings.
    pub logging: Option<LoggingSettings>,
    /// Metrics settings.
    pub metrics: Option<MetricsSettings>,
}

/// Logging section in config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// Filter directive, e.g. `info` or `spotwatch=debug`.
    pub level: Option<String>,
    /// Log file path; stderr when unset.
    pub file: Option<String>,
}

/// Metrics section in config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSettings {
    /// Whether to install the Prometheus recorder.
    pub enabled: Option<bool>,
    /// Listener port for the scrape endpoint.
    pub port: Option<u16>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Suppression window in seconds.
    pub window_secs: Option<u64>,
    /// Home region codes.
    pub home_regions: Option<Vec<i64>>,
    /// Entity directory CSV path.
    pub directory_path: Option<String>,
    /// LRU bound on tracked pairs.
    pub max_tracked_pairs: Option<usize>,
    /// How far one spot may move the replay timeline, in seconds.
    pub max_clock_skew_secs: Option<u64>,
    /// Sweep period in seconds.
    pub sweep_interval_secs: Option<u64>,
    /// Topic band.
    pub band: Option<String>,
    /// Topic mode.
    pub mode: Option<String>,
    /// `arrival` or `event`.
    pub time_base: Option<String>,
    /// `text` or `json`.
    pub output: Option<String>,
    /// Logging section.
    pub logging: Option<LoggingSettings>,
    /// Metrics section.
    pub metrics: Option<MetricsSettings>,
}

impl Default for SpotwatchConfig {
    fn default() -> Self {
        Self {
            suppression: SuppressionConfig::default(),
            home_regions: DEFAULT_HOME_REGIONS.into_iter().map(EntityCode::new).collect(),
            directory_path: None,
            sweep_interval: None,
            band: "6m".to_string(),
            mode: "FT8".to_string(),
            time_base: TimeBase::Arrival,
            output: OutputFormat::Text,
            observability: ObservabilitySettings::default(),
        }
    }
}

impl SpotwatchConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or holds an
    /// invalid value.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or holds an invalid
    /// value.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        Self::from_config_file(file)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks `<config dir>/spotwatch/config.toml`, then
    /// `~/.config/spotwatch/config.toml`. Returns defaults if neither exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be loaded.
    pub fn load_default() -> Result<Self> {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Ok(Self::default());
        };

        Self::load_first_existing(&[
            base_dirs.config_dir().join("spotwatch").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("spotwatch")
                .join("config.toml"),
        ])
    }

    fn load_first_existing(candidates: &[PathBuf]) -> Result<Self> {
        candidates
            .iter()
            .find(|p| p.exists())
            .map_or_else(|| Ok(Self::default()), |path| Self::load_from_file(path))
    }

    /// Converts a `ConfigFile` to `SpotwatchConfig`.
    fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(secs) = file.window_secs {
            config.suppression.window = Duration::from_secs(secs);
        }
        if let Some(codes) = file.home_regions {
            config.home_regions = codes.into_iter().map(EntityCode::new).collect();
        }
        config.directory_path = file.directory_path.map(PathBuf::from);
        config.suppression.max_pairs = file.max_tracked_pairs;
        if let Some(secs) = file.max_clock_skew_secs {
            config.suppression.max_clock_skew = Duration::from_secs(secs);
        }
        config.sweep_interval = file.sweep_interval_secs.map(Duration::from_secs);
        if let Some(band) = file.band {
            config.band = band;
        }
        if let Some(mode) = file.mode {
            config.mode = mode;
        }
        if let Some(time_base) = file.time_base {
            config.time_base = TimeBase::parse(&time_base)?;
        }
        if let Some(output) = file.output {
            config.output = output.parse()?;
        }
        config.observability = ObservabilitySettings {
            logging: file.logging,
            metrics: file.metrics,
        };

        config.validate()?;
        Ok(config)
    }

    /// Applies `SPOTWATCH_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a variable holds an invalid value.
    pub fn apply_env_overrides(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(mut self, var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = var("SPOTWATCH_WINDOW_SECS") {
            let secs: u64 = v.trim().parse().map_err(|_| {
                Error::InvalidInput(format!("SPOTWATCH_WINDOW_SECS '{v}' is not a number"))
            })?;
            self.suppression.window = Duration::from_secs(secs);
        }
        if let Some(v) = var("SPOTWATCH_HOME_REGIONS") {
            self.home_regions = parse_code_list(&v)?;
        }
        if let Some(v) = var("SPOTWATCH_DIRECTORY").filter(|v| !v.trim().is_empty()) {
            self.directory_path = Some(PathBuf::from(v));
        }
        if let Some(v) = var("SPOTWATCH_MAX_TRACKED_PAIRS") {
            let max: usize = v.trim().parse().map_err(|_| {
                Error::InvalidInput(format!("SPOTWATCH_MAX_TRACKED_PAIRS '{v}' is not a number"))
            })?;
            self.suppression.max_pairs = Some(max);
        }

        self.validate()?;
        Ok(self)
    }

    /// Checks values that would make the service meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a zero window, a zero clock skew
    /// bound or an empty home region set.
    pub fn validate(&self) -> Result<()> {
        if self.suppression.window.is_zero() {
            return Err(Error::InvalidInput(
                "suppression window must be greater than zero".to_string(),
            ));
        }
        if self.suppression.max_clock_skew.is_zero() {
            return Err(Error::InvalidInput(
                "max_clock_skew_secs must be greater than zero".to_string(),
            ));
        }
        if self.home_regions.is_empty() {
            return Err(Error::InvalidInput(
                "at least one home region is required".to_string(),
            ));
        }
        Ok(())
    }

    /// The home region classifier.
    #[must_use]
    pub fn home(&self) -> HomeRegions {
        HomeRegions::new(self.home_regions.iter().copied())
    }

    /// Loads the configured entity directory, or the built-in table.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured file cannot be loaded.
    pub fn load_directory(&self) -> Result<EntityDirectory> {
        match &self.directory_path {
            Some(path) => EntityDirectory::load_from_file(path),
            None => EntityDirectory::builtin(),
        }
    }

    /// Renders the effective configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        let file = ConfigFile {
            window_secs: Some(self.suppression.window.as_secs()),
            home_regions: Some(self.home_regions.iter().map(|c| c.get()).collect()),
            directory_path: self
                .directory_path
                .as_ref()
                .map(|p| p.display().to_string()),
            max_tracked_pairs: self.suppression.max_pairs,
            max_clock_skew_secs: Some(self.suppression.max_clock_skew.as_secs()),
            sweep_interval_secs: self.sweep_interval.map(|d| d.as_secs()),
            band: Some(self.band.clone()),
            mode: Some(self.mode.clone()),
            time_base: Some(
                match self.time_base {
                    TimeBase::Arrival => "arrival",
                    TimeBase::Event => "event",
                }
                .to_string(),
            ),
            output: Some(self.output.to_string()),
            logging: self.observability.logging.clone(),
            metrics: self.observability.metrics.clone(),
        };

        toml::to_string_pretty(&file).map_err(|e| Error::OperationFailed {
            operation: "serialize_config".to_string(),
            cause: e.to_string(),
        })
    }

    /// Sets the suppression window.
    #[must_use]
    pub const fn with_window(mut self, window: Duration) -> Self {
        self.suppression.window = window;
        self
    }

    /// Sets the home regions.
    #[must_use]
    pub fn with_home_regions(mut self, codes: impl IntoIterator<Item = EntityCode>) -> Self {
        self.home_regions = codes.into_iter().collect();
        self
    }

    /// Sets the directory file.
    #[must_use]
    pub fn with_directory_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.directory_path = Some(path.into());
        self
    }
}

fn parse_code_list(value: &str) -> Result<Vec<EntityCode>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map(EntityCode::new)
                .map_err(|_| Error::InvalidInput(format!("'{s}' is not an entity code")))
        })
        .collect()
}
