//! Log formatting and filtering.

use crate::config::LoggingSettings;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Default filter when neither the environment nor the config sets one.
const DEFAULT_LEVEL: &str = "info";

/// Output format for log records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line records.
    #[default]
    Pretty,
    /// One JSON object per record.
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "pretty" | "text" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Record format.
    pub format: LogFormat,
    /// Level filter.
    pub filter: EnvFilter,
    /// Log file; stderr when unset.
    pub file: Option<PathBuf>,
    /// A filter directive that failed to parse and was replaced by the
    /// default; reported once the subscriber is installed.
    pub rejected_directive: Option<String>,
}

impl LoggingConfig {
    /// Builds logging configuration from config settings with env overrides.
    ///
    /// Filter precedence: `RUST_LOG`, `SPOTWATCH_LOG_LEVEL`, `--verbose`
    /// (debug), the config file level, then `info`. `SPOTWATCH_LOG_FORMAT`
    /// and `SPOTWATCH_LOG_FILE` override the file settings.
    #[must_use]
    pub fn from_settings(settings: Option<&LoggingSettings>, verbose: bool) -> Self {
        Self::resolve(settings, verbose, |key| std::env::var(key).ok())
    }

    fn resolve<F>(settings: Option<&LoggingSettings>, verbose: bool, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let format = var("SPOTWATCH_LOG_FORMAT")
            .as_deref()
            .and_then(LogFormat::parse)
            .or_else(|| {
                settings
                    .and_then(|s| s.format.as_deref())
                    .and_then(LogFormat::parse)
            })
            .unwrap_or_default();

        let file = var("SPOTWATCH_LOG_FILE")
            .filter(|v| !v.trim().is_empty())
            .or_else(|| settings.and_then(|s| s.file.clone()))
            .map(PathBuf::from);

        let directive = var("RUST_LOG")
            .or_else(|| var("SPOTWATCH_LOG_LEVEL"))
            .or_else(|| verbose.then(|| "debug".to_string()))
            .or_else(|| settings.and_then(|s| s.level.clone()))
            .unwrap_or_else(|| DEFAULT_LEVEL.to_string());

        let (filter, rejected_directive) = match EnvFilter::try_new(&directive) {
            Ok(filter) => (filter, None),
            Err(_) => (EnvFilter::new(DEFAULT_LEVEL), Some(directive)),
        };

        Self {
            format,
            filter,
            file,
            rejected_directive,
        }
    }
}
