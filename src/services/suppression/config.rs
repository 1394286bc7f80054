//! Suppression window configuration.

use super::DEFAULT_MAX_CLOCK_SKEW;
use std::time::Duration;

/// Default suppression window: 15 minutes.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Configuration for the suppression window store.
///
/// Loaded as part of [`crate::config::SpotwatchConfig`], which applies the
/// `SPOTWATCH_WINDOW_SECS` and `SPOTWATCH_MAX_TRACKED_PAIRS` overrides.
///
/// # Example
///
/// ```rust
/// use spotwatch::services::suppression::SuppressionConfig;
/// use std::time::Duration;
///
/// let config = SuppressionConfig::default().with_window(Duration::from_secs(60));
/// assert_eq!(config.window, Duration::from_secs(60));
/// assert!(config.max_pairs.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuppressionConfig {
    /// How long a repeat of an admitted pair is withheld.
    pub window: Duration,

    /// Optional bound on tracked pairs.
    ///
    /// `None` (or zero) keeps every pair for the life of the process. With a bound,
    /// the least recently admitted pair is dropped first; a pair dropped
    /// while still inside its window will be admitted again early.
    pub max_pairs: Option<usize>,

    /// How far a single spot may move the replay timeline in event time.
    pub max_clock_skew: Duration,
}

impl SuppressionConfig {
    /// Builder method to set the window.
    #[must_use]
    pub const fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Builder method to set the replay clock skew bound.
    #[must_use]
    pub const fn with_max_clock_skew(mut self, max_clock_skew: Duration) -> Self {
        self.max_clock_skew = max_clock_skew;
        self
    }

    /// Builder method to bound the number of tracked pairs.
    #[must_use]
    pub const fn with_max_pairs(mut self, max_pairs: Option<usize>) -> Self {
        self.max_pairs = max_pairs;
        self
    }
}

impl Default for SuppressionConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            max_pairs: None,
            max_clock_skew: DEFAULT_MAX_CLOCK_SKEW,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SuppressionConfig::default();

        assert_eq!(config.window, Duration::from_secs(900));
        assert_eq!(config.max_pairs, None);
        assert_eq!(config.max_clock_skew, Duration::from_secs(3600));
    }

    #[test]
    fn test_builder_methods() {
        let config = SuppressionConfig::default()
            .with_window(Duration::from_secs(60))
            .with_max_pairs(Some(500))
            .with_max_clock_skew(Duration::from_secs(120));

        assert_eq!(config.window, Duration::from_secs(60));
        assert_eq!(config.max_clock_skew, Duration::from_secs(120));
        assert_eq!(config.max_pairs, Some(500));
    }
}
