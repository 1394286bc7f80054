//! # Spotwatch
//!
//! Notifies new cross-region radio contacts from a stream of propagation
//! spot reports.
//!
//! Each spot names a sender entity, a receiver entity and a timestamp. Spots
//! between a home region and a foreign entity produce one notification per
//! unordered contact pair; repeats within the suppression window are
//! withheld.
//!
//! ## Example
//!
//! ```rust
//! use spotwatch::directory::EntityDirectory;
//! use spotwatch::models::{EntityCode, SpotEvent};
//! use spotwatch::services::{HomeRegions, Outcome, SpotProcessor, SuppressionConfig, TimeBase};
//! use std::sync::Arc;
//!
//! let directory = Arc::new(EntityDirectory::from_entries([
//!     (EntityCode::new(1), "Home"),
//!     (EntityCode::new(99), "Foreign"),
//! ])?);
//! let home = HomeRegions::new([EntityCode::new(1)]);
//! let processor =
//!     SpotProcessor::new(directory, home, &SuppressionConfig::default(), TimeBase::Event);
//!
//! let spot = SpotEvent::from_epoch(EntityCode::new(1), EntityCode::new(99), 0)?;
//! match processor.process(spot) {
//!     Outcome::Admitted(n) => assert_eq!(n.to_string(), "00:00:00Z Foreign hearing Home"),
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! # Ok::<(), spotwatch::Error>(())
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod config;
pub mod directory;
pub mod io;
pub mod models;
pub mod observability;
pub mod services;

pub use config::SpotwatchConfig;
pub use directory::EntityDirectory;
pub use models::{ContactPair, EntityCode, Notification, SpotEvent, SpotMessage};
pub use services::{
    AdmissionFilter, HomeRegions, Outcome, SpotProcessor, SuppressionConfig,
    SuppressionWindowStore, TimeBase,
};

/// Error type for spotwatch operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Malformed spot payloads, bad directory rows, invalid config values |
/// | `OperationFailed` | File I/O errors, config parse failures, telemetry init failures |
///
/// Rejected and suppressed spots are outcomes, not errors.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - A spot payload is not JSON or lacks `sa`, `ra` or `t`
    /// - A directory row has a non-numeric code or a duplicate code
    /// - A config value is out of range (zero window, empty home set)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - Filesystem I/O errors occur
    /// - The config file is not valid TOML
    /// - Logging or metrics initialization fails
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for spotwatch operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("test error".to_string());
        assert_eq!(err.to_string(), "invalid input: test error");

        let err = Error::OperationFailed {
            operation: "test".to_string(),
            cause: "failed".to_string(),
        };
        assert_eq!(err.to_string(), "operation 'test' failed: failed");
    }
}
