//! Business logic services.
//!
//! The core of spotwatch: home region classification, admission of spots,
//! windowed suppression of repeat contacts, and the pipeline that ties them
//! together.

pub mod admission;
mod processor;
mod region;
pub mod suppression;
mod topics;

pub use admission::{Admission, AdmissionFilter, RejectReason};
pub use processor::{Outcome, ProcessStats, SpotProcessor};
pub use region::{DEFAULT_HOME_REGIONS, HomeRegions};
pub use suppression::{SuppressionConfig, SuppressionWindowStore, TimeBase};
pub use topics::{TOPIC_PREFIX, topic_filters};
