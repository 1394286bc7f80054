//! Recent-contact suppression.
//!
//! Withholds repeat notifications for the same unordered pair of entities
//! within a sliding window.
//!
//! ```text
//! SpotEvent ──► SpotClock::observe ──► SuppressionWindowStore::evaluate
//!                (arrival / replay)      ContactPair ─► last admitted Instant
//!                                          elapsed >  window → admit, refresh
//!                                          elapsed <= window → suppress
//! ```

mod clock;
mod config;
mod store;

pub use clock::{DEFAULT_MAX_CLOCK_SKEW, ReplayClock, SpotClock, TimeBase};
pub use config::{DEFAULT_WINDOW, SuppressionConfig};
pub use store::SuppressionWindowStore;
