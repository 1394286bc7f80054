//! Spot processing pipeline.
//!
//! ```text
//! SpotEvent ─► AdmissionFilter ─► SuppressionWindowStore ─► Notification
//!                 │ rejected            │ suppressed
//!                 ▼                     ▼
//!              dropped               dropped
//! ```

use super::admission::{Admission, AdmissionFilter, RejectReason};
use super::suppression::{SpotClock, SuppressionConfig, SuppressionWindowStore, TimeBase};
use super::HomeRegions;
use crate::directory::EntityDirectory;
use crate::models::{ContactPair, Notification, SpotEvent};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// What happened to one spot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// New contact; emit the notification.
    Admitted(Notification),
    /// Pair already announced within the window.
    Suppressed(ContactPair),
    /// Not eligible for notification.
    Rejected(RejectReason),
}

impl Outcome {
    /// The notification, if the spot was admitted.
    #[must_use]
    pub fn into_notification(self) -> Option<Notification> {
        match self {
            Self::Admitted(notification) => Some(notification),
            Self::Suppressed(_) | Self::Rejected(_) => None,
        }
    }
}

/// Running totals for a processed stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessStats {
    /// Payloads read.
    pub received: u64,
    /// Payloads dropped before the filter.
    pub malformed: u64,
    /// Spots rejected by the filter.
    pub rejected: u64,
    /// Spots suppressed by the window.
    pub suppressed: u64,
    /// Notifications emitted.
    pub admitted: u64,
}

impl ProcessStats {
    /// Counts one outcome.
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Admitted(_) => self.admitted += 1,
            Outcome::Suppressed(_) => self.suppressed += 1,
            Outcome::Rejected(_) => self.rejected += 1,
        }
    }
}

/// Owns the filter, the suppression store and the clock that feeds it.
///
/// `process` takes `&self`, so one processor can be shared across tasks
/// behind an `Arc`; the store serializes its own state.
#[derive(Debug)]
pub struct SpotProcessor {
    filter: AdmissionFilter,
    store: SuppressionWindowStore,
    clock: SpotClock,
}

impl SpotProcessor {
    /// Creates a processor.
    #[must_use]
    pub fn new(
        directory: Arc<EntityDirectory>,
        home: HomeRegions,
        suppression: &SuppressionConfig,
        time_base: TimeBase,
    ) -> Self {
        Self {
            filter: AdmissionFilter::new(directory, home),
            store: SuppressionWindowStore::new(suppression),
            clock: SpotClock::for_time_base(time_base, suppression.max_clock_skew),
        }
    }

    /// Processes a spot, timestamping it with the processor's clock.
    pub fn process(&self, event: SpotEvent) -> Outcome {
        let observed_at = self.clock.observe(&event);
        self.process_at(event, observed_at)
    }

    /// Processes a spot observed at `observed_at`.
    pub fn process_at(&self, event: SpotEvent, observed_at: Instant) -> Outcome {
        let (pair, sender_name, receiver_name) = match self.filter.check(&event) {
            Admission::Eligible {
                pair,
                sender,
                receiver,
            } => (pair, sender, receiver),
            Admission::Rejected(reason) => {
                tracing::debug!(
                    sender = %event.sender,
                    receiver = %event.receiver,
                    reason = %reason,
                    "Spot rejected"
                );
                metrics::counter!("spots_rejected_total", "reason" => reason.as_str()).increment(1);
                return Outcome::Rejected(reason);
            },
        };

        if !self.store.evaluate(pair, observed_at) {
            tracing::debug!(pair = %pair, "Contact suppressed within window");
            metrics::counter!("spots_suppressed_total").increment(1);
            return Outcome::Suppressed(pair);
        }

        tracing::debug!(
            sender = %event.sender,
            receiver = %event.receiver,
            "Contact admitted"
        );
        metrics::counter!("spots_admitted_total").increment(1);

        Outcome::Admitted(Notification::new(event, receiver_name, sender_name))
    }

    /// Drops suppression records whose window has closed.
    pub fn prune_expired(&self) -> usize {
        self.store.prune_expired(self.clock.now())
    }

    /// The suppression store.
    #[must_use]
    pub const fn store(&self) -> &SuppressionWindowStore {
        &self.store
    }
}
