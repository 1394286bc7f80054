//! Contact admission filter.
//!
//! Decides whether a spot is a candidate for notification at all, before
//! any suppression state is consulted. The filter is a pure predicate over
//! the event, the home region set and the entity directory.

use super::HomeRegions;
use crate::directory::EntityDirectory;
use crate::models::{ContactPair, EntityCode, SpotEvent};
use std::fmt;
use std::sync::Arc;

/// Why a spot was not eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Sender and receiver are the same entity.
    SelfContact,
    /// Both sides are home regions.
    HomeToHome,
    /// A side has no directory entry.
    UnknownEntity(EntityCode),
}

impl RejectReason {
    /// Stable label for logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SelfContact => "self_contact",
            Self::HomeToHome => "home_to_home",
            Self::UnknownEntity(_) => "unknown_entity",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownEntity(code) => write!(f, "unknown entity {code}"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Outcome of the admission check.
///
/// An eligible spot carries its contact pair and the resolved display names
/// so the caller does not need a second directory lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission<'a> {
    /// The spot may proceed to suppression.
    Eligible {
        /// Canonical key for the suppression store.
        pair: ContactPair,
        /// Sender display name.
        sender: &'a str,
        /// Receiver display name.
        receiver: &'a str,
    },
    /// The spot is dropped.
    Rejected(RejectReason),
}

impl Admission<'_> {
    /// Returns true for [`Admission::Eligible`].
    #[must_use]
    pub const fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible { .. })
    }
}

/// Filter applied to every decoded spot.
///
/// Rules, in order:
/// 1. sender and receiver must differ
/// 2. at least one side must be foreign
/// 3. both sides must resolve in the directory
///
/// Rule 2 is applied even when the broker subscription already narrowed the
/// stream to spots with a foreign side.
#[derive(Debug, Clone)]
pub struct AdmissionFilter {
    directory: Arc<EntityDirectory>,
    home: HomeRegions,
}

impl AdmissionFilter {
    /// Creates a filter over the given directory and home set.
    #[must_use]
    pub fn new(directory: Arc<EntityDirectory>, home: HomeRegions) -> Self {
        Self { directory, home }
    }

    /// Runs the admission rules.
    #[must_use]
    pub fn check(&self, event: &SpotEvent) -> Admission<'_> {
        let Some(pair) = ContactPair::new(event.sender, event.receiver) else {
            return Admission::Rejected(RejectReason::SelfContact);
        };
        if self.home.is_home(event.sender) && self.home.is_home(event.receiver) {
            return Admission::Rejected(RejectReason::HomeToHome);
        }

        let Some(sender) = self.directory.resolve(event.sender) else {
            return Admission::Rejected(RejectReason::UnknownEntity(event.sender));
        };
        let Some(receiver) = self.directory.resolve(event.receiver) else {
            return Admission::Rejected(RejectReason::UnknownEntity(event.receiver));
        };

        Admission::Eligible {
            pair,
            sender,
            receiver,
        }
    }

    /// Returns true if the spot is eligible.
    #[must_use]
    pub fn admit(&self, event: &SpotEvent) -> bool {
        self.check(event).is_eligible()
    }

    /// The home region set in use.
    #[must_use]
    pub const fn home(&self) -> &HomeRegions {
        &self.home
    }

    /// The directory in use.
    #[must_use]
    pub fn directory(&self) -> &EntityDirectory {
        &self.directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn filter() -> AdmissionFilter {
        let directory = EntityDirectory::from_entries([
            (EntityCode::new(1), "Home"),
            (EntityCode::new(2), "Other Home"),
            (EntityCode::new(99), "Foreign"),
            (EntityCode::new(98), "Far Foreign"),
        ])
        .unwrap();
        let home = HomeRegions::new([EntityCode::new(1), EntityCode::new(2)]);
        AdmissionFilter::new(Arc::new(directory), home)
    }

    fn spot(sender: i64, receiver: i64) -> SpotEvent {
        SpotEvent::from_epoch(sender.into(), receiver.into(), 0).unwrap()
    }

    #[test_case(1, 99, true ; "home sender heard abroad")]
    #[test_case(99, 1, true ; "foreign sender heard at home")]
    #[test_case(98, 99, true ; "foreign to foreign")]
    #[test_case(1, 2, false ; "home to home")]
    #[test_case(2, 1, false ; "home to home reversed")]
    #[test_case(1, 1, false ; "self contact at home")]
    #[test_case(99, 99, false ; "self contact abroad")]
    #[test_case(1, 500, false ; "unknown receiver")]
    #[test_case(500, 1, false ; "unknown sender")]
    fn test_admit(sender: i64, receiver: i64, expected: bool) {
        assert_eq!(filter().admit(&spot(sender, receiver)), expected);
    }

    #[test]
    fn test_self_contact_wins_over_unknown() {
        let filter = filter();
        let admission = filter.check(&spot(500, 500));
        assert_eq!(admission, Admission::Rejected(RejectReason::SelfContact));
    }

    #[test]
    fn test_unknown_entity_reports_code() {
        let filter = filter();
        let admission = filter.check(&spot(1, 500));

        assert_eq!(
            admission,
            Admission::Rejected(RejectReason::UnknownEntity(EntityCode::new(500)))
        );
        if let Admission::Rejected(reason) = admission {
            assert_eq!(reason.to_string(), "unknown entity 500");
            assert_eq!(reason.as_str(), "unknown_entity");
        }
    }

    #[test]
    fn test_eligible_carries_names() {
        let filter = filter();
        let admission = filter.check(&spot(1, 99));

        assert_eq!(
            admission,
            Admission::Eligible {
                pair: ContactPair::new(EntityCode::new(99), EntityCode::new(1)).unwrap(),
                sender: "Home",
                receiver: "Foreign"
            }
        );
    }
}
