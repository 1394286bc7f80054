//! Property-based tests for contact pairs, the suppression window and the
//! replay clock.

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;
use spotwatch::models::{ContactPair, EntityCode};
use spotwatch::services::SuppressionWindowStore;
use spotwatch::services::suppression::ReplayClock;
use std::time::{Duration, Instant};

fn distinct_codes() -> impl Strategy<Value = (i64, i64)> {
    (0i64..600, 0i64..600).prop_filter("codes must differ", |(a, b)| a != b)
}

proptest! {
    /// Property: a pair and its reverse are the same key.
    #[test]
    fn prop_pair_is_unordered((a, b) in distinct_codes()) {
        let forward = ContactPair::new(EntityCode::new(a), EntityCode::new(b)).unwrap();
        let reverse = ContactPair::new(EntityCode::new(b), EntityCode::new(a)).unwrap();

        prop_assert_eq!(forward, reverse);
        prop_assert!(forward.low() < forward.high());
    }

    /// Property: a code never pairs with itself.
    #[test]
    fn prop_self_pair_rejected(a in any::<i64>()) {
        prop_assert!(ContactPair::new(EntityCode::new(a), EntityCode::new(a)).is_none());
    }

    /// Property: within the window a repeat in either direction is suppressed;
    /// past it the pair is admitted again.
    #[test]
    fn prop_window_decides_admission(
        (a, b) in distinct_codes(),
        window_secs in 1u64..7200,
        gap_secs in 0u64..14400,
        reversed in any::<bool>(),
    ) {
        let store = SuppressionWindowStore::with_window(Duration::from_secs(window_secs));
        let t0 = Instant::now();
        let first = ContactPair::new(EntityCode::new(a), EntityCode::new(b)).unwrap();
        let second = if reversed {
            ContactPair::new(EntityCode::new(b), EntityCode::new(a)).unwrap()
        } else {
            first
        };

        prop_assert!(store.evaluate(first, t0));
        let admitted = store.evaluate(second, t0 + Duration::from_secs(gap_secs));

        prop_assert_eq!(admitted, gap_secs > window_secs);
        prop_assert_eq!(store.len(), 1);
    }

    /// Property: only one record is ever kept per pair.
    #[test]
    fn prop_one_record_per_pair(
        events in prop::collection::vec(((0i64..8, 0i64..8), 0u64..3600), 1..64),
    ) {
        let store = SuppressionWindowStore::with_window(Duration::from_secs(900));
        let t0 = Instant::now();
        let mut pairs = std::collections::HashSet::new();

        for ((a, b), offset) in events {
            if let Some(pair) = ContactPair::new(EntityCode::new(a), EntityCode::new(b)) {
                store.evaluate(pair, t0 + Duration::from_secs(offset));
                pairs.insert(pair);
            }
        }

        prop_assert_eq!(store.len(), pairs.len());
    }

    /// Property: one far-future timestamp never stops a pair from being
    /// admitted again once honest time has moved past the window.
    #[test]
    fn prop_replay_clock_ignores_lone_outlier(
        start in 1_600_000_000i64..1_700_000_000,
        outlier_ahead in 7200i64..100_000_000,
        later in 901i64..3600,
    ) {
        let anchor = Instant::now();
        let clock = ReplayClock::anchored_at(anchor);
        let store = SuppressionWindowStore::with_window(Duration::from_secs(900));
        let key = ContactPair::new(EntityCode::new(1), EntityCode::new(99)).unwrap();

        prop_assert!(store.evaluate(key, clock.observe(start)));
        clock.observe(start + outlier_ahead);
        prop_assert!(store.evaluate(key, clock.observe(start + later)));
    }

    /// Property: replay instants never move backwards.
    #[test]
    fn prop_replay_clock_monotonic(
        timestamps in prop::collection::vec(1_600_000_000i64..1_700_000_000, 1..100),
    ) {
        let clock = ReplayClock::new();
        let mut last = None;

        for t in timestamps {
            let instant = clock.observe(t);
            if let Some(previous) = last {
                prop_assert!(instant >= previous);
            }
            last = Some(instant);
        }
    }

    /// Property: in-order timestamps within the skew bound keep their spacing
    /// on the replay timeline.
    #[test]
    fn prop_replay_clock_preserves_spacing(start in 0i64..2_000_000_000, gap in 0i64..=3600) {
        let anchor = Instant::now();
        let clock = ReplayClock::anchored_at(anchor);

        prop_assert_eq!(clock.observe(start), anchor);
        prop_assert_eq!(
            clock.observe(start + gap),
            anchor + Duration::from_secs(u64::try_from(gap).unwrap())
        );
    }
}
