//! Windowed suppression of repeat contacts.

use super::SuppressionConfig;
use crate::models::ContactPair;
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::instrument;

/// Per-pair time of the last admitted notification.
#[derive(Debug)]
enum Records {
    Unbounded(HashMap<ContactPair, Instant>),
    Bounded(LruCache<ContactPair, Instant>),
}

impl Records {
    fn last_admitted(&self, pair: &ContactPair) -> Option<Instant> {
        match self {
            Self::Unbounded(map) => map.get(pair).copied(),
            Self::Bounded(cache) => cache.peek(pair).copied(),
        }
    }

    fn admit(&mut self, pair: ContactPair, at: Instant) {
        match self {
            Self::Unbounded(map) => {
                map.insert(pair, at);
            },
            Self::Bounded(cache) => {
                cache.put(pair, at);
            },
        }
    }

    fn retain_recent(&mut self, now: Instant, window: Duration) -> usize {
        let expired = |at: &Instant| now.saturating_duration_since(*at) > window;
        match self {
            Self::Unbounded(map) => {
                let before = map.len();
                map.retain(|_, at| !expired(at));
                before - map.len()
            },
            Self::Bounded(cache) => {
                let stale: Vec<ContactPair> = cache
                    .iter()
                    .filter(|(_, at)| expired(at))
                    .map(|(pair, _)| *pair)
                    .collect();
                for pair in &stale {
                    cache.pop(pair);
                }
                stale.len()
            },
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Unbounded(map) => map.len(),
            Self::Bounded(cache) => cache.len(),
        }
    }
}

/// Decides whether a contact pair may produce a notification.
///
/// # How it works
///
/// 1. Keeps one record per unordered pair: the instant of its last admission
/// 2. A pair with no record, or whose record is older than the window, is
///    admitted and its record replaced
/// 3. A pair admitted within the window (inclusive) is suppressed and the
///    record left untouched
///
/// Because a suppressed repeat does not refresh the record, a pair that is
/// heard continuously is announced once per window rather than never again.
///
/// # Thread Safety
///
/// The lookup and the replacement happen under one mutex, so two concurrent
/// evaluations of the same new pair produce exactly one admission.
///
/// A poisoned lock is recovered rather than propagated: every mutation is a
/// single insert or remove, so the map is consistent even after a panic
/// elsewhere.
///
/// # Example
///
/// ```rust
/// use spotwatch::models::{ContactPair, EntityCode};
/// use spotwatch::services::suppression::SuppressionWindowStore;
/// use std::time::{Duration, Instant};
///
/// let store = SuppressionWindowStore::with_window(Duration::from_secs(900));
/// let pair = ContactPair::new(EntityCode::new(223), EntityCode::new(291)).unwrap();
/// let t0 = Instant::now();
///
/// assert!(store.evaluate(pair, t0));
/// assert!(!store.evaluate(pair, t0 + Duration::from_secs(900)));
/// assert!(store.evaluate(pair, t0 + Duration::from_secs(901)));
/// ```
#[derive(Debug)]
pub struct SuppressionWindowStore {
    records: Mutex<Records>,
    window: Duration,
}

impl SuppressionWindowStore {
    /// Creates a store from configuration.
    #[must_use]
    pub fn new(config: &SuppressionConfig) -> Self {
        let records = match config.max_pairs.and_then(NonZeroUsize::new) {
            Some(cap) => Records::Bounded(LruCache::new(cap)),
            None => Records::Unbounded(HashMap::new()),
        };

        Self {
            records: Mutex::new(records),
            window: config.window,
        }
    }

    /// Creates an unbounded store with the given window.
    #[must_use]
    pub fn with_window(window: Duration) -> Self {
        Self::new(&SuppressionConfig::default().with_window(window))
    }

    /// Admits or suppresses `pair` observed at `observed_at`.
    ///
    /// Returns `true` if a notification should be emitted. On admission the
    /// pair's record is replaced with `observed_at`.
    #[instrument(
        level = "trace",
        skip(self, pair, observed_at),
        fields(operation = "suppression_evaluate", pair = %pair)
    )]
    #[allow(clippy::cast_precision_loss)]
    pub fn evaluate(&self, pair: ContactPair, observed_at: Instant) -> bool {
        let start = Instant::now();

        let (admitted, tracked) = {
            let mut records = self.lock();
            let admitted = records.last_admitted(&pair).is_none_or(|last| {
                observed_at.saturating_duration_since(last) > self.window
            });
            if admitted {
                records.admit(pair, observed_at);
            }
            (admitted, records.len())
        };

        metrics::histogram!(
            "suppression_evaluate_duration_us",
            "admitted" => if admitted { "true" } else { "false" }
        )
        .record(start.elapsed().as_secs_f64() * 1_000_000.0);
        metrics::gauge!("suppression_pairs_tracked").set(tracked as f64);

        admitted
    }

    /// Instant of the pair's last admission, if tracked.
    #[must_use]
    pub fn last_admitted(&self, pair: ContactPair) -> Option<Instant> {
        self.lock().last_admitted(&pair)
    }

    /// Drops records whose window has already closed at `now`.
    ///
    /// An expired record and a missing record lead to the same decision, so
    /// pruning never changes what [`Self::evaluate`] returns.
    ///
    /// Returns the number of records removed.
    #[allow(clippy::cast_precision_loss)]
    pub fn prune_expired(&self, now: Instant) -> usize {
        let (removed, tracked) = {
            let mut records = self.lock();
            let removed = records.retain_recent(now, self.window);
            (removed, records.len())
        };

        if removed > 0 {
            tracing::debug!(removed, tracked, "Pruned expired contact pairs");
        }
        metrics::gauge!("suppression_pairs_tracked").set(tracked as f64);

        removed
    }

    /// Number of tracked pairs, including ones whose window has closed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if no pair is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The configured window.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    fn lock(&self) -> MutexGuard<'_, Records> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SuppressionWindowStore {
    fn default() -> Self {
        Self::new(&SuppressionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityCode;
    use std::sync::{Arc, Barrier};
    use std::thread;

    const WINDOW: Duration = Duration::from_secs(15 * 60);

    fn pair(a: i64, b: i64) -> ContactPair {
        ContactPair::new(EntityCode::new(a), EntityCode::new(b)).unwrap()
    }

    fn mins(m: u64) -> Duration {
        Duration::from_secs(m * 60)
    }

    #[test]
    fn test_first_sighting_admitted() {
        let store = SuppressionWindowStore::with_window(WINDOW);

        assert!(store.evaluate(pair(223, 291), Instant::now()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_reverse_order_is_same_pair() {
        let store = SuppressionWindowStore::with_window(WINDOW);
        let t0 = Instant::now();

        assert!(store.evaluate(pair(223, 291), t0));
        assert!(!store.evaluate(pair(291, 223), t0));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let store = SuppressionWindowStore::with_window(WINDOW);
        let t0 = Instant::now();

        assert!(store.evaluate(pair(1, 99), t0));
        assert!(!store.evaluate(pair(1, 99), t0 + WINDOW));
        assert!(store.evaluate(pair(1, 99), t0 + WINDOW + Duration::from_nanos(1)));
    }

    #[test]
    fn test_suppressed_repeats_do_not_extend_window() {
        let store = SuppressionWindowStore::with_window(WINDOW);
        let t0 = Instant::now();

        assert!(store.evaluate(pair(1, 99), t0));
        assert!(!store.evaluate(pair(1, 99), t0 + mins(5)));
        assert!(!store.evaluate(pair(1, 99), t0 + mins(12)));
        assert!(store.evaluate(pair(1, 99), t0 + mins(30)));
        assert_eq!(store.last_admitted(pair(1, 99)), Some(t0 + mins(30)));
    }

    #[test]
    fn test_admission_refreshes_record() {
        let store = SuppressionWindowStore::with_window(WINDOW);
        let t0 = Instant::now();

        assert!(store.evaluate(pair(1, 99), t0));
        assert!(store.evaluate(pair(1, 99), t0 + mins(16)));
        assert!(!store.evaluate(pair(1, 99), t0 + mins(30)));
        assert!(store.evaluate(pair(1, 99), t0 + mins(32)));
    }

    #[test]
    fn test_pairs_are_independent() {
        let store = SuppressionWindowStore::with_window(WINDOW);
        let t0 = Instant::now();

        assert!(store.evaluate(pair(1, 99), t0));
        assert!(store.evaluate(pair(1, 98), t0));
        assert!(store.evaluate(pair(2, 99), t0));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_out_of_order_instant_suppresses() {
        let store = SuppressionWindowStore::with_window(WINDOW);
        let t0 = Instant::now() + mins(60);

        assert!(store.evaluate(pair(1, 99), t0));
        assert!(!store.evaluate(pair(1, 99), t0 - mins(1)));
    }

    #[test]
    fn test_prune_expired_keeps_open_windows() {
        let store = SuppressionWindowStore::with_window(WINDOW);
        let t0 = Instant::now();

        store.evaluate(pair(1, 99), t0);
        store.evaluate(pair(1, 98), t0 + mins(10));

        assert_eq!(store.prune_expired(t0 + mins(20)), 1);
        assert_eq!(store.len(), 1);
        assert!(!store.evaluate(pair(1, 98), t0 + mins(20)));
        assert!(store.evaluate(pair(1, 99), t0 + mins(20)));
    }

    #[test]
    fn test_bounded_store_evicts_least_recent() {
        let config = SuppressionConfig::default()
            .with_window(WINDOW)
            .with_max_pairs(Some(2));
        let store = SuppressionWindowStore::new(&config);
        let t0 = Instant::now();

        store.evaluate(pair(1, 99), t0);
        store.evaluate(pair(1, 98), t0);
        store.evaluate(pair(1, 97), t0);

        assert_eq!(store.len(), 2);
        assert_eq!(store.last_admitted(pair(1, 99)), None);
        assert!(!store.evaluate(pair(1, 97), t0));
    }

    #[test]
    fn test_bounded_prune() {
        let config = SuppressionConfig::default()
            .with_window(WINDOW)
            .with_max_pairs(Some(10));
        let store = SuppressionWindowStore::new(&config);
        let t0 = Instant::now();

        store.evaluate(pair(1, 99), t0);
        store.evaluate(pair(1, 98), t0 + mins(20));

        assert_eq!(store.prune_expired(t0 + mins(20)), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_zero_capacity_means_unbounded() {
        let config = SuppressionConfig::default().with_max_pairs(Some(0));
        let store = SuppressionWindowStore::new(&config);
        let t0 = Instant::now();

        for b in 2..100 {
            store.evaluate(pair(1, b), t0);
        }
        assert_eq!(store.len(), 98);
    }

    #[test]
    fn test_concurrent_duplicate_admits_once() {
        for _ in 0..50 {
            let store = Arc::new(SuppressionWindowStore::with_window(WINDOW));
            let barrier = Arc::new(Barrier::new(8));
            let t0 = Instant::now();

            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let store = Arc::clone(&store);
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        let p = if i % 2 == 0 { pair(1, 99) } else { pair(99, 1) };
                        store.evaluate(p, t0)
                    })
                })
                .collect();

            let admitted = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|admitted| *admitted)
                .count();
            assert_eq!(admitted, 1);
        }
    }
}
