//! Monotonic time sources for suppression decisions.
//!
//! Live feeds measure elapsed time on the process's monotonic clock at
//! arrival. Recorded feeds replay far faster than real time, so they map
//! each spot's own timestamp onto a monotonic timeline instead.

use crate::models::SpotEvent;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Which clock drives the suppression window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBase {
    /// Monotonic time at which the spot was processed.
    #[default]
    Arrival,
    /// The spot's reported timestamp, clamped to never run backwards.
    Event,
}

impl TimeBase {
    /// Parses `arrival` or `event` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for any other value.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "arrival" | "live" => Ok(Self::Arrival),
            "event" | "replay" => Ok(Self::Event),
            other => Err(Error::InvalidInput(format!(
                "unknown time base '{other}' (expected 'arrival' or 'event')"
            ))),
        }
    }
}

/// Default bound on how far one spot may move the replay timeline ahead.
pub const DEFAULT_MAX_CLOCK_SKEW: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Copy)]
struct ReplayState {
    /// Epoch second that maps to the anchor.
    origin: i64,
    high_water: Duration,
    /// An out-of-range timestamp waiting for a second spot to confirm it.
    pending: Option<i64>,
}

/// Maps epoch-second timestamps onto a monotonic [`Instant`] timeline.
///
/// The first observed timestamp is pinned to the clock's anchor. Later
/// timestamps advance the timeline by their distance from the first; a
/// timestamp older than the latest one seen maps to the latest point, so
/// the returned instants never decrease.
///
/// A timestamp more than `max_skew` away from the latest point is treated
/// as a reporter with a wrong clock and does not move the timeline. If the
/// next out-of-range spot agrees with it (within `max_skew`), the feed
/// itself has jumped: a jump forward is taken, and a jump backward rebases
/// the timeline so time continues from the latest point.
#[derive(Debug)]
pub struct ReplayClock {
    anchor: Instant,
    max_skew: Duration,
    state: Mutex<Option<ReplayState>>,
}

impl ReplayClock {
    /// Creates a replay clock anchored at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self::anchored_at(Instant::now())
    }

    /// Creates a replay clock anchored at `anchor`.
    #[must_use]
    pub const fn anchored_at(anchor: Instant) -> Self {
        Self {
            anchor,
            max_skew: DEFAULT_MAX_CLOCK_SKEW,
            state: Mutex::new(None),
        }
    }

    /// Sets how far a single spot may be from the timeline before it is
    /// treated as skewed.
    #[must_use]
    pub fn with_max_skew(mut self, max_skew: Duration) -> Self {
        self.max_skew = max_skew;
        self
    }

    /// Returns the timeline instant for `epoch_secs`.
    pub fn observe(&self, epoch_secs: i64) -> Instant {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let state = guard.get_or_insert(ReplayState {
            origin: epoch_secs,
            high_water: Duration::ZERO,
            pending: None,
        });

        let skew = i64::try_from(self.max_skew.as_secs()).unwrap_or(i64::MAX);
        let high_water = i64::try_from(state.high_water.as_secs()).unwrap_or(i64::MAX);
        let offset = epoch_secs.saturating_sub(state.origin);

        if offset.saturating_sub(high_water).saturating_abs() <= skew {
            state.pending = None;
            if offset > high_water {
                state.high_water = secs(offset);
            }
        } else if state
            .pending
            .is_some_and(|p| epoch_secs.saturating_sub(p).saturating_abs() <= skew)
        {
            state.pending = None;
            if offset > high_water {
                state.high_water = secs(offset);
            } else {
                state.origin = epoch_secs.saturating_sub(high_water);
            }
            tracing::info!(epoch_secs, "Replay timeline jumped to follow the feed");
        } else {
            state.pending = Some(epoch_secs);
            metrics::counter!("replay_clock_skew_total").increment(1);
            tracing::warn!(
                epoch_secs,
                skew_secs = offset.saturating_sub(high_water),
                "Spot timestamp far from replay timeline, not advancing"
            );
        }

        self.anchor + state.high_water
    }

    /// The latest point reached on the timeline.
    pub fn now(&self) -> Instant {
        let guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.anchor + guard.map_or(Duration::ZERO, |s| s.high_water)
    }
}

fn secs(offset: i64) -> Duration {
    Duration::from_secs(u64::try_from(offset).unwrap_or(0))
}

impl Default for ReplayClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Clock used by the processor to timestamp spots for the store.
#[derive(Debug)]
pub enum SpotClock {
    /// Process monotonic clock.
    Arrival,
    /// Replay timeline driven by spot timestamps.
    Replay(ReplayClock),
}

impl SpotClock {
    /// Creates the clock for a time base.
    ///
    /// `max_skew` bounds how far one spot may move a replay timeline.
    #[must_use]
    pub fn for_time_base(time_base: TimeBase, max_skew: Duration) -> Self {
        match time_base {
            TimeBase::Arrival => Self::Arrival,
            TimeBase::Event => Self::Replay(ReplayClock::new().with_max_skew(max_skew)),
        }
    }

    /// Instant at which `event` is considered observed.
    pub fn observe(&self, event: &SpotEvent) -> Instant {
        match self {
            Self::Arrival => Instant::now(),
            Self::Replay(clock) => clock.observe(event.epoch_secs()),
        }
    }

    /// Current instant on this clock.
    pub fn now(&self) -> Instant {
        match self {
            Self::Arrival => Instant::now(),
            Self::Replay(clock) => clock.now(),
        }
    }
}
