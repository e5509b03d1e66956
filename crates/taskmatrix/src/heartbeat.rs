use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};

use crate::clock::Clock;

/// Process-wide liveness timestamp.
///
/// The matrix stamps it on `start` and on every heartbeat tick while
/// running; it is left untouched after `stop`. Clones share the same
/// timestamp, so task handlers can hold one without holding the matrix.
#[derive(Clone)]
pub struct HeartbeatTracker {
    last: Arc<RwLock<Option<DateTime<Utc>>>>,
    clock: Arc<dyn Clock>,
}

impl HeartbeatTracker {
    pub(crate) fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            last: Arc::new(RwLock::new(None)),
            clock,
        }
    }

    /// Most recent tick, or `None` if the matrix has never run.
    pub fn last_heartbeat(&self) -> Option<DateTime<Utc>> {
        *self.last.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a tick. Never moves backwards, even if the clock does.
    pub(crate) fn beat(&self) -> DateTime<Utc> {
        let now = self.clock.now();
        let mut last = self.last.write().unwrap_or_else(PoisonError::into_inner);
        let next = match *last {
            Some(prev) if prev > now => prev,
            _ => now,
        };
        *last = Some(next);
        next
    }
}

impl fmt::Debug for HeartbeatTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeartbeatTracker")
            .field("last", &self.last_heartbeat())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::clock::ManualClock;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-15T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn unset_until_first_beat() {
        let tracker = HeartbeatTracker::new(Arc::new(ManualClock::new(t0())));
        assert!(tracker.last_heartbeat().is_none());
        tracker.beat();
        assert_eq!(tracker.last_heartbeat(), Some(t0()));
    }

    #[test]
    fn never_moves_backwards() {
        let clock = Arc::new(ManualClock::new(t0()));
        let tracker = HeartbeatTracker::new(clock.clone());

        clock.advance(Duration::seconds(10));
        tracker.beat();
        clock.set(t0() - Duration::hours(1));
        let stamped = tracker.beat();

        assert_eq!(stamped, t0() + Duration::seconds(10));
        assert_eq!(tracker.last_heartbeat(), Some(t0() + Duration::seconds(10)));
    }

    #[test]
    fn clones_share_state() {
        let tracker = HeartbeatTracker::new(Arc::new(ManualClock::new(t0())));
        let reader = tracker.clone();
        tracker.beat();
        assert_eq!(reader.last_heartbeat(), Some(t0()));
    }
}
