//! Periodic timers backed by Tokio time.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::descriptor::MAX_INTERVAL;

/// Arming flag checked by every firing.
///
/// A firing holds the read lock while it records itself and spawns the
/// handler; disarming takes the write lock, so once [`Gate::disarm`]
/// returns no firing of this timer can start. User code never runs under
/// the lock.
#[derive(Debug)]
pub(crate) struct Gate {
    armed: RwLock<bool>,
}

impl Gate {
    fn new() -> Self {
        Self {
            armed: RwLock::new(true),
        }
    }

    pub(crate) fn run_if_armed<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        let armed = self.armed.read().unwrap_or_else(PoisonError::into_inner);
        if *armed { Some(f()) } else { None }
    }

    pub(crate) fn disarm(&self) {
        *self.armed.write().unwrap_or_else(PoisonError::into_inner) = false;
    }

    pub(crate) fn is_armed(&self) -> bool {
        *self.armed.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A live periodic timer. Dropping the handle disarms and aborts it.
#[derive(Debug)]
pub(crate) struct TimerHandle {
    gate: Arc<Gate>,
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Spawn a timer on `runtime` that calls `on_fire` every `period`,
    /// first one `period` after arming.
    ///
    /// Ticks are fixed-rate: firing N+1 is due `period` after firing N was
    /// due, regardless of what `on_fire` started. Ticks missed while the
    /// runtime was stalled are skipped rather than replayed in a burst.
    /// `period` is clamped to [`MAX_INTERVAL`].
    pub(crate) fn arm<F>(runtime: &Handle, period: Duration, mut on_fire: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let _guard = runtime.enter();
        let period = period.min(MAX_INTERVAL);
        let gate = Arc::new(Gate::new());
        let first = Instant::now() + period;

        let timer_gate = Arc::clone(&gate);
        let task = runtime.spawn(async move {
            let mut ticker = tokio::time::interval_at(first, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if timer_gate.run_if_armed(&mut on_fire).is_none() {
                    break;
                }
            }
        });

        Self { gate, task }
    }

    /// Disarm and abort. No firing starts after this returns.
    pub(crate) fn cancel(self) {
        drop(self);
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.gate.is_armed() && !self.task.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.gate.disarm();
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn gate_runs_only_while_armed() {
        let gate = Gate::new();
        assert_eq!(gate.run_if_armed(|| 7), Some(7));
        gate.disarm();
        assert_eq!(gate.run_if_armed(|| 7), None);
        assert!(!gate.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn first_fire_is_one_period_after_arming() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let timer = TimerHandle::arm(&Handle::current(), Duration::from_millis(10), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        timer.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_firing() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let timer = TimerHandle::arm(&Handle::current(), Duration::from_millis(10), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(35)).await;
        assert!(timer.is_armed());
        timer.cancel();
        let seen = count.load(Ordering::SeqCst);
        assert_eq!(seen, 3);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_firing() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let timer = TimerHandle::arm(&Handle::current(), Duration::from_millis(10), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(15)).await;
        drop(timer);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn oversized_period_is_clamped() {
        let timer = TimerHandle::arm(&Handle::current(), Duration::MAX, || {});
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(timer.is_armed());
    }
}
