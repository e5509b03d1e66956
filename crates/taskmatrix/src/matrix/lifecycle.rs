use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::{debug, info, trace, warn};

use crate::dispatch::Dispatcher;
use crate::error::{MatrixError, Result};
use crate::registry::RegistryEntry;
use crate::timer::TimerHandle;

use super::core::{Inner, Lifecycle};
use super::TaskMatrix;

impl Inner {
    /// Arm the periodic timer for one task.
    pub(super) fn arm_task(&self, runtime: &Handle, entry: &RegistryEntry) -> TimerHandle {
        let dispatcher = Dispatcher {
            descriptor: Arc::clone(&entry.descriptor),
            status: Arc::clone(&entry.status),
            clock: Arc::clone(&self.clock),
            sink: Arc::clone(&self.sink),
        };
        TimerHandle::arm(runtime, entry.descriptor.interval(), move || dispatcher.fire())
    }
}

impl TaskMatrix {
    /// Transition `Stopped -> Running`: stamp the heartbeat, arm the
    /// heartbeat timer and one timer per registered task.
    ///
    /// Returns once everything is armed. Calling it while running is a
    /// no-op. Must be called from within a Tokio runtime.
    pub fn start(&self) -> Result<()> {
        let mut state = self.inner.lock_state();
        if matches!(state.lifecycle, Lifecycle::Running { .. }) {
            debug!("TaskMatrix already running, start ignored");
            return Ok(());
        }

        let runtime = Handle::try_current().map_err(|_| MatrixError::NoRuntime)?;
        if state.registry.is_empty() {
            warn!("TaskMatrix starting with no registered tasks");
        }

        self.inner.heartbeat.beat();
        let tracker = self.inner.heartbeat.clone();
        let heartbeat_interval = self.inner.config.heartbeat_interval();
        let heartbeat = TimerHandle::arm(&runtime, heartbeat_interval, move || {
            let at = tracker.beat();
            trace!(%at, "heartbeat");
        });

        let mut armed = 0;
        for entry in state.registry.entries_mut() {
            let timer = self.inner.arm_task(&runtime, entry);
            entry.timer = Some(timer);
            armed += 1;
        }

        state.lifecycle = Lifecycle::Running { runtime, heartbeat };
        info!(tasks = armed, ?heartbeat_interval, "TaskMatrix started");
        Ok(())
    }

    /// Transition `Running -> Stopped`: cancel the heartbeat and every task
    /// timer.
    ///
    /// No firing starts after this returns. Invocations already in flight
    /// are not awaited and finish on their own. Calling it while stopped is
    /// a no-op.
    pub fn stop(&self) {
        let mut state = self.inner.lock_state();
        let Lifecycle::Running { heartbeat, .. } =
            std::mem::replace(&mut state.lifecycle, Lifecycle::Stopped)
        else {
            debug!("TaskMatrix already stopped, stop ignored");
            return;
        };

        heartbeat.cancel();
        let cancelled = state.registry.disarm_all();
        info!(tasks = cancelled, "TaskMatrix stopped");
    }
}
