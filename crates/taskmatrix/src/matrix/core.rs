use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::config::MatrixConfig;
use crate::descriptor::TaskDescriptor;
use crate::error::{MatrixError, Result};
use crate::heartbeat::HeartbeatTracker;
use crate::registry::TaskRegistry;
use crate::sink::{EventSink, TracingSink};
use crate::snapshot::{MatrixSnapshot, SchedulerState, TaskSnapshot};
use crate::status::TaskStatus;
use crate::timer::TimerHandle;

/// The task scheduler.
///
/// Cheap to clone; clones share the same registry, timers and heartbeat.
/// Dropping the last clone cancels every timer.
#[derive(Clone)]
pub struct TaskMatrix {
    pub(super) inner: Arc<Inner>,
}

pub(super) struct Inner {
    pub(super) config: MatrixConfig,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) sink: Arc<dyn EventSink>,
    pub(super) heartbeat: HeartbeatTracker,
    /// Registry and lifecycle share one lock so arming and disarming never
    /// interleave with registration.
    pub(super) state: Mutex<MatrixState>,
}

pub(super) struct MatrixState {
    pub(super) lifecycle: Lifecycle,
    pub(super) registry: TaskRegistry,
}

pub(super) enum Lifecycle {
    Stopped,
    Running {
        runtime: Handle,
        heartbeat: TimerHandle,
    },
}

impl Inner {
    pub(super) fn lock_state(&self) -> MutexGuard<'_, MatrixState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fluent builder for [`TaskMatrix`].
pub struct TaskMatrixBuilder {
    config: MatrixConfig,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn EventSink>,
}

impl TaskMatrixBuilder {
    pub fn config(mut self, config: MatrixConfig) -> Self {
        self.config = config;
        self
    }

    /// Clock used for status and heartbeat timestamps (default: system clock).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Where invocation outcomes are reported (default: tracing logs).
    pub fn sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn build(self) -> TaskMatrix {
        let heartbeat = HeartbeatTracker::new(Arc::clone(&self.clock));
        TaskMatrix {
            inner: Arc::new(Inner {
                config: self.config,
                clock: self.clock,
                sink: self.sink,
                heartbeat,
                state: Mutex::new(MatrixState {
                    lifecycle: Lifecycle::Stopped,
                    registry: TaskRegistry::new(),
                }),
            }),
        }
    }
}

impl Default for TaskMatrix {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl TaskMatrix {
    pub fn builder() -> TaskMatrixBuilder {
        TaskMatrixBuilder {
            config: MatrixConfig::default(),
            clock: Arc::new(SystemClock),
            sink: Arc::new(TracingSink),
        }
    }

    /// Create a matrix with the given config, system clock and tracing sink.
    pub fn new(config: MatrixConfig) -> Self {
        Self::builder().config(config).build()
    }

    /// Register a task.
    ///
    /// Fails with [`MatrixError::DuplicateTaskId`] if the id is taken. If the
    /// matrix is already running, the task's timer is armed immediately and
    /// its first firing is one interval from now.
    pub fn register_task(&self, descriptor: TaskDescriptor) -> Result<()> {
        let mut state = self.inner.lock_state();
        let MatrixState { lifecycle, registry } = &mut *state;

        let entry = registry.register(descriptor)?;
        let id = entry.descriptor.id().to_string();
        let interval = entry.descriptor.interval();

        if let Lifecycle::Running { runtime, .. } = lifecycle {
            let timer = self.inner.arm_task(runtime, entry);
            entry.timer = Some(timer);
            info!(task_id = %id, ?interval, "registered task while running, timer armed");
        } else {
            info!(task_id = %id, ?interval, "registered task");
        }
        Ok(())
    }

    /// Remove a task and cancel its timer. In-flight invocations finish on
    /// their own.
    pub fn unregister_task(&self, id: &str) -> Result<Arc<TaskDescriptor>> {
        let entry = self.inner.lock_state().registry.unregister(id)?;
        info!(task_id = %id, "unregistered task");
        Ok(entry.descriptor)
    }

    pub fn get_task(&self, id: &str) -> Option<Arc<TaskDescriptor>> {
        self.inner
            .lock_state()
            .registry
            .get(id)
            .map(|e| Arc::clone(&e.descriptor))
    }

    /// Registered tasks in registration order.
    pub fn list_tasks(&self) -> Vec<Arc<TaskDescriptor>> {
        self.inner.lock_state().registry.list()
    }

    pub fn task_count(&self) -> usize {
        self.inner.lock_state().registry.len()
    }

    pub fn task_status(&self, id: &str) -> Result<TaskStatus> {
        let status = self
            .inner
            .lock_state()
            .registry
            .get(id)
            .map(|e| Arc::clone(&e.status))
            .ok_or_else(|| MatrixError::UnknownTaskId(id.to_string()))?;
        let status = status.lock().unwrap_or_else(PoisonError::into_inner).clone();
        Ok(status)
    }

    /// Most recent heartbeat, `None` if the matrix has never been started.
    pub fn last_heartbeat(&self) -> Option<DateTime<Utc>> {
        self.inner.heartbeat.last_heartbeat()
    }

    /// A handle to the heartbeat that task handlers can capture.
    pub fn heartbeat(&self) -> HeartbeatTracker {
        self.inner.heartbeat.clone()
    }

    pub fn state(&self) -> SchedulerState {
        match self.inner.lock_state().lifecycle {
            Lifecycle::Stopped => SchedulerState::Stopped,
            Lifecycle::Running { .. } => SchedulerState::Running,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == SchedulerState::Running
    }

    pub fn snapshot(&self) -> MatrixSnapshot {
        let state = self.inner.lock_state();
        let scheduler_state = match state.lifecycle {
            Lifecycle::Stopped => SchedulerState::Stopped,
            Lifecycle::Running { .. } => SchedulerState::Running,
        };
        let tasks = state
            .registry
            .entries()
            .map(|e| TaskSnapshot {
                id: e.descriptor.id().to_string(),
                name: e.descriptor.name().to_string(),
                description: e.descriptor.description().to_string(),
                interval: e.descriptor.interval(),
                armed: e.timer.as_ref().is_some_and(TimerHandle::is_armed),
                status: e.status.lock().unwrap_or_else(PoisonError::into_inner).clone(),
            })
            .collect();

        MatrixSnapshot {
            state: scheduler_state,
            last_heartbeat: self.inner.heartbeat.last_heartbeat(),
            tasks,
        }
    }
}
