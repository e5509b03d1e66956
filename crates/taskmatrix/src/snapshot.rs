use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::status::TaskStatus;

/// Scheduler lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    Stopped,
    Running,
}

/// Point-in-time view of the whole matrix, for status logs and dashboards.
#[derive(Debug, Clone, Serialize)]
pub struct MatrixSnapshot {
    pub state: SchedulerState,
    pub last_heartbeat: Option<DateTime<Utc>>,
    /// Tasks in registration order.
    pub tasks: Vec<TaskSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskSnapshot {
    pub id: String,
    pub name: String,
    pub description: String,
    pub interval: Duration,
    pub armed: bool,
    pub status: TaskStatus,
}

impl MatrixSnapshot {
    pub fn task(&self, id: &str) -> Option<&TaskSnapshot> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks whose most recent failure is newer than their last success.
    pub fn failing_tasks(&self) -> Vec<&TaskSnapshot> {
        self.tasks
            .iter()
            .filter(|t| match (&t.status.last_error, t.status.last_success) {
                (Some(err), Some(ok)) => err.at >= ok,
                (Some(_), None) => true,
                _ => false,
            })
            .collect()
    }
}
