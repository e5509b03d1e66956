//! Reporting channel for invocation outcomes.
//!
//! The matrix never writes to the console itself; every finished
//! invocation is handed to an [`EventSink`]. [`TracingSink`] is the
//! default, [`ChannelSink`] forwards events to an async consumer.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Outcome of one finished invocation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskEvent {
    Succeeded {
        task_id: String,
        run_id: Uuid,
        at: DateTime<Utc>,
        duration: Duration,
    },
    Failed {
        task_id: String,
        run_id: Uuid,
        at: DateTime<Utc>,
        duration: Duration,
        error: String,
    },
}

impl TaskEvent {
    pub fn task_id(&self) -> &str {
        match self {
            TaskEvent::Succeeded { task_id, .. } | TaskEvent::Failed { task_id, .. } => task_id,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TaskEvent::Failed { .. })
    }
}

/// Receives invocation outcomes. Called from the invocation's own task, so
/// implementations must not block.
pub trait EventSink: Send + Sync {
    fn report(&self, event: TaskEvent);
}

/// Logs successes at debug and failures at warn.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn report(&self, event: TaskEvent) {
        match event {
            TaskEvent::Succeeded { task_id, run_id, duration, .. } => {
                debug!(task_id = %task_id, run_id = %run_id, ?duration, "task completed");
            }
            TaskEvent::Failed { task_id, run_id, duration, error, .. } => {
                warn!(task_id = %task_id, run_id = %run_id, ?duration, error = %error, "task failed");
            }
        }
    }
}

/// Forwards events into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<TaskEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TaskEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn report(&self, event: TaskEvent) {
        if self.tx.send(event).is_err() {
            debug!("event receiver dropped, discarding task event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(task_id: &str) -> TaskEvent {
        TaskEvent::Failed {
            task_id: task_id.into(),
            run_id: Uuid::new_v4(),
            at: Utc::now(),
            duration: Duration::from_millis(3),
            error: "boom".into(),
        }
    }

    #[test]
    fn event_accessors() {
        let ev = failed("b");
        assert_eq!(ev.task_id(), "b");
        assert!(ev.is_failure());
    }

    #[test]
    fn event_serializes_with_kind_tag() {
        let json = serde_json::to_value(failed("b")).unwrap();
        assert_eq!(json["kind"], "failed");
        assert_eq!(json["task_id"], "b");
        assert_eq!(json["error"], "boom");
    }

    #[tokio::test]
    async fn channel_sink_forwards_events() {
        let (sink, mut rx) = ChannelSink::new();
        sink.report(failed("x"));
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.task_id(), "x");
    }

    #[test]
    fn channel_sink_tolerates_dropped_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.report(failed("x"));
    }
}
