//! Per-firing dispatch: run the handler on its own Tokio task and record
//! the outcome at the invocation boundary.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

use futures::FutureExt;
use tokio::time::Instant;
use tracing::trace;
use uuid::Uuid;

use crate::clock::Clock;
use crate::descriptor::TaskDescriptor;
use crate::sink::{EventSink, TaskEvent};
use crate::status::TaskStatus;

/// Everything a timer needs to fire one task.
#[derive(Clone)]
pub(crate) struct Dispatcher {
    pub(crate) descriptor: Arc<TaskDescriptor>,
    pub(crate) status: Arc<Mutex<TaskStatus>>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) sink: Arc<dyn EventSink>,
}

impl Dispatcher {
    /// Record one firing and spawn its invocation. Returns without running
    /// any handler code, so the caller may hold locks around it.
    pub(crate) fn fire(&self) {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record_fire(self.clock.now());
        trace!(task_id = %self.descriptor.id(), run_id = %run_id, "task fired");

        let this = self.clone();
        tokio::spawn(async move {
            let outcome = this.invoke().await;
            this.complete(run_id, started, outcome);
        });
    }

    async fn invoke(&self) -> Result<(), String> {
        let fut = panic::catch_unwind(AssertUnwindSafe(|| self.descriptor.invoke()))
            .map_err(panic_message)?;
        match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(format!("{:#}", e)),
            Err(payload) => Err(panic_message(payload)),
        }
    }

    fn complete(&self, run_id: Uuid, started: Instant, outcome: Result<(), String>) {
        let duration = started.elapsed();
        let at = self.clock.now();
        let task_id = self.descriptor.id().to_string();

        let event = {
            let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
            match outcome {
                Ok(()) => {
                    status.record_success(at, duration);
                    TaskEvent::Succeeded { task_id, run_id, at, duration }
                }
                Err(error) => {
                    status.record_failure(at, duration, error.clone());
                    TaskEvent::Failed { task_id, run_id, at, duration, error }
                }
            }
        };
        self.sink.report(event);
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    let detail = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    };
    format!("handler panicked: {}", detail)
}
