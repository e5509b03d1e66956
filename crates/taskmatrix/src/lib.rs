//! In-process periodic task scheduler.
//!
//! A [`TaskMatrix`] holds a registry of [`TaskDescriptor`]s, each with its
//! own fixed interval. `start()` arms one Tokio timer per task plus a
//! heartbeat timer; every firing runs the task's handler on its own Tokio
//! task so a slow or failing handler never delays any other firing.
//! Failures are caught at the invocation boundary, recorded in the task's
//! [`TaskStatus`] and reported through an [`EventSink`].
//!
//! ```ignore
//! let matrix = TaskMatrix::new(MatrixConfig::default());
//! matrix.register_task(
//!     TaskDescriptor::builder("trading-balance")
//!         .interval(Duration::from_secs(30))
//!         .handler(|| async { Ok(()) })
//!         .build()?,
//! )?;
//! matrix.start()?;
//! // ...
//! matrix.stop();
//! ```

pub mod clock;
pub mod config;
pub mod descriptor;
mod dispatch;
pub mod error;
pub mod heartbeat;
pub mod matrix;
mod registry;
pub mod sink;
pub mod snapshot;
pub mod status;
mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::MatrixConfig;
pub use descriptor::{HandlerFuture, TaskDescriptor, TaskDescriptorBuilder, TaskHandler, MAX_INTERVAL};
pub use error::{MatrixError, Result};
pub use heartbeat::HeartbeatTracker;
pub use matrix::{TaskMatrix, TaskMatrixBuilder};
pub use sink::{ChannelSink, EventSink, TaskEvent, TracingSink};
pub use snapshot::{MatrixSnapshot, SchedulerState, TaskSnapshot};
pub use status::{TaskFailure, TaskStatus};
