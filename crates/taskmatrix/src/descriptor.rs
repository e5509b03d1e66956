use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};

use crate::error::{MatrixError, Result};

/// Boxed future returned by a task handler. The scheduler only looks at
/// whether it resolves to `Ok` or `Err`.
pub type HandlerFuture = BoxFuture<'static, anyhow::Result<()>>;

/// Zero-argument async operation executed on every firing.
pub type TaskHandler = Arc<dyn Fn() -> HandlerFuture + Send + Sync>;

/// Longest accepted task interval (365 days).
pub const MAX_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Immutable description of one periodically invoked unit of work.
///
/// Construct through [`TaskDescriptor::builder`]; validation happens at
/// [`TaskDescriptorBuilder::build`], so a descriptor that exists is always
/// schedulable.
pub struct TaskDescriptor {
    id: String,
    name: String,
    description: String,
    interval: Duration,
    handler: TaskHandler,
}

impl TaskDescriptor {
    pub fn builder(id: impl Into<String>) -> TaskDescriptorBuilder {
        TaskDescriptorBuilder {
            id: id.into(),
            name: None,
            description: String::new(),
            interval: RawInterval::Unset,
            handler: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Create a fresh handler future. Polling it is the caller's business.
    pub(crate) fn invoke(&self) -> HandlerFuture {
        (self.handler)()
    }
}

impl fmt::Debug for TaskDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("description", &self.description)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

enum RawInterval {
    Unset,
    Duration(Duration),
    Millis(i64),
}

/// Fluent builder for [`TaskDescriptor`].
///
/// # Example
/// ```ignore
/// let task = TaskDescriptor::builder("memory-store")
///     .name("Memory Update")
///     .interval(Duration::from_secs(5))
///     .handler(|| async { Ok(()) })
///     .build()?;
/// ```
pub struct TaskDescriptorBuilder {
    id: String,
    name: Option<String>,
    description: String,
    interval: RawInterval,
    handler: Option<TaskHandler>,
}

impl TaskDescriptorBuilder {
    /// Display name (defaults to the id).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = RawInterval::Duration(interval);
        self
    }

    /// Interval in milliseconds. Values `<= 0` or above [`MAX_INTERVAL`] are
    /// rejected at `build()`.
    pub fn interval_ms(mut self, ms: i64) -> Self {
        self.interval = RawInterval::Millis(ms);
        self
    }

    /// Set the handler. Whatever value the future yields on success is dropped.
    pub fn handler<F, Fut, T>(mut self, handler: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        self.handler = Some(Arc::new(move || handler().map(|r| r.map(drop)).boxed()));
        self
    }

    pub fn build(self) -> Result<TaskDescriptor> {
        if self.id.trim().is_empty() {
            return Err(MatrixError::EmptyTaskId);
        }

        let interval = match self.interval {
            RawInterval::Unset => None,
            RawInterval::Duration(d) if d.is_zero() => None,
            RawInterval::Duration(d) => Some(d),
            RawInterval::Millis(ms) if ms <= 0 => {
                return Err(MatrixError::InvalidInterval {
                    id: self.id,
                    interval_ms: ms as i128,
                });
            }
            RawInterval::Millis(ms) => Some(Duration::from_millis(ms as u64)),
        };
        if let Some(d) = interval.filter(|d| *d > MAX_INTERVAL) {
            return Err(MatrixError::InvalidInterval {
                id: self.id,
                interval_ms: i128::try_from(d.as_millis()).unwrap_or(i128::MAX),
            });
        }
        let Some(interval) = interval else {
            return Err(MatrixError::InvalidInterval {
                id: self.id,
                interval_ms: 0,
            });
        };

        let Some(handler) = self.handler else {
            return Err(MatrixError::MissingHandler(self.id));
        };

        Ok(TaskDescriptor {
            name: self.name.unwrap_or_else(|| self.id.clone()),
            id: self.id,
            description: self.description,
            interval,
            handler,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> TaskDescriptorBuilder {
        TaskDescriptor::builder("noop").handler(|| async { Ok(()) })
    }

    #[test]
    fn build_valid_descriptor() {
        let task = noop()
            .name("No-op")
            .description("does nothing")
            .interval_ms(250)
            .build()
            .unwrap();

        assert_eq!(task.id(), "noop");
        assert_eq!(task.name(), "No-op");
        assert_eq!(task.description(), "does nothing");
        assert_eq!(task.interval(), Duration::from_millis(250));
    }

    #[test]
    fn name_defaults_to_id() {
        let task = noop().interval(Duration::from_secs(1)).build().unwrap();
        assert_eq!(task.name(), "noop");
    }

    #[test]
    fn empty_id_rejected() {
        let err = TaskDescriptor::builder("   ")
            .interval_ms(10)
            .handler(|| async { Ok(()) })
            .build()
            .unwrap_err();
        assert_eq!(err, MatrixError::EmptyTaskId);
    }

    #[test]
    fn non_positive_millis_rejected() {
        for ms in [0, -1, -5_000, i64::MIN] {
            let err = noop().interval_ms(ms).build().unwrap_err();
            assert_eq!(
                err,
                MatrixError::InvalidInterval { id: "noop".into(), interval_ms: ms as i128 }
            );
        }
    }

    #[test]
    fn zero_duration_and_missing_interval_rejected() {
        let err = noop().interval(Duration::ZERO).build().unwrap_err();
        assert!(matches!(err, MatrixError::InvalidInterval { interval_ms: 0, .. }));

        let err = noop().build().unwrap_err();
        assert!(matches!(err, MatrixError::InvalidInterval { .. }));
    }

    #[test]
    fn interval_above_maximum_rejected() {
        let err = noop().interval(Duration::MAX).build().unwrap_err();
        assert_eq!(
            err,
            MatrixError::InvalidInterval { id: "noop".into(), interval_ms: Duration::MAX.as_millis() as i128 }
        );

        let err = noop().interval_ms(i64::MAX).build().unwrap_err();
        assert_eq!(err, MatrixError::InvalidInterval { id: "noop".into(), interval_ms: i64::MAX as i128 });

        let err = noop().interval(MAX_INTERVAL + Duration::from_millis(1)).build().unwrap_err();
        assert!(matches!(err, MatrixError::InvalidInterval { .. }));

        let task = noop().interval(MAX_INTERVAL).build().unwrap();
        assert_eq!(task.interval(), MAX_INTERVAL);
    }

    #[test]
    fn missing_handler_rejected() {
        let err = TaskDescriptor::builder("bare").interval_ms(10).build().unwrap_err();
        assert_eq!(err, MatrixError::MissingHandler("bare".into()));
    }

    #[test]
    fn debug_omits_handler() {
        let task = noop().interval_ms(10).build().unwrap();
        let dbg = format!("{:?}", task);
        assert!(dbg.contains("noop"));
        assert!(!dbg.contains("handler"));
    }

    #[tokio::test]
    async fn handler_value_is_discarded() {
        let task = TaskDescriptor::builder("value")
            .interval_ms(10)
            .handler(|| async { Ok::<_, anyhow::Error>(vec![1, 2, 3]) })
            .build()
            .unwrap();
        assert!(task.invoke().await.is_ok());
    }

    #[tokio::test]
    async fn handler_error_is_preserved() {
        let task = TaskDescriptor::builder("boom")
            .interval_ms(10)
            .handler(|| async { Err::<(), _>(anyhow::anyhow!("upstream unavailable")) })
            .build()
            .unwrap();
        let err = task.invoke().await.unwrap_err();
        assert_eq!(err.to_string(), "upstream unavailable");
    }
}
