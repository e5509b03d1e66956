use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// The most recent failure of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskFailure {
    pub at: DateTime<Utc>,
    pub message: String,
}

/// Per-task execution record, queryable through
/// [`TaskMatrix::task_status`](crate::TaskMatrix::task_status).
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskStatus {
    /// When the task last fired.
    pub last_run: Option<DateTime<Utc>>,
    /// When an invocation last completed successfully.
    pub last_success: Option<DateTime<Utc>>,
    /// Last failure (error or panic). Kept after later successes.
    pub last_error: Option<TaskFailure>,
    /// Firings started.
    pub runs: u64,
    pub successes: u64,
    pub failures: u64,
    /// Invocations started but not yet finished.
    pub in_flight: u64,
    /// Mean duration of finished invocations.
    pub avg_duration: Option<Duration>,
}

impl TaskStatus {
    pub(crate) fn record_fire(&mut self, at: DateTime<Utc>) {
        self.last_run = Some(at);
        self.runs += 1;
        self.in_flight += 1;
    }

    pub(crate) fn record_success(&mut self, at: DateTime<Utc>, duration: Duration) {
        self.last_success = Some(at);
        self.successes += 1;
        self.finish(duration);
    }

    pub(crate) fn record_failure(&mut self, at: DateTime<Utc>, duration: Duration, message: String) {
        self.last_error = Some(TaskFailure { at, message });
        self.failures += 1;
        self.finish(duration);
    }

    /// Number of invocations that have finished either way.
    pub fn completed(&self) -> u64 {
        self.successes + self.failures
    }

    fn finish(&mut self, duration: Duration) {
        self.in_flight = self.in_flight.saturating_sub(1);

        // Incremental mean: new_avg = prev_avg + (duration - prev_avg) / count
        let count = self.completed();
        let new_avg = match self.avg_duration {
            Some(prev) if count > 1 => {
                let prev_nanos = prev.as_nanos() as f64;
                let cur_nanos = duration.as_nanos() as f64;
                let avg_nanos = prev_nanos + (cur_nanos - prev_nanos) / count as f64;
                Duration::from_nanos(avg_nanos as u64)
            }
            _ => duration,
        };
        self.avg_duration = Some(new_avg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_empty() {
        let s = TaskStatus::default();
        assert!(s.last_run.is_none());
        assert!(s.last_success.is_none());
        assert!(s.last_error.is_none());
        assert_eq!(s.runs, 0);
        assert_eq!(s.in_flight, 0);
        assert!(s.avg_duration.is_none());
    }

    #[test]
    fn fire_then_success() {
        let mut s = TaskStatus::default();
        let t = Utc::now();
        s.record_fire(t);
        assert_eq!(s.in_flight, 1);
        assert_eq!(s.last_run, Some(t));

        s.record_success(t, Duration::from_millis(100));
        assert_eq!(s.in_flight, 0);
        assert_eq!(s.successes, 1);
        assert_eq!(s.last_success, Some(t));
        assert_eq!(s.avg_duration, Some(Duration::from_millis(100)));
    }

    #[test]
    fn failure_is_kept_after_success() {
        let mut s = TaskStatus::default();
        let t = Utc::now();
        s.record_fire(t);
        s.record_failure(t, Duration::from_millis(5), "boom".into());
        s.record_fire(t);
        s.record_success(t, Duration::from_millis(5));

        assert_eq!(s.failures, 1);
        assert_eq!(s.successes, 1);
        assert_eq!(s.completed(), 2);
        assert_eq!(s.last_error.as_ref().map(|e| e.message.as_str()), Some("boom"));
    }

    #[test]
    fn average_duration_over_completions() {
        let mut s = TaskStatus::default();
        let t = Utc::now();
        s.record_fire(t);
        s.record_fire(t);
        s.record_success(t, Duration::from_millis(100));
        s.record_failure(t, Duration::from_millis(200), "slow".into());

        // Average of 100ms and 200ms = 150ms
        let avg = s.avg_duration.unwrap().as_millis();
        assert!((140..=160).contains(&avg), "expected ~150ms, got {}ms", avg);
    }

    #[test]
    fn in_flight_never_underflows() {
        let mut s = TaskStatus::default();
        s.record_success(Utc::now(), Duration::ZERO);
        assert_eq!(s.in_flight, 0);
    }
}
