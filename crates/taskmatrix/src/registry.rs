use std::sync::{Arc, Mutex};

use indexmap::IndexMap;

use crate::descriptor::TaskDescriptor;
use crate::error::{MatrixError, Result};
use crate::status::TaskStatus;
use crate::timer::TimerHandle;

/// One registered task and its runtime handles.
#[derive(Debug)]
pub(crate) struct RegistryEntry {
    pub(crate) descriptor: Arc<TaskDescriptor>,
    pub(crate) status: Arc<Mutex<TaskStatus>>,
    /// Present only while the matrix is running.
    pub(crate) timer: Option<TimerHandle>,
}

/// Authoritative set of tasks, keyed by id, kept in registration order.
#[derive(Debug, Default)]
pub(crate) struct TaskRegistry {
    entries: IndexMap<String, RegistryEntry>,
}

impl TaskRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add a task. Returns error if the id is already registered.
    pub(crate) fn register(&mut self, descriptor: TaskDescriptor) -> Result<&mut RegistryEntry> {
        let id = descriptor.id().to_string();
        if self.entries.contains_key(&id) {
            return Err(MatrixError::DuplicateTaskId(id));
        }
        let entry = RegistryEntry {
            descriptor: Arc::new(descriptor),
            status: Arc::new(Mutex::new(TaskStatus::default())),
            timer: None,
        };
        Ok(self.entries.entry(id).or_insert(entry))
    }

    /// Remove a task, cancelling its timer if armed.
    pub(crate) fn unregister(&mut self, id: &str) -> Result<RegistryEntry> {
        let mut entry = self
            .entries
            .shift_remove(id)
            .ok_or_else(|| MatrixError::UnknownTaskId(id.to_string()))?;
        if let Some(timer) = entry.timer.take() {
            timer.cancel();
        }
        Ok(entry)
    }

    pub(crate) fn get(&self, id: &str) -> Option<&RegistryEntry> {
        self.entries.get(id)
    }

    /// Descriptors in registration order.
    pub(crate) fn list(&self) -> Vec<Arc<TaskDescriptor>> {
        self.entries
            .values()
            .map(|e| Arc::clone(&e.descriptor))
            .collect()
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut RegistryEntry> {
        self.entries.values_mut()
    }

    /// Cancel every armed timer. Returns how many were cancelled.
    pub(crate) fn disarm_all(&mut self) -> usize {
        let mut cancelled = 0;
        for entry in self.entries.values_mut() {
            if let Some(timer) = entry.timer.take() {
                timer.cancel();
                cancelled += 1;
            }
        }
        cancelled
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str) -> TaskDescriptor {
        TaskDescriptor::builder(id)
            .interval_ms(1_000)
            .handler(|| async { Ok(()) })
            .build()
            .unwrap()
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = TaskRegistry::new();
        registry.register(task("a")).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.get("a").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut registry = TaskRegistry::new();
        registry.register(task("a")).unwrap();
        let err = registry.register(task("a")).unwrap_err();

        assert_eq!(err, MatrixError::DuplicateTaskId("a".into()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn list_keeps_registration_order() {
        let mut registry = TaskRegistry::new();
        for id in ["zeta", "alpha", "mid"] {
            registry.register(task(id)).unwrap();
        }
        let ids: Vec<String> = registry.list().iter().map(|d| d.id().to_string()).collect();
        assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn unregister_removes_and_preserves_order() {
        let mut registry = TaskRegistry::new();
        for id in ["a", "b", "c"] {
            registry.register(task(id)).unwrap();
        }
        let removed = registry.unregister("b").unwrap();
        assert_eq!(removed.descriptor.id(), "b");

        let ids: Vec<String> = registry.list().iter().map(|d| d.id().to_string()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn unregister_unknown_fails() {
        let mut registry = TaskRegistry::new();
        let err = registry.unregister("ghost").unwrap_err();
        assert_eq!(err, MatrixError::UnknownTaskId("ghost".into()));
    }

    #[test]
    fn new_entries_have_no_timer() {
        let mut registry = TaskRegistry::new();
        assert!(registry.is_empty());
        registry.register(task("a")).unwrap();
        assert!(!registry.is_empty());
        assert!(registry.get("a").unwrap().timer.is_none());
        assert_eq!(registry.disarm_all(), 0);
    }
}
