//! The shared task collection.
//!
//! `TaskSet` is the one exclusion mechanism over the task list. The scale
//! reconciler holds its lock while planning (and while adjusting
//! `requested`); the observation reconciler holds it while rewriting
//! `running` counters. Actuation units never touch it.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::error::{StateError, StateResult};
use crate::types::{Task, TaskName};

/// The list of managed tasks, with lookup by name.
#[derive(Debug, Default)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}

impl TaskList {
    /// Look up a task by name.
    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.spec.name == name)
    }

    /// Look up a task by name for mutation.
    ///
    /// Fails with [`StateError::NotFound`] for unmanaged names.
    pub fn get_mut(&mut self, name: &str) -> StateResult<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.spec.name == name)
            .ok_or_else(|| StateError::NotFound(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Names of all managed tasks.
    pub fn names(&self) -> Vec<TaskName> {
        self.tasks.iter().map(|t| t.spec.name.clone()).collect()
    }
}

/// Shared, lockable handle to the task list.
///
/// Clones share the same underlying list.
#[derive(Clone, Default)]
pub struct TaskSet {
    inner: Arc<Mutex<TaskList>>,
}

impl TaskSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TaskList { tasks })),
        }
    }

    /// Take the collection lock.
    ///
    /// Held across planning/update phases only — never across a runtime
    /// network call.
    pub async fn lock(&self) -> MutexGuard<'_, TaskList> {
        self.inner.lock().await
    }
}
