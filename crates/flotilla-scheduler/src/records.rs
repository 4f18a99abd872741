//! Container records — the in-memory ledger of what this process
//! believes about each container it created or observed.
//!
//! Records live in a two-level map (task name → container ID → record)
//! behind one lock. Everything that mutates scheduler state goes through
//! that lock, and the lock is never held across a runtime network call.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};
use tracing::warn;

use flotilla_state::TaskName;

use crate::error::{SchedulerError, SchedulerResult};

/// Containers are keyed internally by this many leading characters of
/// the runtime-assigned ID. Prefix collisions collapse two containers
/// into one record; with random 64-hex IDs the probability is accepted
/// rather than designed away.
pub const SHORT_ID_LEN: usize = 12;

/// Lifecycle states for a tracked container.
///
/// `Created`/`Starting`/`Stopping`/`Removing` are optimistic local
/// transitions written by the actuator; `Running`/`Exited`/`Dead` arrive
/// from runtime observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerState {
    Created,
    Starting,
    Running,
    Stopping,
    Removing,
    Exited,
    Dead,
    Unknown,
}

/// Bookkeeping entry for one container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerRecord {
    /// Last-known lifecycle state; `None` for a container observed with
    /// no prior record (e.g. created by a previous process instance).
    pub state: Option<ContainerState>,
    /// Set during an observation pass when the runtime reported this
    /// container; reset at the start of each pass.
    pub observed: bool,
}

impl ContainerRecord {
    pub fn with_state(state: ContainerState) -> Self {
        Self {
            state: Some(state),
            observed: false,
        }
    }
}

/// The full record map: task name → container ID → record.
pub type RecordMap = HashMap<TaskName, HashMap<String, ContainerRecord>>;

/// Thread-safe store of container records, shared by the actuator and
/// both reconcilers. Clones share the same underlying map.
#[derive(Clone, Default)]
pub struct RecordStore {
    inner: Arc<Mutex<RecordMap>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the store lock directly. Used by the observation pass, which
    /// rewrites flags and states for every record in one critical section.
    pub async fn lock(&self) -> MutexGuard<'_, RecordMap> {
        self.inner.lock().await
    }

    /// Register a task, creating its (empty) container map.
    ///
    /// A task entry is created exactly once, before any actuation;
    /// observation ignores containers of tasks with no entry.
    pub async fn init_task(&self, name: &str) -> SchedulerResult<()> {
        let mut map = self.inner.lock().await;
        if map.contains_key(name) {
            return Err(SchedulerError::AlreadyManaged(name.to_string()));
        }
        map.insert(name.to_string(), HashMap::new());
        Ok(())
    }

    pub async fn is_managed(&self, name: &str) -> bool {
        self.inner.lock().await.contains_key(name)
    }

    /// Store a record for a freshly created container.
    pub async fn insert(&self, task: &str, id: &str, state: ContainerState) {
        let mut map = self.inner.lock().await;
        match map.get_mut(task) {
            Some(containers) => {
                containers.insert(id.to_string(), ContainerRecord::with_state(state));
            }
            None => warn!(%task, %id, "record insert for unmanaged task dropped"),
        }
    }

    /// Overwrite the state of an existing record.
    pub async fn set_state(&self, task: &str, id: &str, state: ContainerState) {
        let mut map = self.inner.lock().await;
        match map.get_mut(task).and_then(|c| c.get_mut(id)) {
            Some(record) => record.state = Some(state),
            None => warn!(%task, %id, "state change for unknown container dropped"),
        }
    }

    /// Current record for a container, if any.
    pub async fn get(&self, task: &str, id: &str) -> Option<ContainerRecord> {
        let map = self.inner.lock().await;
        map.get(task).and_then(|c| c.get(id)).cloned()
    }

    /// Number of records held for a task.
    pub async fn container_count(&self, task: &str) -> usize {
        let map = self.inner.lock().await;
        map.get(task).map_or(0, HashMap::len)
    }

    /// IDs of all records held for a task.
    pub async fn container_ids(&self, task: &str) -> Vec<String> {
        let map = self.inner.lock().await;
        map.get(task)
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Pick one `Running` container of this task and flip it to
    /// `Stopping`, all under the lock, so concurrent stop selections can
    /// never pick the same container. Containers of one task are
    /// fungible; first match wins.
    pub async fn mark_one_stopping(&self, task: &str) -> Option<String> {
        let mut map = self.inner.lock().await;
        let containers = map.get_mut(task)?;
        for (id, record) in containers.iter_mut() {
            if record.state == Some(ContainerState::Running) {
                record.state = Some(ContainerState::Stopping);
                return Some(id.clone());
            }
        }
        None
    }
}

/// Canonical short form of a runtime-assigned container ID.
pub fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

/// Map a runtime status string to a canonical state.
///
/// Unrecognized strings are an anomaly: logged, mapped to `Unknown`.
pub fn status_to_state(status: &str) -> ContainerState {
    if status.contains("Up") {
        ContainerState::Running
    } else if status.contains("Removal") {
        ContainerState::Removing
    } else if status.contains("Exit") {
        ContainerState::Exited
    } else if status.contains("Dead") {
        ContainerState::Dead
    } else {
        warn!(%status, "unrecognized container status");
        ContainerState::Unknown
    }
}
