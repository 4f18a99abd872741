//! Domain types for managed tasks.

use serde::{Deserialize, Serialize};

/// Unique identifier for a task (its name).
pub type TaskName = String;

/// Immutable launch parameters for a task.
///
/// Everything here is fixed at registration time and only read when a
/// container for the task is actuated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskSpec {
    pub name: TaskName,
    /// Image reference (e.g. "nginx:1.27").
    pub image: String,
    /// Command line, split on whitespace at actuation time.
    pub command: String,
    /// Environment variables in "KEY=value" form.
    #[serde(default)]
    pub env: Vec<String>,
    /// Runtime placement/networking options.
    #[serde(default)]
    pub network: NetworkOptions,
}

/// Networking options passed through to the container runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NetworkOptions {
    /// Publish all exposed ports to random host ports.
    #[serde(default)]
    pub publish_all_ports: bool,
    /// Network mode (e.g. "bridge", "host"), runtime default if unset.
    #[serde(default)]
    pub network_mode: Option<String>,
}

/// A managed workload with its replica counters.
///
/// `requested` is only moved by the scale reconciler, one unit at a time,
/// each move paired with an actuation call. `running` is only written by
/// the observation reconciler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub spec: TaskSpec,
    /// Replicas wanted, set by the desired-state source.
    #[serde(default)]
    pub demand: u32,
    /// Replicas this process has committed to (create or stop issued).
    #[serde(default)]
    pub requested: u32,
    /// Replicas observed live at the last observation pass.
    #[serde(default)]
    pub running: u32,
}

impl Task {
    /// Create a task with all counters at zero.
    pub fn new(spec: TaskSpec) -> Self {
        Self {
            spec,
            demand: 0,
            requested: 0,
            running: 0,
        }
    }

    /// Create a task with an initial demand.
    pub fn with_demand(spec: TaskSpec, demand: u32) -> Self {
        Self {
            spec,
            demand,
            requested: 0,
            running: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str) -> TaskSpec {
        TaskSpec {
            name: name.to_string(),
            image: "busybox:latest".to_string(),
            command: "sleep 3600".to_string(),
            env: vec!["APP_ENV=test".to_string()],
            network: NetworkOptions::default(),
        }
    }

    #[test]
    fn new_task_starts_with_zero_counters() {
        let task = Task::new(spec("web"));
        assert_eq!(task.demand, 0);
        assert_eq!(task.requested, 0);
        assert_eq!(task.running, 0);
        assert_eq!(task.name(), "web");
    }

    #[test]
    fn with_demand_sets_only_demand() {
        let task = Task::with_demand(spec("web"), 3);
        assert_eq!(task.demand, 3);
        assert_eq!(task.requested, 0);
        assert_eq!(task.running, 0);
    }

    #[test]
    fn spec_deserializes_with_defaults() {
        let task: TaskSpec = serde_json::from_str(
            r#"{"name": "web", "image": "nginx:1.27", "command": "nginx -g daemon_off"}"#,
        )
        .unwrap();
        assert!(task.env.is_empty());
        assert!(!task.network.publish_all_ports);
        assert!(task.network.network_mode.is_none());
    }
}
