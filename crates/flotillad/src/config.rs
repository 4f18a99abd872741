//! Task file loading.
//!
//! The TOML task file is the daemon's stand-in desired-state source:
//! each `[[task]]` entry names a workload, its launch parameters, and
//! the demanded replica count. The file is re-read every scale cycle so
//! demand edits take effect without a restart (new tasks do not — task
//! registration is one-time).

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use flotilla_state::{NetworkOptions, Task, TaskSpec};

/// Parsed task file.
#[derive(Debug, Deserialize)]
pub struct TaskFile {
    #[serde(default, rename = "task")]
    pub tasks: Vec<TaskEntry>,
}

/// One `[[task]]` entry.
#[derive(Debug, Deserialize)]
pub struct TaskEntry {
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub env: Vec<String>,
    #[serde(default)]
    pub demand: u32,
    #[serde(default)]
    pub publish_all_ports: bool,
    #[serde(default)]
    pub network_mode: Option<String>,
}

impl TaskEntry {
    pub fn to_task(&self) -> Task {
        Task::with_demand(
            TaskSpec {
                name: self.name.clone(),
                image: self.image.clone(),
                command: self.command.clone(),
                env: self.env.clone(),
                network: NetworkOptions {
                    publish_all_ports: self.publish_all_ports,
                    network_mode: self.network_mode.clone(),
                },
            },
            self.demand,
        )
    }
}

/// Load and parse a task file.
pub fn load(path: &Path) -> anyhow::Result<TaskFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading task file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing task file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_task_entries() {
        let file: TaskFile = toml::from_str(
            r#"
            [[task]]
            name = "web"
            image = "nginx:1.27"
            command = "nginx -g daemon_off"
            env = ["PORT=8080"]
            demand = 3
            publish_all_ports = true

            [[task]]
            name = "worker"
            image = "busybox:latest"
            command = "sleep 3600"
            "#,
        )
        .unwrap();

        assert_eq!(file.tasks.len(), 2);

        let web = file.tasks[0].to_task();
        assert_eq!(web.spec.name, "web");
        assert_eq!(web.demand, 3);
        assert!(web.spec.network.publish_all_ports);
        assert_eq!(web.requested, 0);

        let worker = file.tasks[1].to_task();
        assert_eq!(worker.demand, 0);
        assert!(worker.spec.env.is_empty());
    }

    #[test]
    fn empty_file_parses_to_no_tasks() {
        let file: TaskFile = toml::from_str("").unwrap();
        assert!(file.tasks.is_empty());
    }
}
