//! The `ContainerRuntime` trait — what the core needs from an engine.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::RuntimeResult;

/// Full engine-assigned container identifier (64 hex chars for Docker).
pub type ContainerId = String;

/// Parameters for creating a container.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSpec {
    pub image: String,
    /// Command tokens (already split).
    pub command: Vec<String>,
    /// Environment variables in "KEY=value" form.
    pub env: Vec<String>,
    /// Labels to attach, including the scheduler's ownership label.
    pub labels: HashMap<String, String>,
    pub publish_all_ports: bool,
    pub network_mode: Option<String>,
}

/// One entry from a container listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerSummary {
    /// Full container ID.
    pub id: ContainerId,
    /// Human status string (e.g. "Up 2 minutes", "Exited (0) 5 seconds ago").
    pub status: String,
    pub labels: HashMap<String, String>,
}

/// Abstract container engine.
///
/// All ID-taking calls accept a unique ID prefix, matching Docker
/// semantics — the core keys containers by a 12-char prefix and passes
/// that prefix back on stop/remove/start.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Pull an image so that creates for it can succeed.
    async fn pull_image(&self, image: &str) -> RuntimeResult<()>;

    /// Create a container; returns the engine-assigned ID.
    async fn create_container(&self, spec: &CreateSpec) -> RuntimeResult<ContainerId>;

    /// Start a created container.
    async fn start_container(&self, id: &str) -> RuntimeResult<()>;

    /// Stop a running container, allowing `grace_secs` for graceful exit.
    async fn stop_container(&self, id: &str, grace_secs: u32) -> RuntimeResult<()>;

    /// Remove a stopped container, optionally with its volumes.
    async fn remove_container(&self, id: &str, remove_volumes: bool) -> RuntimeResult<()>;

    /// List all containers the engine knows about (running or not).
    async fn list_containers(&self) -> RuntimeResult<Vec<ContainerSummary>>;
}
