//! SimRuntime — in-memory container engine for tests and dry runs.
//!
//! Behaves like a tiny Docker: deterministic 64-hex IDs, Docker-shaped
//! status strings, ID-prefix resolution on every call. Tests can stage
//! runtime drift directly (`set_status`, `forget`, `inject`) and trip
//! one-shot faults per operation. Every call is appended to an ordered
//! op log so issuance order is observable.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::client::{ContainerId, ContainerRuntime, ContainerSummary, CreateSpec};
use crate::error::{RuntimeError, RuntimeResult};

/// Simulated container status, rendered as a Docker status string in
/// listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimStatus {
    Created,
    Up,
    Exited,
    Removal,
    Dead,
}

impl SimStatus {
    fn render(self) -> String {
        match self {
            SimStatus::Created => "Created".to_string(),
            SimStatus::Up => "Up 2 minutes".to_string(),
            SimStatus::Exited => "Exited (0) 5 seconds ago".to_string(),
            SimStatus::Removal => "Removal In Progress".to_string(),
            SimStatus::Dead => "Dead".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct SimContainer {
    image: String,
    labels: HashMap<String, String>,
    status: SimStatus,
}

/// One-shot failure switches, consumed by the next matching call.
#[derive(Debug, Default)]
struct Faults {
    pull: bool,
    create: bool,
    start: bool,
    stop: bool,
    remove: bool,
    list: bool,
}

#[derive(Default)]
struct SimState {
    containers: BTreeMap<ContainerId, SimContainer>,
    next_id: u64,
    faults: Faults,
    ops: Vec<String>,
}

impl SimState {
    /// Resolve an ID prefix to the full key, Docker-style.
    fn resolve(&self, prefix: &str) -> RuntimeResult<ContainerId> {
        let mut matches = self
            .containers
            .keys()
            .filter(|id| id.starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(id), None) => Ok(id.clone()),
            (Some(_), Some(_)) => Err(RuntimeError::Api(format!(
                "ambiguous container id prefix: {prefix}"
            ))),
            (None, _) => Err(RuntimeError::NotFound(prefix.to_string())),
        }
    }
}

/// In-memory [`ContainerRuntime`] backend.
#[derive(Default)]
pub struct SimRuntime {
    inner: Mutex<SimState>,
}

impl SimRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Test/staging surface ────────────────────────────────────────

    /// Insert a container the engine "already had" (e.g. left over from
    /// a previous process) with the given labels and status.
    pub async fn inject(
        &self,
        labels: HashMap<String, String>,
        status: SimStatus,
    ) -> ContainerId {
        let mut state = self.inner.lock().await;
        let id = next_container_id(&mut state);
        state.containers.insert(
            id.clone(),
            SimContainer {
                image: "injected".to_string(),
                labels,
                status,
            },
        );
        id
    }

    /// Like [`inject`](Self::inject) but with an explicit full ID, so
    /// tests can stage ID-prefix collisions.
    pub async fn inject_with_id(
        &self,
        id: &str,
        labels: HashMap<String, String>,
        status: SimStatus,
    ) {
        let mut state = self.inner.lock().await;
        state.containers.insert(
            id.to_string(),
            SimContainer {
                image: "injected".to_string(),
                labels,
                status,
            },
        );
    }

    /// Overwrite a container's status (runtime drift the core didn't cause).
    pub async fn set_status(&self, prefix: &str, status: SimStatus) {
        let mut state = self.inner.lock().await;
        if let Ok(id) = state.resolve(prefix)
            && let Some(container) = state.containers.get_mut(&id)
        {
            container.status = status;
        }
    }

    /// Drop a container from the engine without the core's involvement.
    pub async fn forget(&self, prefix: &str) {
        let mut state = self.inner.lock().await;
        if let Ok(id) = state.resolve(prefix) {
            state.containers.remove(&id);
        }
    }

    /// Current status of a container, if present.
    pub async fn status_of(&self, prefix: &str) -> Option<SimStatus> {
        let state = self.inner.lock().await;
        let id = state.resolve(prefix).ok()?;
        Some(state.containers[&id].status)
    }

    pub async fn container_count(&self) -> usize {
        self.inner.lock().await.containers.len()
    }

    /// Ordered log of every operation issued against this engine.
    pub async fn ops(&self) -> Vec<String> {
        self.inner.lock().await.ops.clone()
    }

    pub async fn fail_next_pull(&self) {
        self.inner.lock().await.faults.pull = true;
    }

    pub async fn fail_next_create(&self) {
        self.inner.lock().await.faults.create = true;
    }

    pub async fn fail_next_start(&self) {
        self.inner.lock().await.faults.start = true;
    }

    pub async fn fail_next_stop(&self) {
        self.inner.lock().await.faults.stop = true;
    }

    pub async fn fail_next_remove(&self) {
        self.inner.lock().await.faults.remove = true;
    }

    pub async fn fail_next_list(&self) {
        self.inner.lock().await.faults.list = true;
    }
}

/// Deterministic 64-hex ID, unique in its leading characters so that
/// 12-char truncation stays collision-free unless a test stages one.
fn next_container_id(state: &mut SimState) -> ContainerId {
    state.next_id += 1;
    format!("{:0<64}", format!("{:x}", state.next_id))
}

#[async_trait]
impl ContainerRuntime for SimRuntime {
    async fn pull_image(&self, image: &str) -> RuntimeResult<()> {
        let mut state = self.inner.lock().await;
        state.ops.push(format!("pull {image}"));
        if std::mem::take(&mut state.faults.pull) {
            return Err(RuntimeError::Image(format!("pull failed: {image}")));
        }
        debug!(%image, "sim: image pulled");
        Ok(())
    }

    async fn create_container(&self, spec: &CreateSpec) -> RuntimeResult<ContainerId> {
        let mut state = self.inner.lock().await;
        state.ops.push(format!("create {}", spec.image));
        if std::mem::take(&mut state.faults.create) {
            return Err(RuntimeError::Api(format!(
                "create failed for image {}",
                spec.image
            )));
        }
        let id = next_container_id(&mut state);
        state.containers.insert(
            id.clone(),
            SimContainer {
                image: spec.image.clone(),
                labels: spec.labels.clone(),
                status: SimStatus::Created,
            },
        );
        debug!(id = %&id[..12], image = %spec.image, "sim: container created");
        Ok(id)
    }

    async fn start_container(&self, id: &str) -> RuntimeResult<()> {
        let mut state = self.inner.lock().await;
        state.ops.push(format!("start {id}"));
        if std::mem::take(&mut state.faults.start) {
            return Err(RuntimeError::Api(format!("start failed: {id}")));
        }
        let full = state.resolve(id)?;
        let Some(container) = state.containers.get_mut(&full) else {
            return Err(RuntimeError::NotFound(id.to_string()));
        };
        if container.status != SimStatus::Created {
            return Err(RuntimeError::Api(format!(
                "container {id} is not in created state"
            )));
        }
        container.status = SimStatus::Up;
        Ok(())
    }

    async fn stop_container(&self, id: &str, grace_secs: u32) -> RuntimeResult<()> {
        let mut state = self.inner.lock().await;
        state.ops.push(format!("stop {id} grace={grace_secs}"));
        if std::mem::take(&mut state.faults.stop) {
            return Err(RuntimeError::Api(format!("stop failed: {id}")));
        }
        let full = state.resolve(id)?;
        if let Some(container) = state.containers.get_mut(&full) {
            container.status = SimStatus::Exited;
        }
        Ok(())
    }

    async fn remove_container(&self, id: &str, remove_volumes: bool) -> RuntimeResult<()> {
        let mut state = self.inner.lock().await;
        state
            .ops
            .push(format!("remove {id} volumes={remove_volumes}"));
        if std::mem::take(&mut state.faults.remove) {
            return Err(RuntimeError::Api(format!("remove failed: {id}")));
        }
        let full = state.resolve(id)?;
        if state.containers[&full].status == SimStatus::Up {
            return Err(RuntimeError::Api(format!(
                "cannot remove running container {id}"
            )));
        }
        state.containers.remove(&full);
        Ok(())
    }

    async fn list_containers(&self) -> RuntimeResult<Vec<ContainerSummary>> {
        let mut state = self.inner.lock().await;
        state.ops.push("list".to_string());
        if std::mem::take(&mut state.faults.list) {
            return Err(RuntimeError::Api("list failed".to_string()));
        }
        Ok(state
            .containers
            .iter()
            .map(|(id, c)| ContainerSummary {
                id: id.clone(),
                status: c.status.render(),
                labels: c.labels.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_spec(image: &str) -> CreateSpec {
        CreateSpec {
            image: image.to_string(),
            command: vec!["sleep".to_string(), "3600".to_string()],
            env: Vec::new(),
            labels: HashMap::new(),
            publish_all_ports: false,
            network_mode: None,
        }
    }

    #[tokio::test]
    async fn create_start_stop_remove_lifecycle() {
        let sim = SimRuntime::new();

        let id = sim.create_container(&create_spec("busybox")).await.unwrap();
        assert_eq!(id.len(), 64);
        assert_eq!(sim.status_of(&id).await, Some(SimStatus::Created));

        sim.start_container(&id[..12]).await.unwrap();
        assert_eq!(sim.status_of(&id).await, Some(SimStatus::Up));

        sim.stop_container(&id[..12], 1).await.unwrap();
        assert_eq!(sim.status_of(&id).await, Some(SimStatus::Exited));

        sim.remove_container(&id[..12], true).await.unwrap();
        assert_eq!(sim.container_count().await, 0);
    }

    #[tokio::test]
    async fn ids_are_unique_in_their_12_char_prefix() {
        let sim = SimRuntime::new();
        let a = sim.create_container(&create_spec("a")).await.unwrap();
        let b = sim.create_container(&create_spec("b")).await.unwrap();
        assert_ne!(&a[..12], &b[..12]);
    }

    #[tokio::test]
    async fn unknown_prefix_is_not_found() {
        let sim = SimRuntime::new();
        let result = sim.start_container("deadbeef").await;
        assert!(matches!(result, Err(RuntimeError::NotFound(_))));
    }

    #[tokio::test]
    async fn ambiguous_prefix_is_rejected() {
        let sim = SimRuntime::new();
        sim.inject_with_id(
            &format!("{:0<64}", "aaaabbbbcccc1"),
            HashMap::new(),
            SimStatus::Up,
        )
        .await;
        sim.inject_with_id(
            &format!("{:0<64}", "aaaabbbbcccc2"),
            HashMap::new(),
            SimStatus::Up,
        )
        .await;

        let result = sim.stop_container("aaaabbbbcccc", 1).await;
        assert!(matches!(result, Err(RuntimeError::Api(_))));
    }

    #[tokio::test]
    async fn cannot_remove_running_container() {
        let sim = SimRuntime::new();
        let id = sim.create_container(&create_spec("busybox")).await.unwrap();
        sim.start_container(&id).await.unwrap();

        let result = sim.remove_container(&id, true).await;
        assert!(matches!(result, Err(RuntimeError::Api(_))));
        assert_eq!(sim.container_count().await, 1);
    }

    #[tokio::test]
    async fn faults_are_one_shot() {
        let sim = SimRuntime::new();
        sim.fail_next_create().await;

        assert!(sim.create_container(&create_spec("busybox")).await.is_err());
        assert!(sim.create_container(&create_spec("busybox")).await.is_ok());
    }

    #[tokio::test]
    async fn list_renders_docker_status_strings() {
        let sim = SimRuntime::new();
        let id = sim.create_container(&create_spec("busybox")).await.unwrap();
        sim.start_container(&id).await.unwrap();

        let containers = sim.list_containers().await.unwrap();
        assert_eq!(containers.len(), 1);
        assert!(containers[0].status.contains("Up"));

        sim.set_status(&id, SimStatus::Dead).await;
        let containers = sim.list_containers().await.unwrap();
        assert_eq!(containers[0].status, "Dead");
    }

    #[tokio::test]
    async fn forget_drops_container_from_listings() {
        let sim = SimRuntime::new();
        let id = sim.create_container(&create_spec("busybox")).await.unwrap();
        sim.forget(&id).await;
        assert!(sim.list_containers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn op_log_preserves_issuance_order() {
        let sim = SimRuntime::new();
        sim.pull_image("busybox").await.unwrap();
        let id = sim.create_container(&create_spec("busybox")).await.unwrap();
        sim.start_container(&id[..12]).await.unwrap();

        let ops = sim.ops().await;
        assert_eq!(ops[0], "pull busybox");
        assert!(ops[1].starts_with("create"));
        assert!(ops[2].starts_with("start"));
    }
}
