//! The `Scheduler` — public surface of the reconciliation core.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{error, info, warn};

use flotilla_runtime::ContainerRuntime;
use flotilla_state::TaskSpec;

use crate::actuator::{start_unit, stop_unit};
use crate::error::{SchedulerError, SchedulerResult};
use crate::records::RecordStore;

/// Label key attached to every container this scheduler creates; its
/// value is the owning task's name. This is the sole ownership claim
/// used during observation.
pub const OWNER_LABEL: &str = "io.flotilla.task";

/// Reconciliation core: owns the record store and a handle to the
/// container runtime.
pub struct Scheduler {
    pub(crate) runtime: Arc<dyn ContainerRuntime>,
    pub(crate) records: RecordStore,
    pull_images: bool,
}

impl Scheduler {
    /// Create a scheduler over the given runtime.
    ///
    /// With `pull_images` set, `init_task` pulls the task's image at
    /// registration time.
    pub fn new(runtime: Arc<dyn ContainerRuntime>, pull_images: bool) -> Self {
        Self {
            runtime,
            records: RecordStore::new(),
            pull_images,
        }
    }

    /// The record store (diagnostic/test access).
    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    /// One-time registration of a task: creates its record-store entry
    /// and optionally pulls its image.
    ///
    /// A pull failure is returned to the caller but the registration
    /// stands — later creates may still succeed once the image is
    /// available.
    pub async fn init_task(&self, spec: &TaskSpec) -> SchedulerResult<()> {
        info!(task = %spec.name, "initializing task");
        self.records.init_task(&spec.name).await?;

        if self.pull_images {
            info!(task = %spec.name, image = %spec.image, "pulling image");
            if let Err(e) = self.runtime.pull_image(&spec.image).await {
                error!(task = %spec.name, image = %spec.image, error = %e, "image pull failed");
                return Err(SchedulerError::Runtime(e));
            }
        }

        Ok(())
    }

    /// Hook for shutdown logic; nothing to do yet.
    pub async fn cleanup(&self) -> SchedulerResult<()> {
        Ok(())
    }

    /// Spawn a start unit for this task onto the pass's join set.
    pub(crate) fn spawn_start(&self, units: &mut JoinSet<()>, spec: &TaskSpec) {
        let runtime = Arc::clone(&self.runtime);
        let records = self.records.clone();
        let spec = spec.clone();
        units.spawn(start_unit(runtime, records, spec));
    }

    /// Select one running container of this task, mark it `Stopping`,
    /// and spawn its stop unit. Fails with [`SchedulerError::NoContainerToStop`]
    /// when no record of the task is in the `Running` state.
    pub(crate) async fn spawn_stop(
        &self,
        units: &mut JoinSet<()>,
        task: &str,
    ) -> SchedulerResult<()> {
        let Some(id) = self.records.mark_one_stopping(task).await else {
            return Err(SchedulerError::NoContainerToStop(task.to_string()));
        };
        let runtime = Arc::clone(&self.runtime);
        let records = self.records.clone();
        units.spawn(stop_unit(runtime, records, task.to_string(), id));
        Ok(())
    }

    /// Drain a pass's join set; unit outcomes were already logged inside
    /// the units, so only panics are reported here.
    pub(crate) async fn join_units(&self, mut units: JoinSet<()>) {
        while let Some(result) = units.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "actuation unit did not run to completion");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flotilla_runtime::SimRuntime;
    use flotilla_state::NetworkOptions;

    fn spec(name: &str) -> TaskSpec {
        TaskSpec {
            name: name.to_string(),
            image: "busybox:latest".to_string(),
            command: "sleep 3600".to_string(),
            env: Vec::new(),
            network: NetworkOptions::default(),
        }
    }

    #[tokio::test]
    async fn init_task_registers_record_entry() {
        let sim = Arc::new(SimRuntime::new());
        let scheduler = Scheduler::new(sim, false);

        scheduler.init_task(&spec("web")).await.unwrap();
        assert!(scheduler.records().is_managed("web").await);
    }

    #[tokio::test]
    async fn duplicate_init_task_is_rejected() {
        let sim = Arc::new(SimRuntime::new());
        let scheduler = Scheduler::new(sim, false);

        scheduler.init_task(&spec("web")).await.unwrap();
        let result = scheduler.init_task(&spec("web")).await;
        assert!(matches!(result, Err(SchedulerError::AlreadyManaged(_))));
    }

    #[tokio::test]
    async fn init_task_pulls_image_when_enabled() {
        let sim = Arc::new(SimRuntime::new());
        let scheduler = Scheduler::new(sim.clone(), true);

        scheduler.init_task(&spec("web")).await.unwrap();
        assert!(sim.ops().await.contains(&"pull busybox:latest".to_string()));
    }

    #[tokio::test]
    async fn init_task_skips_pull_when_disabled() {
        let sim = Arc::new(SimRuntime::new());
        let scheduler = Scheduler::new(sim.clone(), false);

        scheduler.init_task(&spec("web")).await.unwrap();
        assert!(sim.ops().await.is_empty());
    }

    #[tokio::test]
    async fn pull_failure_is_returned_but_task_stays_managed() {
        let sim = Arc::new(SimRuntime::new());
        sim.fail_next_pull().await;
        let scheduler = Scheduler::new(sim.clone(), true);

        let result = scheduler.init_task(&spec("web")).await;
        assert!(matches!(result, Err(SchedulerError::Runtime(_))));

        // Registration already happened; a retry reports the duplicate.
        assert!(scheduler.records().is_managed("web").await);
        let retry = scheduler.init_task(&spec("web")).await;
        assert!(matches!(retry, Err(SchedulerError::AlreadyManaged(_))));
    }

    #[tokio::test]
    async fn cleanup_is_a_noop() {
        let sim = Arc::new(SimRuntime::new());
        let scheduler = Scheduler::new(sim, false);
        assert!(scheduler.cleanup().await.is_ok());
    }
}
