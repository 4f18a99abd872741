//! Lifecycle actuation units — one container started or stopped per unit.
//!
//! Units run as independent spawned tasks; the scale pass joins the whole
//! batch. A unit that fails partway logs the failure and leaves the
//! record at the last successful step, to be reconciled by a later
//! observation pass. `requested` accounting belongs to the caller and is
//! never rolled back here.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error};

use flotilla_runtime::{ContainerRuntime, CreateSpec};
use flotilla_state::TaskSpec;

use crate::records::{ContainerState, RecordStore, short_id};
use crate::scheduler::OWNER_LABEL;

/// Grace period handed to the runtime's stop call before it kills the
/// container.
pub const STOP_GRACE_SECS: u32 = 1;

/// Build runtime creation parameters from a task descriptor.
///
/// The ownership label is what lets the observation pass claim this
/// container later.
pub(crate) fn build_create_spec(spec: &TaskSpec) -> CreateSpec {
    let labels = HashMap::from([(OWNER_LABEL.to_string(), spec.name.clone())]);
    CreateSpec {
        image: spec.image.clone(),
        command: spec.command.split_whitespace().map(str::to_string).collect(),
        env: spec.env.clone(),
        labels,
        publish_all_ports: spec.network.publish_all_ports,
        network_mode: spec.network.network_mode.clone(),
    }
}

/// Start one new container for a task: create, record `Created`, start,
/// record `Starting`.
pub(crate) async fn start_unit(
    runtime: Arc<dyn ContainerRuntime>,
    records: RecordStore,
    spec: TaskSpec,
) {
    let create = build_create_spec(&spec);

    debug!(task = %spec.name, "[start] creating container");
    let full_id = match runtime.create_container(&create).await {
        Ok(id) => id,
        Err(e) => {
            error!(task = %spec.name, error = %e, "could not create container");
            return;
        }
    };

    let id = short_id(&full_id).to_string();
    records.insert(&spec.name, &id, ContainerState::Created).await;
    debug!(task = %spec.name, %id, "[created]");

    if let Err(e) = runtime.start_container(&id).await {
        error!(task = %spec.name, %id, error = %e, "could not start container");
        return;
    }

    records.set_state(&spec.name, &id, ContainerState::Starting).await;
    debug!(task = %spec.name, %id, "[starting]");
}

/// Stop one container of a task: stop, record `Removing`, remove
/// (with volumes).
///
/// The container was already selected and flipped to `Stopping` by the
/// caller, under the record lock.
pub(crate) async fn stop_unit(
    runtime: Arc<dyn ContainerRuntime>,
    records: RecordStore,
    task: String,
    id: String,
) {
    debug!(%task, %id, "[stopping]");
    if let Err(e) = runtime.stop_container(&id, STOP_GRACE_SECS).await {
        error!(%task, %id, error = %e, "could not stop container");
        return;
    }

    records.set_state(&task, &id, ContainerState::Removing).await;
    debug!(%task, %id, "[removing]");

    if let Err(e) = runtime.remove_container(&id, true).await {
        error!(%task, %id, error = %e, "could not remove container");
    }
}
