//! Observation reconciler — merges the runtime's reported container set
//! back into the record store.
//!
//! The runtime's listing is the authority on what exists and what is
//! running; the records are the authority on what this process meant to
//! happen. Contradictions between the two are anomalies: logged, never
//! returned, because by the time they are observed the right response is
//! convergence, not an exception.

use tracing::{debug, info, warn};

use flotilla_state::TaskSet;

use crate::error::SchedulerResult;
use crate::records::{ContainerRecord, ContainerState, short_id, status_to_state};
use crate::scheduler::{OWNER_LABEL, Scheduler};

impl Scheduler {
    /// Run one observation pass.
    ///
    /// Lists all containers (ownership filtering happens locally), resets
    /// and recomputes every task's `running` count, applies observed
    /// state transitions, and garbage-collects records for containers the
    /// runtime no longer reports.
    pub async fn reconcile_observed(&self, tasks: &TaskSet) -> SchedulerResult<()> {
        // The only network call of the pass, before any lock is taken.
        let containers = self.runtime.list_containers().await?;

        let mut list = tasks.lock().await;
        let mut records = self.records.lock().await;

        // Reset counters and per-pass flags.
        for task in list.tasks.iter_mut() {
            task.running = 0;
            if let Some(known) = records.get_mut(&task.spec.name) {
                for record in known.values_mut() {
                    record.observed = false;
                }
            }
        }

        for container in &containers {
            // Ownership is claimed solely through our label.
            let Some(task_name) = container.labels.get(OWNER_LABEL) else {
                continue;
            };
            let Ok(task) = list.get_mut(task_name) else {
                warn!(task = %task_name, "runtime reported a task we are not managing");
                continue;
            };
            let Some(known) = records.get_mut(task_name.as_str()) else {
                warn!(task = %task_name, "managed task has no record entry, ignoring");
                continue;
            };

            let seen = status_to_state(&container.status);
            let id = short_id(&container.id).to_string();
            let record = known.entry(id.clone()).or_insert_with(|| {
                info!(task = %task_name, %id, state = ?seen, "no previous record of container");
                ContainerRecord::default()
            });

            match seen {
                ContainerState::Running => {
                    task.running += 1;
                    // Starting → Running, or a container entirely new to
                    // us. A record mid-termination is not downgraded even
                    // if the runtime still reports it up.
                    if record.state == Some(ContainerState::Starting) || record.state.is_none() {
                        record.state = Some(ContainerState::Running);
                    }
                }
                ContainerState::Removing => {
                    if record.state != Some(ContainerState::Removing) {
                        warn!(
                            task = %task_name, %id,
                            "container is being removed, but we did not terminate it"
                        );
                    }
                }
                ContainerState::Exited => {
                    if record.state != Some(ContainerState::Stopping)
                        && record.state != Some(ContainerState::Exited)
                    {
                        warn!(
                            task = %task_name, %id,
                            "container exited, but we did not terminate it"
                        );
                    }
                }
                ContainerState::Dead => {
                    if record.state != Some(ContainerState::Dead) {
                        warn!(task = %task_name, %id, "container is dead");
                    }
                    record.state = Some(ContainerState::Dead);
                }
                _ => {}
            }

            record.observed = true;
        }

        // Garbage-collect records for containers no longer reported.
        for task in list.tasks.iter() {
            debug!(
                task = %task.spec.name,
                running = task.running,
                requested = task.requested,
                "observed counts"
            );
            let Some(known) = records.get_mut(&task.spec.name) else {
                continue;
            };
            known.retain(|id, record| {
                if record.observed {
                    return true;
                }
                match record.state {
                    // Terminal and confirmed gone: cleanup is complete.
                    Some(ContainerState::Removing) | Some(ContainerState::Exited) => {
                        debug!(task = %task.spec.name, %id, "deleting record, container gone");
                        false
                    }
                    // Mid-actuation records may simply not be visible yet.
                    Some(ContainerState::Created)
                    | Some(ContainerState::Starting)
                    | Some(ContainerState::Stopping) => true,
                    other => {
                        warn!(
                            task = %task.spec.name, %id, state = ?other,
                            "bad state for unreported container"
                        );
                        true
                    }
                }
            });
        }

        Ok(())
    }
}
