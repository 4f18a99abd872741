//! Scale reconciler — diffs `demand` against `requested` and closes the
//! gap with concurrent actuation units.
//!
//! Tasks already mid-scaling (`requested != running`) are left alone for
//! the pass: the core never stacks a second scale action on a task before
//! the first has been observed to complete. This trades responsiveness
//! for correctness.

use tokio::task::JoinSet;
use tracing::{debug, error, info};

use flotilla_state::TaskSet;

use crate::error::SchedulerResult;
use crate::scheduler::Scheduler;

impl Scheduler {
    /// Run one scale pass over the task collection.
    ///
    /// Scale-downs are all issued before any scale-up, to free resources
    /// first. `requested` moves by one per issued unit — it tracks
    /// intent, not confirmed completion. The pass does not return until
    /// every issued unit has resolved one way or the other.
    ///
    /// The returned error is the most recent stop-planning failure
    /// ([`SchedulerError::NoContainerToStop`](crate::SchedulerError::NoContainerToStop));
    /// start failures resolve asynchronously and are only logged.
    pub async fn reconcile_scale(&self, tasks: &TaskSet) -> SchedulerResult<()> {
        let mut units = JoinSet::new();
        let mut last_err = None;

        let mut list = tasks.lock().await;

        let mut too_many = Vec::new();
        let mut too_few = Vec::new();
        for (i, task) in list.tasks.iter().enumerate() {
            if task.requested != task.running {
                debug!(
                    task = %task.spec.name,
                    requested = task.requested,
                    running = task.running,
                    "scale change in flight, skipping"
                );
                continue;
            }
            if task.demand < task.requested {
                too_many.push(i);
            } else if task.demand > task.requested {
                too_few.push(i);
            }
        }

        // Scale down first to free up resources.
        for i in too_many {
            let name = list.tasks[i].spec.name.clone();
            let diff = list.tasks[i].requested - list.tasks[i].demand;
            info!(task = %name, count = diff, "scaling down");
            for _ in 0..diff {
                if let Err(e) = self.spawn_stop(&mut units, &name).await {
                    error!(task = %name, error = %e, "could not stop container");
                    last_err = Some(e);
                }
                list.tasks[i].requested -= 1;
            }
        }

        // Now we can scale up.
        for i in too_few {
            let diff = list.tasks[i].demand - list.tasks[i].requested;
            info!(task = %list.tasks[i].spec.name, count = diff, "scaling up");
            for _ in 0..diff {
                self.spawn_start(&mut units, &list.tasks[i].spec);
                list.tasks[i].requested += 1;
            }
        }

        // Planning is done; units never touch the task collection.
        drop(list);

        // The pass is atomic to the caller: block until every unit issued
        // above has finished, success or failure.
        self.join_units(units).await;

        match last_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
