//! flotilla-scheduler — the scheduling/reconciliation core.
//!
//! Drives a container runtime to match actual running container counts to
//! desired counts, and reconciles internal bookkeeping against
//! runtime-reported reality. Two passes, independently triggerable:
//!
//! - [`Scheduler::reconcile_scale`] — diff `demand` against `requested`
//!   per task and issue concurrent start/stop units, scale-down first,
//!   joining the whole batch before returning.
//! - [`Scheduler::reconcile_observed`] — list containers from the runtime,
//!   claim the ones carrying our ownership label, refresh `running`
//!   counts, apply state transitions, log anomalies, and garbage-collect
//!   records for containers no longer reported.
//!
//! # Architecture
//!
//! ```text
//! Scheduler
//!   ├── RecordStore (task → container id → ContainerRecord, one lock)
//!   ├── ContainerRuntime (create/start/stop/remove/list, network calls
//!   │     always outside the record lock)
//!   └── per-pass JoinSet of actuation units (start or stop, one per
//!         container being changed)
//! ```

pub mod actuator;
pub mod error;
pub mod observe;
pub mod records;
pub mod scale;
pub mod scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use records::{ContainerRecord, ContainerState, RecordStore, short_id, status_to_state};
pub use scheduler::{OWNER_LABEL, Scheduler};
