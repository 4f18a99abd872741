//! flotilla-state — the task data model.
//!
//! A `Task` is a logical workload type: immutable launch parameters
//! (`TaskSpec`) plus three replica counters with distinct owners:
//!
//! - `demand` — what the desired-state source wants (written externally)
//! - `requested` — what the scale reconciler has committed to
//! - `running` — what the observation reconciler last saw live
//!
//! The `TaskSet` is the single shared, lockable collection of tasks. Both
//! reconcilers take its lock for their planning/update phases so that
//! counter mutations never race.

pub mod error;
pub mod tasks;
pub mod types;

pub use error::{StateError, StateResult};
pub use tasks::{TaskList, TaskSet};
pub use types::{NetworkOptions, Task, TaskName, TaskSpec};
