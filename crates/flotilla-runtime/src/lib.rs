//! flotilla-runtime — the container runtime boundary.
//!
//! The scheduling core talks to whatever container engine is underneath
//! through the [`ContainerRuntime`] trait: pull, create, start, stop,
//! remove, list. The wire protocol behind those calls is a backend
//! concern; the core only depends on this surface.
//!
//! [`SimRuntime`] is the in-memory backend used by tests and by dry runs.

pub mod client;
pub mod error;
pub mod sim;

pub use client::{ContainerId, ContainerRuntime, ContainerSummary, CreateSpec};
pub use error::{RuntimeError, RuntimeResult};
pub use sim::{SimRuntime, SimStatus};
