//! flotillad — the Flotilla autoscaler daemon.
//!
//! Assembles the scheduling core around a task file and drives the two
//! reconciliation passes on independent intervals:
//!
//! - scale pass: refresh demand from the task file, then diff and actuate
//! - observation pass: refresh run counts from the runtime
//!
//! Runs against the in-memory sim engine (dry-run); a real container
//! engine plugs in behind the `ContainerRuntime` trait.
//!
//! # Usage
//!
//! ```text
//! flotillad --tasks tasks.toml --scale-interval 10 --observe-interval 15
//! ```

mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use flotilla_runtime::SimRuntime;
use flotilla_scheduler::Scheduler;
use flotilla_state::TaskSet;

#[derive(Parser)]
#[command(name = "flotillad", about = "Flotilla autoscaler daemon")]
struct Cli {
    /// Task file (TOML) listing managed tasks and their demand.
    #[arg(long, default_value = "tasks.toml")]
    tasks: PathBuf,

    /// Seconds between scale passes.
    #[arg(long, default_value = "10")]
    scale_interval: u64,

    /// Seconds between observation passes.
    #[arg(long, default_value = "15")]
    observe_interval: u64,

    /// Pull task images at registration time.
    #[arg(long)]
    pull_images: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,flotillad=debug,flotilla=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    run(cli).await
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let file = config::load(&cli.tasks)?;

    let runtime = Arc::new(SimRuntime::new());
    let scheduler = Scheduler::new(runtime, cli.pull_images);

    // One-time registration per task; a pull failure leaves the task
    // registered, so keep going.
    let mut registered = Vec::with_capacity(file.tasks.len());
    for entry in &file.tasks {
        let task = entry.to_task();
        if let Err(e) = scheduler.init_task(&task.spec).await {
            warn!(task = %task.spec.name, error = %e, "task initialization failed");
        }
        registered.push(task);
    }
    let tasks = TaskSet::from_tasks(registered);

    info!(
        count = file.tasks.len(),
        tasks_file = %cli.tasks.display(),
        "flotillad started"
    );

    let mut scale = tokio::time::interval(Duration::from_secs(cli.scale_interval));
    let mut observe = tokio::time::interval(Duration::from_secs(cli.observe_interval));

    loop {
        tokio::select! {
            _ = scale.tick() => {
                refresh_demand(&tasks, &cli.tasks).await;
                if let Err(e) = scheduler.reconcile_scale(&tasks).await {
                    warn!(error = %e, "scale pass reported an error");
                }
            }
            _ = observe.tick() => {
                if let Err(e) = scheduler.reconcile_observed(&tasks).await {
                    warn!(error = %e, "observation pass failed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("flotillad shutting down");
                scheduler.cleanup().await?;
                return Ok(());
            }
        }
    }
}

/// Re-read the task file and refresh `demand` for known tasks.
async fn refresh_demand(tasks: &TaskSet, path: &Path) {
    let file = match config::load(path) {
        Ok(f) => f,
        Err(e) => {
            warn!(error = %e, "task file reload failed, keeping previous demand");
            return;
        }
    };

    let mut list = tasks.lock().await;
    for entry in &file.tasks {
        if let Ok(task) = list.get_mut(&entry.name) {
            task.demand = entry.demand;
        }
    }
}
