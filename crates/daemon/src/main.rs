// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hcad`: the long-running host control agent daemon. Owns the job store
//! exclusively, reconciles boot-scoped jobs against the active INI files
//! left by a reboot, then runs the Worker Loop until a shutdown signal
//! (spec.md §1, §4.D, §9: "Process-wide state... initialise the jobs root
//! and recover pending/active INIs before the worker starts ticking.").

use hcagent_adapters::fake::{
    FakeBundleStore, FakeCatalogStore, FakeContainerManager, FakeExposureHandler, FakeLinkHandler,
    FakeModuleValidator,
};
use hcagent_adapters::process::ProcessIacExecutor;
use hcagent_core::{Clock, SystemClock};
use hcagent_daemon::{EnvPaths, HostArchDetector};
use hcagent_engine::{reconcile_startup, ExecutorContext, Worker};
use hcagent_storage::{JobManager, JobStore};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let paths = EnvPaths::resolve()?;
    tracing::info!(
        jobs_root = %paths.jobs_root.display(),
        sysconfdir = %paths.sysconfdir.display(),
        modules_root = %paths.modules_root.display(),
        iac_bin = %paths.iac_bin,
        "hcad starting"
    );

    let store = JobStore::new(paths.jobs_root.clone())?;
    let clock = SystemClock;
    let manager = Arc::new(JobManager::new(store, clock.clone()));

    // The container-manager, catalog/bundle store, and link/exposure
    // handlers are external collaborators this repo does not own (spec.md
    // §1, §6). Production deployments inject real implementations that
    // speak those services' wire protocols; this daemon ships the
    // deterministic in-memory defaults so it is runnable standalone.
    let ctx = ExecutorContext {
        container_manager: Arc::new(FakeContainerManager::default()),
        iac_executor: Arc::new(ProcessIacExecutor::new(paths.iac_bin.clone())),
        catalog_store: Arc::new(FakeCatalogStore::default()),
        bundle_store: Arc::new(FakeBundleStore::default()),
        link_handler: Arc::new(FakeLinkHandler::default()),
        exposure_handler: Arc::new(FakeExposureHandler::default()),
        module_validator: Arc::new(FakeModuleValidator::default()),
        arch_detector: Arc::new(HostArchDetector),
        modules_root: paths.modules_root,
        sysconfdir: paths.sysconfdir,
        now_epoch_ms: {
            let clock = clock.clone();
            Arc::new(move || clock.epoch_ms())
        },
    };

    std::fs::create_dir_all(&ctx.sysconfdir)?;

    reconcile_startup(&manager, &ctx, &clock).await?;
    tracing::info!("startup reconciliation complete");

    let shutdown = CancellationToken::new();
    let shutdown_for_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received shutdown signal");
            shutdown_for_signal.cancel();
        }
    });

    let worker = Worker::new(manager, ctx, clock);
    worker.run(shutdown).await;
    tracing::info!("hcad stopped");
    Ok(())
}
