// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds the library handles every command needs: the [`JobManager`] over
//! the on-disk job store, and the [`ExecutorContext`] the worker loop and
//! bundle expansion dispatch against. This binary talks to the library
//! directly (embedded mode, DESIGN.md OQ-1) rather than over a wire
//! protocol, so there is no client/transport layer to stand up here.

use hcagent_adapters::fake::{
    FakeBundleStore, FakeCatalogStore, FakeContainerManager, FakeExposureHandler, FakeLinkHandler,
    FakeModuleValidator,
};
use hcagent_adapters::process::ProcessIacExecutor;
use hcagent_adapters::{ArchDetector, CatalogStore};
use hcagent_core::{Clock, SystemClock};
use hcagent_daemon::{EnvPaths, HostArchDetector};
use hcagent_engine::ExecutorContext;
use hcagent_storage::{JobManager, JobStore};
use std::sync::Arc;

pub struct App {
    pub manager: Arc<JobManager<SystemClock>>,
    pub ctx: ExecutorContext,
    pub clock: SystemClock,
    pub catalog: Arc<dyn CatalogStore>,
}

impl App {
    pub fn load() -> anyhow::Result<Self> {
        let paths = EnvPaths::resolve()?;
        let store = JobStore::new(paths.jobs_root.clone())?;
        let clock = SystemClock;
        let manager = Arc::new(JobManager::new(store, clock.clone()));
        let catalog: Arc<dyn CatalogStore> = Arc::new(FakeCatalogStore::default());

        std::fs::create_dir_all(&paths.sysconfdir)?;

        let detector: Arc<dyn ArchDetector> = Arc::new(HostArchDetector);
        let ctx = ExecutorContext {
            container_manager: Arc::new(FakeContainerManager::default()),
            iac_executor: Arc::new(ProcessIacExecutor::new(paths.iac_bin.clone())),
            catalog_store: catalog.clone(),
            bundle_store: Arc::new(FakeBundleStore::default()),
            link_handler: Arc::new(FakeLinkHandler::default()),
            exposure_handler: Arc::new(FakeExposureHandler::default()),
            module_validator: Arc::new(FakeModuleValidator::default()),
            arch_detector: detector,
            modules_root: paths.modules_root,
            sysconfdir: paths.sysconfdir,
            now_epoch_ms: {
                let clock = clock.clone();
                Arc::new(move || clock.epoch_ms())
            },
        };

        Ok(Self { manager, ctx, clock, catalog })
    }
}
