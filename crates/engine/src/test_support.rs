// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test-only helpers for building an [`ExecutorContext`] wired to
//! the deterministic fakes in `hcagent-adapters::fake`.

#![cfg(test)]

use crate::dispatch::ExecutorContext;
use hcagent_adapters::fake::{
    FakeArchDetector, FakeBundleStore, FakeCatalogStore, FakeContainerManager, FakeExposureHandler,
    FakeIacExecutor, FakeLinkHandler, FakeModuleValidator,
};
use std::path::Path;
use std::sync::Arc;

pub fn test_context(root: &Path) -> ExecutorContext {
    ExecutorContext {
        container_manager: Arc::new(FakeContainerManager::default()),
        iac_executor: Arc::new(FakeIacExecutor::new()),
        catalog_store: Arc::new(FakeCatalogStore::default()),
        bundle_store: Arc::new(FakeBundleStore::default()),
        link_handler: Arc::new(FakeLinkHandler::default()),
        exposure_handler: Arc::new(FakeExposureHandler::default()),
        module_validator: Arc::new(FakeModuleValidator::default()),
        arch_detector: Arc::new(FakeArchDetector::default()),
        modules_root: root.join("modules"),
        sysconfdir: root.join("etc"),
        now_epoch_ms: Arc::new(|| 1_000_000),
    }
}
