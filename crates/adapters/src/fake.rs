// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic in-memory implementations of every adapter trait, used by
//! the engine's own test suite in place of the real external collaborators.

use crate::traits::{
    AdapterError, ArchDetector, ArchInfo, BundleDef, BundleStore, CatalogStore, ContainerManager,
    ExposureHandler, ExposureSpec, IacExecutor, IacVars, LinkHandler, ModuleSource, ModuleValidator,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Records every network create/delete call; never fails.
#[derive(Clone, Default)]
pub struct FakeContainerManager {
    pub networks: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl ContainerManager for FakeContainerManager {
    async fn create_network(&self, name: &str) -> Result<(), AdapterError> {
        self.networks.lock().push(name.to_string());
        Ok(())
    }

    async fn delete_network(&self, name: &str) -> Result<(), AdapterError> {
        self.networks.lock().retain(|n| n != name);
        Ok(())
    }
}

/// Configurable IaC stand-in: callers preload which module ids should fail
/// `apply`, and what output shape a successful `apply` should return.
#[derive(Clone)]
pub struct FakeIacExecutor {
    fail_modules: Arc<Mutex<HashMap<String, String>>>,
    calls: Arc<Mutex<Vec<(&'static str, String)>>>,
}

impl Default for FakeIacExecutor {
    fn default() -> Self {
        Self { fail_modules: Arc::new(Mutex::new(HashMap::new())), calls: Arc::new(Mutex::new(Vec::new())) }
    }
}

impl FakeIacExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_apply_for(&self, module_id: impl Into<String>, message: impl Into<String>) {
        self.fail_modules.lock().insert(module_id.into(), message.into());
    }

    pub fn calls(&self) -> Vec<(&'static str, String)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl IacExecutor for FakeIacExecutor {
    async fn init(&self, vars: &IacVars) -> Result<(), AdapterError> {
        self.calls.lock().push(("init", vars.module_id.clone()));
        Ok(())
    }

    async fn apply(&self, vars: &IacVars) -> Result<Value, AdapterError> {
        self.calls.lock().push(("apply", vars.module_id.clone()));
        if let Some(message) = self.fail_modules.lock().get(&vars.module_id) {
            return Err(AdapterError::Iac(message.clone()));
        }
        Ok(json!({
            "main": { "module_id": vars.module_id },
            "web_ports": { "8080": 30080 },
        }))
    }

    async fn destroy(&self, vars: &IacVars) -> Result<(), AdapterError> {
        self.calls.lock().push(("destroy", vars.module_id.clone()));
        Ok(())
    }
}

/// Resolves every module to a deterministic commit-pinned source and every
/// bundle to a preloaded definition.
#[derive(Clone, Default)]
pub struct FakeCatalogStore {
    pub bundles: Arc<Mutex<HashMap<String, BundleDef>>>,
}

impl FakeCatalogStore {
    pub fn with_bundle(self, def: BundleDef) -> Self {
        self.bundles.lock().insert(def.id.clone(), def);
        self
    }
}

#[async_trait]
impl CatalogStore for FakeCatalogStore {
    async fn resolve_module_source(&self, module_name: &str) -> Result<ModuleSource, AdapterError> {
        Ok(ModuleSource::PinnedGit {
            url: format!("https://catalog.example/{module_name}.git"),
            commit_sha: "a".repeat(40),
        })
    }

    async fn fetch_bundle(&self, bundle_name: &str) -> Result<BundleDef, AdapterError> {
        self.bundles
            .lock()
            .get(bundle_name)
            .cloned()
            .ok_or_else(|| AdapterError::Catalog(format!("unknown bundle '{bundle_name}'")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedComponentStatus {
    pub bundle_id: String,
    pub component_job_id: String,
    pub status: String,
    pub message: Option<String>,
}

#[derive(Clone, Default)]
pub struct FakeBundleStore {
    pub component_statuses: Arc<Mutex<Vec<RecordedComponentStatus>>>,
    pub completions: Arc<Mutex<Vec<(String, bool)>>>,
    pub deletions: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl BundleStore for FakeBundleStore {
    async fn record_component_status(
        &self,
        bundle_id: &str,
        component_job_id: &str,
        status: &str,
        message: Option<&str>,
    ) -> Result<(), AdapterError> {
        self.component_statuses.lock().push(RecordedComponentStatus {
            bundle_id: bundle_id.to_string(),
            component_job_id: component_job_id.to_string(),
            status: status.to_string(),
            message: message.map(str::to_string),
        });
        Ok(())
    }

    async fn complete_bundle_installation(&self, bundle_id: &str, success: bool) -> Result<(), AdapterError> {
        self.completions.lock().push((bundle_id.to_string(), success));
        Ok(())
    }

    async fn delete_bundle(&self, bundle_id: &str) -> Result<(), AdapterError> {
        self.deletions.lock().push(bundle_id.to_string());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct FakeLinkHandler {
    pub created: Arc<Mutex<Vec<String>>>,
    pub deleted: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl LinkHandler for FakeLinkHandler {
    async fn create_link(&self, link_id: &str, bindings: &Value) -> Result<Value, AdapterError> {
        self.created.lock().push(link_id.to_string());
        Ok(json!({ "link_id": link_id, "bindings": bindings, "status": "created" }))
    }

    async fn delete_link(&self, link_id: &str) -> Result<Value, AdapterError> {
        self.deleted.lock().push(link_id.to_string());
        Ok(json!({ "link_id": link_id, "status": "deleted" }))
    }
}

#[derive(Clone, Default)]
pub struct FakeExposureHandler {
    pub created: Arc<Mutex<Vec<String>>>,
    pub deleted: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl ExposureHandler for FakeExposureHandler {
    async fn create_exposure(&self, spec: &ExposureSpec) -> Result<Value, AdapterError> {
        self.created.lock().push(spec.exposure_id.clone());
        Ok(json!({
            "exposure_id": spec.exposure_id,
            "module_id": spec.module_id,
            "protocol": spec.protocol,
            "hostname": spec.hostname,
            "container_port": spec.container_port,
            "tags": spec.tags,
            "status": "created",
        }))
    }

    async fn delete_exposure(&self, exposure_id: &str) -> Result<Value, AdapterError> {
        self.deleted.lock().push(exposure_id.to_string());
        Ok(json!({ "exposure_id": exposure_id, "status": "deleted" }))
    }
}

/// Always passes, unless the path has been preloaded as invalid.
#[derive(Clone, Default)]
pub struct FakeModuleValidator {
    pub invalid_paths: Arc<Mutex<Vec<String>>>,
}

impl FakeModuleValidator {
    pub fn reject(&self, path: impl Into<String>) {
        self.invalid_paths.lock().push(path.into());
    }
}

#[async_trait]
impl ModuleValidator for FakeModuleValidator {
    async fn validate(&self, module_path: &str) -> Result<(), AdapterError> {
        if self.invalid_paths.lock().iter().any(|p| p == module_path) {
            return Err(AdapterError::Validation(format!("module at '{module_path}' failed validation")));
        }
        Ok(())
    }
}

/// Always reports a fixed architecture; no real host probing.
#[derive(Clone)]
pub struct FakeArchDetector {
    pub info: ArchInfo,
}

impl Default for FakeArchDetector {
    fn default() -> Self {
        Self { info: ArchInfo { arch: "amd64".to_string(), accelerator: None } }
    }
}

#[async_trait]
impl ArchDetector for FakeArchDetector {
    async fn detect(&self) -> Result<ArchInfo, AdapterError> {
        Ok(self.info.clone())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
