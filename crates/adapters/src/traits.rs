// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Narrow trait contracts for every external collaborator the core
//! orchestrator does not own: the container-manager daemon, the IaC
//! executor binary, the catalog store, the bundle store, the link and
//! exposure handlers, the module validator, and host architecture
//! detection.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("container manager: {0}")]
    Container(String),
    #[error("iac executor: {0}")]
    Iac(String),
    #[error("catalog store: {0}")]
    Catalog(String),
    #[error("bundle store: {0}")]
    BundleStore(String),
    #[error("link handler: {0}")]
    Link(String),
    #[error("exposure handler: {0}")]
    Exposure(String),
    #[error("module validator: {0}")]
    Validation(String),
    #[error("architecture detection: {0}")]
    ArchDetect(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Creates and removes the private bridge network a module's containers
/// join (one per installed module, named `<product>-module-<id>`).
#[async_trait]
pub trait ContainerManager: Send + Sync {
    async fn create_network(&self, name: &str) -> Result<(), AdapterError>;
    async fn delete_network(&self, name: &str) -> Result<(), AdapterError>;
}

/// The fixed input-variable shape passed to every IaC invocation.
#[derive(Debug, Clone)]
pub struct IacVars {
    pub module_id: String,
    pub module_path: String,
    pub network_name: String,
    pub arch: String,
    pub accelerator: Option<String>,
}

impl IacVars {
    /// Renders the variables as a string-keyed map suitable for a `-var`
    /// style invocation of the IaC binary.
    pub fn as_map(&self) -> HashMap<String, String> {
        let mut m = HashMap::new();
        m.insert("module_id".to_string(), self.module_id.clone());
        m.insert("module_path".to_string(), self.module_path.clone());
        m.insert("network_name".to_string(), self.network_name.clone());
        m.insert("arch".to_string(), self.arch.clone());
        if let Some(acc) = &self.accelerator {
            m.insert("accelerator".to_string(), acc.clone());
        }
        m
    }
}

/// Wraps the subprocess (or fake) IaC tool: `Init`, `Apply`, `Destroy`.
#[async_trait]
pub trait IacExecutor: Send + Sync {
    async fn init(&self, vars: &IacVars) -> Result<(), AdapterError>;
    async fn apply(&self, vars: &IacVars) -> Result<Value, AdapterError>;
    async fn destroy(&self, vars: &IacVars) -> Result<(), AdapterError>;
}

/// A module's resolved install source: either a commit-pinned git url or a
/// local filesystem path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleSource {
    PinnedGit { url: String, commit_sha: String },
    LocalPath(String),
}

#[derive(Debug, Clone)]
pub struct BundleDef {
    pub id: String,
    pub modules: Vec<String>,
    pub links: HashMap<String, Value>,
    pub exposures: HashMap<String, Value>,
}

/// Resolves module and bundle definitions by name (the external catalog
/// git fetcher lives outside this repo).
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn resolve_module_source(&self, module_name: &str) -> Result<ModuleSource, AdapterError>;
    async fn fetch_bundle(&self, bundle_name: &str) -> Result<BundleDef, AdapterError>;
}

/// Records bundle meta-job outcomes in the catalog's persistent bundle
/// record.
#[async_trait]
pub trait BundleStore: Send + Sync {
    async fn record_component_status(
        &self,
        bundle_id: &str,
        component_job_id: &str,
        status: &str,
        message: Option<&str>,
    ) -> Result<(), AdapterError>;

    async fn complete_bundle_installation(&self, bundle_id: &str, success: bool) -> Result<(), AdapterError>;

    async fn delete_bundle(&self, bundle_id: &str) -> Result<(), AdapterError>;
}

/// Creates and removes container-to-container links.
#[async_trait]
pub trait LinkHandler: Send + Sync {
    async fn create_link(&self, link_id: &str, bindings: &Value) -> Result<Value, AdapterError>;
    async fn delete_link(&self, link_id: &str) -> Result<Value, AdapterError>;
}

#[derive(Debug, Clone)]
pub struct ExposureSpec {
    pub exposure_id: String,
    pub module_id: String,
    pub protocol: String,
    pub hostname: Option<String>,
    pub container_port: i64,
    pub tags: Vec<String>,
}

/// Creates and removes network exposures (e.g. reverse-proxy routes) for a
/// module's container port.
#[async_trait]
pub trait ExposureHandler: Send + Sync {
    async fn create_exposure(&self, spec: &ExposureSpec) -> Result<Value, AdapterError>;
    async fn delete_exposure(&self, exposure_id: &str) -> Result<Value, AdapterError>;
}

/// Validates a cloned module's conformance before it is wired up.
#[async_trait]
pub trait ModuleValidator: Send + Sync {
    async fn validate(&self, module_path: &str) -> Result<(), AdapterError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchInfo {
    pub arch: String,
    pub accelerator: Option<String>,
}

/// Detects the host's CPU architecture and any accelerator vendor
/// (e.g. a GPU) relevant to module scheduling.
#[async_trait]
pub trait ArchDetector: Send + Sync {
    async fn detect(&self) -> Result<ArchInfo, AdapterError>;
}
