// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Executor` contract, the ambient ports every executor receives, and
//! the pure map from [`CommandKind`] to the executor that handles it.

use crate::executors::boot::{CreateMountExecutor, DeleteMountExecutor, ManageDiskExecutor, ReleaseDiskExecutor};
use crate::executors::boot::{CreatePathExecutor, DeletePathExecutor};
use crate::executors::inproc::{
    BundleInstallExecutor, BundleUninstallExecutor, CreateExposureExecutor, CreateLinkExecutor,
    DeleteExposureExecutor, DeleteLinkExecutor, InstallModuleExecutor, UninstallModuleExecutor,
};
use async_trait::async_trait;
use hcagent_adapters::{
    ArchDetector, BundleStore, CatalogStore, ContainerManager, ExposureHandler, IacExecutor, LinkHandler,
    ModuleValidator,
};
use hcagent_core::{ArgMap, CommandKind, EventKind, JobStatus, Metadata};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

/// The ambient handles every executor may reach for. Cloned cheaply — every
/// field is an `Arc`.
#[derive(Clone)]
pub struct ExecutorContext {
    pub container_manager: Arc<dyn ContainerManager>,
    pub iac_executor: Arc<dyn IacExecutor>,
    pub catalog_store: Arc<dyn CatalogStore>,
    pub bundle_store: Arc<dyn BundleStore>,
    pub link_handler: Arc<dyn LinkHandler>,
    pub exposure_handler: Arc<dyn ExposureHandler>,
    pub module_validator: Arc<dyn ModuleValidator>,
    pub arch_detector: Arc<dyn ArchDetector>,
    pub modules_root: PathBuf,
    pub sysconfdir: PathBuf,
    /// Wall-clock reader for executors that need to stamp a real time (e.g.
    /// `install_module`'s install manifest). `Clock` itself can't be stored
    /// as a trait object (it requires `Clone`), so the Worker/CLI hand in a
    /// closure over their own clock instead.
    pub now_epoch_ms: Arc<dyn Fn() -> u64 + Send + Sync>,
}

/// What an executor invocation settles to. `status` drives the transition
/// the Worker applies; boot-scoped executors return `Pending` to request a
/// later re-poll without ever entering `Running` again.
pub struct ExecutionResult {
    pub status: JobStatus,
    pub result: Option<Value>,
    pub error: Option<String>,
    pub metadata: Metadata,
}

impl ExecutionResult {
    pub fn completed(result: Value, metadata: Metadata) -> Self {
        Self { status: JobStatus::Completed, result: Some(result), error: None, metadata }
    }

    pub fn failed(message: impl Into<String>, metadata: Metadata) -> Self {
        Self { status: JobStatus::Failed, result: None, error: Some(message.into()), metadata }
    }

    pub fn pending(metadata: Metadata) -> Self {
        Self { status: JobStatus::Pending, result: None, error: None, metadata }
    }
}

/// Streams progress events back to the job's event log. The worker binds
/// one instance per invocation, closing over the job id.
pub struct ProgressSink {
    emit: Box<dyn Fn(EventKind, String, Option<Value>) + Send + Sync>,
}

impl ProgressSink {
    pub fn new(emit: impl Fn(EventKind, String, Option<Value>) + Send + Sync + 'static) -> Self {
        Self { emit: Box::new(emit) }
    }

    pub fn info(&self, message: impl Into<String>) {
        (self.emit)(EventKind::Info, message.into(), None);
    }

    pub fn step(&self, message: impl Into<String>) {
        (self.emit)(EventKind::Step, message.into(), None);
    }

    pub fn step_with_data(&self, message: impl Into<String>, data: Value) {
        (self.emit)(EventKind::Step, message.into(), Some(data));
    }

    pub fn warning(&self, message: impl Into<String>) {
        (self.emit)(EventKind::Warning, message.into(), None);
    }

    #[cfg(test)]
    pub fn noop() -> Self {
        Self::new(|_, _, _| {})
    }
}

#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(
        &self,
        ctx: &ExecutorContext,
        args: &ArgMap,
        metadata: Metadata,
        progress: &ProgressSink,
    ) -> ExecutionResult;
}

/// Maps a command kind to the executor that handles it. `CommandKind` is a
/// closed enum, so every arm is exhaustive at the type level; the dispatcher
/// never interprets arguments itself.
pub fn dispatch(kind: CommandKind) -> Box<dyn Executor> {
    match kind {
        CommandKind::InstallModule => Box::new(InstallModuleExecutor),
        CommandKind::UninstallModule => Box::new(UninstallModuleExecutor),
        CommandKind::CreateLink => Box::new(CreateLinkExecutor),
        CommandKind::DeleteLink => Box::new(DeleteLinkExecutor),
        CommandKind::CreateExposure => Box::new(CreateExposureExecutor),
        CommandKind::DeleteExposure => Box::new(DeleteExposureExecutor),
        CommandKind::BundleInstall => Box::new(BundleInstallExecutor),
        CommandKind::BundleUninstall => Box::new(BundleUninstallExecutor),
        CommandKind::ManageDisk => Box::new(ManageDiskExecutor),
        CommandKind::ReleaseDisk => Box::new(ReleaseDiskExecutor),
        CommandKind::CreateMount => Box::new(CreateMountExecutor),
        CommandKind::DeleteMount => Box::new(DeleteMountExecutor),
        CommandKind::AddPath => Box::new(CreatePathExecutor),
        CommandKind::DeletePath => Box::new(DeletePathExecutor),
    }
}
