// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `uninstall_module` (spec.md §4.F): `Destroy` with the same variable
//! shape `Apply` used, remove the network, remove the module directory.

use super::module_network_name;
use crate::dispatch::{ExecutionResult, Executor, ExecutorContext, ProgressSink};
use hcagent_adapters::IacVars;
use hcagent_core::{ArgMap, Metadata};
use async_trait::async_trait;
use serde_json::json;

pub struct UninstallModuleExecutor;

#[async_trait]
impl Executor for UninstallModuleExecutor {
    async fn execute(
        &self,
        ctx: &ExecutorContext,
        args: &ArgMap,
        metadata: Metadata,
        progress: &ProgressSink,
    ) -> ExecutionResult {
        let id = match args.get_str("id") {
            Ok(v) => v.to_string(),
            Err(e) => return ExecutionResult::failed(e.to_string(), metadata),
        };

        let module_dir = ctx.modules_root.join(&id);
        let module_path = module_dir.to_string_lossy().into_owned();
        let network_name = module_network_name(&id);

        let arch_info = match ctx.arch_detector.detect().await {
            Ok(info) => info,
            Err(e) => return ExecutionResult::failed(e.to_string(), metadata),
        };
        let vars = IacVars {
            module_id: id.clone(),
            module_path: module_path.clone(),
            network_name: network_name.clone(),
            arch: arch_info.arch,
            accelerator: arch_info.accelerator,
        };

        progress.step("destroying");
        if let Err(e) = ctx.iac_executor.destroy(&vars).await {
            return ExecutionResult::failed(e.to_string(), metadata);
        }

        progress.step("network");
        if let Err(e) = ctx.container_manager.delete_network(&network_name).await {
            return ExecutionResult::failed(e.to_string(), metadata);
        }

        if module_dir.exists() {
            if let Err(e) = std::fs::remove_dir_all(&module_dir) {
                return ExecutionResult::failed(format!("failed to remove module dir: {e}"), metadata);
            }
        }

        progress.step("complete");
        ExecutionResult::completed(json!({ "id": id }), metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_context;
    use serde_json::json as j;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_module_id_is_a_terminal_failure() {
        let dir = tempdir().expect("tempdir");
        let ctx = test_context(dir.path());
        let args = ArgMap::new();

        let result =
            UninstallModuleExecutor.execute(&ctx, &args, Metadata::new(), &ProgressSink::noop()).await;
        assert_eq!(result.status, hcagent_core::JobStatus::Failed);
    }

    #[tokio::test]
    async fn removes_the_module_directory_when_present() {
        let dir = tempdir().expect("tempdir");
        let ctx = test_context(dir.path());
        let module_dir = ctx.modules_root.join("m1");
        std::fs::create_dir_all(&module_dir).expect("mkdir");

        let mut args = ArgMap::new();
        args.insert("id", j!("m1"));
        let result =
            UninstallModuleExecutor.execute(&ctx, &args, Metadata::new(), &ProgressSink::noop()).await;
        assert_eq!(result.status, hcagent_core::JobStatus::Completed);
        assert!(!module_dir.exists());
    }
}
