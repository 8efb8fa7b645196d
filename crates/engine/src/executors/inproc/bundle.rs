// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bundle_install` / `bundle_uninstall` meta-jobs (spec.md §4.F). Both are
//! dispatched only once every job in their `depends_on` list is terminal;
//! the Worker reads each dependency's final `(status, error)` and injects it
//! into the `args` it passes here under the reserved `__components` key (an
//! array of `{job_id, status, error}`), since the `Executor` trait itself
//! has no view of the job graph. Neither job ever returns `pending`.

use crate::dispatch::{ExecutionResult, Executor, ExecutorContext, ProgressSink};
use hcagent_core::{ArgMap, Metadata};
use async_trait::async_trait;
use serde_json::{json, Value};

/// One entry of the Worker-injected `__components` array.
struct ComponentOutcome {
    job_id: String,
    status: String,
    error: Option<String>,
}

fn read_components(args: &ArgMap) -> Result<Vec<ComponentOutcome>, String> {
    let raw = args.get("__components").ok_or("missing injected '__components' list")?;
    let arr = raw.as_array().ok_or("'__components' must be an array")?;
    arr.iter()
        .map(|entry| {
            let obj = entry.as_object().ok_or("'__components' entries must be objects")?;
            let job_id = obj
                .get("job_id")
                .and_then(Value::as_str)
                .ok_or("'__components' entry missing 'job_id'")?
                .to_string();
            let status = obj
                .get("status")
                .and_then(Value::as_str)
                .ok_or("'__components' entry missing 'status'")?
                .to_string();
            let error = obj.get("error").and_then(Value::as_str).map(str::to_string);
            Ok(ComponentOutcome { job_id, status, error })
        })
        .collect()
}

pub struct BundleInstallExecutor;

#[async_trait]
impl Executor for BundleInstallExecutor {
    async fn execute(
        &self,
        ctx: &ExecutorContext,
        args: &ArgMap,
        metadata: Metadata,
        progress: &ProgressSink,
    ) -> ExecutionResult {
        let bundle_id = match args.get_str("bundle_id") {
            Ok(v) => v.to_string(),
            Err(e) => return ExecutionResult::failed(e.to_string(), metadata),
        };
        let components = match read_components(args) {
            Ok(c) => c,
            Err(e) => return ExecutionResult::failed(e, metadata),
        };

        progress.step("recording component outcomes");
        let mut all_completed = true;
        for component in &components {
            if component.status != "completed" {
                all_completed = false;
            }
            if let Err(e) = ctx
                .bundle_store
                .record_component_status(
                    &bundle_id,
                    &component.job_id,
                    &component.status,
                    component.error.as_deref(),
                )
                .await
            {
                return ExecutionResult::failed(e.to_string(), metadata);
            }
        }

        progress.step("completing bundle installation");
        if let Err(e) = ctx.bundle_store.complete_bundle_installation(&bundle_id, all_completed).await {
            return ExecutionResult::failed(e.to_string(), metadata);
        }

        ExecutionResult::completed(json!({ "bundle_id": bundle_id, "success": all_completed }), metadata)
    }
}

pub struct BundleUninstallExecutor;

#[async_trait]
impl Executor for BundleUninstallExecutor {
    async fn execute(
        &self,
        ctx: &ExecutorContext,
        args: &ArgMap,
        metadata: Metadata,
        progress: &ProgressSink,
    ) -> ExecutionResult {
        let bundle_id = match args.get_str("bundle_id") {
            Ok(v) => v.to_string(),
            Err(e) => return ExecutionResult::failed(e.to_string(), metadata),
        };
        let components = match read_components(args) {
            Ok(c) => c,
            Err(e) => return ExecutionResult::failed(e, metadata),
        };

        progress.step("recording component outcomes");
        for component in &components {
            if let Err(e) = ctx
                .bundle_store
                .record_component_status(
                    &bundle_id,
                    &component.job_id,
                    &component.status,
                    component.error.as_deref(),
                )
                .await
            {
                return ExecutionResult::failed(e.to_string(), metadata);
            }
        }

        progress.step("deleting bundle");
        if let Err(e) = ctx.bundle_store.delete_bundle(&bundle_id).await {
            return ExecutionResult::failed(e.to_string(), metadata);
        }

        ExecutionResult::completed(json!({ "bundle_id": bundle_id }), metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_context;
    use tempfile::tempdir;

    fn args_with_components(bundle_id: &str, components: Value) -> ArgMap {
        let mut a = ArgMap::new();
        a.insert("bundle_id", json!(bundle_id));
        a.insert("__components", components);
        a
    }

    #[tokio::test]
    async fn install_fails_without_injected_components() {
        let dir = tempdir().expect("tempdir");
        let ctx = test_context(dir.path());
        let mut args = ArgMap::new();
        args.insert("bundle_id", json!("b1"));

        let result =
            BundleInstallExecutor.execute(&ctx, &args, Metadata::new(), &ProgressSink::noop()).await;
        assert_eq!(result.status, hcagent_core::JobStatus::Failed);
    }

    #[tokio::test]
    async fn install_succeeds_when_all_components_completed() {
        let dir = tempdir().expect("tempdir");
        let ctx = test_context(dir.path());
        let args = args_with_components(
            "b1",
            json!([
                {"job_id": "j1", "status": "completed"},
                {"job_id": "j2", "status": "completed"},
            ]),
        );

        let result =
            BundleInstallExecutor.execute(&ctx, &args, Metadata::new(), &ProgressSink::noop()).await;
        assert_eq!(result.status, hcagent_core::JobStatus::Completed);
        assert_eq!(result.result.unwrap()["success"], json!(true));
    }

    #[tokio::test]
    async fn install_reports_failure_when_a_component_failed() {
        let dir = tempdir().expect("tempdir");
        let ctx = test_context(dir.path());
        let args = args_with_components(
            "b1",
            json!([
                {"job_id": "j1", "status": "completed"},
                {"job_id": "j2", "status": "failed", "error": "boom"},
            ]),
        );

        let result =
            BundleInstallExecutor.execute(&ctx, &args, Metadata::new(), &ProgressSink::noop()).await;
        assert_eq!(result.status, hcagent_core::JobStatus::Completed);
        assert_eq!(result.result.unwrap()["success"], json!(false));
    }

    #[tokio::test]
    async fn uninstall_deletes_the_bundle() {
        let dir = tempdir().expect("tempdir");
        let ctx = test_context(dir.path());
        let args = args_with_components("b1", json!([{"job_id": "j1", "status": "completed"}]));

        let result =
            BundleUninstallExecutor.execute(&ctx, &args, Metadata::new(), &ProgressSink::noop()).await;
        assert_eq!(result.status, hcagent_core::JobStatus::Completed);
    }
}
