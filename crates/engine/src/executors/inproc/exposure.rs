// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `create_exposure` / `delete_exposure` (spec.md §4.F): builds an
//! `ExposureSpec` from the job's arguments and delegates to the external
//! exposure handler.

use crate::dispatch::{ExecutionResult, Executor, ExecutorContext, ProgressSink};
use hcagent_adapters::ExposureSpec;
use hcagent_core::{ArgMap, Metadata};
use async_trait::async_trait;

fn build_spec(args: &ArgMap) -> Result<ExposureSpec, String> {
    let exposure_id = args.get_str("exposure_id").map_err(|e| e.to_string())?.to_string();
    let module_id = args.get_str("module_id").map_err(|e| e.to_string())?.to_string();
    let protocol = args.get_str("protocol").map_err(|e| e.to_string())?.to_string();
    let hostname = args.get_str_opt("hostname").map_err(|e| e.to_string())?.map(str::to_string);
    let container_port = args.get_i64("container_port").map_err(|e| e.to_string())?;
    let tags = args.get_str_vec("tags").unwrap_or_default();

    Ok(ExposureSpec { exposure_id, module_id, protocol, hostname, container_port, tags })
}

pub struct CreateExposureExecutor;

#[async_trait]
impl Executor for CreateExposureExecutor {
    async fn execute(
        &self,
        ctx: &ExecutorContext,
        args: &ArgMap,
        metadata: Metadata,
        progress: &ProgressSink,
    ) -> ExecutionResult {
        let spec = match build_spec(args) {
            Ok(s) => s,
            Err(e) => return ExecutionResult::failed(e, metadata),
        };

        progress.step("creating exposure");
        match ctx.exposure_handler.create_exposure(&spec).await {
            Ok(result) => ExecutionResult::completed(result, metadata),
            Err(e) => ExecutionResult::failed(e.to_string(), metadata),
        }
    }
}

pub struct DeleteExposureExecutor;

#[async_trait]
impl Executor for DeleteExposureExecutor {
    async fn execute(
        &self,
        ctx: &ExecutorContext,
        args: &ArgMap,
        metadata: Metadata,
        progress: &ProgressSink,
    ) -> ExecutionResult {
        let exposure_id = match args.get_str("exposure_id") {
            Ok(v) => v.to_string(),
            Err(e) => return ExecutionResult::failed(e.to_string(), metadata),
        };

        progress.step("deleting exposure");
        match ctx.exposure_handler.delete_exposure(&exposure_id).await {
            Ok(result) => ExecutionResult::completed(result, metadata),
            Err(e) => ExecutionResult::failed(e.to_string(), metadata),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_context;
    use serde_json::json;
    use tempfile::tempdir;

    fn create_args() -> ArgMap {
        let mut a = ArgMap::new();
        a.insert("exposure_id", json!("exp1"));
        a.insert("module_id", json!("m1"));
        a.insert("protocol", json!("https"));
        a.insert("hostname", json!("m1.example.com"));
        a.insert("container_port", json!(8080));
        a
    }

    #[tokio::test]
    async fn create_exposure_succeeds_with_valid_spec() {
        let dir = tempdir().expect("tempdir");
        let ctx = test_context(dir.path());
        let args = create_args();

        let result =
            CreateExposureExecutor.execute(&ctx, &args, Metadata::new(), &ProgressSink::noop()).await;
        assert_eq!(result.status, hcagent_core::JobStatus::Completed);
    }

    #[tokio::test]
    async fn create_exposure_requires_container_port() {
        let dir = tempdir().expect("tempdir");
        let ctx = test_context(dir.path());
        let mut args = create_args();
        args.0.remove("container_port");

        let result =
            CreateExposureExecutor.execute(&ctx, &args, Metadata::new(), &ProgressSink::noop()).await;
        assert_eq!(result.status, hcagent_core::JobStatus::Failed);
    }

    #[tokio::test]
    async fn delete_exposure_requires_exposure_id() {
        let dir = tempdir().expect("tempdir");
        let ctx = test_context(dir.path());
        let args = ArgMap::new();

        let result =
            DeleteExposureExecutor.execute(&ctx, &args, Metadata::new(), &ProgressSink::noop()).await;
        assert_eq!(result.status, hcagent_core::JobStatus::Failed);
    }
}
