// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `create_link` / `delete_link` (spec.md §4.F): delegates to the external
//! link handler; the result echoes the inputs with status `created` /
//! `deleted`.

use crate::dispatch::{ExecutionResult, Executor, ExecutorContext, ProgressSink};
use hcagent_core::{ArgMap, Metadata};
use async_trait::async_trait;
use serde_json::Value;

pub struct CreateLinkExecutor;

#[async_trait]
impl Executor for CreateLinkExecutor {
    async fn execute(
        &self,
        ctx: &ExecutorContext,
        args: &ArgMap,
        metadata: Metadata,
        progress: &ProgressSink,
    ) -> ExecutionResult {
        let link_id = match args.get_str("link_id") {
            Ok(v) => v.to_string(),
            Err(e) => return ExecutionResult::failed(e.to_string(), metadata),
        };
        let bindings = match args.get_object("bindings") {
            Ok(v) => Value::Object(v.clone()),
            Err(e) => return ExecutionResult::failed(e.to_string(), metadata),
        };

        progress.step("creating link");
        match ctx.link_handler.create_link(&link_id, &bindings).await {
            Ok(result) => ExecutionResult::completed(result, metadata),
            Err(e) => ExecutionResult::failed(e.to_string(), metadata),
        }
    }
}

pub struct DeleteLinkExecutor;

#[async_trait]
impl Executor for DeleteLinkExecutor {
    async fn execute(
        &self,
        ctx: &ExecutorContext,
        args: &ArgMap,
        metadata: Metadata,
        progress: &ProgressSink,
    ) -> ExecutionResult {
        let link_id = match args.get_str("link_id") {
            Ok(v) => v.to_string(),
            Err(e) => return ExecutionResult::failed(e.to_string(), metadata),
        };

        progress.step("deleting link");
        match ctx.link_handler.delete_link(&link_id).await {
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

    #[tokio::test]
    async fn create_link_echoes_status_created() {
        let dir = tempdir().expect("tempdir");
        let ctx = test_context(dir.path());
        let mut args = ArgMap::new();
        args.insert("link_id", json!("L1"));
        args.insert("bindings", json!({"m1": {"port": 8080}}));

        let result = CreateLinkExecutor.execute(&ctx, &args, Metadata::new(), &ProgressSink::noop()).await;
        assert_eq!(result.status, hcagent_core::JobStatus::Completed);
        assert_eq!(result.result.unwrap()["status"], json!("created"));
    }

    #[tokio::test]
    async fn delete_link_requires_link_id() {
        let dir = tempdir().expect("tempdir");
        let ctx = test_context(dir.path());
        let args = ArgMap::new();

        let result = DeleteLinkExecutor.execute(&ctx, &args, Metadata::new(), &ProgressSink::noop()).await;
        assert_eq!(result.status, hcagent_core::JobStatus::Failed);
    }
}
