// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `add_path` / `delete_path` executors (spec.md §4.G). Path ids are
//! `path_<mount-id>_<path-suffix>` with non-word characters replaced by
//! `_`; the suffix itself is validated at enqueue time by `hca`'s CLI
//! command layer and re-validated here defensively since the executor is
//! the last line of defense against a malformed argument reaching the
//! staged INI file.

use super::sanitize::{sanitize_mount_id, sanitize_path_id, validate_path_suffix};
use super::{args_to_ini_pairs, check_active_create, check_active_release, write_pending_create, write_pending_removal, Phase};
use crate::bootcfg::ResourceKind;
use crate::dispatch::{ExecutionResult, Executor, ExecutorContext, ProgressSink};
use async_trait::async_trait;
use hcagent_core::{ArgMap, Metadata};

fn resolve_path_id(args: &ArgMap) -> Result<String, String> {
    let mount_path = args.get_str("mount_path").map_err(|e| e.to_string())?;
    let suffix = args.get_str("path").map_err(|e| e.to_string())?;
    validate_path_suffix(suffix).map_err(|e| e.to_string())?;
    let mount_id = sanitize_mount_id(mount_path).map_err(|e| e.to_string())?;
    Ok(sanitize_path_id(&mount_id, suffix))
}

pub struct CreatePathExecutor;

#[async_trait]
impl Executor for CreatePathExecutor {
    async fn execute(
        &self,
        ctx: &ExecutorContext,
        args: &ArgMap,
        metadata: Metadata,
        progress: &ProgressSink,
    ) -> ExecutionResult {
        let sanitized = match resolve_path_id(args) {
            Ok(id) => id,
            Err(e) => return ExecutionResult::failed(e, metadata),
        };

        match Phase::from_metadata(&metadata) {
            Phase::WritePending => {
                let pairs = args_to_ini_pairs(args, &["mount_path", "path", "tags"]);
                write_pending_create(ResourceKind::Path, ctx, &sanitized, &pairs, metadata, progress)
            }
            // Path create participates in the error-status check (§4.G).
            Phase::CheckActive => check_active_create(ResourceKind::Path, ctx, metadata, true),
        }
    }
}

pub struct DeletePathExecutor;

#[async_trait]
impl Executor for DeletePathExecutor {
    async fn execute(
        &self,
        ctx: &ExecutorContext,
        args: &ArgMap,
        metadata: Metadata,
        progress: &ProgressSink,
    ) -> ExecutionResult {
        let sanitized = match resolve_path_id(args) {
            Ok(id) => id,
            Err(e) => return ExecutionResult::failed(e, metadata),
        };

        match Phase::from_metadata(&metadata) {
            Phase::WritePending => write_pending_removal(ResourceKind::Path, ctx, &sanitized, metadata, progress),
            Phase::CheckActive => check_active_release(ResourceKind::Path, ctx, metadata),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_context;
    use serde_json::json;
    use tempfile::tempdir;

    fn args(mount_path: &str, path: &str) -> ArgMap {
        let mut a = ArgMap::new();
        a.insert("mount_path", json!(mount_path));
        a.insert("path", json!(path));
        a
    }

    #[tokio::test]
    async fn create_path_rejects_dot_dot_segment() {
        let dir = tempdir().expect("tempdir");
        let ctx = test_context(dir.path());
        let a = args("/data", "logs/../../etc");

        let result = CreatePathExecutor.execute(&ctx, &a, Metadata::new(), &ProgressSink::noop()).await;
        assert_eq!(result.status, hcagent_core::JobStatus::Failed);
    }

    #[tokio::test]
    async fn create_path_writes_sanitized_section_name() {
        let dir = tempdir().expect("tempdir");
        let ctx = test_context(dir.path());
        let a = args("/data", "logs/app.log");

        let result = CreatePathExecutor.execute(&ctx, &a, Metadata::new(), &ProgressSink::noop()).await;
        assert_eq!(result.status, hcagent_core::JobStatus::Pending);
        let contents =
            std::fs::read_to_string(ctx.sysconfdir.join("paths.pending.ini")).expect("read pending");
        assert!(contents.contains("[path_mnt_data_logs_app_log]"));
    }

    #[tokio::test]
    async fn delete_path_completes_once_removed_from_active() {
        let dir = tempdir().expect("tempdir");
        let ctx = test_context(dir.path());
        std::fs::write(
            ctx.sysconfdir.join("paths.ini"),
            "[path_mnt_data_logs_app_log]\nstatus=ok\n",
        )
        .expect("seed active");
        let a = args("/data", "logs/app.log");

        let first = DeletePathExecutor.execute(&ctx, &a, Metadata::new(), &ProgressSink::noop()).await;
        assert_eq!(first.status, hcagent_core::JobStatus::Pending);

        std::fs::write(ctx.sysconfdir.join("paths.ini"), "").expect("clear active");
        let done = DeletePathExecutor.execute(&ctx, &a, first.metadata, &ProgressSink::noop()).await;
        assert_eq!(done.status, hcagent_core::JobStatus::Completed);
    }
}
