// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `create_mount` / `delete_mount` executors (spec.md §4.G). Mount ids are
//! derived from the mount path: leading `/` dropped, remaining `/` become
//! `_`, prefixed with `mnt_`; the bare root mount is rejected.

use super::sanitize::sanitize_mount_id;
use super::{args_to_ini_pairs, check_active_create, check_active_release, write_pending_create, write_pending_removal, Phase};
use crate::bootcfg::ResourceKind;
use crate::dispatch::{ExecutionResult, Executor, ExecutorContext, ProgressSink};
use async_trait::async_trait;
use hcagent_core::{ArgMap, Metadata};

pub struct CreateMountExecutor;

#[async_trait]
impl Executor for CreateMountExecutor {
    async fn execute(
        &self,
        ctx: &ExecutorContext,
        args: &ArgMap,
        metadata: Metadata,
        progress: &ProgressSink,
    ) -> ExecutionResult {
        let mount_path = match args.get_str("mount_path") {
            Ok(p) => p.to_string(),
            Err(e) => return ExecutionResult::failed(e.to_string(), metadata),
        };
        let sanitized = match sanitize_mount_id(&mount_path) {
            Ok(id) => id,
            Err(e) => return ExecutionResult::failed(e.to_string(), metadata),
        };

        match Phase::from_metadata(&metadata) {
            Phase::WritePending => {
                let pairs = args_to_ini_pairs(args, &["mount_path", "tags"]);
                write_pending_create(ResourceKind::Mount, ctx, &sanitized, &pairs, metadata, progress)
            }
            // Mount create participates in the error-status check (§4.G).
            Phase::CheckActive => check_active_create(ResourceKind::Mount, ctx, metadata, true),
        }
    }
}

pub struct DeleteMountExecutor;

#[async_trait]
impl Executor for DeleteMountExecutor {
    async fn execute(
        &self,
        ctx: &ExecutorContext,
        args: &ArgMap,
        metadata: Metadata,
        progress: &ProgressSink,
    ) -> ExecutionResult {
        let mount_path = match args.get_str("mount_path") {
            Ok(p) => p.to_string(),
            Err(e) => return ExecutionResult::failed(e.to_string(), metadata),
        };
        let sanitized = match sanitize_mount_id(&mount_path) {
            Ok(id) => id,
            Err(e) => return ExecutionResult::failed(e.to_string(), metadata),
        };

        match Phase::from_metadata(&metadata) {
            Phase::WritePending => write_pending_removal(ResourceKind::Mount, ctx, &sanitized, metadata, progress),
            Phase::CheckActive => check_active_release(ResourceKind::Mount, ctx, metadata),
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
    async fn create_mount_rejects_bare_root() {
        let dir = tempdir().expect("tempdir");
        let ctx = test_context(dir.path());
        let mut args = ArgMap::new();
        args.insert("mount_path", json!("/"));

        let result =
            CreateMountExecutor.execute(&ctx, &args, Metadata::new(), &ProgressSink::noop()).await;
        assert_eq!(result.status, hcagent_core::JobStatus::Failed);
    }

    #[tokio::test]
    async fn create_mount_sanitizes_path_into_section_name() {
        let dir = tempdir().expect("tempdir");
        let ctx = test_context(dir.path());
        let mut args = ArgMap::new();
        args.insert("mount_path", json!("/data/archive"));

        let result =
            CreateMountExecutor.execute(&ctx, &args, Metadata::new(), &ProgressSink::noop()).await;
        assert_eq!(result.status, hcagent_core::JobStatus::Pending);
        let contents =
            std::fs::read_to_string(ctx.sysconfdir.join("mounts.pending.ini")).expect("read pending");
        assert!(contents.contains("[mnt_data_archive]"));
    }

    #[tokio::test]
    async fn create_mount_fails_on_active_error_status_with_embedded_message() {
        let dir = tempdir().expect("tempdir");
        let ctx = test_context(dir.path());
        let mut args = ArgMap::new();
        args.insert("mount_path", json!("/data"));

        let first =
            CreateMountExecutor.execute(&ctx, &args, Metadata::new(), &ProgressSink::noop()).await;

        std::fs::write(
            ctx.sysconfdir.join("mounts.ini"),
            "[mnt_data]\nstatus=error\nmessage=device busy\n",
        )
        .expect("write active");

        let second =
            CreateMountExecutor.execute(&ctx, &args, first.metadata, &ProgressSink::noop()).await;
        assert_eq!(second.status, hcagent_core::JobStatus::Failed);
        assert_eq!(second.error.as_deref(), Some("device busy"));
    }
}
