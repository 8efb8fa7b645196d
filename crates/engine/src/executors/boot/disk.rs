// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `manage_disk` / `release_disk` executors (spec.md §4.G). Disk ids are
//! used verbatim as the INI section name — they are already a stable
//! device identifier supplied by the caller.

use super::sanitize::sanitize_disk_id;
use super::{args_to_ini_pairs, check_active_create, check_active_release, write_pending_create, write_pending_removal, Phase};
use crate::bootcfg::ResourceKind;
use crate::dispatch::{ExecutionResult, Executor, ExecutorContext, ProgressSink};
use async_trait::async_trait;
use hcagent_core::{ArgMap, Metadata};

pub struct ManageDiskExecutor;

#[async_trait]
impl Executor for ManageDiskExecutor {
    async fn execute(
        &self,
        ctx: &ExecutorContext,
        args: &ArgMap,
        metadata: Metadata,
        progress: &ProgressSink,
    ) -> ExecutionResult {
        let disk_id = match args.get_str("disk_id") {
            Ok(id) => id.to_string(),
            Err(e) => return ExecutionResult::failed(e.to_string(), metadata),
        };
        let sanitized = sanitize_disk_id(&disk_id);

        match Phase::from_metadata(&metadata) {
            Phase::WritePending => {
                let pairs = args_to_ini_pairs(args, &["disk_id", "tags"]);
                write_pending_create(ResourceKind::Disk, ctx, &sanitized, &pairs, metadata, progress)
            }
            Phase::CheckActive => check_active_create(ResourceKind::Disk, ctx, metadata, false),
        }
    }
}

pub struct ReleaseDiskExecutor;

#[async_trait]
impl Executor for ReleaseDiskExecutor {
    async fn execute(
        &self,
        ctx: &ExecutorContext,
        args: &ArgMap,
        metadata: Metadata,
        progress: &ProgressSink,
    ) -> ExecutionResult {
        let disk_id = match args.get_str("disk_id") {
            Ok(id) => id.to_string(),
            Err(e) => return ExecutionResult::failed(e.to_string(), metadata),
        };
        let sanitized = sanitize_disk_id(&disk_id);

        match Phase::from_metadata(&metadata) {
            Phase::WritePending => write_pending_removal(ResourceKind::Disk, ctx, &sanitized, metadata, progress),
            Phase::CheckActive => check_active_release(ResourceKind::Disk, ctx, metadata),
        }
    }
}
