// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The boot-scoped executors: disk, mount, and path create/manage/delete/
//! release, each driving the shared two-phase staged/active INI state
//! machine defined here.

mod disk;
mod mount;
mod path;
pub mod sanitize;

pub use disk::{ManageDiskExecutor, ReleaseDiskExecutor};
pub use mount::{CreateMountExecutor, DeleteMountExecutor};
pub use path::{CreatePathExecutor, DeletePathExecutor};

use crate::bootcfg::{ActiveIni, PendingIni, ResourceKind};
use crate::dispatch::{ExecutionResult, ExecutorContext, ProgressSink};
use hcagent_core::{ArgMap, Metadata};
use serde_json::{json, Value};

const PHASE_KEY: &str = "phase";
const RESOURCE_ID_KEY: &str = "resource_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Phase {
    WritePending,
    CheckActive,
}

impl Phase {
    fn from_metadata(metadata: &Metadata) -> Self {
        match metadata.get(PHASE_KEY).and_then(|v| v.as_str()) {
            Some("check_active") => Phase::CheckActive,
            _ => Phase::WritePending,
        }
    }

    fn store(self, metadata: &mut Metadata) {
        let s = match self {
            Phase::WritePending => "write_pending",
            Phase::CheckActive => "check_active",
        };
        metadata.insert(PHASE_KEY.to_string(), json!(s));
    }
}

/// Serializes every command argument except the given keys into
/// string-valued INI pairs. Booleans and numbers become their string
/// representation; nested maps/arrays are serialized as a JSON string
/// (matching the `luks`/`lvm`-style nested fields named in the protocol).
pub(super) fn args_to_ini_pairs(args: &ArgMap, skip: &[&str]) -> Vec<(String, String)> {
    args.0
        .iter()
        .filter(|(k, _)| !skip.contains(&k.as_str()))
        .map(|(k, v)| {
            let s = match v {
                Value::String(s) => s.clone(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                other => other.to_string(),
            };
            (k.clone(), s)
        })
        .collect()
}

/// Phase 1 for a create/manage request: write a named section with the
/// resource's arguments, remember the sanitized id, and move to
/// `check_active`.
pub(super) fn write_pending_create(
    kind: ResourceKind,
    ctx: &ExecutorContext,
    sanitized_id: &str,
    pairs: &[(String, String)],
    mut metadata: Metadata,
    progress: &ProgressSink,
) -> ExecutionResult {
    let pending = PendingIni::new(kind, &ctx.sysconfdir);
    match pending.write_section(sanitized_id, pairs) {
        Ok(()) => {
            progress.step(format!("wrote pending section '{sanitized_id}'"));
            metadata.insert(RESOURCE_ID_KEY.to_string(), json!(sanitized_id));
            Phase::CheckActive.store(&mut metadata);
            ExecutionResult::pending(metadata)
        }
        Err(e) => ExecutionResult::failed(format!("failed to write pending section: {e}"), metadata),
    }
}

/// Phase 1 for a delete/release request: write a `!<id>` removal marker.
pub(super) fn write_pending_removal(
    kind: ResourceKind,
    ctx: &ExecutorContext,
    sanitized_id: &str,
    mut metadata: Metadata,
    progress: &ProgressSink,
) -> ExecutionResult {
    let pending = PendingIni::new(kind, &ctx.sysconfdir);
    match pending.write_removal(sanitized_id) {
        Ok(()) => {
            progress.step(format!("wrote removal marker for '{sanitized_id}'"));
            metadata.insert(RESOURCE_ID_KEY.to_string(), json!(sanitized_id));
            Phase::CheckActive.store(&mut metadata);
            ExecutionResult::pending(metadata)
        }
        Err(e) => ExecutionResult::failed(format!("failed to write removal marker: {e}"), metadata),
    }
}

fn resource_id_from_metadata(metadata: &Metadata) -> Option<String> {
    metadata.get(RESOURCE_ID_KEY).and_then(|v| v.as_str()).map(str::to_string)
}

/// Phase 2 for a create/manage request: success iff the sanitized id
/// appears in the active file. When `checks_error_status` is set (mount
/// and path create), a `status = error` entry is a terminal failure
/// carrying the embedded message instead of a stay-pending result.
pub(super) fn check_active_create(
    kind: ResourceKind,
    ctx: &ExecutorContext,
    metadata: Metadata,
    checks_error_status: bool,
) -> ExecutionResult {
    let Some(resource_id) = resource_id_from_metadata(&metadata) else {
        return ExecutionResult::failed("missing resource_id in metadata during check_active", metadata);
    };
    let active = match ActiveIni::load(kind, &ctx.sysconfdir) {
        Ok(a) => a,
        Err(_) => return ExecutionResult::pending(metadata), // transient read failure, keep re-polling
    };

    match active.lookup(&resource_id) {
        Some(section) if checks_error_status && section.status() == Some("error") => {
            let message = section.message().unwrap_or("boot service reported an error").to_string();
            ExecutionResult::failed(message, metadata)
        }
        Some(_) => ExecutionResult::completed(json!({ "resource_id": resource_id }), metadata),
        None => ExecutionResult::pending(metadata),
    }
}

/// Phase 2 for a delete/release request: success iff the id no longer
/// appears in the active file.
pub(super) fn check_active_release(
    kind: ResourceKind,
    ctx: &ExecutorContext,
    metadata: Metadata,
) -> ExecutionResult {
    let Some(resource_id) = resource_id_from_metadata(&metadata) else {
        return ExecutionResult::failed("missing resource_id in metadata during check_active", metadata);
    };
    let active = match ActiveIni::load(kind, &ctx.sysconfdir) {
        Ok(a) => a,
        Err(_) => return ExecutionResult::pending(metadata),
    };
    if active.contains(&resource_id) {
        ExecutionResult::pending(metadata)
    } else {
        ExecutionResult::completed(json!({ "resource_id": resource_id }), metadata)
    }
}
