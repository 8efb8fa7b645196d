// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hca enqueue <kind>` — one subcommand per `enqueue_*` endpoint named in
//! spec.md §6. Each builds the matching `hcagent-wire` request DTO, turns
//! it into a [`Command`], and hands it to the [`JobManager`] with its
//! `depends_on` list.

use crate::context::App;
use crate::output::{format_or_json, OutputFormat};
use clap::Subcommand;
use hcagent_core::{Command, CommandKind, JobId};
use hcagent_engine::executors::boot::sanitize::validate_path_suffix;
use hcagent_wire::requests::{
    EnqueueCreateExposure, EnqueueCreateLink, EnqueueCreateMount, EnqueueCreatePath,
    EnqueueDeleteExposure, EnqueueDeleteLink, EnqueueDeleteMount, EnqueueDeletePath,
    EnqueueInstallModule, EnqueueManageDisk, EnqueueReleaseDisk, EnqueueUninstallModule,
};
use serde_json::{json, Value};

fn parse_depends_on(ids: &[String]) -> Vec<JobId> {
    ids.iter().map(JobId::from_string).collect()
}

/// Parses `key=value` pairs into a JSON object, decoding the value as JSON
/// when it parses (so `--option count=3` yields a number) and falling back
/// to a plain string otherwise.
fn parse_options(pairs: &[String]) -> anyhow::Result<serde_json::Map<String, Value>> {
    let mut map = serde_json::Map::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("--option must be key=value, got {pair:?}"))?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| json!(raw));
        map.insert(key.to_string(), value);
    }
    Ok(map)
}

#[derive(Debug, clap::Args)]
pub struct DependsOn {
    /// Job this job depends on; repeat for multiple dependencies.
    #[arg(long = "depends-on")]
    pub depends_on: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum EnqueueCommand {
    /// Install a module from a pinned git source or a local path.
    InstallModule {
        id: String,
        source: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[command(flatten)]
        deps: DependsOn,
    },
    /// Uninstall a previously installed module.
    UninstallModule {
        id: String,
        #[command(flatten)]
        deps: DependsOn,
    },
    /// Create a link between modules.
    CreateLink {
        link_id: String,
        /// Module-id → bind configuration, as a JSON object.
        #[arg(long)]
        bindings: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[command(flatten)]
        deps: DependsOn,
    },
    /// Delete a link.
    DeleteLink {
        link_id: String,
        #[command(flatten)]
        deps: DependsOn,
    },
    /// Expose a module's port under a hostname.
    CreateExposure {
        exposure_id: String,
        module_id: String,
        protocol: String,
        #[arg(long)]
        hostname: Option<String>,
        #[arg(long)]
        container_port: i64,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[command(flatten)]
        deps: DependsOn,
    },
    /// Delete an exposure.
    DeleteExposure {
        exposure_id: String,
        #[command(flatten)]
        deps: DependsOn,
    },
    /// Bring a disk under management (boot-scoped).
    ManageDisk {
        disk_id: String,
        /// Extra staged-INI fields, `key=value`; repeat for multiple.
        #[arg(long = "option")]
        options: Vec<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[command(flatten)]
        deps: DependsOn,
    },
    /// Release a managed disk (boot-scoped).
    ReleaseDisk {
        disk_id: String,
        #[command(flatten)]
        deps: DependsOn,
    },
    /// Create a mount (boot-scoped).
    CreateMount {
        mount_path: String,
        #[arg(long = "option")]
        options: Vec<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[command(flatten)]
        deps: DependsOn,
    },
    /// Delete a mount (boot-scoped).
    DeleteMount {
        mount_path: String,
        #[command(flatten)]
        deps: DependsOn,
    },
    /// Create a path under a mount (boot-scoped).
    CreatePath {
        mount_path: String,
        path: String,
        #[arg(long = "option")]
        options: Vec<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[command(flatten)]
        deps: DependsOn,
    },
    /// Delete a path under a mount (boot-scoped).
    DeletePath {
        mount_path: String,
        path: String,
        #[command(flatten)]
        deps: DependsOn,
    },
}

pub fn run(app: &App, cmd: EnqueueCommand, format: OutputFormat) -> anyhow::Result<()> {
    let (kind, args, depends_on) = match cmd {
        EnqueueCommand::InstallModule { id, source, tags, deps } => {
            let req = EnqueueInstallModule { id, source, tags, depends_on: Vec::new() };
            (CommandKind::InstallModule, req.into_args(), deps.depends_on)
        }
        EnqueueCommand::UninstallModule { id, deps } => {
            let req = EnqueueUninstallModule { id, depends_on: Vec::new() };
            (CommandKind::UninstallModule, req.into_args(), deps.depends_on)
        }
        EnqueueCommand::CreateLink { link_id, bindings, tags, deps } => {
            let bindings: Value = serde_json::from_str(&bindings)
                .map_err(|e| anyhow::anyhow!("--bindings must be JSON: {e}"))?;
            let req = EnqueueCreateLink { link_id, bindings, tags, depends_on: Vec::new() };
            (CommandKind::CreateLink, req.into_args(), deps.depends_on)
        }
        EnqueueCommand::DeleteLink { link_id, deps } => {
            let req = EnqueueDeleteLink { link_id, depends_on: Vec::new() };
            (CommandKind::DeleteLink, req.into_args(), deps.depends_on)
        }
        EnqueueCommand::CreateExposure {
            exposure_id,
            module_id,
            protocol,
            hostname,
            container_port,
            tags,
            deps,
        } => {
            let req = EnqueueCreateExposure {
                exposure_id,
                module_id,
                protocol,
                hostname,
                container_port,
                tags,
                depends_on: Vec::new(),
            };
            (CommandKind::CreateExposure, req.into_args(), deps.depends_on)
        }
        EnqueueCommand::DeleteExposure { exposure_id, deps } => {
            let req = EnqueueDeleteExposure { exposure_id, depends_on: Vec::new() };
            (CommandKind::DeleteExposure, req.into_args(), deps.depends_on)
        }
        EnqueueCommand::ManageDisk { disk_id, options, tags, deps } => {
            let req = EnqueueManageDisk {
                disk_id,
                options: parse_options(&options)?,
                tags,
                depends_on: Vec::new(),
            };
            (CommandKind::ManageDisk, req.into_args(), deps.depends_on)
        }
        EnqueueCommand::ReleaseDisk { disk_id, deps } => {
            let req = EnqueueReleaseDisk { disk_id, depends_on: Vec::new() };
            (CommandKind::ReleaseDisk, req.into_args(), deps.depends_on)
        }
        EnqueueCommand::CreateMount { mount_path, options, tags, deps } => {
            let req = EnqueueCreateMount {
                mount_path,
                options: parse_options(&options)?,
                tags,
                depends_on: Vec::new(),
            };
            (CommandKind::CreateMount, req.into_args(), deps.depends_on)
        }
        EnqueueCommand::DeleteMount { mount_path, deps } => {
            let req = EnqueueDeleteMount { mount_path, depends_on: Vec::new() };
            (CommandKind::DeleteMount, req.into_args(), deps.depends_on)
        }
        EnqueueCommand::CreatePath { mount_path, path, options, tags, deps } => {
            validate_path_suffix(&path).map_err(|e| anyhow::anyhow!(e))?;
            let req = EnqueueCreatePath {
                mount_path,
                path,
                options: parse_options(&options)?,
                tags,
                depends_on: Vec::new(),
            };
            (CommandKind::AddPath, req.into_args(), deps.depends_on)
        }
        EnqueueCommand::DeletePath { mount_path, path, deps } => {
            validate_path_suffix(&path).map_err(|e| anyhow::anyhow!(e))?;
            let req = EnqueueDeletePath { mount_path, path, depends_on: Vec::new() };
            (CommandKind::DeletePath, req.into_args(), deps.depends_on)
        }
    };

    let command = Command::new(kind, args);
    let id = app.manager.enqueue(command, parse_depends_on(&depends_on))?;
    format_or_json(format, &json!({ "id": id.to_string() }), || println!("Enqueued job {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_options_decodes_json_scalars_and_falls_back_to_strings() {
        let parsed = parse_options(&["count=3".to_string(), "label=usb".to_string()]).unwrap();
        assert_eq!(parsed.get("count"), Some(&json!(3)));
        assert_eq!(parsed.get("label"), Some(&json!("usb")));
    }

    #[test]
    fn parse_options_rejects_pairs_without_equals() {
        assert!(parse_options(&["broken".to_string()]).is_err());
    }

    #[test]
    fn parse_depends_on_builds_job_ids() {
        let ids = parse_depends_on(&["job-00000000000000000a".to_string()]);
        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0].to_string(), "job-00000000000000000a");
    }
}
