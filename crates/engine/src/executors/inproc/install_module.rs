// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `install_module` (spec.md §4.F): clone-or-local-path, validate, network,
//! detect arch, `Init`/`Apply` the IaC tool, validate outputs.

use super::module_network_name;
use crate::dispatch::{ExecutionResult, Executor, ExecutorContext, ProgressSink};
use hcagent_adapters::{IacVars, ModuleSource};
use hcagent_core::{ArgMap, Metadata};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tokio::process::Command as ProcessCommand;

/// `<git-url>@<40 lowercase hex chars>`. Anything with an `@` whose suffix
/// is not exactly 40 lowercase hex chars is a rejected symbolic ref; no `@`
/// at all means the whole argument is a local path (spec.md §4.F, §9).
fn parse_source(raw: &str) -> Result<ModuleSource, String> {
    match raw.rsplit_once('@') {
        None => Ok(ModuleSource::LocalPath(raw.to_string())),
        Some((url, maybe_sha)) => {
            let is_commit_sha =
                maybe_sha.len() == 40 && maybe_sha.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase());
            if is_commit_sha {
                Ok(ModuleSource::PinnedGit { url: url.to_string(), commit_sha: maybe_sha.to_string() })
            } else {
                Err(format!(
                    "symbolic ref '{maybe_sha}' is not accepted; pin to a 40-character commit sha"
                ))
            }
        }
    }
}

async fn run_git(args: &[&str], cwd: Option<&Path>) -> Result<(), String> {
    let mut cmd = ProcessCommand::new("git");
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    let output = cmd.output().await.map_err(|e| format!("failed to spawn git: {e}"))?;
    if !output.status.success() {
        return Err(format!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }
    Ok(())
}

/// Clones the pinned commit into `dest`, cleans any prior remnant on the
/// same id, and drops the repo metadata directory afterwards.
async fn clone_pinned(url: &str, commit_sha: &str, dest: &Path) -> Result<(), String> {
    if dest.exists() {
        std::fs::remove_dir_all(dest).map_err(|e| format!("failed to clean prior module dir: {e}"))?;
    }
    std::fs::create_dir_all(dest.parent().unwrap_or(Path::new("."))).map_err(|e| e.to_string())?;
    run_git(&["clone", url, &dest.to_string_lossy()], None).await?;
    run_git(&["checkout", commit_sha], Some(dest)).await?;
    let git_dir = dest.join(".git");
    if git_dir.exists() {
        std::fs::remove_dir_all(&git_dir).map_err(|e| format!("failed to drop .git metadata: {e}"))?;
    }
    Ok(())
}

fn write_install_manifest(
    module_dir: &Path,
    id: &str,
    source: &str,
    commit_ref: &str,
    tags: &[String],
    now_ms: u64,
) -> Result<(), String> {
    let manifest = json!({
        "id": id,
        "source": source,
        "ref": commit_ref,
        "installed_at_epoch_ms": now_ms,
        "tags": tags,
    });
    let bytes = serde_json::to_vec_pretty(&manifest).map_err(|e| e.to_string())?;
    std::fs::write(module_dir.join("install.json"), bytes).map_err(|e| e.to_string())
}

/// `main` must decode as an object; at least one key ending in `_ports`
/// must decode as an object mapping container-port strings to host-port
/// numbers (spec.md §4.F).
fn validate_outputs(outputs: &Value) -> Result<(), String> {
    let obj = outputs.as_object().ok_or("IaC apply output must be a JSON object")?;
    let main = obj.get("main").ok_or("IaC apply output missing required 'main' output")?;
    if !main.is_object() {
        return Err("'main' output must decode as an object".to_string());
    }
    let ports_entries: Vec<(&String, &Value)> =
        obj.iter().filter(|(k, _)| k.ends_with("_ports")).collect();
    if ports_entries.is_empty() {
        return Err("IaC apply output must include at least one '<container>_ports' mapping".to_string());
    }
    for (key, value) in ports_entries {
        let mapping = value.as_object().ok_or_else(|| format!("'{key}' must decode as an object"))?;
        for (port, host_port) in mapping {
            if !host_port.is_number() {
                return Err(format!("'{key}.{port}' must map to a numeric host port"));
            }
        }
    }
    Ok(())
}

pub struct InstallModuleExecutor;

#[async_trait]
impl Executor for InstallModuleExecutor {
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
        let source_raw = match args.get_str("source") {
            Ok(v) => v.to_string(),
            Err(e) => return ExecutionResult::failed(e.to_string(), metadata),
        };
        let tags = args.get_str_vec("tags").unwrap_or_default();

        let source = match parse_source(&source_raw) {
            Ok(s) => s,
            Err(e) => return ExecutionResult::failed(e, metadata),
        };

        progress.step("cloning");
        let module_dir: PathBuf = ctx.modules_root.join(&id);
        let (module_path, commit_ref) = match &source {
            ModuleSource::PinnedGit { url, commit_sha } => {
                if let Err(e) = clone_pinned(url, commit_sha, &module_dir).await {
                    return ExecutionResult::failed(e, metadata);
                }
                (module_dir.to_string_lossy().into_owned(), commit_sha.clone())
            }
            ModuleSource::LocalPath(path) => (path.clone(), "local".to_string()),
        };

        if let Err(e) = write_install_manifest(
            Path::new(&module_path),
            &id,
            &source_raw,
            &commit_ref,
            &tags,
            (ctx.now_epoch_ms)(),
        ) {
            return ExecutionResult::failed(e, metadata);
        }

        progress.step("validating");
        if let Err(e) = ctx.module_validator.validate(&module_path).await {
            return ExecutionResult::failed(e.to_string(), metadata);
        }

        progress.step("network");
        let network_name = module_network_name(&id);
        if let Err(e) = ctx.container_manager.create_network(&network_name).await {
            return ExecutionResult::failed(e.to_string(), metadata);
        }

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

        progress.step("applying");
        if let Err(e) = ctx.iac_executor.init(&vars).await {
            return ExecutionResult::failed(e.to_string(), metadata);
        }
        let outputs = match ctx.iac_executor.apply(&vars).await {
            Ok(v) => v,
            Err(e) => return ExecutionResult::failed(e.to_string(), metadata),
        };

        if let Err(e) = validate_outputs(&outputs) {
            return ExecutionResult::failed(e, metadata);
        }

        progress.step("complete");
        ExecutionResult::completed(
            json!({ "id": id, "module_path": module_path, "network": network_name, "outputs": outputs }),
            metadata,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_source_accepts_pinned_commit() {
        let sha = "a".repeat(40);
        let raw = format!("https://example.com/repo.git@{sha}");
        let parsed = parse_source(&raw).expect("should parse");
        assert_eq!(parsed, ModuleSource::PinnedGit { url: "https://example.com/repo.git".into(), commit_sha: sha });
    }

    #[test]
    fn parse_source_rejects_symbolic_ref() {
        let raw = "https://example.com/repo.git@main";
        assert!(parse_source(raw).is_err());
    }

    #[test]
    fn parse_source_treats_bare_path_as_local() {
        let parsed = parse_source("/opt/modules/foo").expect("should parse");
        assert_eq!(parsed, ModuleSource::LocalPath("/opt/modules/foo".into()));
    }

    #[test]
    fn validate_outputs_requires_main_and_a_ports_mapping() {
        assert!(validate_outputs(&json!({})).is_err());
        assert!(validate_outputs(&json!({"main": {}})).is_err());
        assert!(validate_outputs(&json!({"main": {}, "web_ports": {"8080": 30080}})).is_ok());
        assert!(validate_outputs(&json!({"main": {}, "web_ports": {"8080": "nope"}})).is_err());
    }

    #[tokio::test]
    async fn install_stamps_the_manifest_with_the_context_clock() {
        let dir = tempfile::tempdir().expect("tempdir");
        let module_src = dir.path().join("src-module");
        std::fs::create_dir_all(&module_src).expect("create local module dir");
        let ctx = crate::test_support::test_context(dir.path());

        let mut args = ArgMap::new();
        args.insert("id", json!("m1"));
        args.insert("source", json!(module_src.to_string_lossy()));

        let result =
            InstallModuleExecutor.execute(&ctx, &args, Metadata::new(), &ProgressSink::noop()).await;
        assert_eq!(result.status, hcagent_core::JobStatus::Completed);

        let manifest: Value =
            serde_json::from_slice(&std::fs::read(module_src.join("install.json")).expect("read manifest"))
                .expect("manifest is valid json");
        assert_eq!(manifest["installed_at_epoch_ms"], json!(1_000_000));
    }
}
