// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Bundle Expander (spec.md §4.H): synthesizes a bundle's component
//! jobs and a trailing meta-job at enqueue time. Every component job is
//! tagged with the bundle id and carries `bundle_id` in its own arguments,
//! so the meta-job executor and `hca job list --tag <bundle-id>` can
//! correlate results back to the bundle.

use hcagent_adapters::{AdapterError, BundleDef, CatalogStore, ModuleSource};
use hcagent_core::{ArgMap, Clock, Command, CommandKind, JobId};
use hcagent_storage::{EnqueueError, JobManager};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("catalog: {0}")]
    Catalog(#[from] AdapterError),
    #[error("enqueue: {0}")]
    Enqueue(#[from] EnqueueError),
}

fn source_string(source: ModuleSource) -> String {
    match source {
        ModuleSource::PinnedGit { url, commit_sha } => format!("{url}@{commit_sha}"),
        ModuleSource::LocalPath(path) => path,
    }
}

fn tagged_args(bundle_id: &str, mut args: ArgMap) -> ArgMap {
    args.insert("bundle_id", json!(bundle_id));
    args.insert("tags", json!([bundle_id]));
    args
}

/// Expansion order (install): a strict sequential chain of module installs,
/// links depending on all modules, exposures depending on all modules and
/// links, then a `bundle_install` meta-job depending on everything above.
pub async fn expand_install<C: Clock>(
    manager: &JobManager<C>,
    catalog: &dyn CatalogStore,
    bundle_name: &str,
) -> Result<JobId, BundleError> {
    let bundle = catalog.fetch_bundle(bundle_name).await?;
    let bundle_id = bundle.id.clone();

    let mut module_job_ids = Vec::with_capacity(bundle.modules.len());
    for module_name in &bundle.modules {
        let source = catalog.resolve_module_source(module_name).await?;
        let mut args = ArgMap::new();
        args.insert("id", json!(module_name));
        args.insert("source", json!(source_string(source)));
        let command = Command::new(CommandKind::InstallModule, tagged_args(&bundle_id, args));
        let id = manager.enqueue(command, module_job_ids.clone())?;
        module_job_ids.push(id);
    }

    let mut link_job_ids = Vec::with_capacity(bundle.links.len());
    for (link_id, bindings) in &bundle.links {
        let mut args = ArgMap::new();
        args.insert("link_id", json!(link_id));
        args.insert("bindings", bindings.clone());
        let command = Command::new(CommandKind::CreateLink, tagged_args(&bundle_id, args));
        let id = manager.enqueue(command, module_job_ids.clone())?;
        link_job_ids.push(id);
    }

    let mut dependents_of_exposures = module_job_ids.clone();
    dependents_of_exposures.extend(link_job_ids.iter().copied());

    let mut exposure_job_ids = Vec::with_capacity(bundle.exposures.len());
    for (exposure_id, spec) in &bundle.exposures {
        let mut args = exposure_args_from_spec(exposure_id, spec);
        args.insert("exposure_id", json!(exposure_id));
        let command = Command::new(CommandKind::CreateExposure, tagged_args(&bundle_id, args));
        let id = manager.enqueue(command, dependents_of_exposures.clone())?;
        exposure_job_ids.push(id);
    }

    let mut all_components = module_job_ids;
    all_components.extend(link_job_ids);
    all_components.extend(exposure_job_ids);

    let mut meta_args = ArgMap::new();
    meta_args.insert("bundle_id", json!(bundle_id));
    let meta_command = Command::new(CommandKind::BundleInstall, meta_args);
    Ok(manager.enqueue(meta_command, all_components)?)
}

/// Expansion order (uninstall): reverse dependency direction — delete
/// exposures first (no deps), then links (depend on all exposure deletes),
/// then modules (depend on all link deletes), then the meta-job.
pub async fn expand_uninstall<C: Clock>(
    manager: &JobManager<C>,
    catalog: &dyn CatalogStore,
    bundle_name: &str,
) -> Result<JobId, BundleError> {
    let bundle = catalog.fetch_bundle(bundle_name).await?;
    let bundle_id = bundle.id.clone();

    let mut exposure_job_ids = Vec::with_capacity(bundle.exposures.len());
    for exposure_id in bundle.exposures.keys() {
        let mut args = ArgMap::new();
        args.insert("exposure_id", json!(exposure_id));
        let command = Command::new(CommandKind::DeleteExposure, tagged_args(&bundle_id, args));
        let id = manager.enqueue(command, Vec::new())?;
        exposure_job_ids.push(id);
    }

    let mut link_job_ids = Vec::with_capacity(bundle.links.len());
    for link_id in bundle.links.keys() {
        let mut args = ArgMap::new();
        args.insert("link_id", json!(link_id));
        let command = Command::new(CommandKind::DeleteLink, tagged_args(&bundle_id, args));
        let id = manager.enqueue(command, exposure_job_ids.clone())?;
        link_job_ids.push(id);
    }

    let mut module_job_ids = Vec::with_capacity(bundle.modules.len());
    for module_name in &bundle.modules {
        let mut args = ArgMap::new();
        args.insert("id", json!(module_name));
        let command = Command::new(CommandKind::UninstallModule, tagged_args(&bundle_id, args));
        let id = manager.enqueue(command, link_job_ids.clone())?;
        module_job_ids.push(id);
    }

    let mut all_components = exposure_job_ids;
    all_components.extend(link_job_ids);
    all_components.extend(module_job_ids);

    let mut meta_args = ArgMap::new();
    meta_args.insert("bundle_id", json!(bundle_id));
    let meta_command = Command::new(CommandKind::BundleUninstall, meta_args);
    Ok(manager.enqueue(meta_command, all_components)?)
}

/// A bundle's exposure map stores each exposure's fields (`module_id`,
/// `protocol`, optional `hostname`, `container_port`) as a single JSON
/// object (`BundleDef.exposures`); this copies them verbatim into the
/// component job's argument map.
fn exposure_args_from_spec(exposure_id: &str, spec: &serde_json::Value) -> ArgMap {
    let mut args = ArgMap::new();
    if let Some(obj) = spec.as_object() {
        for (k, v) in obj {
            args.insert(k.clone(), v.clone());
        }
    } else {
        tracing::warn!(exposure_id, "bundle exposure spec is not a JSON object; ignoring its fields");
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcagent_adapters::fake::FakeCatalogStore;
    use hcagent_core::{FakeClock, JobStatus};
    use hcagent_storage::JobStore;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn bundle_def(id: &str) -> BundleDef {
        let mut links = HashMap::new();
        links.insert("l1".to_string(), json!({"m1": {"port": 8080}}));
        let mut exposures = HashMap::new();
        exposures.insert(
            "e1".to_string(),
            json!({"module_id": "m1", "protocol": "https", "container_port": 8080}),
        );
        BundleDef { id: id.to_string(), modules: vec!["m1".to_string(), "m2".to_string()], links, exposures }
    }

    fn manager(dir: &std::path::Path) -> JobManager<FakeClock> {
        JobManager::new(JobStore::new(dir.to_path_buf()).expect("store"), FakeClock::new())
    }

    #[tokio::test]
    async fn install_expansion_chains_modules_and_depends_meta_on_everything() {
        let dir = tempdir().expect("tempdir");
        let mgr = manager(dir.path());
        let catalog = FakeCatalogStore::default().with_bundle(bundle_def("b1"));

        let meta_id = expand_install(&mgr, &catalog, "b1").await.expect("expand");
        let meta_view = mgr.get(meta_id).expect("meta job exists");
        assert_eq!(meta_view.job.command.kind, CommandKind::BundleInstall);
        // 2 modules + 1 link + 1 exposure = 4 components.
        assert_eq!(meta_view.job.depends_on.len(), 4);

        let tagged = mgr.list_by_tag("b1").expect("list by tag");
        assert_eq!(tagged.len(), 4);
        for job in &tagged {
            assert_eq!(job.status, JobStatus::Queued);
        }
    }

    #[tokio::test]
    async fn uninstall_expansion_starts_with_exposure_deletes() {
        let dir = tempdir().expect("tempdir");
        let mgr = manager(dir.path());
        let catalog = FakeCatalogStore::default().with_bundle(bundle_def("b2"));

        let meta_id = expand_uninstall(&mgr, &catalog, "b2").await.expect("expand");
        let meta_view = mgr.get(meta_id).expect("meta job exists");
        assert_eq!(meta_view.job.command.kind, CommandKind::BundleUninstall);
        assert_eq!(meta_view.job.depends_on.len(), 4);

        let exposure_delete = mgr
            .list_by_tag("b2")
            .expect("list by tag")
            .into_iter()
            .find(|j| j.command.kind == CommandKind::DeleteExposure)
            .expect("a delete_exposure job exists");
        assert!(exposure_delete.depends_on.is_empty());
    }
}
