// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request payload DTOs, one per `enqueue_*` endpoint named in spec.md §6.
//! Each carries its command's typed arguments plus the caller-supplied
//! `depends_on` list; `into_args` renders the typed fields into the
//! [`ArgMap`] shape `hcagent-engine`'s executors decode.

use hcagent_core::{ArgMap, JobId};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

fn base_args(tags: &[String]) -> ArgMap {
    let mut args = ArgMap::new();
    if !tags.is_empty() {
        args.insert("tags", json!(tags));
    }
    args
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueInstallModule {
    pub id: String,
    /// `<git-url>@<40-hex commit sha>` or a local filesystem path.
    pub source: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub depends_on: Vec<JobId>,
}

impl EnqueueInstallModule {
    pub fn into_args(self) -> ArgMap {
        let mut args = base_args(&self.tags);
        args.insert("id", json!(self.id));
        args.insert("source", json!(self.source));
        args
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueUninstallModule {
    pub id: String,
    #[serde(default)]
    pub depends_on: Vec<JobId>,
}

impl EnqueueUninstallModule {
    pub fn into_args(self) -> ArgMap {
        let mut args = ArgMap::new();
        args.insert("id", json!(self.id));
        args
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueCreateLink {
    pub link_id: String,
    /// Module-id → bind configuration, arbitrary depth.
    pub bindings: Value,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub depends_on: Vec<JobId>,
}

impl EnqueueCreateLink {
    pub fn into_args(self) -> ArgMap {
        let mut args = base_args(&self.tags);
        args.insert("link_id", json!(self.link_id));
        args.insert("bindings", self.bindings);
        args
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueDeleteLink {
    pub link_id: String,
    #[serde(default)]
    pub depends_on: Vec<JobId>,
}

impl EnqueueDeleteLink {
    pub fn into_args(self) -> ArgMap {
        let mut args = ArgMap::new();
        args.insert("link_id", json!(self.link_id));
        args
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueCreateExposure {
    pub exposure_id: String,
    pub module_id: String,
    pub protocol: String,
    #[serde(default)]
    pub hostname: Option<String>,
    pub container_port: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub depends_on: Vec<JobId>,
}

impl EnqueueCreateExposure {
    pub fn into_args(self) -> ArgMap {
        let mut args = base_args(&self.tags);
        args.insert("exposure_id", json!(self.exposure_id));
        args.insert("module_id", json!(self.module_id));
        args.insert("protocol", json!(self.protocol));
        if let Some(h) = self.hostname {
            args.insert("hostname", json!(h));
        }
        args.insert("container_port", json!(self.container_port));
        args
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueDeleteExposure {
    pub exposure_id: String,
    #[serde(default)]
    pub depends_on: Vec<JobId>,
}

impl EnqueueDeleteExposure {
    pub fn into_args(self) -> ArgMap {
        let mut args = ArgMap::new();
        args.insert("exposure_id", json!(self.exposure_id));
        args
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueManageDisk {
    pub disk_id: String,
    /// Arbitrary key/value pairs copied verbatim into the staged INI
    /// section (e.g. `filesystem`, `luks`, `lvm`).
    #[serde(default)]
    pub options: serde_json::Map<String, Value>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub depends_on: Vec<JobId>,
}

impl EnqueueManageDisk {
    pub fn into_args(self) -> ArgMap {
        let mut args = base_args(&self.tags);
        args.insert("disk_id", json!(self.disk_id));
        for (k, v) in self.options {
            args.insert(k, v);
        }
        args
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueReleaseDisk {
    pub disk_id: String,
    #[serde(default)]
    pub depends_on: Vec<JobId>,
}

impl EnqueueReleaseDisk {
    pub fn into_args(self) -> ArgMap {
        let mut args = ArgMap::new();
        args.insert("disk_id", json!(self.disk_id));
        args
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueCreateMount {
    pub mount_path: String,
    #[serde(default)]
    pub options: serde_json::Map<String, Value>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub depends_on: Vec<JobId>,
}

impl EnqueueCreateMount {
    pub fn into_args(self) -> ArgMap {
        let mut args = base_args(&self.tags);
        args.insert("mount_path", json!(self.mount_path));
        for (k, v) in self.options {
            args.insert(k, v);
        }
        args
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueDeleteMount {
    pub mount_path: String,
    #[serde(default)]
    pub depends_on: Vec<JobId>,
}

impl EnqueueDeleteMount {
    pub fn into_args(self) -> ArgMap {
        let mut args = ArgMap::new();
        args.insert("mount_path", json!(self.mount_path));
        args
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueCreatePath {
    pub mount_path: String,
    pub path: String,
    #[serde(default)]
    pub options: serde_json::Map<String, Value>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub depends_on: Vec<JobId>,
}

impl EnqueueCreatePath {
    pub fn into_args(self) -> ArgMap {
        let mut args = base_args(&self.tags);
        args.insert("mount_path", json!(self.mount_path));
        args.insert("path", json!(self.path));
        for (k, v) in self.options {
            args.insert(k, v);
        }
        args
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueDeletePath {
    pub mount_path: String,
    pub path: String,
    #[serde(default)]
    pub depends_on: Vec<JobId>,
}

impl EnqueueDeletePath {
    pub fn into_args(self) -> ArgMap {
        let mut args = ArgMap::new();
        args.insert("mount_path", json!(self.mount_path));
        args.insert("path", json!(self.path));
        args
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueBundleInstall {
    pub bundle_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueBundleUninstall {
    pub bundle_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_module_into_args_carries_id_and_source() {
        let req = EnqueueInstallModule {
            id: "m1".to_string(),
            source: "https://example.com/m1.git@".to_string() + &"a".repeat(40),
            tags: vec!["bundle-x".to_string()],
            depends_on: Vec::new(),
        };
        let args = req.into_args();
        assert_eq!(args.get_str("id").expect("id"), "m1");
        assert_eq!(args.get_str_vec("tags").expect("tags"), vec!["bundle-x".to_string()]);
    }

    #[test]
    fn manage_disk_into_args_copies_arbitrary_options() {
        let mut options = serde_json::Map::new();
        options.insert("filesystem".to_string(), json!("ext4"));
        let req = EnqueueManageDisk {
            disk_id: "usb-X".to_string(),
            options,
            tags: Vec::new(),
            depends_on: Vec::new(),
        };
        let args = req.into_args();
        assert_eq!(args.get_str("filesystem").expect("filesystem"), "ext4");
    }

    #[test]
    fn depends_on_deserializes_job_ids_from_strings() {
        let json = json!({
            "id": "m1",
            "source": "/local/path",
            "depends_on": ["job-00000000000000000a"],
        });
        let req: EnqueueInstallModule = serde_json::from_value(json).expect("deserialize");
        assert_eq!(req.depends_on.len(), 1);
    }
}
