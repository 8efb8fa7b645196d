// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The staged/active INI handoff that mediates the two-phase boot-scoped
//! protocol between this agent and the out-of-process boot service.
//!
//! The core writes `<sysconfdir>/{disks,mounts,paths}.pending.ini` only and
//! reads `<sysconfdir>/{disks,mounts,paths}.ini` only; no advisory locking
//! is needed because the two parties write disjoint files. Every pending
//! write is a whole-file load, mutate, save at mode 0600.

use ini::Ini;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootCfgError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid ini at '{path}': {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// The three resource kinds mediated by the protocol, each with its own
/// pair of pending/active files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Disk,
    Mount,
    Path,
}

impl ResourceKind {
    fn file_stem(self) -> &'static str {
        match self {
            ResourceKind::Disk => "disks",
            ResourceKind::Mount => "mounts",
            ResourceKind::Path => "paths",
        }
    }

    pub fn pending_path(self, sysconfdir: &Path) -> PathBuf {
        sysconfdir.join(format!("{}.pending.ini", self.file_stem()))
    }

    pub fn active_path(self, sysconfdir: &Path) -> PathBuf {
        sysconfdir.join(format!("{}.ini", self.file_stem()))
    }
}

fn load_or_empty(path: &Path) -> Result<Ini, BootCfgError> {
    if !path.exists() {
        return Ok(Ini::new());
    }
    Ini::load_from_file(path)
        .map_err(|e| BootCfgError::Parse { path: path.to_path_buf(), reason: e.to_string() })
}

fn save_at_0600(ini: &Ini, path: &Path) -> Result<(), BootCfgError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    ini.write_to_file(path)?;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    fs::set_permissions(path, perms)?;
    Ok(())
}

/// The intents file this agent writes: `<kind>.pending.ini`.
pub struct PendingIni {
    path: PathBuf,
}

impl PendingIni {
    pub fn new(kind: ResourceKind, sysconfdir: &Path) -> Self {
        Self { path: kind.pending_path(sysconfdir) }
    }

    /// Writes (or overwrites) a named section with the given key/value
    /// pairs — phase 1 of a create/manage request.
    pub fn write_section(&self, section_name: &str, pairs: &[(String, String)]) -> Result<(), BootCfgError> {
        let mut ini = load_or_empty(&self.path)?;
        ini.delete(Some(section_name));
        {
            let mut section = ini.with_section(Some(section_name));
            for (k, v) in pairs {
                section.set(k, v);
            }
        }
        save_at_0600(&ini, &self.path)
    }

    /// Writes a `!<id>` section with no keys — phase 1 of a delete/release
    /// request, signalling removal to the boot service.
    pub fn write_removal(&self, section_name: &str) -> Result<(), BootCfgError> {
        let mut ini = load_or_empty(&self.path)?;
        let removal_name = format!("!{section_name}");
        ini.delete(Some(removal_name.as_str()));
        ini.with_section(Some(removal_name));
        save_at_0600(&ini, &self.path)
    }

    /// Every section name still outstanding in the pending file, used by
    /// startup reconciliation purely for visibility logging.
    pub fn section_names(&self) -> Result<Vec<String>, BootCfgError> {
        let ini = load_or_empty(&self.path)?;
        Ok(ini.sections().filter_map(|name| name.map(str::to_string)).collect())
    }
}

/// A matched section of the active (outcomes) file, exposing the few keys
/// callers need without forcing them to parse the whole `Properties` map.
pub struct ActiveSection {
    status: Option<String>,
    message: Option<String>,
    request_id: Option<String>,
}

impl ActiveSection {
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }
}

/// The outcomes file the boot service writes: `<kind>.ini`. Read-only from
/// this agent's side.
pub struct ActiveIni {
    ini: Ini,
}

impl ActiveIni {
    pub fn load(kind: ResourceKind, sysconfdir: &Path) -> Result<Self, BootCfgError> {
        Ok(Self { ini: load_or_empty(&kind.active_path(sysconfdir))? })
    }

    pub fn contains(&self, section_name: &str) -> bool {
        self.ini.section(Some(section_name)).is_some()
    }

    pub fn lookup(&self, section_name: &str) -> Option<ActiveSection> {
        let props = self.ini.section(Some(section_name))?;
        Some(ActiveSection {
            status: props.get("status").map(str::to_string),
            message: props.get("message").map(str::to_string),
            request_id: props.get("request_id").map(str::to_string),
        })
    }

    /// Every `(section_name, section)` pair present, used by startup
    /// reconciliation to sweep the whole file once.
    pub fn entries(&self) -> impl Iterator<Item = (&str, ActiveSection)> {
        self.ini.sections().filter_map(move |name| {
            let name = name?;
            let section = self.lookup(name)?;
            Some((name, section))
        })
    }
}

#[cfg(test)]
#[path = "bootcfg_tests.rs"]
mod tests;
