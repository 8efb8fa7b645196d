// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed command kinds and the command envelope attached to a [`crate::Job`].

use crate::argmap::ArgMap;
use serde::{Deserialize, Serialize};

/// The closed set of actions a job can perform (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    InstallModule,
    UninstallModule,
    CreateLink,
    DeleteLink,
    CreateExposure,
    DeleteExposure,
    BundleInstall,
    BundleUninstall,
    ManageDisk,
    ReleaseDisk,
    CreateMount,
    DeleteMount,
    AddPath,
    DeletePath,
}

crate::simple_display! {
    CommandKind {
        InstallModule => "install_module",
        UninstallModule => "uninstall_module",
        CreateLink => "create_link",
        DeleteLink => "delete_link",
        CreateExposure => "create_exposure",
        DeleteExposure => "delete_exposure",
        BundleInstall => "bundle_install",
        BundleUninstall => "bundle_uninstall",
        ManageDisk => "manage_disk",
        ReleaseDisk => "release_disk",
        CreateMount => "create_mount",
        DeleteMount => "delete_mount",
        AddPath => "add_path",
        DeletePath => "delete_path",
    }
}

impl CommandKind {
    /// Boot-scoped kinds are driven by the two-phase staged/active INI
    /// protocol (spec.md §4.G) and are the only kinds eligible for the
    /// Worker's pending-retry pass.
    pub fn is_boot_scoped(self) -> bool {
        matches!(
            self,
            CommandKind::ManageDisk
                | CommandKind::ReleaseDisk
                | CommandKind::CreateMount
                | CommandKind::DeleteMount
                | CommandKind::AddPath
                | CommandKind::DeletePath
        )
    }

    pub fn is_meta(self) -> bool {
        matches!(self, CommandKind::BundleInstall | CommandKind::BundleUninstall)
    }
}

/// A job's typed command: the action kind plus its dynamically-typed
/// arguments (spec.md §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub kind: CommandKind,
    #[serde(default)]
    pub args: ArgMap,
}

impl Command {
    pub fn new(kind: CommandKind, args: ArgMap) -> Self {
        Self { kind, args }
    }

    /// Extracts the `tags` argument, if present, as the job's tag list
    /// (spec.md §4.C: "Extracts any `tags` argument... into the job's tag
    /// list").
    pub fn extract_tags(&self) -> Vec<String> {
        self.args.get_str_vec("tags").unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_wire_kind_names() {
        assert_eq!(CommandKind::InstallModule.to_string(), "install_module");
        assert_eq!(CommandKind::DeletePath.to_string(), "delete_path");
    }

    #[test]
    fn boot_scoped_classification_matches_spec_table() {
        for k in [
            CommandKind::ManageDisk,
            CommandKind::ReleaseDisk,
            CommandKind::CreateMount,
            CommandKind::DeleteMount,
            CommandKind::AddPath,
            CommandKind::DeletePath,
        ] {
            assert!(k.is_boot_scoped(), "{k} should be boot-scoped");
        }
        for k in [CommandKind::InstallModule, CommandKind::CreateLink, CommandKind::BundleInstall] {
            assert!(!k.is_boot_scoped(), "{k} should not be boot-scoped");
        }
    }

    #[test]
    fn extract_tags_defaults_to_empty() {
        let cmd = Command::new(CommandKind::InstallModule, ArgMap::new());
        assert!(cmd.extract_tags().is_empty());
    }

    #[test]
    fn extract_tags_reads_string_array() {
        let mut args = ArgMap::new();
        args.insert("tags", serde_json::json!(["a", "b"]));
        let cmd = Command::new(CommandKind::InstallModule, args);
        assert_eq!(cmd.extract_tags(), vec!["a".to_string(), "b".to_string()]);
    }
}
