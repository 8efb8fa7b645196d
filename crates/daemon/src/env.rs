// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon (spec.md §6:
//! "Environment. Module storage root and the IaC executable are looked up
//! via environment; the core treats these as opaque strings.").

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("could not determine a home directory to derive a default state path")]
    NoHomeDir,
}

/// The four environment-resolved paths/strings spec.md §6 names:
/// `HCA_JOBS_ROOT`, `HCA_SYSCONFDIR`, `HCA_MODULES_ROOT`, `HCA_IAC_BIN`.
#[derive(Debug, Clone)]
pub struct EnvPaths {
    pub jobs_root: PathBuf,
    pub sysconfdir: PathBuf,
    pub modules_root: PathBuf,
    pub iac_bin: String,
}

impl EnvPaths {
    /// Resolves every path from its environment variable, falling back to
    /// an XDG-style default under the user's state/data directories.
    pub fn resolve() -> Result<Self, DaemonError> {
        let jobs_root = env_path("HCA_JOBS_ROOT").map(Ok).unwrap_or_else(|| Ok(default_state_dir()?.join("jobs")))?;
        let sysconfdir = env_path("HCA_SYSCONFDIR").unwrap_or_else(|| PathBuf::from("/etc/hcagent"));
        let modules_root = env_path("HCA_MODULES_ROOT")
            .map(Ok)
            .unwrap_or_else(|| Ok(default_data_dir()?.join("modules")))?;
        let iac_bin = std::env::var("HCA_IAC_BIN").unwrap_or_else(|_| "terraform".to_string());
        Ok(Self { jobs_root, sysconfdir, modules_root, iac_bin })
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key).ok().map(PathBuf::from)
}

fn default_state_dir() -> Result<PathBuf, DaemonError> {
    Ok(dirs::state_dir().or_else(dirs::data_local_dir).ok_or(DaemonError::NoHomeDir)?.join("hcagent"))
}

fn default_data_dir() -> Result<PathBuf, DaemonError> {
    Ok(dirs::data_local_dir().ok_or(DaemonError::NoHomeDir)?.join("hcagent"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn resolve_honors_every_env_override() {
        std::env::set_var("HCA_JOBS_ROOT", "/tmp/hca-test/jobs");
        std::env::set_var("HCA_SYSCONFDIR", "/tmp/hca-test/etc");
        std::env::set_var("HCA_MODULES_ROOT", "/tmp/hca-test/modules");
        std::env::set_var("HCA_IAC_BIN", "/usr/local/bin/tofu");

        let paths = EnvPaths::resolve().expect("resolve");
        assert_eq!(paths.jobs_root, PathBuf::from("/tmp/hca-test/jobs"));
        assert_eq!(paths.sysconfdir, PathBuf::from("/tmp/hca-test/etc"));
        assert_eq!(paths.modules_root, PathBuf::from("/tmp/hca-test/modules"));
        assert_eq!(paths.iac_bin, "/usr/local/bin/tofu");

        std::env::remove_var("HCA_JOBS_ROOT");
        std::env::remove_var("HCA_SYSCONFDIR");
        std::env::remove_var("HCA_MODULES_ROOT");
        std::env::remove_var("HCA_IAC_BIN");
    }

    #[test]
    #[serial]
    fn resolve_defaults_iac_bin_to_terraform() {
        std::env::remove_var("HCA_IAC_BIN");
        let paths = EnvPaths::resolve().expect("resolve");
        assert_eq!(paths.iac_bin, "terraform");
    }
}
