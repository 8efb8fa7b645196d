// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The one real, host-probing [`ArchDetector`] (spec.md §4.F:
//! "detects architecture and accelerator vendor"). CPU architecture comes
//! from the build target; accelerator presence is a best-effort probe of
//! well-known device nodes, since no accelerator vendor library is part of
//! this workspace's dependency tier.

use async_trait::async_trait;
use hcagent_adapters::{AdapterError, ArchDetector, ArchInfo};
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct HostArchDetector;

fn detect_accelerator() -> Option<String> {
    if Path::new("/dev/nvidia0").exists() {
        return Some("nvidia".to_string());
    }
    if Path::new("/dev/kfd").exists() {
        return Some("amd".to_string());
    }
    None
}

#[async_trait]
impl ArchDetector for HostArchDetector {
    async fn detect(&self) -> Result<ArchInfo, AdapterError> {
        Ok(ArchInfo { arch: std::env::consts::ARCH.to_string(), accelerator: detect_accelerator() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn detect_reports_the_build_target_architecture() {
        let info = HostArchDetector.detect().await.expect("detect");
        assert_eq!(info.arch, std::env::consts::ARCH);
    }
}
