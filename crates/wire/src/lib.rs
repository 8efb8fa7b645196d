// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hcagent-wire: serializable DTOs matching the response envelope implied
//! by the (out-of-scope) HTTP API in spec.md §6, so that whoever
//! implements the transport has a stable contract to serialize against.
//! `hcagent-cli` also prints embedded-mode results through these types.

pub mod requests;
pub mod view;

pub use requests::{
    EnqueueBundleInstall, EnqueueBundleUninstall, EnqueueCreateExposure, EnqueueCreateLink,
    EnqueueCreateMount, EnqueueCreatePath, EnqueueDeleteExposure, EnqueueDeleteLink,
    EnqueueDeleteMount, EnqueueDeletePath, EnqueueInstallModule, EnqueueManageDisk,
    EnqueueReleaseDisk, EnqueueUninstallModule,
};
pub use view::{EventView, JobSummary, JobView};
