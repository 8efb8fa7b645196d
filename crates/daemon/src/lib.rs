// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! hcagent-daemon: the long-running process that owns the job store
//! exclusively, wires the ambient adapter ports, performs startup
//! reconciliation, and runs the Worker Loop until shutdown (spec.md §1,
//! §4.D, §4.G).

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod env;
pub mod host_arch;

pub use env::{DaemonError, EnvPaths};
pub use host_arch::HostArchDetector;
