// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hca worker run` — drives the Worker Loop in this process, for
//! scripting and manual testing without starting `hcad` (spec.md §2:
//! "`hcagent-cli` ... drive the worker loop for scripting and manual
//! testing").

use crate::context::App;
use clap::Args;
use hcagent_engine::{reconcile_startup, Worker};
use tokio_util::sync::CancellationToken;

#[derive(Args, Debug)]
pub struct WorkerRunArgs {
    /// Run startup reconciliation against active INI files before ticking.
    #[arg(long, default_value_t = true)]
    reconcile: bool,
}

pub async fn run(app: App, args: WorkerRunArgs) -> anyhow::Result<()> {
    if args.reconcile {
        reconcile_startup(&app.manager, &app.ctx, &app.clock).await?;
    }

    let shutdown = CancellationToken::new();
    let shutdown_for_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown_for_signal.cancel();
        }
    });

    let worker = Worker::new(app.manager, app.ctx, app.clock);
    worker.run(shutdown).await;
    Ok(())
}
