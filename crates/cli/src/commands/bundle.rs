// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hca bundle install|uninstall` — drives the Bundle Expander (spec.md
//! §4.H) to synthesize a bundle's component jobs and trailing meta-job.

use crate::context::App;
use crate::output::{format_or_json, OutputFormat};
use clap::Subcommand;
use hcagent_engine::bundle::{expand_install, expand_uninstall};
use serde_json::json;

#[derive(Subcommand, Debug)]
pub enum BundleCommand {
    /// Install every module, link, and exposure a catalog bundle names.
    Install { bundle_name: String },
    /// Uninstall every component of a previously installed bundle.
    Uninstall { bundle_name: String },
}

pub async fn run(app: &App, cmd: BundleCommand, format: OutputFormat) -> anyhow::Result<()> {
    let (meta_job_id, bundle_name) = match cmd {
        BundleCommand::Install { bundle_name } => {
            let id = expand_install(&app.manager, app.catalog.as_ref(), &bundle_name).await?;
            (id, bundle_name)
        }
        BundleCommand::Uninstall { bundle_name } => {
            let id = expand_uninstall(&app.manager, app.catalog.as_ref(), &bundle_name).await?;
            (id, bundle_name)
        }
    };
    format_or_json(
        format,
        &json!({ "bundle_name": bundle_name, "meta_job_id": meta_job_id.to_string() }),
        || println!("Enqueued bundle '{bundle_name}', meta-job {meta_job_id}"),
    )
}
