// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hca`: local operation of the host control agent job queue. Talks to
//! the `hcagent-storage`/`hcagent-engine` libraries directly against the
//! same on-disk jobs root `hcad` owns — there is no wire protocol between
//! them (DESIGN.md OQ-1).

mod color;
mod commands;
mod context;
mod output;

use clap::{Parser, Subcommand};
use commands::{bundle::BundleCommand, enqueue::EnqueueCommand, job::JobCommand, worker::WorkerRunArgs};
use context::App;
use output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "hca", version, styles = color::styles())]
struct Cli {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Enqueue a job of a given kind.
    #[command(subcommand)]
    Enqueue(EnqueueCommand),
    /// Inspect or manage existing jobs.
    #[command(subcommand)]
    Job(JobCommand),
    /// Expand and enqueue a catalog bundle.
    #[command(subcommand)]
    Bundle(BundleCommand),
    /// Run the worker loop in this process.
    Worker {
        #[command(subcommand)]
        action: WorkerAction,
    },
}

#[derive(Subcommand, Debug)]
enum WorkerAction {
    Run(WorkerRunArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let app = App::load()?;

    let result = match cli.command {
        Commands::Enqueue(cmd) => commands::enqueue::run(&app, cmd, cli.output),
        Commands::Job(cmd) => commands::job::run(&app, cmd, cli.output),
        Commands::Bundle(cmd) => commands::bundle::run(&app, cmd, cli.output).await,
        Commands::Worker { action: WorkerAction::Run(args) } => commands::worker::run(app, args).await,
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
    Ok(())
}
