// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hca job get|list|cancel|delete` — the inspection and lifecycle
//! commands spec.md §4.C names on the Job Manager.

use crate::context::App;
use crate::output::{apply_limit, format_or_json, handle_list_with_limit, OutputFormat};
use clap::Subcommand;
use hcagent_core::JobId;
use hcagent_wire::view::{JobSummary, JobView};
use std::io::Write;

#[derive(Subcommand, Debug)]
pub enum JobCommand {
    /// Fetch a single job's full record and event log.
    Get { id: String },
    /// List all jobs, newest first.
    List {
        /// Only jobs carrying this tag (e.g. a bundle id).
        #[arg(long)]
        tag: Option<String>,
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
        #[arg(long)]
        no_limit: bool,
    },
    /// Cancel a queued job.
    Cancel { id: String },
    /// Delete a terminal job and its on-disk record.
    Delete { id: String },
}

fn render_summary_row(job: &JobSummary, out: &mut dyn Write) {
    let _ = writeln!(out, "{}  {:<10}  {:<16}  {}", job.id, job.status, job.kind, job.tags.join(","));
}

pub fn run(app: &App, cmd: JobCommand, format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        JobCommand::Get { id } => {
            let view = app.manager.get(JobId::from_string(&id))?;
            let wire = JobView::new(&view.job, &view.events);
            format_or_json(format, &wire, || {
                println!("{}  {}  {}", wire.id, wire.status, wire.command_kind);
                if let Some(err) = &wire.error {
                    println!("error: {err}");
                }
                for event in &wire.events {
                    println!("  [{}] {} {}", event.at_epoch_ms, event.kind, event.message);
                }
            })
        }
        JobCommand::List { tag, limit, no_limit } => {
            let jobs = match &tag {
                Some(tag) => app.manager.list_by_tag(tag)?,
                None => app.manager.list_all()?.into_iter().map(|v| v.job).collect(),
            };
            let mut summaries: Vec<JobSummary> = jobs.iter().map(JobSummary::from).collect();
            let truncation = apply_limit(&mut summaries, limit, no_limit);
            handle_list_with_limit(format, &summaries, "No jobs found", truncation, |items, out| {
                for job in items {
                    render_summary_row(job, out);
                }
            })
        }
        JobCommand::Cancel { id } => {
            let id = JobId::from_string(&id);
            app.manager.cancel(id)?;
            format_or_json(format, &serde_json::json!({ "id": id.to_string(), "cancelled": true }), || {
                println!("Cancelled job {id}");
            })
        }
        JobCommand::Delete { id } => {
            let id = JobId::from_string(&id);
            app.manager.delete(id)?;
            format_or_json(format, &serde_json::json!({ "id": id.to_string(), "deleted": true }), || {
                println!("Deleted job {id}");
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_summary_row_does_not_panic_on_empty_tags() {
        let job = JobSummary {
            id: JobId::from_string("job-00000000000000000a"),
            status: hcagent_core::JobStatus::Queued,
            kind: hcagent_core::CommandKind::InstallModule,
            depends_on: Vec::new(),
            tags: Vec::new(),
            created_at_epoch_ms: 0,
            started_at_epoch_ms: None,
            completed_at_epoch_ms: None,
            error: None,
        };
        let mut buf = Vec::new();
        render_summary_row(&job, &mut buf);
        assert!(String::from_utf8(buf).unwrap().contains("install_module"));
    }
}
