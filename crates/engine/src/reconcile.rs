// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup reconciliation (spec.md §4.G): on agent start, re-drives every
//! `pending` boot-scoped job against the active INI files so a reboot that
//! happened mid-poll does not strand a job in `pending` forever. Matching
//! is by the sanitized resource id carried in the job's own metadata (the
//! same key `check_active` already uses); each active section's
//! `request_id` is read back only for a visibility cross-check, never as
//! the primary key (DESIGN.md OQ-2).

use crate::bootcfg::{ActiveIni, PendingIni, ResourceKind};
use crate::dispatch::{dispatch, ExecutionResult, ExecutorContext, ProgressSink};
use hcagent_core::{Clock, Event, JobStatus};
use hcagent_storage::{JobManager, ManagerError};
use std::sync::Arc;

const RESOURCE_KINDS: [ResourceKind; 3] = [ResourceKind::Disk, ResourceKind::Mount, ResourceKind::Path];

/// Runs once at daemon startup, before the Worker Loop begins ticking.
pub async fn reconcile_startup<C: Clock + 'static>(
    manager: &Arc<JobManager<C>>,
    ctx: &ExecutorContext,
    clock: &C,
) -> Result<(), ManagerError> {
    log_outstanding_pending_entries(ctx);

    let pending_jobs: Vec<_> =
        manager.get_pending()?.into_iter().filter(|j| j.command.kind.is_boot_scoped()).collect();

    for job in pending_jobs {
        let executor = dispatch(job.command.kind);
        let progress = ProgressSink::new({
            let sink_manager = manager.clone();
            let sink_clock = clock.clone();
            let job_id = job.id;
            move |kind, message, data| {
                let now = sink_clock.epoch_ms();
                let mut event = Event::new(now, kind, message);
                if let Some(d) = data {
                    event = event.with_data(d);
                }
                let _ = sink_manager.append_event(job_id, event);
            }
        });

        let result: ExecutionResult =
            executor.execute(ctx, &job.command.args, job.metadata.clone(), &progress).await;

        manager.update_metadata(job.id, result.metadata)?;
        match result.status {
            JobStatus::Pending => {
                tracing::info!(job_id = %job.id, "reconciliation: job remains pending, awaiting boot service");
            }
            JobStatus::Completed => {
                let now = clock.epoch_ms();
                manager.update_status(job.id, JobStatus::Completed, None, Some(now), result.result, None)?;
                manager.append_event(job.id, Event::final_event(now, "Job execution completed (reconciled)"))?;
                tracing::info!(job_id = %job.id, "reconciliation: job completed across restart");
            }
            JobStatus::Failed => {
                let now = clock.epoch_ms();
                let message = result.error.clone().unwrap_or_else(|| "unknown error".to_string());
                manager.update_status(job.id, JobStatus::Failed, None, Some(now), result.result, result.error)?;
                manager.append_event(
                    job.id,
                    Event::final_event(now, format!("Job failed: {message} (reconciled)")),
                )?;
                tracing::warn!(job_id = %job.id, %message, "reconciliation: job failed across restart");
            }
            other => {
                tracing::error!(job_id = %job.id, status = %other, "reconciliation: impossible executor status");
            }
        }
    }

    Ok(())
}

/// Sweeps `<kind>.pending.ini` for sections the boot service has not yet
/// acted on and `<kind>.ini` for their resolved counterparts, logging both
/// for operator visibility only — no job state is mutated here.
fn log_outstanding_pending_entries(ctx: &ExecutorContext) {
    for kind in RESOURCE_KINDS {
        match PendingIni::new(kind, &ctx.sysconfdir).section_names() {
            Ok(names) => {
                for name in names {
                    tracing::info!(kind = ?kind, section = %name, "pending boot-service request outstanding");
                }
            }
            Err(e) => tracing::warn!(kind = ?kind, error = %e, "failed to read pending ini for reconciliation"),
        }
        if let Ok(active) = ActiveIni::load(kind, &ctx.sysconfdir) {
            for (name, section) in active.entries() {
                tracing::debug!(
                    kind = ?kind,
                    section = %name,
                    status = ?section.status(),
                    request_id = ?section.request_id(),
                    "active boot-service entry observed at startup"
                );
            }
        }
    }
}
