// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Worker Loop (spec.md §4.D): a single cooperative task that selects
//! one runnable job per tick, dispatches it, and persists the result. A
//! slower interval separately re-polls `pending` boot-scoped jobs.

use crate::dispatch::{dispatch, ExecutionResult, ExecutorContext, ProgressSink};
use hcagent_core::{ArgMap, Clock, Event, Job, JobId, JobStatus};
use hcagent_storage::JobManager;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const TICK_INTERVAL: Duration = Duration::from_secs(1);
const PENDING_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// The reserved argument key the Worker injects into a meta-job's args
/// before dispatch, since `Executor::execute` has no other view of the job
/// graph (spec.md §4.F: "walks the job's `depends_on` list, reads each
/// dependency's status").
const COMPONENTS_KEY: &str = "__components";

pub struct Worker<C: Clock> {
    manager: Arc<JobManager<C>>,
    ctx: ExecutorContext,
    clock: C,
}

impl<C: Clock + 'static> Worker<C> {
    pub fn new(manager: Arc<JobManager<C>>, ctx: ExecutorContext, clock: C) -> Self {
        Self { manager, ctx, clock }
    }

    /// Runs until `shutdown` is cancelled. Both intervals drive the same
    /// loop body; ticks never overlap (spec.md §4.D: "still strictly
    /// single-threaded execution").
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut tick = tokio::time::interval(TICK_INTERVAL);
        let mut pending_tick = tokio::time::interval(PENDING_RETRY_INTERVAL);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("worker loop shutting down");
                    return;
                }
                _ = tick.tick() => self.run_tick().await,
                _ = pending_tick.tick() => self.run_pending_retry().await,
            }
        }
    }

    async fn run_tick(&self) {
        let queued = match self.manager.get_queued() {
            Ok(q) => q,
            Err(e) => {
                tracing::error!(error = %e, "failed to load queued jobs");
                return;
            }
        };

        for job in queued {
            let dep_statuses: Vec<(JobId, JobStatus)> = match self.dependency_statuses(&job) {
                Ok(v) => v,
                Err(e) => {
                    tracing::error!(job_id = %job.id, error = %e, "failed to read dependency status");
                    return;
                }
            };

            if !dep_statuses.iter().all(|(_, s)| s.is_terminal()) {
                continue; // blocked on an in-flight dependency, try the next candidate
            }

            if let Some((bad_id, bad_status)) =
                dep_statuses.iter().find(|(_, s)| matches!(s, JobStatus::Failed | JobStatus::Cancelled))
            {
                self.auto_cancel(job.id, *bad_id, *bad_status);
                return; // tick ends without executing anything
            }

            self.run_job(job).await;
            return;
        }
    }

    fn dependency_statuses(&self, job: &Job) -> Result<Vec<(JobId, JobStatus)>, String> {
        job.depends_on
            .iter()
            .map(|dep| self.manager.get(*dep).map(|v| (*dep, v.job.status)).map_err(|e| e.to_string()))
            .collect()
    }

    fn auto_cancel(&self, job_id: JobId, bad_dep: JobId, bad_status: JobStatus) {
        let now = self.clock.epoch_ms();
        let message = format!("cancelled: dependency '{bad_dep}' {bad_status}");
        if let Err(e) =
            self.manager.update_status(job_id, JobStatus::Cancelled, None, Some(now), None, Some(message.clone()))
        {
            tracing::error!(job_id = %job_id, error = %e, "failed to auto-cancel job with a failed dependency");
            return;
        }
        let _ = self.manager.append_event(job_id, Event::final_event(now, message));
        tracing::info!(job_id = %job_id, %bad_dep, "auto-cancelled: dependency did not complete successfully");
    }

    async fn run_job(&self, job: Job) {
        let now = self.clock.epoch_ms();
        if let Err(e) = self.manager.update_status(job.id, JobStatus::Running, Some(now), None, None, None) {
            tracing::error!(job_id = %job.id, error = %e, "failed to start job");
            return;
        }
        let _ = self.manager.append_event(job.id, Event::info(now, "Job execution started"));
        tracing::info!(job_id = %job.id, kind = %job.command.kind, "job execution started");

        let args = self.build_invocation_args(&job);
        let executor = dispatch(job.command.kind);
        let progress = self.progress_sink(job.id);
        let metadata = job.metadata.clone();

        let result = executor.execute(&self.ctx, &args, metadata, &progress).await;

        self.settle(job, result);
    }

    fn settle(&self, job: Job, result: ExecutionResult) {
        let now = self.clock.epoch_ms();
        if let Err(e) = self.manager.update_metadata(job.id, result.metadata) {
            tracing::warn!(job_id = %job.id, error = %e, "failed to persist executor metadata");
        }

        match result.status {
            JobStatus::Completed => {
                if let Err(e) = self.manager.update_status(
                    job.id,
                    JobStatus::Completed,
                    None,
                    Some(now),
                    result.result,
                    None,
                ) {
                    tracing::error!(job_id = %job.id, error = %e, "failed to settle completed job");
                }
                let _ = self.manager.append_event(job.id, Event::final_event(now, "Job execution completed"));
                tracing::info!(job_id = %job.id, "job execution completed");
            }
            JobStatus::Failed => {
                let message = result.error.clone().unwrap_or_else(|| "unknown error".to_string());
                if let Err(e) = self.manager.update_status(
                    job.id,
                    JobStatus::Failed,
                    None,
                    Some(now),
                    result.result,
                    result.error,
                ) {
                    tracing::error!(job_id = %job.id, error = %e, "failed to settle failed job");
                }
                let _ =
                    self.manager.append_event(job.id, Event::final_event(now, format!("Job failed: {message}")));
                tracing::warn!(job_id = %job.id, kind = %job.command.kind, %message, "job execution failed");
            }
            JobStatus::Pending => {
                if let Err(e) = self.manager.update_status(job.id, JobStatus::Pending, None, None, None, None) {
                    tracing::error!(job_id = %job.id, error = %e, "failed to mark job pending");
                }
                let _ = self
                    .manager
                    .append_event(job.id, Event::progress(now, "Job execution pending, awaiting re-poll"));
            }
            other => {
                tracing::error!(job_id = %job.id, status = %other, "executor returned an impossible status");
            }
        }
    }

    /// Every ~5s, re-invokes boot-scoped `pending` jobs without re-entering
    /// `running` (spec.md §4.D). Dependencies must still be satisfied.
    async fn run_pending_retry(&self) {
        let pending = match self.manager.get_pending() {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "failed to load pending jobs");
                return;
            }
        };

        for job in pending {
            if !job.command.kind.is_boot_scoped() {
                continue;
            }
            let deps_ready = job.depends_on.iter().all(|dep| {
                matches!(self.manager.get(*dep).map(|v| v.job.status), Ok(JobStatus::Completed))
            });
            if !deps_ready {
                continue;
            }

            let executor = dispatch(job.command.kind);
            let progress = self.progress_sink(job.id);
            let args = job.command.args.clone();
            let metadata = job.metadata.clone();
            let result = executor.execute(&self.ctx, &args, metadata, &progress).await;

            if matches!(result.status, JobStatus::Pending) {
                if let Err(e) = self.manager.update_metadata(job.id, result.metadata) {
                    tracing::warn!(job_id = %job.id, error = %e, "failed to persist pending-retry metadata");
                }
                continue;
            }
            self.settle(job, result);
        }
    }

    fn progress_sink(&self, job_id: JobId) -> ProgressSink {
        let manager = self.manager.clone();
        let clock = self.clock.clone();
        ProgressSink::new(move |kind, message, data| {
            let now = clock.epoch_ms();
            let mut event = Event::new(now, kind, message);
            if let Some(d) = data {
                event = event.with_data(d);
            }
            let _ = manager.append_event(job_id, event);
        })
    }

    /// Meta-jobs (`bundle_install`/`bundle_uninstall`) get a cloned `ArgMap`
    /// carrying each dependency's terminal `(job_id, status, error)` under
    /// `__components`; everything else passes its stored args through
    /// unmodified. Never persisted — this is a per-invocation view only.
    fn build_invocation_args(&self, job: &Job) -> ArgMap {
        if !job.command.kind.is_meta() {
            return job.command.args.clone();
        }

        let mut args = job.command.args.clone();
        let components: Vec<Value> = job
            .depends_on
            .iter()
            .filter_map(|dep| self.manager.get(*dep).ok())
            .map(|view| {
                let mut obj = Map::new();
                obj.insert("job_id".to_string(), json!(view.job.id.to_string()));
                obj.insert("status".to_string(), json!(view.job.status.to_string()));
                if let Some(err) = &view.job.error {
                    obj.insert("error".to_string(), json!(err));
                }
                Value::Object(obj)
            })
            .collect();
        args.insert(COMPONENTS_KEY, json!(components));
        args
    }
}
