// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thread-safe façade over the [`JobStore`] and the dependency graph
//! (spec.md §4.C). A single [`parking_lot::RwLock`] guards every
//! store-touching operation; internal helpers never re-lock.

use crate::graph::{self, GraphError, Node};
use crate::store::{StoreError, JobStore};
use hcagent_core::{Clock, Command, Event, Job, JobId, JobStatus, Metadata};
use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnqueueError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("job '{0}' not found")]
    NotFound(JobId),
    #[error("job '{0}' is not queued (status: {1})")]
    NotQueued(JobId, JobStatus),
    #[error("job '{0}' is running and cannot be deleted")]
    RunningCannotBeDeleted(JobId),
    #[error("invalid status transition for job '{0}': {1} -> {2}")]
    InvalidTransition(JobId, JobStatus, JobStatus),
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// A job's metadata plus its full event log (spec.md §4.C: "Get").
#[derive(Debug, Clone)]
pub struct JobView {
    pub job: Job,
    pub events: Vec<Event>,
}

pub struct JobManager<C: Clock> {
    store: JobStore,
    clock: C,
    lock: RwLock<()>,
}

impl<C: Clock> JobManager<C> {
    pub fn new(store: JobStore, clock: C) -> Self {
        Self { store, clock, lock: RwLock::new(()) }
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    /// spec.md §4.C: "Enqueue(command, depends_on) → job-id | Error."
    pub fn enqueue(&self, command: Command, depends_on: Vec<JobId>) -> Result<JobId, EnqueueError> {
        let _guard = self.lock.write();
        let existing = self.load_dependency_map()?;
        let id = JobId::new();
        graph::validate_new_dependencies(id, &depends_on, &existing)?;

        let now = self.clock.epoch_ms();
        let job = Job::new(id, command, depends_on, now);
        let initial_event = Event::info(now, "Job enqueued");
        self.store.create(&job, &initial_event)?;
        Ok(id)
    }

    fn load_dependency_map(&self) -> Result<HashMap<JobId, Vec<JobId>>, StoreError> {
        let mut map = HashMap::new();
        for id in self.store.list_ids()? {
            let job = self.store.read_job(&id)?;
            map.insert(id, job.depends_on);
        }
        Ok(map)
    }

    /// spec.md §4.C: "Get(id) → JobView | NotFound."
    pub fn get(&self, id: JobId) -> Result<JobView, ManagerError> {
        let _guard = self.lock.read();
        self.get_locked(id)
    }

    fn get_locked(&self, id: JobId) -> Result<JobView, ManagerError> {
        let job = self.store.read_job(&id).map_err(|e| match e {
            StoreError::NotFound(id) => ManagerError::NotFound(id),
            other => ManagerError::Store(other),
        })?;
        let events = self.store.read_events(&id)?;
        Ok(JobView { job, events })
    }

    /// spec.md §4.C: "ListAll() → [JobView]. All jobs, newest-created first."
    pub fn list_all(&self) -> Result<Vec<JobView>, ManagerError> {
        let _guard = self.lock.read();
        let mut views = self.all_job_views_locked()?;
        views.sort_by(|a, b| b.job.created_at_epoch_ms.cmp(&a.job.created_at_epoch_ms));
        Ok(views)
    }

    fn all_jobs_locked(&self) -> Result<Vec<Job>, ManagerError> {
        let mut jobs = Vec::new();
        for id in self.store.list_ids()? {
            match self.store.read_job(&id) {
                Ok(job) => jobs.push(job),
                Err(StoreError::Corrupt(id, reason)) => {
                    tracing::error!(job_id = %id, reason, "skipping corrupt job");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(jobs)
    }

    fn all_job_views_locked(&self) -> Result<Vec<JobView>, ManagerError> {
        let mut views = Vec::new();
        for job in self.all_jobs_locked()? {
            let events = self.store.read_events(&job.id)?;
            views.push(JobView { job, events });
        }
        Ok(views)
    }

    /// spec.md §4.C: "ListAllTopoSorted() → [JobView]. All jobs,
    /// topologically ordered across the full set."
    pub fn list_all_topo_sorted(&self) -> Result<Vec<JobView>, ManagerError> {
        let _guard = self.lock.read();
        let jobs = self.all_jobs_locked()?;
        let by_id: HashMap<JobId, Job> = jobs.into_iter().map(|j| (j.id, j)).collect();
        let nodes: Vec<Node> =
            by_id.values().map(|j| Node { id: j.id, depends_on: j.depends_on.clone() }).collect();
        let order = graph::topo_sort(nodes);
        let mut views = Vec::with_capacity(order.len());
        for id in order {
            if let Some(job) = by_id.get(&id) {
                let events = self.store.read_events(&id)?;
                views.push(JobView { job: job.clone(), events });
            }
        }
        Ok(views)
    }

    /// spec.md §4.C / §4.D: "GetQueued() → [Job]. Just the queued set,
    /// topologically ordered as above."
    pub fn get_queued(&self) -> Result<Vec<Job>, ManagerError> {
        let _guard = self.lock.read();
        let jobs = self.all_jobs_locked()?;
        let queued: HashMap<JobId, Job> =
            jobs.into_iter().filter(|j| j.status == JobStatus::Queued).map(|j| (j.id, j)).collect();
        let nodes: Vec<Node> =
            queued.values().map(|j| Node { id: j.id, depends_on: j.depends_on.clone() }).collect();
        let order = graph::topo_sort(nodes);
        Ok(order.into_iter().filter_map(|id| queued.get(&id).cloned()).collect())
    }

    /// spec.md §4.C: "GetPending() → [Job]. The pending set, unordered."
    pub fn get_pending(&self) -> Result<Vec<Job>, ManagerError> {
        let _guard = self.lock.read();
        Ok(self.all_jobs_locked()?.into_iter().filter(|j| j.status == JobStatus::Pending).collect())
    }

    /// spec.md §4.C: jobs tagged with a bundle id, used to correlate a
    /// bundle's component jobs.
    pub fn list_by_tag(&self, tag: &str) -> Result<Vec<Job>, ManagerError> {
        let _guard = self.lock.read();
        Ok(self.all_jobs_locked()?.into_iter().filter(|j| j.has_tag(tag)).collect())
    }

    /// spec.md §4.C: "Cancel(id) → Ok | Error. Only valid when current
    /// status is queued... cascades."
    pub fn cancel(&self, id: JobId) -> Result<(), ManagerError> {
        let _guard = self.lock.write();
        let mut job = self.read_job_locked(id)?;
        if job.status != JobStatus::Queued {
            return Err(ManagerError::NotQueued(id, job.status));
        }
        let now = self.clock.epoch_ms();
        job.status = JobStatus::Cancelled;
        job.error = Some("cancelled by user".to_string());
        job.completed_at_epoch_ms = Some(now);
        self.store.save(&job)?;
        self.store.append_event(&id, &Event::final_event(now, "cancelled by user"))?;
        self.cascade_cancel_locked(id, "cancelled by user")?;
        Ok(())
    }

    /// spec.md §4.C: "Delete(id) → Ok | Error. Forbidden when running;
    /// otherwise removes the directory."
    pub fn delete(&self, id: JobId) -> Result<(), ManagerError> {
        let _guard = self.lock.write();
        let job = self.read_job_locked(id)?;
        if job.status == JobStatus::Running {
            return Err(ManagerError::RunningCannotBeDeleted(id));
        }
        self.store.delete(&id)?;
        Ok(())
    }

    /// Deletes every job whose status is not `running`, matching a
    /// predicate over the status. Backs the bulk `DELETE /jobs` endpoint
    /// named in spec.md §6.
    pub fn delete_where(&self, predicate: impl Fn(JobStatus) -> bool) -> Result<usize, ManagerError> {
        let _guard = self.lock.write();
        let jobs = self.all_jobs_locked()?;
        let mut count = 0;
        for job in jobs {
            if job.status == JobStatus::Running {
                continue;
            }
            if predicate(job.status) {
                self.store.delete(&job.id)?;
                count += 1;
            }
        }
        Ok(count)
    }

    /// spec.md §4.C: "UpdateStatus(id, status, startedAt?, completedAt?,
    /// result?, err) → Ok. The sole path by which the Worker mutates a
    /// job's lifecycle fields."
    #[allow(clippy::too_many_arguments)]
    pub fn update_status(
        &self,
        id: JobId,
        status: JobStatus,
        started_at_epoch_ms: Option<u64>,
        completed_at_epoch_ms: Option<u64>,
        result: Option<serde_json::Value>,
        error: Option<String>,
    ) -> Result<(), ManagerError> {
        let _guard = self.lock.write();
        let mut job = self.read_job_locked(id)?;
        if !job.status.can_transition_to(status) {
            return Err(ManagerError::InvalidTransition(id, job.status, status));
        }
        job.status = status;
        if let Some(t) = started_at_epoch_ms {
            job.started_at_epoch_ms = Some(t);
        }
        if let Some(t) = completed_at_epoch_ms {
            job.completed_at_epoch_ms = Some(t);
        }
        if result.is_some() {
            job.result = result;
        }
        if error.is_some() {
            job.error = error;
        }
        self.store.save(&job)?;

        if status.is_terminal() {
            if matches!(status, JobStatus::Failed | JobStatus::Cancelled) {
                let reason = job.error.clone().unwrap_or_else(|| status.to_string());
                self.cascade_cancel_locked(id, &reason)?;
            }
        }
        Ok(())
    }

    /// spec.md §4.C: "UpdateMetadata(id, map) → Ok. Merges a partial
    /// metadata map into the job's opaque metadata."
    pub fn update_metadata(&self, id: JobId, partial: Metadata) -> Result<(), ManagerError> {
        let _guard = self.lock.write();
        let mut job = self.read_job_locked(id)?;
        for (k, v) in partial {
            job.metadata.insert(k, v);
        }
        self.store.save(&job)?;
        Ok(())
    }

    /// spec.md §4.C: "AppendEvent(id, event) → Ok. Appends one line to the
    /// job's event log."
    pub fn append_event(&self, id: JobId, event: Event) -> Result<(), ManagerError> {
        let _guard = self.lock.write();
        self.store.append_event(&id, &event).map_err(|e| match e {
            StoreError::NotFound(id) => ManagerError::NotFound(id),
            other => ManagerError::Store(other),
        })
    }

    fn read_job_locked(&self, id: JobId) -> Result<Job, ManagerError> {
        self.store.read_job(&id).map_err(|e| match e {
            StoreError::NotFound(id) => ManagerError::NotFound(id),
            other => ManagerError::Store(other),
        })
    }

    /// spec.md §3 / §4.C: "Cascade cancel." Given a just-finished job with a
    /// terminal failed/cancelled status, every still-queued transitive
    /// dependent is cancelled with a message attributing the cause. Never
    /// traverses non-queued dependents. Each level's message names its own
    /// *direct* dependency, not the root cause: for A ← B ← C with A
    /// failing, B's message names A, and C's (cascaded from B, not A)
    /// names B, each reason derived from that job's own status/error.
    fn cascade_cancel_locked(&self, cause_id: JobId, cause_reason: &str) -> Result<(), ManagerError> {
        let jobs = self.all_jobs_locked()?;
        let mut dependents: HashMap<JobId, Vec<JobId>> = HashMap::new();
        for job in &jobs {
            for dep in &job.depends_on {
                dependents.entry(*dep).or_default().push(job.id);
            }
        }
        let by_id: HashMap<JobId, Job> = jobs.into_iter().map(|j| (j.id, j)).collect();

        let mut reasons: HashMap<JobId, String> = HashMap::new();
        reasons.insert(cause_id, cause_reason.to_string());

        let mut queue = vec![cause_id];
        let mut visited = std::collections::HashSet::new();
        while let Some(finished_id) = queue.pop() {
            if !visited.insert(finished_id) {
                continue;
            }
            let Some(direct) = dependents.get(&finished_id) else { continue };
            let finished_reason = reasons.get(&finished_id).cloned().unwrap_or_else(|| finished_id.to_string());
            for dependent_id in direct {
                let Some(dependent) = by_id.get(dependent_id) else { continue };
                if dependent.status != JobStatus::Queued {
                    continue;
                }
                let now = self.clock.epoch_ms();
                let mut updated = dependent.clone();
                updated.status = JobStatus::Cancelled;
                let message = format!("cancelled: dependency '{finished_id}' {finished_reason}");
                updated.error = Some(message.clone());
                updated.completed_at_epoch_ms = Some(now);
                self.store.save(&updated)?;
                self.store.append_event(dependent_id, &Event::final_event(now, message.clone()))?;
                reasons.insert(*dependent_id, message);
                queue.push(*dependent_id);
            }
        }
        Ok(())
    }

}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
