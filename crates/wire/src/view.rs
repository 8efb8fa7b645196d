// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-side DTOs: the shapes `GET /jobs` and `GET /jobs/{id}` (spec.md §6)
//! would serialize, built from [`hcagent_core::Job`] and
//! [`hcagent_core::Event`] rather than exposing the core types directly so
//! that a wire/on-disk divergence never leaks into the HTTP contract.

use hcagent_core::{Command, CommandKind, Event, EventKind, Job, JobId, JobStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One line of a job's event log, as the wire would carry it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventView {
    pub at_epoch_ms: u64,
    pub kind: EventKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<&Event> for EventView {
    fn from(e: &Event) -> Self {
        Self { at_epoch_ms: e.at_epoch_ms, kind: e.kind, message: e.message.clone(), data: e.data.clone() }
    }
}

/// A row in `GET /jobs`'s listing — no event log, matching spec.md §6's
/// distinction between the list and detail shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: JobId,
    pub status: JobStatus,
    pub kind: CommandKind,
    pub depends_on: Vec<JobId>,
    pub tags: Vec<String>,
    pub created_at_epoch_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_epoch_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at_epoch_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id,
            status: job.status,
            kind: job.command.kind,
            depends_on: job.depends_on.clone(),
            tags: job.tags.clone(),
            created_at_epoch_ms: job.created_at_epoch_ms,
            started_at_epoch_ms: job.started_at_epoch_ms,
            completed_at_epoch_ms: job.completed_at_epoch_ms,
            error: job.error.clone(),
        }
    }
}

/// `GET /jobs/{id}`'s response shape (spec.md §4.C: "Get(id) → JobView"):
/// the full job record plus its complete event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobView {
    pub id: JobId,
    pub status: JobStatus,
    pub command_kind: CommandKind,
    pub args: Value,
    pub depends_on: Vec<JobId>,
    pub tags: Vec<String>,
    pub metadata: Value,
    pub created_at_epoch_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_epoch_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at_epoch_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub events: Vec<EventView>,
}

impl JobView {
    pub fn new(job: &Job, events: &[Event]) -> Self {
        let Command { kind, args } = job.command.clone();
        Self {
            id: job.id,
            status: job.status,
            command_kind: kind,
            args: serde_json::to_value(args.0).unwrap_or(Value::Null),
            depends_on: job.depends_on.clone(),
            tags: job.tags.clone(),
            metadata: Value::Object(job.metadata.clone()),
            created_at_epoch_ms: job.created_at_epoch_ms,
            started_at_epoch_ms: job.started_at_epoch_ms,
            completed_at_epoch_ms: job.completed_at_epoch_ms,
            result: job.result.clone(),
            error: job.error.clone(),
            events: events.iter().map(EventView::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcagent_core::{ArgMap, CommandKind};
    use serde_json::json;

    #[test]
    fn job_view_serializes_args_as_plain_object() {
        let mut args = ArgMap::new();
        args.insert("id", json!("m1"));
        let command = Command::new(CommandKind::InstallModule, args);
        let job = Job::new(JobId::new(), command, Vec::new(), 1000);

        let view = JobView::new(&job, &[]);
        let json = serde_json::to_value(&view).expect("serialize");
        assert_eq!(json["args"]["id"], "m1");
        assert_eq!(json["command_kind"], "install_module");
    }

    #[test]
    fn job_summary_omits_event_log() {
        let command = Command::new(CommandKind::InstallModule, ArgMap::new());
        let job = Job::new(JobId::new(), command, Vec::new(), 1000);
        let summary = JobSummary::from(&job);
        let json = serde_json::to_value(&summary).expect("serialize");
        assert!(json.get("events").is_none());
    }
}
