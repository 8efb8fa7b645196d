// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifier, status, and the durable job record.

use crate::command::Command;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

crate::define_id! {
    /// Unique identifier for a job instance.
    pub struct JobId("job-");
}

/// Status of a job (spec.md §3: "JobStatus").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    /// Executor voluntarily suspended, awaiting external completion.
    Pending,
    Completed,
    Failed,
    Cancelled,
}

crate::simple_display! {
    JobStatus {
        Queued => "queued",
        Running => "running",
        Pending => "pending",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled)
    }

    /// Validates a status transition against spec.md §3's invariant table.
    /// Terminal statuses are sticky; `pending` may only be reached from
    /// `running` or re-entered from `pending` itself.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (Queued, Running)
                | (Queued, Cancelled)
                | (Running, Completed)
                | (Running, Failed)
                | (Running, Pending)
                | (Pending, Completed)
                | (Pending, Failed)
                | (Pending, Pending)
        )
    }
}

/// Opaque, executor-owned cross-invocation state (spec.md §3: "optional
/// executor metadata"). The Manager never interprets its contents.
pub type Metadata = Map<String, Value>;

/// A job instance (spec.md §3: "Job").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    pub command: Command,
    #[serde(default)]
    pub depends_on: Vec<JobId>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: Metadata,
    pub created_at_epoch_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_epoch_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at_epoch_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Job {
    pub fn new(id: JobId, command: Command, depends_on: Vec<JobId>, created_at_epoch_ms: u64) -> Self {
        let tags = command.extract_tags();
        Self {
            id,
            status: JobStatus::Queued,
            command,
            depends_on,
            tags,
            metadata: Metadata::new(),
            created_at_epoch_ms,
            started_at_epoch_ms: None,
            completed_at_epoch_ms: None,
            result: None,
            error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
