// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job event log entries (spec.md §3: "Event").

use serde::{Deserialize, Serialize};

/// Short type tag for an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Info,
    Progress,
    Log,
    Step,
    Warning,
    Error,
    Final,
}

crate::simple_display! {
    EventKind {
        Info => "info",
        Progress => "progress",
        Log => "log",
        Step => "step",
        Warning => "warning",
        Error => "error",
        Final => "final",
    }
}

/// One line of a job's append-only event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Epoch milliseconds. Advisory only — append order is authoritative
    /// (spec.md §3 invariants).
    pub at_epoch_ms: u64,
    pub kind: EventKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Event {
    pub fn new(at_epoch_ms: u64, kind: EventKind, message: impl Into<String>) -> Self {
        Self { at_epoch_ms, kind, message: message.into(), data: None }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn info(at_epoch_ms: u64, message: impl Into<String>) -> Self {
        Self::new(at_epoch_ms, EventKind::Info, message)
    }

    pub fn progress(at_epoch_ms: u64, message: impl Into<String>) -> Self {
        Self::new(at_epoch_ms, EventKind::Progress, message)
    }

    pub fn warning(at_epoch_ms: u64, message: impl Into<String>) -> Self {
        Self::new(at_epoch_ms, EventKind::Warning, message)
    }

    pub fn error(at_epoch_ms: u64, message: impl Into<String>) -> Self {
        Self::new(at_epoch_ms, EventKind::Error, message)
    }

    pub fn final_event(at_epoch_ms: u64, message: impl Into<String>) -> Self {
        Self::new(at_epoch_ms, EventKind::Final, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_without_data_field_when_absent() {
        let ev = Event::info(1000, "Job enqueued");
        let json = serde_json::to_value(&ev).unwrap_or_default();
        assert!(json.get("data").is_none());
    }

    #[test]
    fn round_trips_through_json() {
        let ev = Event::error(42, "boom").with_data(serde_json::json!({"code": 7}));
        let text = serde_json::to_string(&ev).unwrap_or_default();
        let back: Event = serde_json::from_str(&text).unwrap_or_else(|_| Event::info(0, ""));
        assert_eq!(back, ev);
    }
}
