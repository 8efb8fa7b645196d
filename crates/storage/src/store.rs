// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable per-job directory storage: `job.json` (atomic whole-file writes)
//! and `events.jsonl` (append-only). See spec.md §4.A.

use hcagent_core::{Event, Job, JobId};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("job '{0}' not found")]
    NotFound(JobId),
    #[error("job '{0}' data is corrupt: {1}")]
    Corrupt(JobId, String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

const JOB_FILE: &str = "job.json";
const EVENTS_FILE: &str = "events.jsonl";

/// Owns the on-disk job directory tree. The only writer of `job.json` and
/// `events.jsonl`; callers serialize access through [`crate::manager::JobManager`]'s
/// lock, not through this type.
pub struct JobStore {
    root: PathBuf,
}

impl JobStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn job_dir(&self, id: &JobId) -> PathBuf {
        self.root.join(id.as_str())
    }

    /// Writes a brand-new job directory: `job.json` plus the initial event.
    pub fn create(&self, job: &Job, initial_event: &Event) -> Result<(), StoreError> {
        let dir = self.job_dir(&job.id);
        fs::create_dir_all(&dir)?;
        self.write_job_file(&dir, job)?;
        self.append_event_file(&job.id, &dir, initial_event)?;
        Ok(())
    }

    /// Overwrites `job.json` atomically: serialize to a temp sibling, then
    /// rename over the target. Rename is atomic on the same filesystem.
    pub fn save(&self, job: &Job) -> Result<(), StoreError> {
        let dir = self.job_dir(&job.id);
        self.write_job_file(&dir, job)
    }

    fn write_job_file(&self, dir: &Path, job: &Job) -> Result<(), StoreError> {
        let final_path = dir.join(JOB_FILE);
        let tmp_path = dir.join(format!("{JOB_FILE}.tmp.{}", std::process::id()));
        let bytes = serde_json::to_vec_pretty(job)
            .map_err(|e| StoreError::Corrupt(job.id, e.to_string()))?;
        {
            let mut f = fs::File::create(&tmp_path)?;
            f.write_all(&bytes)?;
            f.sync_all()?;
        }
        fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }

    pub fn append_event(&self, id: &JobId, event: &Event) -> Result<(), StoreError> {
        let dir = self.job_dir(id);
        if !dir.exists() {
            return Err(StoreError::NotFound(*id));
        }
        self.append_event_file(id, &dir, event)
    }

    fn append_event_file(&self, id: &JobId, dir: &Path, event: &Event) -> Result<(), StoreError> {
        let line = serde_json::to_string(event).map_err(|e| StoreError::Corrupt(*id, e.to_string()))?;
        let mut f = fs::OpenOptions::new().create(true).append(true).open(dir.join(EVENTS_FILE))?;
        writeln!(f, "{line}")?;
        f.sync_all()?;
        Ok(())
    }

    /// Reads a job's metadata file only (no event log).
    pub fn read_job(&self, id: &JobId) -> Result<Job, StoreError> {
        let dir = self.job_dir(id);
        let path = dir.join(JOB_FILE);
        if !path.exists() {
            return Err(StoreError::NotFound(*id));
        }
        let bytes = fs::read(&path)?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt(*id, e.to_string()))
    }

    /// Reads the full, ordered event log for a job.
    pub fn read_events(&self, id: &JobId) -> Result<Vec<Event>, StoreError> {
        let path = self.job_dir(id).join(EVENTS_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let f = fs::File::open(&path)?;
        let reader = BufReader::new(f);
        let mut events = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let event: Event = serde_json::from_str(&line)
                .map_err(|e| StoreError::Corrupt(*id, format!("bad event line: {e}")))?;
            events.push(event);
        }
        Ok(events)
    }

    /// Enumerates job ids present on disk. A directory missing `job.json`
    /// is treated as not-yet-fully-written and skipped (spec.md §4.A: "a
    /// missing directory is the only proof of non-existence").
    pub fn list_ids(&self) -> Result<Vec<JobId>, StoreError> {
        let mut ids = Vec::new();
        let entries = match fs::read_dir(&self.root) {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !entry.path().join(JOB_FILE).exists() {
                tracing::warn!(job_dir = %name, "skipping job directory without job.json");
                continue;
            }
            ids.push(JobId::from_string(name));
        }
        Ok(ids)
    }

    /// Removes a job's entire directory. Callers must already have verified
    /// the job is not `running` (spec.md §4.C: "Forbidden when running").
    pub fn delete(&self, id: &JobId) -> Result<(), StoreError> {
        let dir = self.job_dir(id);
        if !dir.exists() {
            return Err(StoreError::NotFound(*id));
        }
        fs::remove_dir_all(&dir)?;
        Ok(())
    }

    pub fn exists(&self, id: &JobId) -> bool {
        self.job_dir(id).join(JOB_FILE).exists()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
