// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real, subprocess-based [`IacExecutor`]. Shells out to the IaC binary
//! named by `HCA_IAC_BIN`, streaming its stdout and stderr into the event
//! log concurrently while the worker blocks on the child's exit.

use crate::traits::{AdapterError, IacExecutor, IacVars};
use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as ProcessCommand;

/// Invoked once per streamed output line (`stdout` or `stderr`).
pub type LineSink = std::sync::Arc<dyn Fn(&str, &str) + Send + Sync>;

#[derive(Clone)]
pub struct ProcessIacExecutor {
    bin: String,
    sink: Option<LineSink>,
}

impl ProcessIacExecutor {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into(), sink: None }
    }

    pub fn with_line_sink(mut self, sink: LineSink) -> Self {
        self.sink = Some(sink);
        self
    }

    async fn run(&self, subcommand: &str, vars: &IacVars, want_output: bool) -> Result<Option<Value>, AdapterError> {
        let mut cmd = ProcessCommand::new(&self.bin);
        cmd.arg(subcommand);
        for (k, v) in vars.as_map() {
            cmd.arg("-var").arg(format!("{k}={v}"));
        }
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            AdapterError::Iac(format!("failed to spawn '{}': {e}", self.bin))
        })?;

        let stdout = child.stdout.take().expect("piped stdout");
        let stderr = child.stderr.take().expect("piped stderr");
        let sink_out = self.sink.clone();
        let sink_err = self.sink.clone();

        let stdout_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            let mut collected = String::new();
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(sink) = &sink_out {
                    sink("stdout", &line);
                }
                collected.push_str(&line);
                collected.push('\n');
            }
            collected
        });
        let stderr_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            let mut collected = String::new();
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(sink) = &sink_err {
                    sink("stderr", &line);
                }
                collected.push_str(&line);
                collected.push('\n');
            }
            collected
        });

        let status = child.wait().await.map_err(|e| AdapterError::Iac(format!("wait failed: {e}")))?;
        let stdout_text = stdout_task.await.unwrap_or_default();
        let stderr_text = stderr_task.await.unwrap_or_default();

        if !status.success() {
            return Err(AdapterError::Iac(format!(
                "'{} {}' exited with {}: {}",
                self.bin,
                subcommand,
                status,
                stderr_text.trim()
            )));
        }

        if !want_output {
            return Ok(None);
        }

        let parsed: Value = serde_json::from_str(stdout_text.trim()).map_err(|e| {
            AdapterError::Iac(format!("could not parse '{subcommand}' output as JSON: {e}"))
        })?;
        Ok(Some(parsed))
    }
}

#[async_trait]
impl IacExecutor for ProcessIacExecutor {
    async fn init(&self, vars: &IacVars) -> Result<(), AdapterError> {
        self.run("init", vars, false).await?;
        Ok(())
    }

    async fn apply(&self, vars: &IacVars) -> Result<Value, AdapterError> {
        let out = self.run("apply", vars, true).await?;
        out.ok_or_else(|| AdapterError::Iac("apply produced no output".to_string()))
    }

    async fn destroy(&self, vars: &IacVars) -> Result<(), AdapterError> {
        self.run("destroy", vars, false).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
