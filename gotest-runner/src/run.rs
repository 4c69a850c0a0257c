// Copyright (c) The gotest-action Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Spawning `go test -json` and pumping its streams through the pipeline.
//!
//! Stdout carries the newline-delimited event protocol and is fed through the
//! line framer into the aggregator; stderr is unstructured (compiler
//! diagnostics, module downloads) and is only captured raw. The two streams
//! are drained concurrently so neither pipe can fill up and stall the child,
//! but chunks within each stream are processed strictly in arrival order.

use crate::{
    aggregator::{RunAggregator, TestFinished},
    errors::RunTestsError,
    line_buffer::LineBuffer,
    time::stopwatch,
};
use bytes::BytesMut;
use chrono::{DateTime, Local};
use std::{process::Stdio, time::Duration};
use tokio::io::AsyncBufReadExt;
use tracing::{debug, info};

/// The size of each buffered reader's buffer.
const CHUNK_SIZE: usize = 4 * 1024;

/// Observes a run as it progresses.
///
/// The driver reports state, not presentation: how (and whether) these
/// callbacks are surfaced is up to the caller. All methods default to no-ops.
pub trait RunObserver {
    /// A test reached its terminal event.
    fn test_finished(&mut self, _finished: &TestFinished) {}

    /// A raw chunk arrived on the child's stdout, before framing.
    fn stdout_chunk(&mut self, _chunk: &[u8]) {}
}

/// The no-op observer.
impl RunObserver for () {}

/// An invocation of `go test -json -v` for one package pattern.
#[derive(Clone, Debug)]
pub struct GoTestCommand {
    package: String,
    extra_args: Vec<String>,
}

impl GoTestCommand {
    /// Creates a command for the given package pattern (e.g. `./...`).
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            extra_args: Vec::new(),
        }
    }

    /// Adds extra `go test` arguments from the action-input convention:
    /// semicolon-separated, whitespace-trimmed, empties dropped.
    pub fn extra_args_input(mut self, input: &str) -> Self {
        self.extra_args.extend(
            input
                .split(';')
                .map(str::trim)
                .filter(|arg| !arg.is_empty())
                .map(str::to_owned),
        );
        self
    }

    /// The full argument list passed to `go`.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["test".to_owned(), "-json".to_owned(), "-v".to_owned()];
        args.extend(self.extra_args.iter().cloned());
        args.push(self.package.clone());
        args
    }

    fn display(&self) -> String {
        format!("go {}", self.args().join(" "))
    }

    /// Runs the command to completion, feeding every stdout line through
    /// `aggregator`.
    ///
    /// A nonzero exit is not an error here -- it lands in
    /// [`RunOutput::exit_code`] for the reporter to interpret. Errors are
    /// limited to being unable to spawn or talk to the child at all.
    pub async fn run(
        &self,
        aggregator: &mut RunAggregator,
        observer: &mut impl RunObserver,
    ) -> Result<RunOutput, RunTestsError> {
        let command = self.display();
        info!("running tests as \"{command}\"");

        let watch = stopwatch();
        let mut child = tokio::process::Command::new("go")
            .args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|error| RunTestsError::Spawn {
                command: command.clone(),
                error,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or(RunTestsError::StreamMissing { stream: "stdout" })?;
        let stderr = child
            .stderr
            .take()
            .ok_or(RunTestsError::StreamMissing { stream: "stderr" })?;

        let mut stdout = tokio::io::BufReader::with_capacity(CHUNK_SIZE, stdout);
        let mut stderr = tokio::io::BufReader::with_capacity(CHUNK_SIZE, stderr);

        let mut lines = LineBuffer::new();
        let mut raw_stdout = BytesMut::new();
        let mut raw_stderr = BytesMut::new();

        let mut out_done = false;
        let mut err_done = false;

        while !out_done || !err_done {
            tokio::select! {
                res = stdout.fill_buf(), if !out_done => {
                    let read = {
                        let buf = res.map_err(RunTestsError::ReadStdout)?;
                        raw_stdout.extend_from_slice(buf);
                        observer.stdout_chunk(buf);
                        lines.push(buf, |line| {
                            if let Some(finished) = aggregator.handle_line(line) {
                                observer.test_finished(&finished);
                            }
                        });
                        buf.len()
                    };

                    stdout.consume(read);
                    out_done = read == 0;
                }
                res = stderr.fill_buf(), if !err_done => {
                    let read = {
                        let buf = res.map_err(RunTestsError::ReadStderr)?;
                        raw_stderr.extend_from_slice(buf);
                        buf.len()
                    };

                    stderr.consume(read);
                    err_done = read == 0;
                }
            };
        }

        // A crashed child can leave its final line unterminated; it still has
        // to reach the decoder.
        lines.finish(|line| {
            if let Some(finished) = aggregator.handle_line(line) {
                observer.test_finished(&finished);
            }
        });

        let status = child.wait().await.map_err(|error| RunTestsError::Wait {
            command: command.clone(),
            error,
        })?;
        debug!("`{command}` exited with {status}");

        Ok(RunOutput {
            exit_code: status.code().unwrap_or(-1),
            raw_stdout: String::from_utf8_lossy(&raw_stdout).into_owned(),
            raw_stderr: String::from_utf8_lossy(&raw_stderr).into_owned(),
            started_at: watch.start_time(),
            duration: watch.elapsed(),
        })
    }
}

/// Everything captured from one subprocess invocation, alongside the
/// aggregator the caller fed it through.
#[derive(Clone, Debug)]
pub struct RunOutput {
    /// The child's exit code. Termination by signal is folded into `-1`:
    /// all the reporter needs to know is that it was nonzero.
    pub exit_code: i32,

    /// The complete raw stdout, kept for the infra-failure dump.
    pub raw_stdout: String,

    /// The complete raw stderr. Not part of the event protocol; may contain
    /// module downloads as well as real errors.
    pub raw_stderr: String,

    /// When the run started.
    pub started_at: DateTime<Local>,

    /// Wall-clock duration of the whole subprocess run.
    pub duration: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn args_are_assembled_in_order() {
        let command = GoTestCommand::new("./...").extra_args_input(" -race ; -count=1 ;; ");
        assert_eq!(command.args(), ["test", "-json", "-v", "-race", "-count=1", "./..."]);
    }

    #[test]
    fn empty_args_input_adds_nothing() {
        let command = GoTestCommand::new("./pkg").extra_args_input("");
        assert_eq!(command.args(), ["test", "-json", "-v", "./pkg"]);
    }
}
