// Copyright (c) The gotest-action Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Output surfaces: GitHub Actions workflow commands and plain console.
//!
//! The core reporter only emits structured calls through a `ReportSink`; this
//! module decides what those look like on screen. On a runner (detected via
//! `GITHUB_ACTIONS`) we speak the workflow-command protocol so failures show
//! up as annotations in the PR view; locally we fall back to colored text.

use camino::Utf8Path;
use gotest_runner::{
    aggregator::{Outcome, TestFinished},
    reporter::{MessageLevel, ReportSink},
    run::RunObserver,
    settings::RunSettings,
};
use owo_colors::{OwoColorize, Style, style};
use std::io::Write;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

/// Initializes the tracing subscriber. Diagnostics (skipped lines, failed
/// path resolutions) go to stderr; `GOTEST_LOG` overrides the level.
pub(crate) fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var("GOTEST_LOG")
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Picks the sink matching the environment.
pub(crate) fn sink_for_environment() -> Box<dyn ReportSink> {
    if running_on_actions() {
        Box::new(WorkflowSink::new())
    } else {
        Box::new(ConsoleSink::new())
    }
}

fn running_on_actions() -> bool {
    std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true")
}

/// Escapes message data for a workflow command.
fn escape_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escapes a command property value, which additionally reserves `:` and `,`.
fn escape_property(prop: &str) -> String {
    escape_data(prop).replace(':', "%3A").replace(',', "%2C")
}

/// Emits GitHub Actions workflow commands on stdout.
///
/// The command protocol is line-oriented: `::error::msg`,
/// `::group::title`/`::endgroup::`, and file annotations via
/// `::error file=path,line=N::msg`.
#[derive(Debug, Default)]
pub(crate) struct WorkflowSink;

impl WorkflowSink {
    pub(crate) fn new() -> Self {
        Self
    }
}

impl ReportSink for WorkflowSink {
    fn message(&mut self, level: MessageLevel, text: &str) {
        match level {
            MessageLevel::Info => println!("{text}"),
            MessageLevel::Warning => println!("::warning::{}", escape_data(text)),
            MessageLevel::Error => println!("::error::{}", escape_data(text)),
        }
    }

    fn start_group(&mut self, title: &str) {
        println!("::group::{}", escape_data(title));
    }

    fn end_group(&mut self) {
        println!("::endgroup::");
    }

    fn annotate(&mut self, path: &Utf8Path, line: u64, message: &str) {
        println!(
            "::error file={},line={line}::{}",
            escape_property(path.as_str()),
            escape_data(message)
        );
    }

    fn run_failed(&mut self, reason: &str) {
        // The exit code carries the failed state; the command just makes the
        // reason show up as an annotation at the top of the run.
        println!("::error::{}", escape_data(reason));
    }
}

/// Styles for console output, matching the original action's palette.
#[derive(Clone, Debug)]
struct Styles {
    pass: Style,
    fail: Style,
    slow: Style,
}

impl Styles {
    fn colored() -> Self {
        Self {
            pass: style().green(),
            fail: style().red(),
            slow: style().yellow(),
        }
    }
}

/// Plain colored output for local runs.
#[derive(Debug)]
pub(crate) struct ConsoleSink {
    styles: Styles,
}

impl ConsoleSink {
    pub(crate) fn new() -> Self {
        Self {
            styles: Styles::colored(),
        }
    }
}

impl ReportSink for ConsoleSink {
    fn message(&mut self, level: MessageLevel, text: &str) {
        match level {
            MessageLevel::Info => println!("{text}"),
            MessageLevel::Warning => println!("{}", text.style(self.styles.slow)),
            MessageLevel::Error => println!("{}", text.style(self.styles.fail)),
        }
    }

    fn start_group(&mut self, title: &str) {
        println!("{}", title.bold());
    }

    fn end_group(&mut self) {
        println!();
    }

    fn annotate(&mut self, path: &Utf8Path, line: u64, message: &str) {
        println!("  {path}:{line}: {message}");
    }

    fn run_failed(&mut self, reason: &str) {
        println!("{}", reason.style(self.styles.fail).bold());
    }
}

/// Live per-test progress, fed by the run driver as terminal events arrive.
#[derive(Debug)]
pub(crate) struct LiveProgress {
    settings: RunSettings,
    styles: Styles,
}

impl LiveProgress {
    pub(crate) fn new(settings: RunSettings) -> Self {
        Self {
            settings,
            styles: Styles::colored(),
        }
    }
}

impl RunObserver for LiveProgress {
    fn test_finished(&mut self, finished: &TestFinished) {
        let TestFinished {
            key,
            elapsed,
            outcome,
        } = finished;
        match outcome {
            Outcome::Fail => {
                if self.settings.is_long_running(*elapsed) {
                    println!("{}", format!("{key} took {elapsed}s to fail").style(self.styles.slow));
                }
                if !self.settings.show_stdout {
                    println!("{}", format!("{key} failed in {elapsed}s").style(self.styles.fail));
                }
            }
            Outcome::Pass => {
                if self.settings.is_long_running(*elapsed) {
                    println!("{}", format!("{key} passed in {elapsed}s").style(self.styles.slow));
                } else if !self.settings.show_stdout && self.settings.show_passed_tests {
                    println!("{}", format!("{key} passed in {elapsed}s").style(self.styles.pass));
                }
            }
        }
    }

    fn stdout_chunk(&mut self, chunk: &[u8]) {
        if self.settings.show_stdout {
            // Raw passthrough; the stream is already line-oriented text.
            let mut stdout = std::io::stdout().lock();
            let _ = stdout.write_all(chunk);
        }
    }
}
