// Copyright (c) The gotest-action Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::{Utf8Path, Utf8PathBuf};

/// Severity of a reporter message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MessageLevel {
    /// Informational, e.g. the final summary.
    Info,
    /// Noteworthy but not failing, e.g. a long-running test.
    Warning,
    /// A failing test's detail block.
    Error,
}

/// Where reporter output goes.
///
/// Implemented by the binary for GitHub Actions workflow commands and for
/// plain console output, and by [`RecordingSink`] for tests. Methods are
/// infallible: a sink that can't write has nowhere better to report that.
pub trait ReportSink {
    /// Emits one message at the given level.
    fn message(&mut self, level: MessageLevel, text: &str);

    /// Opens a titled, collapsible block. Blocks do not nest.
    fn start_group(&mut self, title: &str);

    /// Closes the current block.
    fn end_group(&mut self);

    /// Emits a source-location annotation.
    fn annotate(&mut self, path: &Utf8Path, line: u64, message: &str);

    /// Marks the whole run as failed with a reason. May be called more than
    /// once; every reason is surfaced.
    fn run_failed(&mut self, reason: &str);
}

impl<S: ReportSink + ?Sized> ReportSink for Box<S> {
    fn message(&mut self, level: MessageLevel, text: &str) {
        (**self).message(level, text);
    }

    fn start_group(&mut self, title: &str) {
        (**self).start_group(title);
    }

    fn end_group(&mut self) {
        (**self).end_group();
    }

    fn annotate(&mut self, path: &Utf8Path, line: u64, message: &str) {
        (**self).annotate(path, line, message);
    }

    fn run_failed(&mut self, reason: &str) {
        (**self).run_failed(reason);
    }
}

/// One recorded sink call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SinkEvent {
    /// A [`ReportSink::message`] call.
    Message {
        /// The level.
        level: MessageLevel,
        /// The text.
        text: String,
    },
    /// A [`ReportSink::start_group`] call.
    StartGroup(String),
    /// A [`ReportSink::end_group`] call.
    EndGroup,
    /// A [`ReportSink::annotate`] call.
    Annotation {
        /// The repository-relative path.
        path: Utf8PathBuf,
        /// The 1-based line.
        line: u64,
        /// The grouped diagnostic text.
        message: String,
    },
    /// A [`ReportSink::run_failed`] call.
    RunFailed(String),
}

/// A sink that records every call, for asserting on reporter behavior.
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// The calls, in order.
    pub events: Vec<SinkEvent>,
}

impl RecordingSink {
    /// Creates an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded annotations, in order.
    pub fn annotations(&self) -> Vec<&SinkEvent> {
        self.events
            .iter()
            .filter(|event| matches!(event, SinkEvent::Annotation { .. }))
            .collect()
    }

    /// The recorded run-failure reasons, in order.
    pub fn failure_reasons(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SinkEvent::RunFailed(reason) => Some(reason.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl ReportSink for RecordingSink {
    fn message(&mut self, level: MessageLevel, text: &str) {
        self.events.push(SinkEvent::Message {
            level,
            text: text.to_owned(),
        });
    }

    fn start_group(&mut self, title: &str) {
        self.events.push(SinkEvent::StartGroup(title.to_owned()));
    }

    fn end_group(&mut self) {
        self.events.push(SinkEvent::EndGroup);
    }

    fn annotate(&mut self, path: &Utf8Path, line: u64, message: &str) {
        self.events.push(SinkEvent::Annotation {
            path: path.to_owned(),
            line,
            message: message.to_owned(),
        });
    }

    fn run_failed(&mut self, reason: &str) {
        self.events.push(SinkEvent::RunFailed(reason.to_owned()));
    }
}
