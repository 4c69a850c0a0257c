// Copyright (c) The gotest-action Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Folds the event stream into per-test records and classification sets.
//!
//! One [`RunAggregator`] is owned by a single run invocation; there is no
//! shared or global state. The driver feeds it completed lines in arrival
//! order, so no locking is involved anywhere in the pipeline.

use crate::{
    classify::{FailureSignature, classify_fragment},
    events::{Action, TestEvent},
};
use indexmap::{IndexMap, IndexSet};
use std::fmt;
use tracing::error;

/// Stable identity of a test within a run: package import path plus optional
/// test name. A bare package (no test name) identifies package-level output
/// such as build errors.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct TestKey {
    package: String,
    test: Option<String>,
}

impl TestKey {
    /// Creates a key for a test, or for the package itself if `test` is
    /// `None`.
    pub fn new(package: impl Into<String>, test: Option<String>) -> Self {
        Self {
            package: package.into(),
            test,
        }
    }

    /// The package import path.
    pub fn package(&self) -> &str {
        &self.package
    }

    /// The test name, if this key refers to a single test.
    pub fn test(&self) -> Option<&str> {
        self.test.as_deref()
    }
}

impl fmt::Display for TestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.test {
            Some(test) => write!(f, "{}/{}", self.package, test),
            None => write!(f, "{}", self.package),
        }
    }
}

/// Everything recorded for one test over the lifetime of a run.
///
/// Created lazily on the first event for its key, never deleted. Output lines
/// are append-only and keep arrival order.
#[derive(Clone, Debug, Default)]
pub struct TestRecord {
    elapsed: f64,
    output: Vec<String>,
}

impl TestRecord {
    /// Elapsed seconds, set by the terminal event. Zero if the test never
    /// reached one (e.g. the run crashed first).
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// The captured output fragments, in arrival order.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// The output fragments joined back into the raw captured text.
    /// Fragments already carry their own newlines.
    pub fn joined_output(&self) -> String {
        self.output.concat()
    }
}

/// How a test's terminal event went.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The test passed.
    Pass,
    /// The test failed.
    Fail,
}

/// Emitted by the aggregator when a test reaches its terminal event, so the
/// driver can surface live progress. Carries state only; presentation is the
/// caller's concern.
#[derive(Clone, Debug)]
pub struct TestFinished {
    /// The finished test.
    pub key: TestKey,
    /// Its recorded elapsed time in seconds.
    pub elapsed: f64,
    /// Pass or fail.
    pub outcome: Outcome,
}

/// Aggregates decoded events into the run's result ledger.
#[derive(Debug)]
pub struct RunAggregator {
    include_package_output: bool,
    tests: IndexMap<TestKey, TestRecord>,
    failed: IndexSet<TestKey>,
    panicked: IndexSet<TestKey>,
    errored: IndexSet<TestKey>,
    total_run: usize,
}

impl RunAggregator {
    /// Creates an empty aggregator.
    ///
    /// If `include_package_output` is false, events without a `Test` field
    /// (package-level build output and summaries) are dropped before any
    /// record is created.
    pub fn new(include_package_output: bool) -> Self {
        Self {
            include_package_output,
            tests: IndexMap::new(),
            failed: IndexSet::new(),
            panicked: IndexSet::new(),
            errored: IndexSet::new(),
            total_run: 0,
        }
    }

    /// Handles one complete line from the event stream.
    ///
    /// Decode failures are logged and skipped; the stream keeps going. This
    /// intentionally swallows non-JSON noise, since `go test` and the tests
    /// themselves can interleave arbitrary text on stdout.
    pub fn handle_line(&mut self, line: &str) -> Option<TestFinished> {
        match TestEvent::decode(line) {
            Ok(event) => self.handle_event(event),
            Err(err) => {
                error!("failed to process line \"{}\": {}", err.line, err.error);
                None
            }
        }
    }

    /// Applies one decoded event to the ledger. Returns a notification for
    /// terminal events.
    pub fn handle_event(&mut self, event: TestEvent) -> Option<TestFinished> {
        if !self.include_package_output && event.test.is_none() {
            return None;
        }

        let key = TestKey::new(event.package, event.test);
        match event.action {
            Action::Output => {
                let output = event.output?;
                match classify_fragment(&output) {
                    Some(FailureSignature::Panic) => {
                        self.panicked.insert(key.clone());
                    }
                    Some(FailureSignature::SanitizerError) => {
                        self.errored.insert(key.clone());
                    }
                    None => {}
                }
                self.record_mut(key).output.push(output);
                None
            }
            Action::Fail => {
                self.total_run += 1;
                self.record_mut(key.clone()).elapsed = event.elapsed;
                self.failed.insert(key.clone());
                Some(TestFinished {
                    key,
                    elapsed: event.elapsed,
                    outcome: Outcome::Fail,
                })
            }
            Action::Pass => {
                self.total_run += 1;
                self.record_mut(key.clone()).elapsed = event.elapsed;
                Some(TestFinished {
                    key,
                    elapsed: event.elapsed,
                    outcome: Outcome::Pass,
                })
            }
            Action::Run | Action::Skip | Action::Other => {
                // No state transition, but the event still references the
                // key: the record is created on first sight.
                self.record_mut(key);
                None
            }
        }
    }

    fn record_mut(&mut self, key: TestKey) -> &mut TestRecord {
        self.tests.entry(key).or_default()
    }

    /// All records, in creation order.
    pub fn tests(&self) -> &IndexMap<TestKey, TestRecord> {
        &self.tests
    }

    /// Looks up one record.
    pub fn record(&self, key: &TestKey) -> Option<&TestRecord> {
        self.tests.get(key)
    }

    /// Keys that received a `fail` terminal event.
    pub fn failed(&self) -> &IndexSet<TestKey> {
        &self.failed
    }

    /// Keys whose output began a runtime panic report.
    pub fn panicked(&self) -> &IndexSet<TestKey> {
        &self.panicked
    }

    /// Keys whose output contained a sanitizer error report.
    pub fn errored(&self) -> &IndexSet<TestKey> {
        &self.errored
    }

    /// The number of terminal (`pass`/`fail`) events seen.
    pub fn total_run(&self) -> usize {
        self.total_run
    }

    /// The number of distinct keys in any classification set. Computed over
    /// the set union: a test that both failed and panicked counts once.
    pub fn unhealthy_count(&self) -> usize {
        self.failed
            .iter()
            .chain(&self.panicked)
            .chain(&self.errored)
            .collect::<IndexSet<_>>()
            .len()
    }

    /// The number of tests that ran and were never classified as failed,
    /// panicked, or errored.
    pub fn passed(&self) -> usize {
        self.total_run.saturating_sub(self.unhealthy_count())
    }

    /// True if no key landed in any classification set.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.panicked.is_empty() && self.errored.is_empty()
    }
}
