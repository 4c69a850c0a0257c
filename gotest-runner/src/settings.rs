// Copyright (c) The gotest-action Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Run settings consumed by the pipeline.
//!
//! The values live here; where they come from (action inputs, CLI flags) is
//! the binary's business.

/// Behavior toggles for a single run.
#[derive(Clone, Debug)]
pub struct RunSettings {
    /// Pass the raw `go test` stream through to the console as it arrives.
    /// When set, per-test progress lines are suppressed since the raw output
    /// already shows them.
    pub show_stdout: bool,

    /// Record package-level events (those without a `Test` field), such as
    /// build errors and package summaries.
    pub show_package_output: bool,

    /// Emit a progress line for each passing test, not just failing ones.
    pub show_passed_tests: bool,

    /// Threshold in seconds above which a test is called out as
    /// long-running. `None` disables the check.
    pub long_running_threshold: Option<f64>,
}

impl RunSettings {
    /// The default long-running threshold, in seconds.
    pub const DEFAULT_LONG_RUNNING_SECS: f64 = 15.0;

    /// Converts the action-input convention, where `-1` disables the
    /// long-running check, into an optional threshold.
    pub fn long_running_from_secs(secs: f64) -> Option<f64> {
        (secs >= 0.0).then_some(secs)
    }

    /// True if `elapsed` should be called out as long-running.
    pub fn is_long_running(&self, elapsed: f64) -> bool {
        self.long_running_threshold
            .is_some_and(|threshold| elapsed >= threshold)
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            show_stdout: false,
            show_package_output: false,
            show_passed_tests: false,
            long_running_threshold: Some(Self::DEFAULT_LONG_RUNNING_SECS),
        }
    }
}
