// Copyright (c) The gotest-action Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::{ActionExitCode, ExpectedError},
    output,
};
use camino::Utf8PathBuf;
use clap::{Parser, builder::BoolishValueParser};
use gotest_runner::{
    aggregator::RunAggregator,
    reporter::{RunVerdict, report},
    resolver::GoListResolver,
    run::GoTestCommand,
    settings::RunSettings,
};

/// Runs `go test` and reports per-test results, panics, sanitizer errors,
/// and source-location annotations.
///
/// Flags double as GitHub Actions inputs: every flag can also be supplied
/// through the corresponding `INPUT_*` environment variable, which is how
/// the actions runner passes inputs to the process. Boolean inputs arrive as
/// the strings "true"/"false", so the boolean flags accept an optional
/// value.
#[derive(Debug, Parser)]
#[command(name = "gotest-action", version, about)]
pub struct GotestActionApp {
    /// Package pattern to test, e.g. `./...`.
    #[arg(long, env = "INPUT_PACKAGE", value_name = "PATTERN", default_value = "./...")]
    package: String,

    /// Extra arguments for `go test`, semicolon-separated.
    #[arg(long, env = "INPUT_ARGS", value_name = "ARGS", default_value = "")]
    args: String,

    /// Pass the raw `go test` stream through as it arrives.
    #[arg(
        long,
        env = "INPUT_SHOW_STDOUT",
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    show_stdout: bool,

    /// Record package-level output (build errors, package summaries).
    #[arg(
        long,
        env = "INPUT_SHOW_PACKAGE_OUTPUT",
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    show_package_output: bool,

    /// Print a progress line for passing tests too.
    #[arg(
        long,
        env = "INPUT_SHOW_PASSED_TESTS",
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    show_passed_tests: bool,

    /// Call out tests that take at least this many seconds; -1 disables.
    #[arg(
        long,
        env = "INPUT_SHOW_LONG_RUNNING_TESTS",
        value_name = "SECONDS",
        default_value_t = RunSettings::DEFAULT_LONG_RUNNING_SECS,
        allow_negative_numbers = true
    )]
    show_long_running_tests: f64,

    /// Workspace root stripped from annotation paths. Set by the runner.
    #[arg(long, env = "GITHUB_WORKSPACE", value_name = "PATH")]
    workspace_root: Option<Utf8PathBuf>,
}

impl GotestActionApp {
    /// Executes the app, returning the process exit code.
    pub fn exec(self) -> Result<i32, ExpectedError> {
        output::init_logging();

        // The pipeline is sequential by design; a current-thread runtime is
        // all the concurrency the two stream pumps need.
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| ExpectedError::RuntimeSetup { err })?;
        runtime.block_on(self.exec_impl())
    }

    async fn exec_impl(self) -> Result<i32, ExpectedError> {
        let settings = RunSettings {
            show_stdout: self.show_stdout,
            show_package_output: self.show_package_output,
            show_passed_tests: self.show_passed_tests,
            long_running_threshold: RunSettings::long_running_from_secs(
                self.show_long_running_tests,
            ),
        };

        let command = GoTestCommand::new(self.package.as_str()).extra_args_input(&self.args);
        let mut aggregator = RunAggregator::new(settings.show_package_output);
        let mut progress = output::LiveProgress::new(settings);

        let run_output = command
            .run(&mut aggregator, &mut progress)
            .await
            .map_err(|err| ExpectedError::RunTests { err })?;

        let mut resolver = GoListResolver::new(self.workspace_root);
        let mut sink = output::sink_for_environment();
        let verdict = report(&aggregator, &run_output, &mut resolver, &mut sink).await;

        Ok(match verdict {
            RunVerdict::Pass => ActionExitCode::OK,
            RunVerdict::TestsFailed => ActionExitCode::TEST_RUN_FAILED,
            RunVerdict::InfraFailure => ActionExitCode::INFRA_FAILURE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        GotestActionApp::command().debug_assert();
    }

    #[test]
    fn boolean_inputs_accept_actions_style_values() {
        let app =
            GotestActionApp::parse_from(["gotest-action", "--show-passed-tests", "false"]);
        assert!(!app.show_passed_tests);

        let app = GotestActionApp::parse_from(["gotest-action", "--show-passed-tests"]);
        assert!(app.show_passed_tests);

        let app = GotestActionApp::parse_from(["gotest-action"]);
        assert!(!app.show_passed_tests);
    }

    #[test]
    fn long_running_default_and_disable() {
        let app = GotestActionApp::parse_from(["gotest-action"]);
        assert_eq!(app.show_long_running_tests, 15.0);

        let app = GotestActionApp::parse_from([
            "gotest-action",
            "--show-long-running-tests",
            "-1",
        ]);
        assert_eq!(
            RunSettings::long_running_from_secs(app.show_long_running_tests),
            None
        );
    }
}
