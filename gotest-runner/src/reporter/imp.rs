// Copyright (c) The gotest-action Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    aggregator::{RunAggregator, TestKey},
    annotate::extract_annotations,
    reporter::{MessageLevel, ReportSink},
    resolver::SourcePathResolver,
    run::RunOutput,
};
use indexmap::IndexSet;
use tracing::warn;

/// The overall outcome of a run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RunVerdict {
    /// Every test that ran passed.
    Pass,
    /// At least one test failed, panicked, or errored.
    TestsFailed,
    /// The subprocess exited nonzero without any classified test failure:
    /// a build error or tool crash, not a test outcome.
    InfraFailure,
}

/// Emits the full report for a finished run and returns its verdict.
///
/// Path resolution failures are isolated per annotation: they are logged and
/// that annotation is dropped, the rest of the report is unaffected.
pub async fn report(
    aggregator: &RunAggregator,
    output: &RunOutput,
    resolver: &mut impl SourcePathResolver,
    sink: &mut impl ReportSink,
) -> RunVerdict {
    // A nonzero exit with nothing classified means the problem isn't any
    // individual test, so per-test blocks would be empty or misleading. Dump
    // the raw streams instead.
    if output.exit_code != 0 && aggregator.is_clean() {
        sink.run_failed(&format!(
            "go test failed with exit code {}, but no tests failed. Check output for more details",
            output.exit_code
        ));
        dump_stream(sink, "stdout", &output.raw_stdout);
        dump_stream(sink, "stderr", &output.raw_stderr);
        return RunVerdict::InfraFailure;
    }

    // Anything on stderr gets surfaced, even on success: it's outside the
    // event protocol. This includes module downloads, so it's not always an
    // error.
    if !output.raw_stderr.is_empty() {
        dump_stream(sink, "stderr", &output.raw_stderr);
    }

    emit_section(aggregator, sink, aggregator.panicked(), "panicked");
    emit_section(aggregator, sink, aggregator.errored(), "errored");

    // Failed tests additionally get source-location annotations.
    let failed = aggregator.failed();
    if !failed.is_empty() {
        sink.run_failed(&format!(
            "{}/{} tests failed",
            failed.len(),
            aggregator.total_run()
        ));
        for key in failed {
            let Some(record) = aggregator.record(key) else {
                continue;
            };
            if record.output().is_empty() {
                continue;
            }

            sink.start_group(&format!("test {key} failed in {}s", record.elapsed()));
            sink.message(
                MessageLevel::Error,
                &format!("test {key} failed in {}s:\n{}", record.elapsed(), record.joined_output()),
            );
            for annotation in extract_annotations(record.output()) {
                match resolver.source_path(key.package(), &annotation.file).await {
                    Ok(path) => sink.annotate(&path, annotation.line, &annotation.text),
                    Err(error) => {
                        warn!("failed to resolve {} for {key}: {error}", annotation.file);
                    }
                }
            }
            sink.end_group();
        }
    }

    let verdict = if aggregator.is_clean() {
        RunVerdict::Pass
    } else {
        RunVerdict::TestsFailed
    };

    sink.message(
        MessageLevel::Info,
        &format!(
            "{}/{} tests passed in {:.2}s",
            aggregator.passed(),
            aggregator.total_run(),
            output.duration.as_secs_f64()
        ),
    );
    verdict
}

fn dump_stream(sink: &mut impl ReportSink, name: &str, contents: &str) {
    sink.start_group(name);
    sink.message(MessageLevel::Info, contents);
    sink.end_group();
}

fn emit_section(
    aggregator: &RunAggregator,
    sink: &mut impl ReportSink,
    keys: &IndexSet<TestKey>,
    label: &str,
) {
    if keys.is_empty() {
        return;
    }

    sink.run_failed(&format!(
        "{}/{} tests {label}",
        keys.len(),
        aggregator.total_run()
    ));
    for key in keys {
        let Some(record) = aggregator.record(key) else {
            continue;
        };
        if record.output().is_empty() {
            continue;
        }
        emit_block(sink, key, label, record.elapsed(), &record.joined_output());
    }
}

fn emit_block(sink: &mut impl ReportSink, key: &TestKey, label: &str, elapsed: f64, output: &str) {
    sink.start_group(&format!("test {key} {label} in {elapsed}s"));
    sink.message(
        MessageLevel::Error,
        &format!("test {key} {label} in {elapsed}s:\n{output}"),
    );
    sink.end_group();
}
