// Copyright (c) The gotest-action Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end pipeline tests: raw bytes in, verdict and annotations out.
//!
//! These drive the same path the subprocess driver does -- line framer into
//! aggregator, then the reporter -- without spawning a real `go test`.

use camino::Utf8PathBuf;
use chrono::Local;
use gotest_runner::{
    aggregator::RunAggregator,
    line_buffer::LineBuffer,
    reporter::{MessageLevel, RecordingSink, RunVerdict, SinkEvent, report},
    resolver::StaticResolver,
    run::RunOutput,
};
use indoc::indoc;
use pretty_assertions::assert_eq;
use std::time::Duration;

fn feed(aggregator: &mut RunAggregator, stream: &[u8], chunk_size: usize) {
    let mut lines = LineBuffer::new();
    for chunk in stream.chunks(chunk_size) {
        lines.push(chunk, |line| {
            aggregator.handle_line(line);
        });
    }
    lines.finish(|line| {
        aggregator.handle_line(line);
    });
}

fn run_output(exit_code: i32) -> RunOutput {
    RunOutput {
        exit_code,
        raw_stdout: String::new(),
        raw_stderr: String::new(),
        started_at: Local::now(),
        duration: Duration::from_millis(340),
    }
}

// Ends without a trailing newline on purpose: the final fail event only
// arrives through the residual-flush path.
const STREAM: &[u8] = indoc! {br#"
    {"Action":"run","Package":"example.com/mod/pkg","Test":"TestA"}
    {"Action":"output","Package":"example.com/mod/pkg","Test":"TestA","Output":"=== RUN   TestA\n"}
    {"Action":"pass","Package":"example.com/mod/pkg","Test":"TestA","Elapsed":0.01}
    this line is not json and must not abort the stream
    {"Action":"run","Package":"example.com/mod/pkg","Test":"TestB"}
    {"Action":"output","Package":"example.com/mod/pkg","Test":"TestB","Output":"=== RUN   TestB\n"}
    {"Action":"output","Package":"example.com/mod/pkg","Test":"TestB","Output":"    pkg_test.go:10: boom\n"}
    {"Action":"output","Package":"example.com/mod/pkg","Test":"TestB","Output":"--- FAIL: TestB (0.02s)\n"}
    {"Action":"fail","Package":"example.com/mod/pkg","Test":"TestB","Elapsed":0.02}"#};

#[tokio::test]
async fn one_failure_end_to_end() {
    let mut aggregator = RunAggregator::new(false);
    feed(&mut aggregator, STREAM, 4096);

    assert_eq!(aggregator.total_run(), 2);
    assert_eq!(aggregator.passed(), 1);

    let mut resolver = StaticResolver::new();
    resolver.insert("example.com/mod/pkg", "pkg");
    let mut sink = RecordingSink::new();

    let verdict = report(&aggregator, &run_output(1), &mut resolver, &mut sink).await;
    assert_eq!(verdict, RunVerdict::TestsFailed);
    assert_eq!(sink.failure_reasons(), ["1/2 tests failed"]);
    assert_eq!(
        sink.annotations(),
        [&SinkEvent::Annotation {
            path: Utf8PathBuf::from("pkg/pkg_test.go"),
            line: 10,
            message: "pkg_test.go:10: boom".to_owned(),
        }]
    );
    assert_eq!(
        sink.events.last(),
        Some(&SinkEvent::Message {
            level: MessageLevel::Info,
            text: "1/2 tests passed in 0.34s".to_owned(),
        })
    );
}

// Chunk boundaries must not change what the pipeline computes. The stream
// deliberately ends without a trailing newline so the residual-flush path is
// exercised too.
#[tokio::test]
async fn chunking_does_not_change_results() {
    for chunk_size in [1, 3, 17, 64, STREAM.len()] {
        let mut aggregator = RunAggregator::new(false);
        feed(&mut aggregator, STREAM, chunk_size);

        assert_eq!(aggregator.total_run(), 2, "chunk size {chunk_size}");
        assert_eq!(aggregator.passed(), 1, "chunk size {chunk_size}");
        assert_eq!(aggregator.failed().len(), 1, "chunk size {chunk_size}");
    }
}

#[tokio::test]
async fn truncated_panic_still_classifies() {
    // The child crashed before TestC's terminal event; the panic output alone
    // classifies it, and the overall verdict is failed.
    let stream: &[u8] = indoc! {br#"
        {"Action":"output","Package":"p","Test":"TestC","Output":"panic: runtime error: index out of range\n"}"#};

    let mut aggregator = RunAggregator::new(false);
    feed(&mut aggregator, stream, 4096);
    assert_eq!(aggregator.total_run(), 0);
    assert_eq!(aggregator.panicked().len(), 1);

    let mut resolver = StaticResolver::new();
    let mut sink = RecordingSink::new();
    let verdict = report(&aggregator, &run_output(2), &mut resolver, &mut sink).await;

    // Classified failure, so this is a test outcome, not an infra failure,
    // despite the nonzero exit.
    assert_eq!(verdict, RunVerdict::TestsFailed);
    assert_eq!(sink.failure_reasons(), ["1/0 tests panicked"]);
}

#[tokio::test]
async fn build_error_is_an_infra_failure() {
    // A compile error produces package-level output and a nonzero exit, but
    // no terminal fail events. With package output disabled nothing gets
    // classified, which must surface as an infra failure with raw dumps.
    let stream: &[u8] = indoc! {br##"
        {"Action":"output","Package":"example.com/mod/pkg","Output":"# example.com/mod/pkg\n"}
        {"Action":"output","Package":"example.com/mod/pkg","Output":"./broken.go:3:1: syntax error\n"}
    "##};

    let mut aggregator = RunAggregator::new(false);
    feed(&mut aggregator, stream, 4096);

    let mut resolver = StaticResolver::new();
    let mut sink = RecordingSink::new();
    let output = RunOutput {
        raw_stdout: String::from_utf8_lossy(stream).into_owned(),
        ..run_output(2)
    };
    let verdict = report(&aggregator, &output, &mut resolver, &mut sink).await;
    assert_eq!(verdict, RunVerdict::InfraFailure);
    assert!(sink.failure_reasons()[0].contains("exit code 2"));
    assert!(sink.events.contains(&SinkEvent::StartGroup("stdout".to_owned())));
}
