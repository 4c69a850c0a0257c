// Copyright (c) The gotest-action Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoding of `go test -json` events.
//!
//! Each line of the stream is one JSON object in the test2json format (see
//! `go doc test2json`). The decoder is deliberately lenient: actions we don't
//! know about are carried as [`Action::Other`] and ignored downstream, and
//! `Elapsed` values that aren't clean finite numbers fall back to zero rather
//! than failing the event. Only a line that isn't a JSON object at all is a
//! decode error, and even that is a per-line diagnostic, not a stream abort.

use crate::errors::EventDecodeError;
use serde::{Deserialize, Deserializer};

/// The lifecycle action described by a [`TestEvent`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// The test (or its package) emitted a fragment of output.
    Output,
    /// The test started running.
    Run,
    /// Terminal action: the test passed.
    Pass,
    /// Terminal action: the test failed.
    Fail,
    /// The test was skipped.
    Skip,
    /// Any action this decoder doesn't know about (`start`, `pause`,
    /// `cont`, `bench`, and whatever test2json grows next).
    #[serde(other)]
    Other,
}

impl Action {
    /// Returns true for actions that finalize a test's elapsed time.
    pub fn is_terminal(self) -> bool {
        matches!(self, Action::Pass | Action::Fail)
    }
}

/// One event from the `go test -json` stream.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TestEvent {
    /// The import path of the package being tested.
    #[serde(rename = "Package", default)]
    pub package: String,

    /// The test name, absent for package-level events (build output,
    /// package summaries).
    #[serde(rename = "Test", default)]
    pub test: Option<String>,

    /// What happened.
    #[serde(rename = "Action")]
    pub action: Action,

    /// The output fragment, present only for [`Action::Output`].
    #[serde(rename = "Output", default)]
    pub output: Option<String>,

    /// Elapsed seconds, present only for terminal actions. Defaults to zero
    /// for absent, malformed, or non-finite values.
    #[serde(rename = "Elapsed", default, deserialize_with = "lenient_f64")]
    pub elapsed: f64,
}

impl TestEvent {
    /// Decodes a single line of the stream.
    pub fn decode(line: &str) -> Result<Self, EventDecodeError> {
        serde_json::from_str(line).map_err(|error| EventDecodeError {
            line: line.to_owned(),
            error,
        })
    }
}

/// Parses a number-like JSON value, substituting 0 for anything that doesn't
/// resolve to a finite float. test2json always writes plain numbers here, but
/// the stream is produced by an external tool and we never let a weird value
/// take down the pipeline.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let parsed = match &value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed.filter(|f| f.is_finite()).unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn decodes_output_event() {
        let event = TestEvent::decode(
            r#"{"Time":"2024-05-01T10:00:00Z","Action":"output","Package":"example.com/pkg","Test":"TestFoo","Output":"=== RUN   TestFoo\n"}"#,
        )
        .expect("valid event");
        assert_eq!(event.action, Action::Output);
        assert_eq!(event.package, "example.com/pkg");
        assert_eq!(event.test.as_deref(), Some("TestFoo"));
        assert_eq!(event.output.as_deref(), Some("=== RUN   TestFoo\n"));
        assert_eq!(event.elapsed, 0.0);
    }

    #[test]
    fn decodes_terminal_event_with_elapsed() {
        let event = TestEvent::decode(
            r#"{"Action":"pass","Package":"example.com/pkg","Test":"TestFoo","Elapsed":0.25}"#,
        )
        .expect("valid event");
        assert_eq!(event.action, Action::Pass);
        assert_eq!(event.elapsed, 0.25);
    }

    #[test]
    fn package_level_event_has_no_test() {
        let event =
            TestEvent::decode(r#"{"Action":"output","Package":"example.com/pkg","Output":"ok\n"}"#)
                .expect("valid event");
        assert_eq!(event.test, None);
    }

    #[test_case(r#""start""#; "start")]
    #[test_case(r#""pause""#; "pause")]
    #[test_case(r#""bench""#; "bench")]
    #[test_case(r#""some-future-action""#; "unknown")]
    fn unrecognized_actions_decode_as_other(action: &str) {
        let line = format!(r#"{{"Action":{action},"Package":"p"}}"#);
        let event = TestEvent::decode(&line).expect("valid event");
        assert_eq!(event.action, Action::Other);
        assert!(!event.action.is_terminal());
    }

    #[test_case(r#"{"Action":"pass","Package":"p"}"#, 0.0; "absent")]
    #[test_case(r#"{"Action":"pass","Package":"p","Elapsed":null}"#, 0.0; "null")]
    #[test_case(r#"{"Action":"pass","Package":"p","Elapsed":"0.5"}"#, 0.5; "numeric string")]
    #[test_case(r#"{"Action":"pass","Package":"p","Elapsed":"soon"}"#, 0.0; "garbage string")]
    #[test_case(r#"{"Action":"pass","Package":"p","Elapsed":"inf"}"#, 0.0; "non finite string")]
    #[test_case(r#"{"Action":"pass","Package":"p","Elapsed":true}"#, 0.0; "wrong type")]
    #[test_case(r#"{"Action":"pass","Package":"p","Elapsed":1.5}"#, 1.5; "plain number")]
    fn elapsed_parsing_is_lenient(line: &str, expected: f64) {
        let event = TestEvent::decode(line).expect("valid event");
        assert_eq!(event.elapsed, expected);
    }

    #[test_case("not json at all"; "free text")]
    #[test_case("{truncated"; "truncated object")]
    #[test_case("[1, 2, 3]"; "array")]
    #[test_case("42"; "bare number")]
    fn non_events_are_decode_errors(line: &str) {
        let err = TestEvent::decode(line).expect_err("should not decode");
        assert_eq!(err.line, line);
    }
}
