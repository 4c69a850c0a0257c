// Copyright (c) The gotest-action Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stopwatch for tracking how long a run takes.
//!
//! Combines a `SystemTime`-backed realtime clock (for reporting when the run
//! started) with a monotonic `Instant` (for measuring how long it took).

use chrono::{DateTime, Local};
use std::time::{Duration, Instant};

pub(crate) fn stopwatch() -> Stopwatch {
    Stopwatch::new()
}

#[derive(Clone, Debug)]
pub(crate) struct Stopwatch {
    start_time: DateTime<Local>,
    instant: Instant,
}

impl Stopwatch {
    fn new() -> Self {
        Self {
            // These two syscalls happen imperceptibly close to each other,
            // which is good enough for our purposes.
            start_time: Local::now(),
            instant: Instant::now(),
        }
    }

    pub(crate) fn start_time(&self) -> DateTime<Local> {
        self.start_time
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.instant.elapsed()
    }
}
