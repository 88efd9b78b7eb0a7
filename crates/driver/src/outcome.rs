// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Result of driving one invocation

use ag_capture::CapturedOutput;
use ag_core::Value;
use serde::{Serialize, Serializer};
use std::time::Duration;

/// A call that returned normally.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Completion {
    pub returns: Vec<Value>,
    pub output: CapturedOutput,
}

/// How a drive ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Completed(Completion),
    /// The callable unwound instead of returning.
    Panicked {
        message: String,
        output: CapturedOutput,
    },
    /// The deadline passed first. Whatever the callable printed is dropped.
    TimedOut {
        #[serde(rename = "deadline_ms", serialize_with = "as_millis")]
        deadline: Duration,
    },
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, Outcome::TimedOut { .. })
    }

    /// Captured lines, when the call finished one way or another.
    pub fn output(&self) -> Option<&CapturedOutput> {
        match self {
            Outcome::Completed(done) => Some(&done.output),
            Outcome::Panicked { output, .. } => Some(output),
            Outcome::TimedOut { .. } => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Completed(_) => "completed",
            Outcome::Panicked { .. } => "panicked",
            Outcome::TimedOut { .. } => "timed_out",
        }
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
pub(crate) fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn as_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(duration_ms(*d))
}
