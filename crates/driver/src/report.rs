// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Grading: comparing outcomes to expectations and running case lists.

use crate::driver::Driver;
use crate::error::DriveError;
use crate::outcome::{duration_ms, Outcome};
use ag_core::{check_anatomy, AnatomyCase, AnatomyFailure, Expect, InvocationDescriptor, Value};
use serde::Serialize;
use std::fmt::Write as _;
use thiserror::Error;

/// One reason a case did not pass.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "failure", rename_all = "snake_case")]
pub enum Failure {
    #[error(transparent)]
    Anatomy(AnatomyFailure),
    #[error(
        "function '{name}' timed out before completing. Do you have an extra stdin read, perhaps?"
    )]
    TimedOut { name: String, deadline_ms: u64 },
    #[error("function '{name}' panicked: {message}")]
    Panicked { name: String, message: String },
    #[error(
        "function '{name}' returned unexpected number of values. Expected {expected} value(s), found {found} value(s)"
    )]
    ReturnCount {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error(
        "function '{name}' returned unexpected value. Specifically, return value position {position}: expected {expected}, found {found}"
    )]
    ReturnValue {
        name: String,
        position: usize,
        expected: Value,
        found: Value,
    },
    #[error(
        "function '{name}' displayed unexpected number of output lines to the terminal. Expected {expected} line(s), found {found} line(s)"
    )]
    OutputLineCount {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("function '{name}' displayed unexpected line to the terminal. Unexpected line was \"{line}\".")]
    OutputLine {
        name: String,
        position: usize,
        expected: String,
        line: String,
    },
    #[error(
        "function '{name}' displayed unexpected number of error lines. Expected {expected} line(s), found {found} line(s)"
    )]
    ErrorLineCount {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("function '{name}' displayed unexpected error line. Unexpected line was \"{line}\".")]
    ErrorLine {
        name: String,
        position: usize,
        expected: String,
        line: String,
    },
    #[error("function '{name}' could not be driven: {message}")]
    Harness { name: String, message: String },
}

/// Compare a drive's outcome against the case's expectations.
pub fn check_outcome(case: &InvocationDescriptor, outcome: &Outcome) -> Vec<Failure> {
    let name = case.name();
    let completion = match outcome {
        Outcome::TimedOut { deadline } => {
            return vec![Failure::TimedOut {
                name: name.to_string(),
                deadline_ms: duration_ms(*deadline),
            }]
        }
        Outcome::Panicked { message, .. } => {
            return vec![Failure::Panicked {
                name: name.to_string(),
                message: message.clone(),
            }]
        }
        Outcome::Completed(completion) => completion,
    };

    let mut failures = Vec::new();
    if let Expect::Exact(expected) = case.expected_returns() {
        check_returns(name, expected, &completion.returns, &mut failures);
    }
    if let Expect::Exact(expected) = case.expected_stdout() {
        check_lines(
            name,
            expected,
            &completion.output.out_lines,
            LineKind::Output,
            &mut failures,
        );
    }
    if let Expect::Exact(expected) = case.expected_stderr() {
        check_lines(
            name,
            expected,
            &completion.output.err_lines,
            LineKind::Error,
            &mut failures,
        );
    }
    failures
}

fn check_returns(name: &str, expected: &[Value], found: &[Value], failures: &mut Vec<Failure>) {
    if expected.len() != found.len() {
        failures.push(Failure::ReturnCount {
            name: name.to_string(),
            expected: expected.len(),
            found: found.len(),
        });
        return;
    }
    for (position, (want, got)) in expected.iter().zip(found).enumerate() {
        if want != got {
            failures.push(Failure::ReturnValue {
                name: name.to_string(),
                position,
                expected: want.clone(),
                found: got.clone(),
            });
        }
    }
}

#[derive(Clone, Copy)]
enum LineKind {
    /// Compared after trimming surrounding whitespace.
    Output,
    /// Compared verbatim.
    Error,
}

fn check_lines(
    name: &str,
    expected: &[String],
    captured: &[String],
    kind: LineKind,
    failures: &mut Vec<Failure>,
) {
    if expected.len() != captured.len() {
        failures.push(match kind {
            LineKind::Output => Failure::OutputLineCount {
                name: name.to_string(),
                expected: expected.len(),
                found: captured.len(),
            },
            LineKind::Error => Failure::ErrorLineCount {
                name: name.to_string(),
                expected: expected.len(),
                found: captured.len(),
            },
        });
        return;
    }
    for (position, (want, line)) in expected.iter().zip(captured).enumerate() {
        match kind {
            LineKind::Output if want.as_str() != line.trim() => failures.push(Failure::OutputLine {
                name: name.to_string(),
                position,
                expected: want.clone(),
                line: line.clone(),
            }),
            LineKind::Error if want != line => failures.push(Failure::ErrorLine {
                name: name.to_string(),
                position,
                expected: want.clone(),
                line: line.clone(),
            }),
            _ => {}
        }
    }
}

/// Result of grading one case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseReport {
    pub name: String,
    /// Absent when the case was not driven.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    pub failures: Vec<Failure>,
}

impl CaseReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Results of a list of cases, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub cases: Vec<CaseReport>,
}

impl Report {
    pub fn is_success(&self) -> bool {
        self.cases.iter().all(CaseReport::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Failure> {
        self.cases.iter().flat_map(|case| &case.failures)
    }

    /// Count line followed by every failure message.
    pub fn summary(&self) -> String {
        let failed = self.cases.iter().filter(|case| !case.passed()).count();
        let mut out = format!("{} case(s), {} failed", self.cases.len(), failed);
        for failure in self.failures() {
            let _ = write!(out, "\n  {failure}");
        }
        out
    }

    /// Panic with the summary unless every case passed.
    #[allow(clippy::panic)]
    pub fn assert_success(&self) {
        if !self.is_success() {
            panic!("{}", self.summary());
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Anatomy check each case, then drive the ones whose signature fits.
pub async fn run_output_cases(driver: &Driver, cases: &[InvocationDescriptor]) -> Report {
    let mut report = Report::default();
    for case in cases {
        let graded = match anatomy_gate(case) {
            Some(rejected) => rejected,
            None => grade(case, driver.drive(case).await),
        };
        report.cases.push(graded);
    }
    report
}

/// [`run_output_cases`] for callers outside an async runtime.
pub fn run_output_cases_blocking(driver: &Driver, cases: &[InvocationDescriptor]) -> Report {
    let mut report = Report::default();
    for case in cases {
        let graded = match anatomy_gate(case) {
            Some(rejected) => rejected,
            None => grade(case, driver.drive_blocking(case)),
        };
        report.cases.push(graded);
    }
    report
}

/// Signature checks only; nothing is invoked.
pub fn run_anatomy_cases(cases: &[AnatomyCase]) -> Report {
    Report {
        cases: cases
            .iter()
            .map(|case| CaseReport {
                name: case.name.clone(),
                outcome: None,
                failures: check_anatomy(case)
                    .into_iter()
                    .map(Failure::Anatomy)
                    .collect(),
            })
            .collect(),
    }
}

fn anatomy_gate(case: &InvocationDescriptor) -> Option<CaseReport> {
    let failures = check_anatomy(&AnatomyCase::from_descriptor(case));
    if failures.is_empty() {
        return None;
    }
    tracing::debug!(
        case = case.name(),
        failures = failures.len(),
        "signature mismatch; not driving"
    );
    Some(CaseReport {
        name: case.name().to_string(),
        outcome: None,
        failures: failures.into_iter().map(Failure::Anatomy).collect(),
    })
}

fn grade(case: &InvocationDescriptor, result: Result<Outcome, DriveError>) -> CaseReport {
    match result {
        Ok(outcome) => CaseReport {
            name: case.name().to_string(),
            failures: check_outcome(case, &outcome),
            outcome: Some(outcome),
        },
        Err(error) => {
            tracing::error!(case = case.name(), %error, "drive failed");
            CaseReport {
                name: case.name().to_string(),
                outcome: None,
                failures: vec![Failure::Harness {
                    name: case.name().to_string(),
                    message: error.to_string(),
                }],
            }
        }
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
