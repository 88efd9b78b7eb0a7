//! Grading a submission end to end.

use crate::prelude::*;
use ag_core::{AnatomyCase, InvocationDescriptor, Value, ValueKind};
use ag_driver::{
    run_anatomy_cases, run_output_cases, run_output_cases_blocking, Failure, Outcome, Report,
};
use std::time::{Duration, Instant};

fn grade(cases: &[InvocationDescriptor]) -> Report {
    run_output_cases_blocking(&driver(), cases)
}

fn passing_cases() -> Vec<InvocationDescriptor> {
    vec![
        InvocationDescriptor::new("to_fahrenheit", to_fahrenheit())
            .arg(100.0)
            .expect_returns([212.0])
            .expect_stdout(["100.0C is 212.0F"]),
        InvocationDescriptor::new("greet", greet())
            .input("Ann\n")
            .expect_stdout(["Name? Hello, Ann!"]),
        InvocationDescriptor::new("tally", tally())
            .with_inputs(["3\n", "x\n", "4\n", "done\n"])
            .expect_returns([7, 2])
            .expect_stdout(["total 7"])
            .expect_stderr(["skipping \"x\""]),
    ]
}

pub fn passing_submission_reports_success() {
    let report = grade(&passing_cases());
    report.assert_success();
    similar_asserts::assert_eq!(report.summary(), "3 case(s), 0 failed");
}

pub fn wrong_expectations_are_itemized() {
    let cases = [
        InvocationDescriptor::new("to_fahrenheit", to_fahrenheit())
            .arg(0.0)
            .expect_returns([33.0])
            .expect_stdout(["0.0C is 32.0F"]),
        InvocationDescriptor::new("greet", greet())
            .input("Bo\n")
            .expect_stdout(["Hello, Bo!"]),
        InvocationDescriptor::new("tally", tally())
            .with_inputs(["1\n", "done\n"])
            .expect_returns([1, 1])
            .expect_stdout(["total 1", "bye"]),
    ];
    let report = grade(&cases);
    similar_asserts::assert_eq!(
        report.summary(),
        "3 case(s), 3 failed\n  \
         function 'to_fahrenheit' returned unexpected value. Specifically, return value position 0: expected 33.0, found 32.0\n  \
         function 'greet' displayed unexpected line to the terminal. Unexpected line was \"Name? Hello, Bo!\".\n  \
         function 'tally' displayed unexpected number of output lines to the terminal. Expected 2 line(s), found 1 line(s)"
    );
}

pub fn extra_stdin_read_is_reported_as_timeout() {
    let mut cases = vec![InvocationDescriptor::new("double_prompt", double_prompt()).input("one\n")];
    cases.extend(passing_cases());

    let started = Instant::now();
    let report = grade(&cases);
    assert!(started.elapsed() < Duration::from_secs(3));

    let hung = &report.cases[0];
    assert!(hung.outcome.as_ref().is_some_and(Outcome::is_timed_out));
    assert_eq!(
        hung.failures[0].to_string(),
        "function 'double_prompt' timed out before completing. Do you have an extra stdin read, perhaps?"
    );
    // Later cases are unaffected by the abandoned call.
    assert!(report.cases[1..].iter().all(|case| case.passed()), "{}", report.summary());
    assert_eq!(driver().abandoned_count(), 0);
}

pub fn panicking_submission_does_not_stop_the_suite() {
    let cases = [
        InvocationDescriptor::new("last_word", last_word())
            .arg(vec!["a", "b"])
            .expect_returns(["b"]),
        InvocationDescriptor::new("to_fahrenheit", to_fahrenheit())
            .arg(-40.0)
            .expect_returns([-40.0])
            .expect_stdout(["-40.0C is -40.0F"]),
    ];
    let report = grade(&cases);
    match report.cases[0].failures.as_slice() {
        [Failure::Panicked { message, .. }] => {
            assert!(message.contains("index out of bounds"), "{message}")
        }
        other => panic!("expected a panic failure, got {other:?}"),
    }
    assert!(report.cases[1].passed(), "{}", report.summary());
}

pub fn seeded_output_is_reproducible() {
    let driver = driver();
    let rolls = |seed: u64| -> Vec<String> {
        let case = InvocationDescriptor::new("dice", dice()).arg(20).ignore_stdout().with_seed(seed);
        match driver.drive_blocking(&case).unwrap() {
            Outcome::Completed(done) => done.output.out_lines,
            other => panic!("expected completion, got {other:?}"),
        }
    };

    let first = rolls(1);
    assert_eq!(first.len(), 20);
    assert!(first.iter().all(|r| matches!(r.as_str(), "1" | "2" | "3" | "4" | "5" | "6")));
    assert_eq!(rolls(1), first);
    assert_ne!(rolls(7), first);

    // Output recorded from one run grades the next.
    let report = grade(&[InvocationDescriptor::new("dice", dice()).arg(20).expect_stdout(first)]);
    report.assert_success();
}

pub fn signature_mismatches_skip_the_drive() {
    let report = run_anatomy_cases(&[
        AnatomyCase::new("to_fahrenheit", to_fahrenheit(), [ValueKind::Float], [ValueKind::Float]),
        AnatomyCase::new("tally", tally(), [], [ValueKind::Int]),
    ]);
    similar_asserts::assert_eq!(
        report.summary(),
        "2 case(s), 1 failed\n  \
         function 'tally' returns unexpected number of values. Expected 1 value(s), found 2 value(s)"
    );

    // An integer argument where a float is declared never reaches the callable.
    let report = grade(&[InvocationDescriptor::new("to_fahrenheit", to_fahrenheit())
        .arg(100)
        .expect_returns([212.0])]);
    assert_eq!(report.cases[0].outcome, None);
    similar_asserts::assert_eq!(
        report.summary(),
        "1 case(s), 1 failed\n  \
         function 'to_fahrenheit' has unexpected parameter type at position 0. Expected type int, found type float"
    );
}

pub fn async_runner_matches_blocking_runner() {
    let cases = passing_cases();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let from_async = runtime.block_on(run_output_cases(&driver(), &cases));
    similar_asserts::assert_eq!(from_async, grade(&cases));
    from_async.assert_success();
}

pub fn report_is_serialized_for_tooling() {
    let report = grade(&passing_cases()[..1]);
    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    let case = &json["cases"][0];
    assert_eq!(case["name"], "to_fahrenheit");
    assert_eq!(case["outcome"]["status"], "completed");
    assert_eq!(
        case["outcome"]["returns"][0],
        serde_json::to_value(Value::Float(212.0)).unwrap()
    );
    assert_eq!(case["outcome"]["output"]["out_lines"][0], "100.0C is 212.0F");
    assert_eq!(case["failures"], serde_json::json!([]));
}
