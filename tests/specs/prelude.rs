//! Test helpers for grading scenarios.
//!
//! A small "submission" of callables, written the way a student exercise
//! would be, plus the driver settings it is graded with.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use ag_core::{invokable, CallContext, Invokable, Signature, Value, ValueKind};
use ag_driver::{Driver, DriverConfig};
use rand::Rng;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

// Short deadline so the hanging submission does not slow the suite.
const GRADING_DEADLINE_MS: u64 = 400;

pub fn driver() -> Driver {
    Driver::with_config(DriverConfig::new().deadline(Duration::from_millis(GRADING_DEADLINE_MS)))
}

fn say(ctx: &CallContext, line: impl std::fmt::Display) {
    writeln!(ctx.stdout(), "{line}").unwrap();
}

/// `celsius -> fahrenheit`, announcing the conversion.
pub fn to_fahrenheit() -> Arc<dyn Invokable> {
    invokable(
        Signature::new([ValueKind::Float], [ValueKind::Float]),
        |ctx, args| {
            let c = args[0].as_float().unwrap_or_default();
            let f = c * 9.0 / 5.0 + 32.0;
            say(ctx, format!("{c:.1}C is {f:.1}F"));
            vec![Value::Float(f)]
        },
    )
}

/// Prompts for a name and greets it.
pub fn greet() -> Arc<dyn Invokable> {
    invokable(Signature::nullary(), |ctx, _args| {
        write!(ctx.stdout(), "Name? ").unwrap();
        let name = ctx.read_line().unwrap().unwrap_or_default();
        say(ctx, format!("Hello, {name}!"));
        vec![]
    })
}

/// Reads integers until `done`, returns their sum and count.
pub fn tally() -> Arc<dyn Invokable> {
    invokable(
        Signature::new([], [ValueKind::Int, ValueKind::Int]),
        |ctx, _args| {
            let (mut sum, mut count) = (0i64, 0i64);
            while let Some(line) = ctx.read_line().unwrap() {
                if line == "done" {
                    break;
                }
                match line.trim().parse::<i64>() {
                    Ok(n) => {
                        sum += n;
                        count += 1;
                    }
                    Err(_) => writeln!(ctx.stderr(), "skipping {line:?}").unwrap(),
                }
            }
            say(ctx, format!("total {sum}"));
            vec![Value::Int(sum), Value::Int(count)]
        },
    )
}

/// Prints `n` dice rolls on one line each.
pub fn dice() -> Arc<dyn Invokable> {
    invokable(Signature::new([ValueKind::Int], []), |ctx, args| {
        for _ in 0..args[0].as_int().unwrap_or_default() {
            let value: u32 = ctx.rng().random_range(1..=6);
            say(ctx, value);
        }
        vec![]
    })
}

/// Asks for two lines when only one is ever supplied.
pub fn double_prompt() -> Arc<dyn Invokable> {
    invokable(Signature::nullary(), |ctx, _args| {
        let first = ctx.read_line().unwrap().unwrap_or_default();
        let second = ctx.read_line().unwrap().unwrap_or_default();
        say(ctx, format!("{first} {second}"));
        vec![]
    })
}

/// Indexes past the end of its input.
pub fn last_word() -> Arc<dyn Invokable> {
    invokable(
        Signature::new([ValueKind::list_of(ValueKind::Str)], [ValueKind::Str]),
        |_ctx, args| {
            let words = args[0].as_list().unwrap_or_default();
            vec![words[words.len()].clone()]
        },
    )
}
