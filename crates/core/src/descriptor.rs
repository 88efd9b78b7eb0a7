// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Immutable description of one test case.
//!
//! Build with [`InvocationDescriptor::new`] and the chained setters:
//!
//! ```
//! use ag_core::{invokable, InvocationDescriptor, Signature, Value, ValueKind};
//!
//! let double = invokable(Signature::new([ValueKind::Int], [ValueKind::Int]), |_ctx, args| {
//!     vec![Value::from(args[0].as_int().unwrap_or_default() * 2)]
//! });
//! let case = InvocationDescriptor::new("double", double)
//!     .arg(21)
//!     .expect_returns([42]);
//! assert_eq!(case.seed(), 1);
//! ```

use crate::invokable::Invokable;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Seed applied to the invocation's generator unless a case overrides it.
pub const DEFAULT_SEED: u64 = 1;

/// An expectation that is either checked exactly or ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum Expect<T> {
    Ignore,
    Exact(T),
}

impl<T> Expect<T> {
    pub fn exact(&self) -> Option<&T> {
        match self {
            Expect::Exact(v) => Some(v),
            Expect::Ignore => None,
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Expect::Ignore)
    }
}

/// One test case: target, arguments, stdin lines and expectations.
///
/// Expected returns and expected output default to "exactly nothing": a
/// case that neither sets nor ignores them asserts that the callable
/// returns no values and prints no lines. Error output is ignored unless
/// set.
#[derive(Clone)]
pub struct InvocationDescriptor {
    name: String,
    target: Arc<dyn Invokable>,
    args: Vec<Value>,
    inputs: Vec<String>,
    returns: Expect<Vec<Value>>,
    stdout: Expect<Vec<String>>,
    stderr: Expect<Vec<String>>,
    seed: u64,
}

impl InvocationDescriptor {
    pub fn new(name: impl Into<String>, target: Arc<dyn Invokable>) -> Self {
        Self {
            name: name.into(),
            target,
            args: Vec::new(),
            inputs: Vec::new(),
            returns: Expect::Exact(Vec::new()),
            stdout: Expect::Exact(Vec::new()),
            stderr: Expect::Ignore,
            seed: DEFAULT_SEED,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Append several arguments.
    pub fn with_args(mut self, values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        self.args.extend(values.into_iter().map(Into::into));
        self
    }

    /// Queue text for standard input. Written verbatim, so include `\n`
    /// where the callable reads whole lines.
    pub fn input(mut self, text: impl Into<String>) -> Self {
        self.inputs.push(text.into());
        self
    }

    pub fn with_inputs(mut self, texts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.inputs.extend(texts.into_iter().map(Into::into));
        self
    }

    pub fn expect_returns(mut self, values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        self.returns = Expect::Exact(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn ignore_returns(mut self) -> Self {
        self.returns = Expect::Ignore;
        self
    }

    /// Expected output lines, compared after trimming each captured line.
    pub fn expect_stdout(mut self, lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.stdout = Expect::Exact(lines.into_iter().map(Into::into).collect());
        self
    }

    pub fn ignore_stdout(mut self) -> Self {
        self.stdout = Expect::Ignore;
        self
    }

    /// Expected error lines, compared verbatim.
    pub fn expect_stderr(mut self, lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.stderr = Expect::Exact(lines.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &Arc<dyn Invokable> {
        &self.target
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn expected_returns(&self) -> &Expect<Vec<Value>> {
        &self.returns
    }

    pub fn expected_stdout(&self) -> &Expect<Vec<String>> {
        &self.stdout
    }

    pub fn expected_stderr(&self) -> &Expect<Vec<String>> {
        &self.stderr
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl fmt::Debug for InvocationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationDescriptor")
            .field("name", &self.name)
            .field("signature", &self.target.signature())
            .field("args", &self.args)
            .field("inputs", &self.inputs)
            .field("returns", &self.returns)
            .field("stdout", &self.stdout)
            .field("stderr", &self.stderr)
            .field("seed", &self.seed)
            .finish()
    }
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
