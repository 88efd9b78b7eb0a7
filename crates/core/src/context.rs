// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-invocation context handed to an [`Invokable`](crate::Invokable).
//!
//! The context owns the pseudo-random generator the callable should draw
//! from. It is seeded freshly for every invocation, so the same seed always
//! yields the same sequence and one invocation cannot disturb another.
//!
//! The stdio accessors return the process handles. While a capture is
//! active those handles point at the capture's pipes. Writing through them
//! (rather than the `print!` family) also bypasses libtest's per-thread
//! output capture, which would otherwise swallow the text before it reaches
//! file descriptor 1.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared between the driver and a callable.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// State available to a callable for the duration of one invocation.
pub struct CallContext {
    seed: u64,
    rng: StdRng,
    cancel: CancelToken,
}

impl CallContext {
    /// Build a context whose generator is seeded with `seed`.
    pub fn new(seed: u64, cancel: CancelToken) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
            cancel,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The invocation's deterministic generator.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// True once the driver has given up on this invocation.
    ///
    /// Long-running callables should poll this and return early.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn stdin(&self) -> io::StdinLock<'static> {
        io::stdin().lock()
    }

    pub fn stdout(&self) -> io::Stdout {
        io::stdout()
    }

    pub fn stderr(&self) -> io::Stderr {
        io::stderr()
    }

    /// Read one line from standard input without its line terminator.
    ///
    /// Returns `Ok(None)` at end of input.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.stdin().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(len);
        Ok(Some(line))
    }
}

impl fmt::Debug for CallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallContext")
            .field("seed", &self.seed)
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
