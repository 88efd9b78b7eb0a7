// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Invocation threads left running after their deadline.
//!
//! A thread cannot be killed, only asked to stop. Timed-out invocations are
//! cancelled and see end of file on stdin once the capture closes; the ones
//! that still do not return are parked here so later drives can report them.

use crate::outcome::duration_ms;
use parking_lot::{const_mutex, Mutex};
use std::thread::JoinHandle;
use std::time::Instant;

struct Abandoned {
    name: String,
    handle: JoinHandle<()>,
    since: Instant,
}

static ABANDONED: Mutex<Vec<Abandoned>> = const_mutex(Vec::new());

pub(crate) fn register(name: &str, handle: JoinHandle<()>) {
    ABANDONED.lock().push(Abandoned {
        name: name.to_string(),
        handle,
        since: Instant::now(),
    });
}

/// Join abandoned invocations that have since finished.
///
/// Returns how many are still running.
pub fn reap_abandoned() -> usize {
    let mut registry = ABANDONED.lock();
    let (finished, running): (Vec<_>, Vec<_>) = std::mem::take(&mut *registry)
        .into_iter()
        .partition(|entry| entry.handle.is_finished());
    *registry = running;
    let still_running = registry.len();
    drop(registry);

    for entry in finished {
        let elapsed_ms = duration_ms(entry.since.elapsed());
        if entry.handle.join().is_err() {
            tracing::warn!(case = %entry.name, elapsed_ms, "abandoned invocation panicked");
        } else {
            tracing::debug!(case = %entry.name, elapsed_ms, "reaped abandoned invocation");
        }
    }
    still_running
}

#[cfg(test)]
#[path = "abandoned_tests.rs"]
mod tests;
