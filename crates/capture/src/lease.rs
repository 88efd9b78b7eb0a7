// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide right to redirect the standard streams.
//!
//! The descriptors being swapped are global, so captures are serialized
//! through one lock. The holder thread is remembered so that a nested
//! capture on the same thread fails instead of deadlocking.

use crate::error::CaptureError;
use parking_lot::{const_mutex, Mutex, MutexGuard};
use std::cell::Cell;

static STDIO: Mutex<()> = const_mutex(());

thread_local! {
    static HELD: Cell<bool> = const { Cell::new(false) };
}

/// Held for the lifetime of a capture. Not `Send`: it must be released on
/// the thread that took it.
pub(crate) struct StdioLease {
    _guard: MutexGuard<'static, ()>,
}

impl StdioLease {
    pub(crate) fn acquire() -> Result<Self, CaptureError> {
        if HELD.with(Cell::get) {
            return Err(CaptureError::Reentrant);
        }
        let guard = STDIO.lock();
        HELD.with(|held| held.set(true));
        Ok(Self { _guard: guard })
    }
}

impl Drop for StdioLease {
    fn drop(&mut self) {
        HELD.with(|held| held.set(false));
    }
}

/// Whether the calling thread currently holds an active capture.
pub fn capture_active_on_this_thread() -> bool {
    HELD.with(Cell::get)
}
