// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the driver crate.

use std::time::Duration;

/// Drive deadline override
pub fn drive_timeout() -> Option<Duration> {
    millis("AG_DRIVE_TIMEOUT_MS")
}

/// Drain completion wait override
pub fn drain_timeout() -> Option<Duration> {
    millis("AG_DRAIN_TIMEOUT_MS")
}

fn millis(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
}
