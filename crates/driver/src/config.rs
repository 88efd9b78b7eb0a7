// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Driver configuration

use ag_capture::DEFAULT_DRAIN_TIMEOUT;
use std::time::Duration;

/// How long a callable may run before it is considered hung.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(3);

/// Driver settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Wall-clock limit for one invocation
    pub deadline: Duration,
    /// Bound on waiting for captured output to drain at stop
    pub drain_timeout: Duration,
    /// Characters that split captured output into lines
    pub output_delimiters: Vec<char>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            deadline: DEFAULT_DEADLINE,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
            output_delimiters: vec!['\n'],
        }
    }
}

impl DriverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, overridden by `AG_DRIVE_TIMEOUT_MS` and `AG_DRAIN_TIMEOUT_MS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(deadline) = crate::env::drive_timeout() {
            config.deadline = deadline;
        }
        if let Some(drain) = crate::env::drain_timeout() {
            config.drain_timeout = drain;
        }
        config
    }

    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    pub fn output_delimiters(mut self, delimiters: impl IntoIterator<Item = char>) -> Self {
        self.output_delimiters = delimiters.into_iter().collect();
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
