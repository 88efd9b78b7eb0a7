// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for driving an invocation

use ag_capture::CaptureError;
use thiserror::Error;

/// Harness faults. Timeouts, panics and mismatches are outcomes, not errors.
#[derive(Debug, Error)]
pub enum DriveError {
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),
    #[error("failed to spawn invocation thread for {name}: {source}")]
    Spawn {
        name: String,
        source: std::io::Error,
    },
    #[error("failed to build runtime: {0}")]
    Runtime(#[source] std::io::Error),
}
