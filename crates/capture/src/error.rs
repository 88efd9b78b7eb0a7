// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capture errors

use nix::errno::Errno;
use thiserror::Error;

/// Errors raised while opening a capture or feeding it input.
///
/// Everything except [`InputClosed`](CaptureError::InputClosed) is a
/// resource failure during [`StreamCapture::start`](crate::StreamCapture::start);
/// when one is returned no stream has been swapped.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("a capture is already active on this thread")]
    Reentrant,
    #[error("failed to create {stream} pipe: {source}")]
    Pipe {
        stream: &'static str,
        source: std::io::Error,
    },
    #[error("failed to duplicate original {stream}: {source}")]
    Dup { stream: &'static str, source: Errno },
    #[error("failed to redirect {stream}: {source}")]
    Redirect { stream: &'static str, source: Errno },
    #[error("failed to spawn {stream} pipe thread: {source}")]
    Spawn {
        stream: &'static str,
        source: std::io::Error,
    },
    #[error("stdin pipe is closed")]
    InputClosed,
}
