// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Descriptor-level save, swap and restore of the three standard streams.

use crate::error::CaptureError;
use nix::errno::Errno;
use nix::libc;
use nix::unistd;
use std::fmt;
use std::os::fd::RawFd;

/// One of the three standard streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    Stdin,
    Stdout,
    Stderr,
}

impl Stream {
    pub const ALL: [Stream; 3] = [Stream::Stdin, Stream::Stdout, Stream::Stderr];

    pub fn fd(self) -> RawFd {
        match self {
            Stream::Stdin => libc::STDIN_FILENO,
            Stream::Stdout => libc::STDOUT_FILENO,
            Stream::Stderr => libc::STDERR_FILENO,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stream::Stdin => "stdin",
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Duplicates of the original stdin/stdout/stderr, indexed like
/// [`Stream::ALL`].
///
/// Dropping without [`restore`](SavedStdio::restore) still puts the
/// originals back.
pub(crate) struct SavedStdio {
    fds: Option<[RawFd; 3]>,
}

impl SavedStdio {
    pub(crate) fn save() -> Result<Self, CaptureError> {
        let mut fds = [-1; 3];
        for (i, stream) in Stream::ALL.into_iter().enumerate() {
            match unistd::dup(stream.fd()) {
                Ok(fd) => fds[i] = fd,
                Err(source) => {
                    close_all(&fds[..i]);
                    return Err(CaptureError::Dup {
                        stream: stream.name(),
                        source,
                    });
                }
            }
        }
        Ok(Self { fds: Some(fds) })
    }

    /// Point each standard descriptor at the matching replacement.
    ///
    /// All or nothing: if one swap fails, the ones already made are undone.
    pub(crate) fn install(&self, replacements: [RawFd; 3]) -> Result<(), CaptureError> {
        let Some(saved) = self.fds else {
            return Ok(());
        };
        for (i, stream) in Stream::ALL.into_iter().enumerate() {
            if let Err(source) = unistd::dup2(replacements[i], stream.fd()) {
                for (j, done) in Stream::ALL.into_iter().enumerate().take(i) {
                    let _ = unistd::dup2(saved[j], done.fd());
                }
                return Err(CaptureError::Redirect {
                    stream: stream.name(),
                    source,
                });
            }
        }
        Ok(())
    }

    /// Put the originals back and release the duplicates.
    ///
    /// Returns the streams that could not be restored; the caller logs them
    /// once the streams that did come back are usable.
    pub(crate) fn restore(mut self) -> Vec<(Stream, Errno)> {
        self.restore_in_place()
    }

    fn restore_in_place(&mut self) -> Vec<(Stream, Errno)> {
        let Some(saved) = self.fds.take() else {
            return Vec::new();
        };
        let mut failed = Vec::new();
        for (i, stream) in Stream::ALL.into_iter().enumerate() {
            if let Err(e) = unistd::dup2(saved[i], stream.fd()) {
                failed.push((stream, e));
            }
        }
        close_all(&saved);
        failed
    }
}

impl Drop for SavedStdio {
    fn drop(&mut self) {
        for (stream, error) in self.restore_in_place() {
            tracing::warn!(%stream, %error, "failed to restore stream on drop");
        }
    }
}

fn close_all(fds: &[RawFd]) {
    for &fd in fds {
        let _ = unistd::close(fd);
    }
}
