// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background copy of a pipe's read end into a shared buffer.
//!
//! Each drain thread reports once, on a channel, when it reaches end of
//! stream or fails. Stopping a capture waits on that report instead of
//! sleeping and hoping the copy has caught up.

use crate::error::CaptureError;
use crate::stdio::Stream;
use parking_lot::Mutex;
use std::io::{self, Read};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

const CHUNK: usize = 8192;

pub(crate) struct Drain {
    stream: Stream,
    buffer: Arc<Mutex<Vec<u8>>>,
    done: mpsc::Receiver<io::Result<()>>,
}

impl Drain {
    pub(crate) fn spawn<R>(stream: Stream, reader: R) -> Result<Self, CaptureError>
    where
        R: Read + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let (tx, done) = mpsc::channel();
        let sink = Arc::clone(&buffer);
        std::thread::Builder::new()
            .name(format!("drain:{}", stream))
            .spawn(move || {
                let _ = tx.send(pump(reader, &sink));
            })
            .map_err(|source| CaptureError::Spawn {
                stream: stream.name(),
                source,
            })?;
        Ok(Self {
            stream,
            buffer,
            done,
        })
    }

    /// Wait up to `timeout` for end of stream, then take what was copied.
    pub(crate) fn finish(self, timeout: Duration) -> Drained {
        let status = match self.done.recv_timeout(timeout) {
            Ok(Ok(())) => DrainStatus::Complete,
            Ok(Err(e)) => DrainStatus::Failed(e),
            Err(RecvTimeoutError::Timeout) => DrainStatus::Unfinished,
            Err(RecvTimeoutError::Disconnected) => {
                DrainStatus::Failed(io::Error::other("drain thread exited without reporting"))
            }
        };
        let bytes = std::mem::take(&mut *self.buffer.lock());
        Drained {
            stream: self.stream,
            bytes,
            status,
        }
    }
}

fn pump<R: Read>(mut reader: R, sink: &Mutex<Vec<u8>>) -> io::Result<()> {
    let mut chunk = [0u8; CHUNK];
    loop {
        match reader.read(&mut chunk) {
            Ok(0) => return Ok(()),
            Ok(n) => sink.lock().extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

#[derive(Debug)]
pub(crate) enum DrainStatus {
    Complete,
    Failed(io::Error),
    /// End of stream was not seen in time; someone still holds a write end.
    Unfinished,
}

#[derive(Debug)]
pub(crate) struct Drained {
    pub(crate) stream: Stream,
    pub(crate) bytes: Vec<u8>,
    pub(crate) status: DrainStatus,
}

impl Drained {
    pub(crate) fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    pub(crate) fn log_problems(&self) {
        match &self.status {
            DrainStatus::Complete => {}
            DrainStatus::Failed(error) => tracing::warn!(
                stream = %self.stream,
                %error,
                captured = self.bytes.len(),
                "drain failed; captured text may be incomplete"
            ),
            DrainStatus::Unfinished => tracing::warn!(
                stream = %self.stream,
                captured = self.bytes.len(),
                "drain did not reach end of stream in time; captured text may be incomplete"
            ),
        }
    }
}

#[cfg(test)]
#[path = "drain_tests.rs"]
mod tests;
