// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background writer for the stdin pipe.
//!
//! Input is queued without blocking the caller and written with blocking
//! writes while the reader consumes it, so text larger than the pipe's
//! buffer arrives in full. Like a drain, the thread reports once when it is
//! done.

use crate::error::CaptureError;
use crate::stdio::Stream;
use std::io::{self, PipeWriter, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

pub(crate) struct Feed {
    queue: Option<mpsc::Sender<String>>,
    done: mpsc::Receiver<Fed>,
}

impl Feed {
    pub(crate) fn spawn(writer: PipeWriter) -> Result<Self, CaptureError> {
        let (queue, pending) = mpsc::channel();
        let (tx, done) = mpsc::channel();
        std::thread::Builder::new()
            .name(format!("feed:{}", Stream::Stdin))
            .spawn(move || {
                let _ = tx.send(pump(writer, &pending));
            })
            .map_err(|source| CaptureError::Spawn {
                stream: Stream::Stdin.name(),
                source,
            })?;
        Ok(Self {
            queue: Some(queue),
            done,
        })
    }

    /// Queue `text` behind everything pushed before it.
    pub(crate) fn push(&mut self, text: &str) -> Result<(), CaptureError> {
        let queue = self.queue.as_ref().ok_or(CaptureError::InputClosed)?;
        if queue.send(text.to_string()).is_err() {
            // The writer gave up; nothing more can be delivered.
            self.queue = None;
            return Err(CaptureError::InputClosed);
        }
        Ok(())
    }

    /// No more input; the reader sees end of file once the queue is written.
    pub(crate) fn close(&mut self) {
        self.queue = None;
    }

    /// Close the queue and wait up to `timeout` for the writer to finish.
    ///
    /// The stdin read end must be closed (or fully read) first, otherwise a
    /// writer blocked on a full pipe only returns at the timeout.
    pub(crate) fn finish(mut self, timeout: Duration) -> FeedStatus {
        self.close();
        match self.done.recv_timeout(timeout) {
            Ok(fed) => FeedStatus::Done(fed),
            Err(RecvTimeoutError::Timeout) => FeedStatus::Unfinished,
            Err(RecvTimeoutError::Disconnected) => FeedStatus::Done(Fed {
                error: Some(io::Error::other("feed thread exited without reporting")),
                ..Fed::default()
            }),
        }
    }
}

fn pump(mut writer: PipeWriter, pending: &mpsc::Receiver<String>) -> Fed {
    let mut fed = Fed::default();
    while let Ok(text) = pending.recv() {
        if let Err(error) = writer.write_all(text.as_bytes()) {
            fed.undelivered = text.len() + pending.try_iter().map(|t| t.len()).sum::<usize>();
            fed.error = Some(error);
            break;
        }
        fed.written += text.len();
    }
    fed
}

#[derive(Debug, Default)]
pub(crate) struct Fed {
    pub(crate) written: usize,
    /// Bytes still queued when the pipe stopped accepting writes.
    pub(crate) undelivered: usize,
    pub(crate) error: Option<io::Error>,
}

#[derive(Debug)]
pub(crate) enum FeedStatus {
    Done(Fed),
    /// Still blocked writing; someone else keeps the read end open.
    Unfinished,
}

impl FeedStatus {
    /// Queued bytes the reader never received.
    pub(crate) fn undelivered(&self) -> usize {
        match self {
            FeedStatus::Done(fed) => fed.undelivered,
            FeedStatus::Unfinished => 0,
        }
    }

    pub(crate) fn log_problems(&self) {
        match self {
            FeedStatus::Done(Fed {
                error: Some(error),
                written,
                ..
            }) if error.kind() != io::ErrorKind::BrokenPipe => tracing::warn!(
                %error,
                written,
                "failed to write stdin input"
            ),
            FeedStatus::Done(_) => {}
            FeedStatus::Unfinished => {
                tracing::warn!("stdin feed did not finish in time; input may still be pending")
            }
        }
    }
}

#[cfg(test)]
#[path = "feed_tests.rs"]
mod tests;
