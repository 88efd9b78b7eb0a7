// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single-use stream capture.

use crate::drain::{Drain, Drained};
use crate::error::CaptureError;
use crate::feed::Feed;
use crate::lease::StdioLease;
use crate::lines::{split_error_lines, split_fields};
use crate::stdio::{SavedStdio, Stream};
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, Read, Write};
use std::os::fd::{AsFd, AsRawFd};
use std::time::Duration;

/// Upper bound on waiting for a drain thread to see end of stream at stop.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_millis(250);

/// Options for [`StreamCapture::start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    delimiters: Vec<char>,
    drain_timeout: Duration,
    std_buffers: StdBuffers,
}

impl CaptureConfig {
    /// Newline-delimited output, default drain timeout.
    pub fn new() -> Self {
        Self {
            delimiters: vec!['\n'],
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
            std_buffers: StdBuffers::Settle,
        }
    }

    /// Characters that split captured output into lines.
    pub fn delimiters(mut self, delimiters: impl IntoIterator<Item = char>) -> Self {
        self.delimiters = delimiters.into_iter().collect();
        self
    }

    pub fn drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Never take std's stdin, stdout or stderr locks, at start or at stop.
    ///
    /// For when another thread may be holding one of them indefinitely.
    /// Text buffered inside std is then neither flushed into the capture
    /// nor discarded from it; unread input is still dropped from the pipe.
    pub fn leave_std_buffers(mut self) -> Self {
        self.std_buffers = StdBuffers::Leave;
        self
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Finalized text of a stopped capture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CapturedOutput {
    /// Output split on the configured delimiters, empty fields dropped.
    pub out_lines: Vec<String>,
    /// Error text split on newlines, trailing empty entry dropped.
    pub err_lines: Vec<String>,
}

/// What stop does with std's process-wide stdin and stdout buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StdBuffers {
    /// Flush pending output, discard unread input.
    Settle,
    /// Leave both alone; another thread may hold their locks.
    Leave,
}

/// Redirected standard streams for the duration of one invocation.
///
/// Created by [`start`](StreamCapture::start) and consumed by
/// [`stop`](StreamCapture::stop), so a capture can be stopped exactly once
/// and its lines only exist afterwards. Dropping a capture without stopping
/// it still restores the original streams, but the captured text is lost.
pub struct StreamCapture {
    delimiters: Vec<char>,
    drain_timeout: Duration,
    std_buffers: StdBuffers,
    // Field order is drop order: streams come back before the lease goes.
    saved: SavedStdio,
    input: Feed,
    out: Drain,
    err: Drain,
    _lease: StdioLease,
}

impl StreamCapture {
    /// Swap stdin, stdout and stderr for pipes and start draining output.
    ///
    /// Pipes, duplicates of the originals and drain threads are all set up
    /// before the first descriptor is swapped, so on error nothing has
    /// changed.
    pub fn start(config: CaptureConfig) -> Result<Self, CaptureError> {
        let lease = StdioLease::acquire()?;

        // Anything already buffered belongs to the original destinations.
        if config.std_buffers == StdBuffers::Settle {
            if let Err(error) = flush_std_streams() {
                tracing::warn!(%error, "failed to flush standard streams before capture");
            }
        }

        let (in_reader, in_writer) = pipe(Stream::Stdin)?;
        let (out_reader, out_writer) = pipe(Stream::Stdout)?;
        let (err_reader, err_writer) = pipe(Stream::Stderr)?;

        let saved = SavedStdio::save()?;
        let input = Feed::spawn(in_writer)?;
        let out = Drain::spawn(Stream::Stdout, out_reader)?;
        let err = Drain::spawn(Stream::Stderr, err_reader)?;

        saved.install([
            in_reader.as_raw_fd(),
            out_writer.as_raw_fd(),
            err_writer.as_raw_fd(),
        ])?;
        // Descriptors 0/1/2 now hold the only copies of these ends, so
        // restoring them is what closes the pipes.
        drop((in_reader, out_writer, err_writer));

        Ok(Self {
            delimiters: config.delimiters,
            drain_timeout: config.drain_timeout,
            std_buffers: config.std_buffers,
            saved,
            input,
            out,
            err,
            _lease: lease,
        })
    }

    /// Append `text` to standard input as if it had been typed.
    ///
    /// Never blocks. Text is queued and written by a background thread as
    /// the reader makes room, so input of any size arrives in order and in
    /// full.
    pub fn write_input(&mut self, text: &str) -> Result<(), CaptureError> {
        self.input.push(text)
    }

    /// Signal end of input; once queued text is read, stdin sees end of file.
    pub fn close_input(&mut self) {
        self.input.close();
    }

    /// Restore the original streams and return the captured lines.
    ///
    /// Input that was written but never read is discarded so it cannot leak
    /// into a later capture. Unless the capture was started with
    /// [`CaptureConfig::leave_std_buffers`], this flushes std's stdout and
    /// empties std's stdin buffer, taking both locks.
    pub fn stop(self) -> CapturedOutput {
        let buffers = self.std_buffers;
        self.finish(buffers)
    }

    /// Like [`stop`](StreamCapture::stop), but never takes std's stream
    /// locks, so text still buffered in-process is not captured.
    ///
    /// For use when an abandoned callable may still hold the stdin or stdout
    /// lock.
    pub fn stop_leaving_input(self) -> CapturedOutput {
        self.finish(StdBuffers::Leave)
    }

    fn finish(self, buffers: StdBuffers) -> CapturedOutput {
        let Self {
            delimiters,
            drain_timeout,
            std_buffers: _,
            saved,
            mut input,
            out,
            err,
            _lease: lease,
        } = self;

        let flushed = match buffers {
            StdBuffers::Settle => flush_std_streams(),
            StdBuffers::Leave => Ok(()),
        };
        input.close();
        let from_std = match buffers {
            StdBuffers::Settle => discard_buffered_stdin(),
            StdBuffers::Leave => Ok(0),
        };
        let from_pipe = discard_pipe_input();
        // Closes the stdin read end, so a writer stuck on a full pipe fails.
        let unrestored = saved.restore();
        let fed = input.finish(drain_timeout);
        let out = out.finish(drain_timeout);
        let err = err.finish(drain_timeout);
        drop(lease);

        // Streams are back; diagnostics now reach the real stderr.
        if let Err(error) = flushed {
            tracing::warn!(%error, "failed to flush standard streams before restoring them");
        }
        let discarded = match (from_std, from_pipe) {
            (Ok(buffered), Ok(piped)) => Ok(buffered + piped + fed.undelivered()),
            (Err(error), _) | (_, Err(error)) => Err(error),
        };
        match discarded {
            Ok(0) => {}
            Ok(bytes) => tracing::debug!(bytes, "discarded unread stdin input"),
            Err(error) => tracing::warn!(%error, "failed to discard unread stdin input"),
        }
        fed.log_problems();
        for (stream, error) in unrestored {
            tracing::warn!(%stream, %error, "failed to restore stream");
        }
        finalize(&out, &err, &delimiters)
    }
}

fn finalize(out: &Drained, err: &Drained, delimiters: &[char]) -> CapturedOutput {
    out.log_problems();
    err.log_problems();
    CapturedOutput {
        out_lines: split_fields(&out.text(), delimiters),
        err_lines: split_error_lines(&err.text()),
    }
}

fn pipe(stream: Stream) -> Result<(io::PipeReader, io::PipeWriter), CaptureError> {
    io::pipe().map_err(|source| CaptureError::Pipe {
        stream: stream.name(),
        source,
    })
}

fn flush_std_streams() -> io::Result<()> {
    io::stdout().flush()?;
    io::stderr().flush()
}

/// Empty std's stdin buffer and the pipe behind it. Input must already be
/// closed so this ends at end of file.
fn discard_buffered_stdin() -> io::Result<usize> {
    let mut stdin = io::stdin().lock();
    let mut discarded = 0;
    loop {
        let available = match stdin.fill_buf() {
            Ok(buf) => buf.len(),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if available == 0 {
            return Ok(discarded);
        }
        stdin.consume(available);
        discarded += available;
    }
}

/// Read whatever is left in the stdin pipe straight from descriptor 0,
/// without std's stdin lock. Stops when the pipe is empty rather than
/// waiting for end of file.
fn discard_pipe_input() -> io::Result<usize> {
    let mut pipe = File::from(io::stdin().as_fd().try_clone_to_owned()?);
    fcntl(pipe.as_raw_fd(), FcntlArg::F_SETFL(OFlag::O_NONBLOCK)).map_err(io::Error::from)?;
    let mut chunk = [0u8; 8192];
    let mut discarded = 0;
    loop {
        match pipe.read(&mut chunk) {
            Ok(0) => return Ok(discarded),
            Ok(n) => discarded += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(discarded),
            Err(e) => return Err(e),
        }
    }
}
