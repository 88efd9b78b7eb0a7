// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Driving one invocation: capture, call, feed input, wait, classify.

use crate::abandoned::{reap_abandoned, register};
use crate::config::DriverConfig;
use crate::error::DriveError;
use crate::outcome::{duration_ms, Completion, Outcome};
use ag_capture::{CaptureConfig, CaptureError, StreamCapture};
use ag_core::{CallContext, CancelToken, InvocationDescriptor, Value};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tokio::sync::oneshot;

type CallResult = Result<Vec<Value>, String>;

/// Runs invocation descriptors one at a time under stream capture.
///
/// The standard streams are process-wide, so concurrent drives from
/// different threads queue on the capture lease rather than interleave.
#[derive(Debug, Clone, Default)]
pub struct Driver {
    config: DriverConfig,
}

impl Driver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DriverConfig) -> Self {
        Self { config }
    }

    /// Driver using [`DriverConfig::from_env`].
    pub fn from_env() -> Self {
        Self::with_config(DriverConfig::from_env())
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Timed-out invocations from earlier drives that are still running.
    pub fn abandoned_count(&self) -> usize {
        reap_abandoned()
    }

    /// Invoke `case`'s target with its arguments and input under capture.
    ///
    /// Returns once the callable returns, panics, or runs past the deadline.
    /// Only harness faults are errors.
    ///
    /// The returned future holds the capture lease and is not `Send`; run it
    /// on the thread that polls it (`#[tokio::test]`, `block_on`).
    pub async fn drive(&self, case: &InvocationDescriptor) -> Result<Outcome, DriveError> {
        let stale = reap_abandoned();
        if stale > 0 {
            tracing::warn!(
                stale,
                "abandoned invocations from earlier drives are still running"
            );
        }
        tracing::debug!(
            case = case.name(),
            seed = case.seed(),
            args = case.args().len(),
            inputs = case.inputs().len(),
            deadline_ms = duration_ms(self.config.deadline),
            "driving invocation"
        );

        let started = Instant::now();
        let mut capture_config = CaptureConfig::new()
            .delimiters(self.config.output_delimiters.iter().copied())
            .drain_timeout(self.config.drain_timeout);
        if stale > 0 {
            // An abandoned call may sit on std's stdin or stdout lock forever.
            capture_config = capture_config.leave_std_buffers();
        }
        let mut capture = StreamCapture::start(capture_config)?;

        let cancel = CancelToken::new();
        let (tx, mut rx) = oneshot::channel();
        let handle = match spawn_invocation(case, cancel.clone(), tx) {
            Ok(handle) => handle,
            Err(source) => {
                capture.stop();
                return Err(DriveError::Spawn {
                    name: case.name().to_string(),
                    source,
                });
            }
        };

        let input_error = feed(&mut capture, case.inputs());

        let outcome = match tokio::time::timeout(self.config.deadline, &mut rx).await {
            Ok(result) => {
                let output = capture.stop();
                if handle.join().is_err() {
                    tracing::warn!(case = case.name(), "invocation thread failed after reporting");
                }
                match result {
                    Ok(Ok(returns)) => Outcome::Completed(Completion { returns, output }),
                    Ok(Err(message)) => Outcome::Panicked { message, output },
                    Err(_) => Outcome::Panicked {
                        message: "invocation thread exited without reporting".to_string(),
                        output,
                    },
                }
            }
            Err(_elapsed) => {
                cancel.cancel();
                // The hung call may still hold the stdin or stdout lock.
                capture.stop_leaving_input();
                // A blocked read now sees end of file; give it a moment.
                match tokio::time::timeout(self.config.drain_timeout, &mut rx).await {
                    Ok(_) => {
                        let _ = handle.join();
                    }
                    Err(_) => register(case.name(), handle),
                }
                Outcome::TimedOut {
                    deadline: self.config.deadline,
                }
            }
        };

        if let Some((index, error)) = input_error {
            tracing::warn!(case = case.name(), index, %error, "input was not fully delivered");
        }
        tracing::info!(
            case = case.name(),
            outcome = outcome.label(),
            elapsed_ms = duration_ms(started.elapsed()),
            "invocation finished"
        );
        Ok(outcome)
    }

    /// [`drive`](Driver::drive) on a fresh current-thread runtime.
    ///
    /// Must not be called from inside another tokio runtime.
    pub fn drive_blocking(&self, case: &InvocationDescriptor) -> Result<Outcome, DriveError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(DriveError::Runtime)?;
        runtime.block_on(self.drive(case))
    }
}

/// Queue each input in order. Stops at the first failure and closes input so
/// the callable sees end of file instead of waiting on text that never comes.
fn feed(capture: &mut StreamCapture, inputs: &[String]) -> Option<(usize, CaptureError)> {
    for (index, text) in inputs.iter().enumerate() {
        if let Err(error) = capture.write_input(text) {
            capture.close_input();
            return Some((index, error));
        }
    }
    None
}

fn spawn_invocation(
    case: &InvocationDescriptor,
    cancel: CancelToken,
    tx: oneshot::Sender<CallResult>,
) -> std::io::Result<JoinHandle<()>> {
    let target = Arc::clone(case.target());
    let args = case.args().to_vec();
    let seed = case.seed();
    thread::Builder::new()
        .name(format!("invoke:{}", case.name()))
        .spawn(move || {
            // Seeded here, immediately before the call, so nothing else can
            // draw from the generator first.
            let mut ctx = CallContext::new(seed, cancel);
            let result = panic::catch_unwind(AssertUnwindSafe(|| target.invoke(&mut ctx, &args)))
                .map_err(|payload| panic_message(&*payload));
            let _ = tx.send(result);
        })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
