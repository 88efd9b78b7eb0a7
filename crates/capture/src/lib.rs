// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Process-wide standard stream capture.
//!
//! [`StreamCapture::start`] swaps file descriptors 0, 1 and 2 for pipes,
//! drains the output pipes on background threads, and feeds queued input
//! into the stdin pipe from another. [`StreamCapture::stop`] restores the original
//! descriptors and returns the captured text split into lines.
//!
//! ```no_run
//! use ag_capture::{CaptureConfig, StreamCapture};
//! use std::io::Write;
//!
//! # fn example() -> Result<(), ag_capture::CaptureError> {
//! let capture = StreamCapture::start(CaptureConfig::new())?;
//! writeln!(std::io::stdout(), "hello").ok();
//! let captured = capture.stop();
//! assert_eq!(captured.out_lines, vec!["hello"]);
//! # Ok(())
//! # }
//! ```
//!
//! Only one capture may be active in the process. A second capture from
//! another thread waits for the first to stop; a second capture from the
//! same thread fails with [`CaptureError::Reentrant`].
//!
//! Text written with `print!`/`println!` on a thread whose output libtest
//! is capturing never reaches descriptor 1 and so is not seen here.

mod capture;
mod drain;
mod error;
mod feed;
mod lease;
pub mod lines;
mod stdio;

pub use capture::{CaptureConfig, CapturedOutput, StreamCapture, DEFAULT_DRAIN_TIMEOUT};
pub use error::CaptureError;
pub use lease::capture_active_on_this_thread;
pub use stdio::Stream;
