// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ag-driver: bounded invocation of a callable under stream capture
//!
//! A [`Driver`] runs one [`InvocationDescriptor`](ag_core::InvocationDescriptor)
//! at a time: it opens a capture, calls the target on its own thread, feeds
//! the prepared input and waits for completion or the deadline. The
//! [`report`] module compares outcomes against a case's expectations.

mod abandoned;
mod config;
mod driver;
pub mod env;
mod error;
mod outcome;
pub mod report;

pub use abandoned::reap_abandoned;
pub use config::{DriverConfig, DEFAULT_DEADLINE};
pub use driver::Driver;
pub use error::DriveError;
pub use outcome::{Completion, Outcome};
pub use report::{
    check_outcome, run_anatomy_cases, run_output_cases, run_output_cases_blocking, CaseReport,
    Failure, Report,
};
