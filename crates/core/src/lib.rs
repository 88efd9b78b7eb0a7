// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ag-core: values, invokables and test case descriptors for the grading harness

pub mod anatomy;
pub mod context;
pub mod descriptor;
pub mod invokable;
pub mod signature;
pub mod value;

pub use anatomy::{check_anatomy, AnatomyCase, AnatomyFailure};
pub use context::{CallContext, CancelToken};
pub use descriptor::{Expect, InvocationDescriptor, DEFAULT_SEED};
pub use invokable::{invokable, FnInvokable, Invokable};
pub use signature::Signature;
pub use value::{Value, ValueKind};
