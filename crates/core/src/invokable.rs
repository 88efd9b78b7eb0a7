// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The capability the harness calls: a fixed argument sequence in, a fixed
//! result sequence out.

use crate::context::CallContext;
use crate::signature::Signature;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// A callable under test.
///
/// Implementations declare their [`Signature`] up front; the anatomy check
/// compares it against a test case before the harness ever invokes them.
/// `invoke` runs on a dedicated thread, hence `Send + Sync`.
pub trait Invokable: Send + Sync {
    fn signature(&self) -> Signature;

    fn invoke(&self, ctx: &mut CallContext, args: &[Value]) -> Vec<Value>;
}

/// Adapts a closure into an [`Invokable`].
pub struct FnInvokable<F> {
    signature: Signature,
    f: F,
}

impl<F> FnInvokable<F>
where
    F: Fn(&mut CallContext, &[Value]) -> Vec<Value> + Send + Sync,
{
    pub fn new(signature: Signature, f: F) -> Self {
        Self { signature, f }
    }
}

impl<F> Invokable for FnInvokable<F>
where
    F: Fn(&mut CallContext, &[Value]) -> Vec<Value> + Send + Sync,
{
    fn signature(&self) -> Signature {
        self.signature.clone()
    }

    fn invoke(&self, ctx: &mut CallContext, args: &[Value]) -> Vec<Value> {
        (self.f)(ctx, args)
    }
}

impl<F> fmt::Debug for FnInvokable<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnInvokable")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Wrap a closure as a shareable invokable.
pub fn invokable<F>(signature: Signature, f: F) -> Arc<dyn Invokable>
where
    F: Fn(&mut CallContext, &[Value]) -> Vec<Value> + Send + Sync + 'static,
{
    Arc::new(FnInvokable::new(signature, f))
}
