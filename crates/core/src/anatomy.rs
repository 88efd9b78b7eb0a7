// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Anatomy check: does an invokable's declared signature match what a test
//! case is going to pass in and expect back?
//!
//! The driver never re-validates types, so a case should only be driven
//! after this check comes back clean.

use crate::descriptor::InvocationDescriptor;
use crate::invokable::Invokable;
use crate::value::{Value, ValueKind};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Expected shape of one callable.
#[derive(Clone)]
pub struct AnatomyCase {
    pub name: String,
    pub target: Arc<dyn Invokable>,
    pub params: Vec<ValueKind>,
    /// `None` skips the return check.
    pub returns: Option<Vec<ValueKind>>,
}

impl AnatomyCase {
    pub fn new(
        name: impl Into<String>,
        target: Arc<dyn Invokable>,
        params: impl IntoIterator<Item = ValueKind>,
        returns: impl IntoIterator<Item = ValueKind>,
    ) -> Self {
        Self {
            name: name.into(),
            target,
            params: params.into_iter().collect(),
            returns: Some(returns.into_iter().collect()),
        }
    }

    /// Derive expected kinds from a test case's arguments and, when they are
    /// checked, its expected return values.
    pub fn from_descriptor(case: &InvocationDescriptor) -> Self {
        Self {
            name: case.name().to_string(),
            target: Arc::clone(case.target()),
            params: case.args().iter().map(Value::kind).collect(),
            returns: case
                .expected_returns()
                .exact()
                .map(|values| values.iter().map(Value::kind).collect()),
        }
    }
}

/// A signature mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnatomyFailure {
    #[error("function '{name}' has unexpected number of parameters. Expected {expected} parameter(s), found {found} parameter(s)")]
    ParamCount {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("function '{name}' has unexpected parameter type at position {position}. Expected type {expected}, found type {found}")]
    ParamKind {
        name: String,
        position: usize,
        expected: ValueKind,
        found: ValueKind,
    },
    #[error("function '{name}' returns unexpected number of values. Expected {expected} value(s), found {found} value(s)")]
    ReturnCount {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("function '{name}' returns unexpected data type for return {position}. Expected type {expected}, found type {found}")]
    ReturnKind {
        name: String,
        position: usize,
        expected: ValueKind,
        found: ValueKind,
    },
}

/// Compare the declared signature against the case. Empty means it fits.
pub fn check_anatomy(case: &AnatomyCase) -> Vec<AnatomyFailure> {
    let signature = case.target.signature();
    let mut failures = Vec::new();

    if signature.params.len() == case.params.len() {
        for (position, (expected, found)) in case.params.iter().zip(&signature.params).enumerate()
        {
            if !expected.accepts(found) {
                failures.push(AnatomyFailure::ParamKind {
                    name: case.name.clone(),
                    position,
                    expected: expected.clone(),
                    found: found.clone(),
                });
            }
        }
    } else {
        failures.push(AnatomyFailure::ParamCount {
            name: case.name.clone(),
            expected: case.params.len(),
            found: signature.params.len(),
        });
    }

    let Some(returns) = &case.returns else {
        return failures;
    };
    if signature.returns.len() == returns.len() {
        for (position, (expected, found)) in returns.iter().zip(&signature.returns).enumerate() {
            if !expected.accepts(found) {
                failures.push(AnatomyFailure::ReturnKind {
                    name: case.name.clone(),
                    position,
                    expected: expected.clone(),
                    found: found.clone(),
                });
            }
        }
    } else {
        failures.push(AnatomyFailure::ReturnCount {
            name: case.name.clone(),
            expected: returns.len(),
            found: signature.returns.len(),
        });
    }

    failures
}

#[cfg(test)]
#[path = "anatomy_tests.rs"]
mod tests;
