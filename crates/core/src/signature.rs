// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declared parameter and return shapes of an invokable.

use crate::value::ValueKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered parameter kinds and ordered return kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub params: Vec<ValueKind>,
    pub returns: Vec<ValueKind>,
}

impl Signature {
    pub fn new(
        params: impl IntoIterator<Item = ValueKind>,
        returns: impl IntoIterator<Item = ValueKind>,
    ) -> Self {
        Self {
            params: params.into_iter().collect(),
            returns: returns.into_iter().collect(),
        }
    }

    /// A signature with no parameters and no return values.
    pub fn nullary() -> Self {
        Self::default()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn({})", join(&self.params))?;
        match self.returns.len() {
            0 => Ok(()),
            1 => write!(f, " -> {}", join(&self.returns)),
            _ => write!(f, " -> ({})", join(&self.returns)),
        }
    }
}

fn join(kinds: &[ValueKind]) -> String {
    kinds
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
