// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turning captured text into line sequences.

/// Split `text` at any of `delimiters`, dropping empty fields.
///
/// Blank lines and a trailing delimiter therefore produce nothing. With no
/// delimiters the whole (non-empty) text is a single field.
pub fn split_fields(text: &str, delimiters: &[char]) -> Vec<String> {
    text.split(|c: char| delimiters.contains(&c))
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split error text on `'\n'`, keeping interior blank lines but dropping the
/// single empty entry a trailing newline leaves behind.
pub fn split_error_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    if lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines
}

#[cfg(test)]
#[path = "lines_tests.rs"]
mod tests;
