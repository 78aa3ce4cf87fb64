// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Path grammar: `name([index])?(.name([index])?)*`.

use crate::config::PATH_SEPARATOR;
use crate::error::{Error, Result};
use std::fmt;

/// One parsed path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Segment<'a> {
    pub name: &'a str,
    pub index: Option<usize>,
}

impl fmt::Display for Segment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}[{index}]", self.name),
            None => f.write_str(self.name),
        }
    }
}

fn invalid(path: &str, detail: &str) -> Error {
    Error::InvalidPath {
        path: path.to_string(),
        detail: detail.to_string(),
    }
}

/// Check that `key` is usable as an entry name.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(invalid(key, "empty name"));
    }
    if let Some(c) = key
        .chars()
        .find(|c| *c == PATH_SEPARATOR || *c == '[' || *c == ']' || c.is_whitespace())
    {
        return Err(invalid(key, &format!("name contains {c:?}")));
    }
    Ok(())
}

/// Split a path into segments. The empty path yields no segments.
pub(crate) fn parse(path: &str) -> Result<Vec<Segment<'_>>> {
    if path.is_empty() {
        return Ok(Vec::new());
    }
    path.split(PATH_SEPARATOR)
        .map(|token| parse_segment(path, token))
        .collect()
}

fn parse_segment<'a>(path: &str, token: &'a str) -> Result<Segment<'a>> {
    let (name, index) = match token.find('[') {
        Some(open) => {
            let digits = token[open + 1..]
                .strip_suffix(']')
                .ok_or_else(|| invalid(path, "unterminated index"))?;
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid(path, "index must be a non-negative decimal"));
            }
            let index = digits
                .parse::<usize>()
                .map_err(|_| invalid(path, "index too large"))?;
            (&token[..open], Some(index))
        }
        None => (token, None),
    };
    validate_key(name).map_err(|_| invalid(path, &format!("bad segment '{token}'")))?;
    Ok(Segment { name, index })
}

/// Render segments back into a path.
pub(crate) fn join(segments: &[Segment<'_>]) -> String {
    segments
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// `prefix.key`, or `key` at the root.
pub(crate) fn child(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}{PATH_SEPARATOR}{key}")
    }
}
