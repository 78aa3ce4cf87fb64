// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Value constraints read from descriptor attributes.
//!
//! Shared by schema construction (defaults must satisfy their own leaf) and
//! by the validator (input must satisfy the leaf).

use super::attr;
use crate::error::ErrorCode;
use crate::hash::Attributes;
use crate::types::{convert, Value};
use std::cmp::Ordering;

/// A constraint a value breaks.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Violation {
    pub code: ErrorCode,
    pub detail: String,
}

impl Violation {
    fn out_of_range(detail: String) -> Self {
        Self {
            code: ErrorCode::OutOfRange,
            detail,
        }
    }
}

/// Check `value` (already of the leaf's kind) against bounds, sizes and
/// options; the first violation wins.
pub(crate) fn check(attributes: &Attributes, value: &Value) -> Result<(), Violation> {
    match violations(attributes, value).into_iter().next() {
        Some(violation) => Err(violation),
        None => Ok(()),
    }
}

/// Every constraint group `value` breaks: bounds, then sizes, then options.
pub(crate) fn violations(attributes: &Attributes, value: &Value) -> Vec<Violation> {
    [
        check_bounds(attributes, value),
        check_size(attributes, value),
        check_options(attributes, value),
    ]
    .into_iter()
    .filter_map(std::result::Result::err)
    .collect()
}

fn check_bounds(attributes: &Attributes, value: &Value) -> Result<(), Violation> {
    let bounds = [
        (attr::MIN_INC, "<", Ordering::Less, true),
        (attr::MAX_INC, ">", Ordering::Greater, true),
        (attr::MIN_EXC, "<=", Ordering::Greater, false),
        (attr::MAX_EXC, ">=", Ordering::Less, false),
    ];
    for (name, symbol, ordering, inclusive) in bounds {
        let Some(bound) = attributes.get(name) else {
            continue;
        };
        // inclusive bounds fail on `ordering`, exclusive ones on anything but it
        let broken = match value.compare_numeric(bound) {
            Some(found) if inclusive => found == ordering,
            Some(found) => found != ordering,
            None => true,
        };
        if broken {
            return Err(Violation::out_of_range(format!(
                "{value} {symbol} {name} {bound}"
            )));
        }
    }
    Ok(())
}

fn check_size(attributes: &Attributes, value: &Value) -> Result<(), Violation> {
    match value.vector_len() {
        Some(len) => check_len(attributes, len),
        None => Ok(()),
    }
}

/// `minSize`/`maxSize` against an element count.
pub(crate) fn check_len(attributes: &Attributes, len: usize) -> Result<(), Violation> {
    if let Some(Value::Uint32(min)) = attributes.get(attr::MIN_SIZE) {
        if len < *min as usize {
            return Err(Violation::out_of_range(format!(
                "{len} elements, {} is {min}",
                attr::MIN_SIZE
            )));
        }
    }
    if let Some(Value::Uint32(max)) = attributes.get(attr::MAX_SIZE) {
        if len > *max as usize {
            return Err(Violation::out_of_range(format!(
                "{len} elements, {} is {max}",
                attr::MAX_SIZE
            )));
        }
    }
    Ok(())
}

fn check_options(attributes: &Attributes, value: &Value) -> Result<(), Violation> {
    let Some(options) = attributes.get(attr::OPTIONS) else {
        return Ok(());
    };
    let allowed = convert::elements(options).unwrap_or_default();
    if allowed.iter().any(|option| option == value) {
        return Ok(());
    }
    Err(Violation {
        code: ErrorCode::NotInOptions,
        detail: format!("'{value}' is not one of [{options}]"),
    })
}
