// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Kind conversion, numeric comparison and the text grammar.
//!
//! Text formatting is locale independent. Floats use the shortest
//! representation that parses back to the same bits (at most 9 significant
//! digits for FLOAT, 17 for DOUBLE).

use super::{Kind, Value};
use crate::error::{Error, Result};
use base64::prelude::{Engine as _, BASE64_STANDARD};
use num_complex::Complex;
use std::cmp::Ordering;

/// How strict a conversion is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Conversion {
    /// Only value-preserving conversions succeed.
    #[default]
    Exact,
    /// Integer/float conversions may round or truncate.
    Lossy,
}

fn cannot_convert(value: &Value, to: Kind) -> Error {
    Error::kind_mismatch(format!(
        "cannot convert {} '{}' to {to}",
        value.kind(),
        to_text(value)
    ))
}

impl Value {
    /// Convert to `to` under the conversion rules of the type system.
    pub fn convert(&self, to: Kind, mode: Conversion) -> Result<Value> {
        let from = self.kind();
        if from == to {
            return Ok(self.clone());
        }
        if to == Kind::String {
            return to_string_value(self).ok_or_else(|| cannot_convert(self, to));
        }
        if let Value::String(text) = self {
            return parse_text(to, text);
        }
        if let Some(element) = to.element() {
            let elements = elements(self).ok_or_else(|| cannot_convert(self, to))?;
            let converted = elements
                .iter()
                .map(|e| e.convert(element, mode))
                .collect::<Result<Vec<_>>>()?;
            return from_elements(to, converted);
        }
        if !from.is_scalar() || !to.is_scalar() {
            return Err(cannot_convert(self, to));
        }
        convert_scalar(self, to, mode).map_err(|_| cannot_convert(self, to))
    }

    /// Compare two real numeric values exactly where possible.
    ///
    /// Integers compare through `i128`; anything involving a float compares
    /// through `f64`. Returns `None` for non-numeric values and NaN.
    pub fn compare_numeric(&self, other: &Value) -> Option<Ordering> {
        match (numeric(self)?, numeric(other)?) {
            (Num::Int(a), Num::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

#[derive(Clone, Copy)]
enum Num {
    Int(i128),
    Float(f64),
}

impl Num {
    fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }
}

fn numeric(value: &Value) -> Option<Num> {
    let n = match value {
        Value::Char(v) | Value::Uint8(v) => Num::Int(i128::from(*v)),
        Value::Int8(v) => Num::Int(i128::from(*v)),
        Value::Int16(v) => Num::Int(i128::from(*v)),
        Value::Uint16(v) => Num::Int(i128::from(*v)),
        Value::Int32(v) => Num::Int(i128::from(*v)),
        Value::Uint32(v) => Num::Int(i128::from(*v)),
        Value::Int64(v) => Num::Int(i128::from(*v)),
        Value::Uint64(v) => Num::Int(i128::from(*v)),
        Value::Float(v) => Num::Float(f64::from(*v)),
        Value::Double(v) => Num::Float(*v),
        _ => return None,
    };
    Some(n)
}

fn convert_scalar(value: &Value, to: Kind, mode: Conversion) -> Result<Value> {
    match value {
        Value::Bool(b) => from_int(to, i128::from(*b), mode),
        Value::ComplexFloat(c) if to == Kind::ComplexDouble => Ok(Value::ComplexDouble(
            Complex::new(f64::from(c.re), f64::from(c.im)),
        )),
        Value::ComplexDouble(c) if to == Kind::ComplexFloat => {
            let re = narrow_f64(c.re, mode)?;
            let im = narrow_f64(c.im, mode)?;
            Ok(Value::ComplexFloat(Complex::new(re, im)))
        }
        Value::ComplexFloat(c) if c.im == 0.0 => from_float(to, f64::from(c.re), mode),
        Value::ComplexDouble(c) if c.im == 0.0 => from_float(to, c.re, mode),
        other => match numeric(other) {
            Some(Num::Int(i)) => from_int(to, i, mode),
            Some(Num::Float(f)) => from_float(to, f, mode),
            None => Err(cannot_convert(other, to)),
        },
    }
}

fn from_int(to: Kind, i: i128, mode: Conversion) -> Result<Value> {
    let lossy = mode == Conversion::Lossy;
    let out_of_kind = || Error::kind_mismatch(format!("{i} does not fit {to}"));
    let value = match to {
        Kind::Bool => match i {
            0 => Value::Bool(false),
            1 => Value::Bool(true),
            _ if lossy => Value::Bool(true),
            _ => return Err(out_of_kind()),
        },
        Kind::Char => Value::Char(u8::try_from(i).map_err(|_| out_of_kind())?),
        Kind::Int8 => Value::Int8(i8::try_from(i).map_err(|_| out_of_kind())?),
        Kind::Uint8 => Value::Uint8(u8::try_from(i).map_err(|_| out_of_kind())?),
        Kind::Int16 => Value::Int16(i16::try_from(i).map_err(|_| out_of_kind())?),
        Kind::Uint16 => Value::Uint16(u16::try_from(i).map_err(|_| out_of_kind())?),
        Kind::Int32 => Value::Int32(i32::try_from(i).map_err(|_| out_of_kind())?),
        Kind::Uint32 => Value::Uint32(u32::try_from(i).map_err(|_| out_of_kind())?),
        Kind::Int64 => Value::Int64(i64::try_from(i).map_err(|_| out_of_kind())?),
        Kind::Uint64 => Value::Uint64(u64::try_from(i).map_err(|_| out_of_kind())?),
        Kind::Float => {
            let f = i as f32;
            if !lossy && f as i128 != i {
                return Err(out_of_kind());
            }
            Value::Float(f)
        }
        Kind::Double => {
            let f = i as f64;
            if !lossy && f as i128 != i {
                return Err(out_of_kind());
            }
            Value::Double(f)
        }
        Kind::ComplexFloat => match from_int(Kind::Float, i, mode)? {
            Value::Float(f) => Value::ComplexFloat(Complex::new(f, 0.0)),
            _ => return Err(out_of_kind()),
        },
        Kind::ComplexDouble => match from_int(Kind::Double, i, mode)? {
            Value::Double(f) => Value::ComplexDouble(Complex::new(f, 0.0)),
            _ => return Err(out_of_kind()),
        },
        _ => return Err(out_of_kind()),
    };
    Ok(value)
}

fn narrow_f64(f: f64, mode: Conversion) -> Result<f32> {
    let g = f as f32;
    if mode == Conversion::Lossy || f.is_nan() || f64::from(g) == f {
        Ok(g)
    } else {
        Err(Error::kind_mismatch(format!("{f:?} is not exact as FLOAT")))
    }
}

fn from_float(to: Kind, f: f64, mode: Conversion) -> Result<Value> {
    let lossy = mode == Conversion::Lossy;
    match to {
        Kind::Float => narrow_f64(f, mode).map(Value::Float),
        Kind::Double => Ok(Value::Double(f)),
        Kind::ComplexFloat => {
            narrow_f64(f, mode).map(|re| Value::ComplexFloat(Complex::new(re, 0.0)))
        }
        Kind::ComplexDouble => Ok(Value::ComplexDouble(Complex::new(f, 0.0))),
        Kind::Bool if lossy && f.is_finite() => Ok(Value::Bool(f != 0.0)),
        _ if to == Kind::Bool || to.is_integer() => {
            let truncated = f.trunc();
            if !f.is_finite() || (!lossy && truncated != f) {
                return Err(Error::kind_mismatch(format!("{f:?} is not exact as {to}")));
            }
            from_int(to, truncated as i128, Conversion::Exact)
        }
        _ => Err(Error::kind_mismatch(format!("cannot convert {f:?} to {to}"))),
    }
}

fn to_string_value(value: &Value) -> Option<Value> {
    match value.kind() {
        Kind::Bytes | Kind::None | Kind::VectorString | Kind::VectorBytes | Kind::VectorNone => {
            None
        }
        kind if kind.is_composite() => None,
        _ => Some(Value::String(to_text(value))),
    }
}

/// Parse text as a scalar or vector kind.
///
/// Vector text is comma separated; the empty string is the empty vector.
pub(crate) fn parse_text(to: Kind, text: &str) -> Result<Value> {
    if to.is_scalar() {
        return parse_scalar(to, text);
    }
    match to.element() {
        Some(Kind::Bytes) | Some(Kind::None) | None => Err(Error::kind_mismatch(format!(
            "STRING does not convert to {to}"
        ))),
        Some(element) => {
            if text.is_empty() {
                return from_elements(to, Vec::new());
            }
            let parts = if element == Kind::String {
                text.split(',')
                    .map(|part| Value::String(part.to_string()))
                    .collect()
            } else {
                split_top_level(text)
                    .into_iter()
                    .map(|part| parse_scalar(element, part.trim()))
                    .collect::<Result<Vec<_>>>()?
            };
            from_elements(to, parts)
        }
    }
}

/// Split at commas outside parentheses, so `(1,2),(3,4)` yields two parts.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

fn strip_sign(text: &str) -> &str {
    text.strip_prefix('+')
        .or_else(|| text.strip_prefix('-'))
        .unwrap_or(text)
}

fn all_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

fn is_integer_text(text: &str) -> bool {
    all_digits(strip_sign(text))
}

/// `[+-]?digits(.digits*)?([eE][+-]?digits)?`
fn is_decimal_text(text: &str) -> bool {
    let unsigned = strip_sign(text);
    let (mantissa, exponent) = match unsigned.find(&['e', 'E'][..]) {
        Some(pos) => (&unsigned[..pos], Some(&unsigned[pos + 1..])),
        None => (unsigned, None),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (mantissa, None),
    };
    all_digits(int_part)
        && frac_part.map_or(true, |f| f.bytes().all(|b| b.is_ascii_digit()))
        && exponent.map_or(true, |e| all_digits(strip_sign(e)))
}

fn is_special_float(text: &str) -> bool {
    let unsigned = strip_sign(text);
    ["nan", "inf", "infinity"]
        .iter()
        .any(|s| unsigned.eq_ignore_ascii_case(s))
}

fn parse_float(text: &str) -> Option<f64> {
    if is_decimal_text(text) || is_special_float(text) {
        text.parse::<f64>().ok()
    } else {
        None
    }
}

/// Parse one scalar from text. Any failure is a ParseFailure.
pub(crate) fn parse_scalar(kind: Kind, text: &str) -> Result<Value> {
    let fail = || Error::parse_failure(kind, text);
    match kind {
        Kind::String => Ok(Value::String(text.to_string())),
        Kind::None if text.is_empty() => Ok(Value::None),
        Kind::Bool => {
            if text.eq_ignore_ascii_case("true") || text == "1" {
                Ok(Value::Bool(true))
            } else if text.eq_ignore_ascii_case("false") || text == "0" {
                Ok(Value::Bool(false))
            } else {
                Err(fail())
            }
        }
        Kind::Float => {
            if is_decimal_text(text) || is_special_float(text) {
                text.parse::<f32>().map(Value::Float).map_err(|_| fail())
            } else {
                Err(fail())
            }
        }
        Kind::Double => parse_float(text).map(Value::Double).ok_or_else(fail),
        Kind::ComplexFloat | Kind::ComplexDouble => {
            let (re, im) = match text
                .strip_prefix('(')
                .and_then(|t| t.strip_suffix(')'))
                .and_then(|t| t.split_once(','))
            {
                Some((re, im)) => (re.trim(), im.trim()),
                None => (text, "0"),
            };
            if kind == Kind::ComplexFloat {
                match (parse_scalar(Kind::Float, re), parse_scalar(Kind::Float, im)) {
                    (Ok(Value::Float(re)), Ok(Value::Float(im))) => {
                        Ok(Value::ComplexFloat(Complex::new(re, im)))
                    }
                    _ => Err(fail()),
                }
            } else {
                match (parse_float(re), parse_float(im)) {
                    (Some(re), Some(im)) => Ok(Value::ComplexDouble(Complex::new(re, im))),
                    _ => Err(fail()),
                }
            }
        }
        k if k.is_integer() => {
            if is_integer_text(text) {
                let i = text.parse::<i128>().map_err(|_| fail())?;
                from_int(kind, i, Conversion::Exact).map_err(|_| fail())
            } else {
                let f = parse_float(text).ok_or_else(fail)?;
                from_float(kind, f, Conversion::Exact).map_err(|_| fail())
            }
        }
        _ => Err(fail()),
    }
}

pub(crate) fn format_f32(f: f32) -> String {
    format!("{f:?}")
}

pub(crate) fn format_f64(f: f64) -> String {
    format!("{f:?}")
}

/// Text of one scalar value.
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Char(v) | Value::Uint8(v) => v.to_string(),
        Value::Int8(v) => v.to_string(),
        Value::Int16(v) => v.to_string(),
        Value::Uint16(v) => v.to_string(),
        Value::Int32(v) => v.to_string(),
        Value::Uint32(v) => v.to_string(),
        Value::Int64(v) => v.to_string(),
        Value::Uint64(v) => v.to_string(),
        Value::Float(f) => format_f32(*f),
        Value::Double(f) => format_f64(*f),
        Value::ComplexFloat(c) => format!("({},{})", format_f32(c.re), format_f32(c.im)),
        Value::ComplexDouble(c) => format!("({},{})", format_f64(c.re), format_f64(c.im)),
        Value::String(s) => s.clone(),
        Value::Bytes(b) => BASE64_STANDARD.encode(b),
        _ => String::new(),
    }
}

/// Text of a scalar or vector value; vectors are comma joined.
pub(crate) fn to_text(value: &Value) -> String {
    match elements(value) {
        Some(elements) => elements
            .iter()
            .map(scalar_text)
            .collect::<Vec<_>>()
            .join(","),
        None => scalar_text(value),
    }
}

macro_rules! split_vector {
    ($v:expr, $scalar:ident) => {
        $v.iter().cloned().map(Value::$scalar).collect()
    };
}

/// Split a vector value into scalar values of its element kind.
pub(crate) fn elements(value: &Value) -> Option<Vec<Value>> {
    let elements = match value {
        Value::VectorBool(v) => split_vector!(v, Bool),
        Value::VectorChar(v) => split_vector!(v, Char),
        Value::VectorInt8(v) => split_vector!(v, Int8),
        Value::VectorUint8(v) => split_vector!(v, Uint8),
        Value::VectorInt16(v) => split_vector!(v, Int16),
        Value::VectorUint16(v) => split_vector!(v, Uint16),
        Value::VectorInt32(v) => split_vector!(v, Int32),
        Value::VectorUint32(v) => split_vector!(v, Uint32),
        Value::VectorInt64(v) => split_vector!(v, Int64),
        Value::VectorUint64(v) => split_vector!(v, Uint64),
        Value::VectorFloat(v) => split_vector!(v, Float),
        Value::VectorDouble(v) => split_vector!(v, Double),
        Value::VectorComplexFloat(v) => split_vector!(v, ComplexFloat),
        Value::VectorComplexDouble(v) => split_vector!(v, ComplexDouble),
        Value::VectorString(v) => split_vector!(v, String),
        Value::VectorBytes(v) => split_vector!(v, Bytes),
        Value::VectorNone(n) => vec![Value::None; *n],
        _ => return None,
    };
    Some(elements)
}

macro_rules! join_vector {
    ($elements:expr, $scalar:ident, $vector:ident) => {{
        let mut out = Vec::with_capacity($elements.len());
        for element in $elements {
            match element {
                Value::$scalar(v) => out.push(v),
                other => {
                    return Err(Error::kind_mismatch(format!(
                        "{} element in {}",
                        other.kind(),
                        Kind::$vector
                    )))
                }
            }
        }
        Value::$vector(out)
    }};
}

/// Build a vector value of kind `vector` from scalar elements.
pub(crate) fn from_elements(vector: Kind, elements: Vec<Value>) -> Result<Value> {
    let value = match vector {
        Kind::VectorBool => join_vector!(elements, Bool, VectorBool),
        Kind::VectorChar => join_vector!(elements, Char, VectorChar),
        Kind::VectorInt8 => join_vector!(elements, Int8, VectorInt8),
        Kind::VectorUint8 => join_vector!(elements, Uint8, VectorUint8),
        Kind::VectorInt16 => join_vector!(elements, Int16, VectorInt16),
        Kind::VectorUint16 => join_vector!(elements, Uint16, VectorUint16),
        Kind::VectorInt32 => join_vector!(elements, Int32, VectorInt32),
        Kind::VectorUint32 => join_vector!(elements, Uint32, VectorUint32),
        Kind::VectorInt64 => join_vector!(elements, Int64, VectorInt64),
        Kind::VectorUint64 => join_vector!(elements, Uint64, VectorUint64),
        Kind::VectorFloat => join_vector!(elements, Float, VectorFloat),
        Kind::VectorDouble => join_vector!(elements, Double, VectorDouble),
        Kind::VectorComplexFloat => join_vector!(elements, ComplexFloat, VectorComplexFloat),
        Kind::VectorComplexDouble => join_vector!(elements, ComplexDouble, VectorComplexDouble),
        Kind::VectorString => join_vector!(elements, String, VectorString),
        Kind::VectorBytes => join_vector!(elements, Bytes, VectorBytes),
        Kind::VectorNone => {
            if let Some(other) = elements.iter().find(|e| !e.is_none()) {
                return Err(Error::kind_mismatch(format!(
                    "{} element in VECTOR_NONE",
                    other.kind()
                )));
            }
            Value::VectorNone(elements.len())
        }
        other => {
            return Err(Error::kind_mismatch(format!("{other} is not a vector kind")));
        }
    };
    Ok(value)
}
