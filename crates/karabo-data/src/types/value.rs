// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed values.

use super::{Kind, NdArray};
use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::schema::Schema;
use num_complex::{Complex32, Complex64};
use std::fmt;

/// A value of exactly one [`Kind`].
///
/// The variant is the kind, so representation and declared kind cannot
/// drift apart.
#[derive(Debug, Clone)]
pub enum Value {
    // Scalars
    Bool(bool),
    Char(u8),
    Int8(i8),
    Uint8(u8),
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Uint64(u64),
    Float(f32),
    Double(f64),
    ComplexFloat(Complex32),
    ComplexDouble(Complex64),
    String(String),
    Bytes(Vec<u8>),
    None,

    // Vectors
    VectorBool(Vec<bool>),
    VectorChar(Vec<u8>),
    VectorInt8(Vec<i8>),
    VectorUint8(Vec<u8>),
    VectorInt16(Vec<i16>),
    VectorUint16(Vec<u16>),
    VectorInt32(Vec<i32>),
    VectorUint32(Vec<u32>),
    VectorInt64(Vec<i64>),
    VectorUint64(Vec<u64>),
    VectorFloat(Vec<f32>),
    VectorDouble(Vec<f64>),
    VectorComplexFloat(Vec<Complex32>),
    VectorComplexDouble(Vec<Complex64>),
    VectorString(Vec<String>),
    VectorBytes(Vec<Vec<u8>>),
    /// A sequence of absent values; only the count is meaningful.
    VectorNone(usize),

    // Composites
    Hash(Hash),
    VectorHash(Vec<Hash>),
    Schema(Schema),
    NdArray(NdArray),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Bool(_) => Kind::Bool,
            Self::Char(_) => Kind::Char,
            Self::Int8(_) => Kind::Int8,
            Self::Uint8(_) => Kind::Uint8,
            Self::Int16(_) => Kind::Int16,
            Self::Uint16(_) => Kind::Uint16,
            Self::Int32(_) => Kind::Int32,
            Self::Uint32(_) => Kind::Uint32,
            Self::Int64(_) => Kind::Int64,
            Self::Uint64(_) => Kind::Uint64,
            Self::Float(_) => Kind::Float,
            Self::Double(_) => Kind::Double,
            Self::ComplexFloat(_) => Kind::ComplexFloat,
            Self::ComplexDouble(_) => Kind::ComplexDouble,
            Self::String(_) => Kind::String,
            Self::Bytes(_) => Kind::Bytes,
            Self::None => Kind::None,
            Self::VectorBool(_) => Kind::VectorBool,
            Self::VectorChar(_) => Kind::VectorChar,
            Self::VectorInt8(_) => Kind::VectorInt8,
            Self::VectorUint8(_) => Kind::VectorUint8,
            Self::VectorInt16(_) => Kind::VectorInt16,
            Self::VectorUint16(_) => Kind::VectorUint16,
            Self::VectorInt32(_) => Kind::VectorInt32,
            Self::VectorUint32(_) => Kind::VectorUint32,
            Self::VectorInt64(_) => Kind::VectorInt64,
            Self::VectorUint64(_) => Kind::VectorUint64,
            Self::VectorFloat(_) => Kind::VectorFloat,
            Self::VectorDouble(_) => Kind::VectorDouble,
            Self::VectorComplexFloat(_) => Kind::VectorComplexFloat,
            Self::VectorComplexDouble(_) => Kind::VectorComplexDouble,
            Self::VectorString(_) => Kind::VectorString,
            Self::VectorBytes(_) => Kind::VectorBytes,
            Self::VectorNone(_) => Kind::VectorNone,
            Self::Hash(_) => Kind::Hash,
            Self::VectorHash(_) => Kind::VectorHash,
            Self::Schema(_) => Kind::Schema,
            Self::NdArray(_) => Kind::NdArray,
        }
    }

    /// Check if value is the explicit absent value.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Number of elements of a vector or table value.
    pub fn vector_len(&self) -> Option<usize> {
        let len = match self {
            Self::VectorBool(v) => v.len(),
            Self::VectorChar(v) | Self::VectorUint8(v) => v.len(),
            Self::VectorInt8(v) => v.len(),
            Self::VectorInt16(v) => v.len(),
            Self::VectorUint16(v) => v.len(),
            Self::VectorInt32(v) => v.len(),
            Self::VectorUint32(v) => v.len(),
            Self::VectorInt64(v) => v.len(),
            Self::VectorUint64(v) => v.len(),
            Self::VectorFloat(v) => v.len(),
            Self::VectorDouble(v) => v.len(),
            Self::VectorComplexFloat(v) => v.len(),
            Self::VectorComplexDouble(v) => v.len(),
            Self::VectorString(v) => v.len(),
            Self::VectorBytes(v) => v.len(),
            Self::VectorNone(n) => *n,
            Self::VectorHash(v) => v.len(),
            _ => return None,
        };
        Some(len)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_hash(&self) -> Option<&Hash> {
        match self {
            Self::Hash(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_hash_mut(&mut self) -> Option<&mut Hash> {
        match self {
            Self::Hash(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_vector_hash(&self) -> Option<&[Hash]> {
        match self {
            Self::VectorHash(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vector_hash_mut(&mut self) -> Option<&mut Vec<Hash>> {
        match self {
            Self::VectorHash(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_schema(&self) -> Option<&Schema> {
        match self {
            Self::Schema(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_ndarray(&self) -> Option<&NdArray> {
        match self {
            Self::NdArray(a) => Some(a),
            _ => None,
        }
    }

    /// Elements of a VECTOR_STRING.
    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            Self::VectorString(v) => Some(v),
            _ => None,
        }
    }
}

fn bits_eq_f32(a: &[f32], b: &[f32]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
}

fn bits_eq_f64(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
}

fn bits_eq_c32(a: &[Complex32], b: &[Complex32]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(x, y)| x.re.to_bits() == y.re.to_bits() && x.im.to_bits() == y.im.to_bits())
}

fn bits_eq_c64(a: &[Complex64], b: &[Complex64]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(x, y)| x.re.to_bits() == y.re.to_bits() && x.im.to_bits() == y.im.to_bits())
}

/// Exact equality: same kind, same value; floats compare bitwise.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            (Self::ComplexFloat(a), Self::ComplexFloat(b)) => {
                bits_eq_c32(std::slice::from_ref(a), std::slice::from_ref(b))
            }
            (Self::ComplexDouble(a), Self::ComplexDouble(b)) => {
                bits_eq_c64(std::slice::from_ref(a), std::slice::from_ref(b))
            }
            (Self::VectorFloat(a), Self::VectorFloat(b)) => bits_eq_f32(a, b),
            (Self::VectorDouble(a), Self::VectorDouble(b)) => bits_eq_f64(a, b),
            (Self::VectorComplexFloat(a), Self::VectorComplexFloat(b)) => bits_eq_c32(a, b),
            (Self::VectorComplexDouble(a), Self::VectorComplexDouble(b)) => bits_eq_c64(a, b),

            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Int8(a), Self::Int8(b)) => a == b,
            (Self::Uint8(a), Self::Uint8(b)) => a == b,
            (Self::Int16(a), Self::Int16(b)) => a == b,
            (Self::Uint16(a), Self::Uint16(b)) => a == b,
            (Self::Int32(a), Self::Int32(b)) => a == b,
            (Self::Uint32(a), Self::Uint32(b)) => a == b,
            (Self::Int64(a), Self::Int64(b)) => a == b,
            (Self::Uint64(a), Self::Uint64(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::None, Self::None) => true,

            (Self::VectorBool(a), Self::VectorBool(b)) => a == b,
            (Self::VectorChar(a), Self::VectorChar(b)) => a == b,
            (Self::VectorInt8(a), Self::VectorInt8(b)) => a == b,
            (Self::VectorUint8(a), Self::VectorUint8(b)) => a == b,
            (Self::VectorInt16(a), Self::VectorInt16(b)) => a == b,
            (Self::VectorUint16(a), Self::VectorUint16(b)) => a == b,
            (Self::VectorInt32(a), Self::VectorInt32(b)) => a == b,
            (Self::VectorUint32(a), Self::VectorUint32(b)) => a == b,
            (Self::VectorInt64(a), Self::VectorInt64(b)) => a == b,
            (Self::VectorUint64(a), Self::VectorUint64(b)) => a == b,
            (Self::VectorString(a), Self::VectorString(b)) => a == b,
            (Self::VectorBytes(a), Self::VectorBytes(b)) => a == b,
            (Self::VectorNone(a), Self::VectorNone(b)) => a == b,

            (Self::Hash(a), Self::Hash(b)) => a == b,
            (Self::VectorHash(a), Self::VectorHash(b)) => a == b,
            (Self::Schema(a), Self::Schema(b)) => a == b,
            (Self::NdArray(a), Self::NdArray(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hash(h) => write!(f, "<HASH with {} entries>", h.len()),
            Self::VectorHash(v) => write!(f, "<VECTOR_HASH with {} rows>", v.len()),
            Self::Schema(s) => write!(f, "<SCHEMA {}>", s.root_name()),
            Self::NdArray(a) => write!(f, "<NDARRAY {} {:?}>", a.element_kind(), a.shape()),
            other => f.write_str(&super::convert::to_text(other)),
        }
    }
}

/// Trait for extracting a typed value.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self>;
}

fn mismatch(expected: Kind, got: &Value) -> Error {
    Error::kind_mismatch(format!("expected {expected}, found {}", got.kind()))
}

// Implement From<T> for Value and FromValue for T
macro_rules! impl_value_conversions {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }

        impl FromValue for $ty {
            fn from_value(value: &Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(v.clone()),
                    other => Err(mismatch(Kind::$variant, other)),
                }
            }
        }
    };
}

impl_value_conversions!(bool, Bool);
impl_value_conversions!(i8, Int8);
impl_value_conversions!(u8, Uint8);
impl_value_conversions!(i16, Int16);
impl_value_conversions!(u16, Uint16);
impl_value_conversions!(i32, Int32);
impl_value_conversions!(u32, Uint32);
impl_value_conversions!(i64, Int64);
impl_value_conversions!(u64, Uint64);
impl_value_conversions!(f32, Float);
impl_value_conversions!(f64, Double);
impl_value_conversions!(Complex32, ComplexFloat);
impl_value_conversions!(Complex64, ComplexDouble);
impl_value_conversions!(String, String);
impl_value_conversions!(Vec<bool>, VectorBool);
impl_value_conversions!(Vec<i8>, VectorInt8);
impl_value_conversions!(Vec<u8>, VectorUint8);
impl_value_conversions!(Vec<i16>, VectorInt16);
impl_value_conversions!(Vec<u16>, VectorUint16);
impl_value_conversions!(Vec<i32>, VectorInt32);
impl_value_conversions!(Vec<u32>, VectorUint32);
impl_value_conversions!(Vec<i64>, VectorInt64);
impl_value_conversions!(Vec<u64>, VectorUint64);
impl_value_conversions!(Vec<f32>, VectorFloat);
impl_value_conversions!(Vec<f64>, VectorDouble);
impl_value_conversions!(Vec<Complex32>, VectorComplexFloat);
impl_value_conversions!(Vec<Complex64>, VectorComplexDouble);
impl_value_conversions!(Vec<String>, VectorString);
impl_value_conversions!(Vec<Vec<u8>>, VectorBytes);
impl_value_conversions!(Hash, Hash);
impl_value_conversions!(Vec<Hash>, VectorHash);
impl_value_conversions!(Schema, Schema);
impl_value_conversions!(NdArray, NdArray);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<&str>> for Value {
    fn from(v: Vec<&str>) -> Self {
        Value::VectorString(v.into_iter().map(str::to_string).collect())
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_follows_variant() {
        assert_eq!(Value::from(42i32).kind(), Kind::Int32);
        assert_eq!(Value::from("x").kind(), Kind::String);
        assert_eq!(Value::Bytes(vec![1]).kind(), Kind::Bytes);
        assert_eq!(Value::from(vec![1u8]).kind(), Kind::VectorUint8);
        assert_eq!(Value::None.kind(), Kind::None);
        assert_eq!(Value::from(Hash::new()).kind(), Kind::Hash);
    }

    #[test]
    fn test_float_equality_is_bitwise() {
        // same payload, same value; a decoded NaN equals the encoded one
        assert_eq!(Value::Double(f64::NAN), Value::Double(f64::NAN));
        assert_ne!(Value::Double(f64::NAN), Value::Double(-f64::NAN));
        assert_ne!(Value::Double(0.0), Value::Double(-0.0));
        assert_eq!(Value::Float(1.5), Value::Float(1.5));
        assert_eq!(
            Value::VectorFloat(vec![f32::NAN]),
            Value::VectorFloat(vec![f32::NAN])
        );
        // numerically NaN still equals nothing
        assert_eq!(Value::Double(f64::NAN).compare_numeric(&Value::Double(f64::NAN)), None);
    }

    #[test]
    fn test_equality_requires_same_kind() {
        assert_ne!(Value::Int32(1), Value::Int64(1));
        assert_ne!(Value::Char(b'a'), Value::Uint8(b'a'));
        assert_ne!(Value::Bytes(b"ab".to_vec()), Value::from("ab"));
        assert_eq!(Value::None, Value::None);
        assert_ne!(Value::None, Value::VectorNone(0));
    }

    #[test]
    fn test_from_value() {
        let v = Value::from(7u16);
        assert_eq!(u16::from_value(&v).expect("u16"), 7);
        let err = i32::from_value(&v).expect_err("UINT16 is not INT32");
        assert_eq!(err.code(), crate::ErrorCode::KindMismatch);
    }

    #[test]
    fn test_vector_len() {
        assert_eq!(Value::from(vec![1i32, 2, 3]).vector_len(), Some(3));
        assert_eq!(Value::VectorNone(4).vector_len(), Some(4));
        assert_eq!(Value::Int32(1).vector_len(), None);
    }
}
