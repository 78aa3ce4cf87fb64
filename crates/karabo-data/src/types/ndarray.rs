// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Multidimensional numeric arrays.

use super::Kind;
use crate::error::{Error, Result};
use bytes::Bytes;
use num_complex::Complex;
use std::borrow::Cow;

pub(crate) const HOST_BIG_ENDIAN: bool = cfg!(target_endian = "big");

/// Dense array: element kind, shape and raw element storage.
///
/// Storage is a reference-counted [`Bytes`] buffer, so cloning an array is
/// cheap; the buffer is immutable, which keeps clones observably independent.
#[derive(Debug, Clone)]
pub struct NdArray {
    kind: Kind,
    shape: Vec<u64>,
    data: Bytes,
    big_endian: bool,
}

impl NdArray {
    /// Wrap raw storage.
    ///
    /// Fails with KindMismatch if `kind` has no fixed-width representation
    /// and with Malformed if `data` does not hold exactly
    /// `product(shape)` elements.
    pub fn new(
        kind: Kind,
        shape: Vec<u64>,
        data: impl Into<Bytes>,
        big_endian: bool,
    ) -> Result<Self> {
        let data = data.into();
        let size = kind
            .fixed_size()
            .ok_or_else(|| Error::kind_mismatch(format!("{kind} cannot be an array element")))?;
        let expected = shape
            .iter()
            .try_fold(size as u64, |acc, d| acc.checked_mul(*d))
            .ok_or_else(|| Error::Malformed(format!("array shape {shape:?} overflows")))?;
        if expected != data.len() as u64 {
            return Err(Error::Malformed(format!(
                "array of {kind} with shape {shape:?} needs {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            kind,
            shape,
            data,
            big_endian,
        })
    }

    /// Build an array from typed elements in host byte order.
    pub fn from_slice<T: NdElement>(shape: Vec<u64>, elements: &[T]) -> Result<Self> {
        let mut data = Vec::with_capacity(std::mem::size_of_val(elements));
        for element in elements {
            element.write_ne(&mut data);
        }
        Self::new(T::KIND, shape, data, HOST_BIG_ENDIAN)
    }

    /// Element kind.
    pub fn element_kind(&self) -> Kind {
        self.kind
    }

    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// Raw storage in the order given by [`Self::is_big_endian`].
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn is_big_endian(&self) -> bool {
        self.big_endian
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.kind
            .fixed_size()
            .map_or(0, |size| self.data.len() / size)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Storage in host byte order, borrowed when no swap is needed.
    pub fn host_bytes(&self) -> Cow<'_, [u8]> {
        if self.big_endian == HOST_BIG_ENDIAN {
            Cow::Borrowed(&self.data)
        } else {
            Cow::Owned(swap_bytes(self.kind, &self.data))
        }
    }

    /// Same array with storage in host byte order.
    pub fn into_host_order(self) -> Self {
        if self.big_endian == HOST_BIG_ENDIAN {
            return self;
        }
        let data = Bytes::from(swap_bytes(self.kind, &self.data));
        Self {
            data,
            big_endian: HOST_BIG_ENDIAN,
            ..self
        }
    }

    /// Copy the elements out as `T`.
    pub fn to_vec<T: NdElement>(&self) -> Result<Vec<T>> {
        if T::KIND != self.kind {
            return Err(Error::kind_mismatch(format!(
                "array holds {}, requested {}",
                self.kind,
                T::KIND
            )));
        }
        let size = self.kind.fixed_size().unwrap_or(1);
        Ok(self
            .host_bytes()
            .chunks_exact(size)
            .map(T::read_ne)
            .collect())
    }
}

impl PartialEq for NdArray {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.shape == other.shape
            && self.host_bytes() == other.host_bytes()
    }
}

/// Reverse every scalar component of the stored elements.
fn swap_bytes(kind: Kind, data: &[u8]) -> Vec<u8> {
    // complex values swap each component separately
    let unit = match kind {
        Kind::ComplexFloat => 4,
        Kind::ComplexDouble => 8,
        other => other.fixed_size().unwrap_or(1),
    };
    let mut out = data.to_vec();
    for chunk in out.chunks_exact_mut(unit) {
        chunk.reverse();
    }
    out
}

/// Element types that can be packed into an [`NdArray`].
pub trait NdElement: Copy {
    const KIND: Kind;
    fn write_ne(&self, out: &mut Vec<u8>);
    fn read_ne(bytes: &[u8]) -> Self;
}

macro_rules! impl_nd_element {
    ($ty:ty, $kind:ident) => {
        impl NdElement for $ty {
            const KIND: Kind = Kind::$kind;

            fn write_ne(&self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_ne_bytes());
            }

            fn read_ne(bytes: &[u8]) -> Self {
                let mut buf = [0u8; std::mem::size_of::<$ty>()];
                buf.copy_from_slice(bytes);
                <$ty>::from_ne_bytes(buf)
            }
        }
    };
}

impl_nd_element!(i8, Int8);
impl_nd_element!(u8, Uint8);
impl_nd_element!(i16, Int16);
impl_nd_element!(u16, Uint16);
impl_nd_element!(i32, Int32);
impl_nd_element!(u32, Uint32);
impl_nd_element!(i64, Int64);
impl_nd_element!(u64, Uint64);
impl_nd_element!(f32, Float);
impl_nd_element!(f64, Double);

impl NdElement for bool {
    const KIND: Kind = Kind::Bool;

    fn write_ne(&self, out: &mut Vec<u8>) {
        out.push(u8::from(*self));
    }

    fn read_ne(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

impl NdElement for Complex<f32> {
    const KIND: Kind = Kind::ComplexFloat;

    fn write_ne(&self, out: &mut Vec<u8>) {
        self.re.write_ne(out);
        self.im.write_ne(out);
    }

    fn read_ne(bytes: &[u8]) -> Self {
        Complex::new(f32::read_ne(&bytes[..4]), f32::read_ne(&bytes[4..]))
    }
}

impl NdElement for Complex<f64> {
    const KIND: Kind = Kind::ComplexDouble;

    fn write_ne(&self, out: &mut Vec<u8>) {
        self.re.write_ne(out);
        self.im.write_ne(out);
    }

    fn read_ne(bytes: &[u8]) -> Self {
        Complex::new(f64::read_ne(&bytes[..8]), f64::read_ne(&bytes[8..]))
    }
}
