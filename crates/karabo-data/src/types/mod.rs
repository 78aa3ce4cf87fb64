// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Value kinds and their machine representations.
//!
//! Every value stored in a [`crate::Hash`] has exactly one [`Kind`]. The
//! kind carries a stable wire id (binary codec) and a canonical name (XML
//! codec); [`TypeRegistry`] maps ids and names back to kinds, including the
//! legacy names older producers emit.
//!
//! # Kinds
//!
//! - **Scalars**: BOOL, CHAR, INT8..UINT64, FLOAT, DOUBLE, COMPLEX_*, STRING, BYTES, NONE
//! - **Vectors**: one per scalar kind
//! - **Composites**: HASH, VECTOR_HASH, SCHEMA, NDARRAY

pub(crate) mod convert;
mod ndarray;
mod registry;
mod value;

pub use convert::Conversion;
pub use ndarray::NdArray;
pub use registry::TypeRegistry;
pub use value::{FromValue, Value};

use std::fmt;

macro_rules! define_kinds {
    ($($variant:ident = $id:literal => $name:literal,)*) => {
        /// Enumerated value category.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u16)]
        pub enum Kind {
            $($variant = $id,)*
        }

        impl Kind {
            /// All kinds in wire-id order.
            pub const ALL: &'static [Kind] = &[$(Kind::$variant,)*];

            /// Canonical name used by the XML codec and in schemas.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Kind::$variant => $name,)*
                }
            }

            /// Inverse of [`Kind::name`]; legacy aliases live in the registry.
            pub fn from_name(name: &str) -> Option<Kind> {
                match name {
                    $($name => Some(Kind::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

define_kinds! {
    Bool = 0 => "BOOL",
    VectorBool = 1 => "VECTOR_BOOL",
    Char = 2 => "CHAR",
    VectorChar = 3 => "VECTOR_CHAR",
    Int8 = 4 => "INT8",
    VectorInt8 = 5 => "VECTOR_INT8",
    Uint8 = 6 => "UINT8",
    VectorUint8 = 7 => "VECTOR_UINT8",
    Int16 = 8 => "INT16",
    VectorInt16 = 9 => "VECTOR_INT16",
    Uint16 = 10 => "UINT16",
    VectorUint16 = 11 => "VECTOR_UINT16",
    Int32 = 12 => "INT32",
    VectorInt32 = 13 => "VECTOR_INT32",
    Uint32 = 14 => "UINT32",
    VectorUint32 = 15 => "VECTOR_UINT32",
    Int64 = 16 => "INT64",
    VectorInt64 = 17 => "VECTOR_INT64",
    Uint64 = 18 => "UINT64",
    VectorUint64 = 19 => "VECTOR_UINT64",
    Float = 20 => "FLOAT",
    VectorFloat = 21 => "VECTOR_FLOAT",
    Double = 22 => "DOUBLE",
    VectorDouble = 23 => "VECTOR_DOUBLE",
    ComplexFloat = 24 => "COMPLEX_FLOAT",
    VectorComplexFloat = 25 => "VECTOR_COMPLEX_FLOAT",
    ComplexDouble = 26 => "COMPLEX_DOUBLE",
    VectorComplexDouble = 27 => "VECTOR_COMPLEX_DOUBLE",
    String = 28 => "STRING",
    VectorString = 29 => "VECTOR_STRING",
    Hash = 30 => "HASH",
    VectorHash = 31 => "VECTOR_HASH",
    Bytes = 37 => "BYTES",
    VectorBytes = 38 => "VECTOR_BYTES",
    Schema = 47 => "SCHEMA",
    None = 50 => "NONE",
    VectorNone = 51 => "VECTOR_NONE",
    NdArray = 52 => "NDARRAY",
}

impl Kind {
    /// Stable wire identifier.
    pub const fn id(self) -> u16 {
        self as u16
    }

    pub fn is_scalar(self) -> bool {
        !self.is_vector() && !self.is_composite()
    }

    pub fn is_vector(self) -> bool {
        self.element().is_some()
    }

    pub fn is_composite(self) -> bool {
        matches!(
            self,
            Kind::Hash | Kind::VectorHash | Kind::Schema | Kind::NdArray
        )
    }

    /// Kinds allowed as attribute values (scalars and vectors).
    pub fn is_attribute_kind(self) -> bool {
        !self.is_composite()
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Kind::Char
                | Kind::Int8
                | Kind::Uint8
                | Kind::Int16
                | Kind::Uint16
                | Kind::Int32
                | Kind::Uint32
                | Kind::Int64
                | Kind::Uint64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, Kind::Float | Kind::Double)
    }

    pub fn is_complex(self) -> bool {
        matches!(self, Kind::ComplexFloat | Kind::ComplexDouble)
    }

    /// Real numeric kinds: integers and floats. Bounds apply to these.
    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Element kind of a vector kind.
    pub fn element(self) -> Option<Kind> {
        let element = match self {
            Kind::VectorBool => Kind::Bool,
            Kind::VectorChar => Kind::Char,
            Kind::VectorInt8 => Kind::Int8,
            Kind::VectorUint8 => Kind::Uint8,
            Kind::VectorInt16 => Kind::Int16,
            Kind::VectorUint16 => Kind::Uint16,
            Kind::VectorInt32 => Kind::Int32,
            Kind::VectorUint32 => Kind::Uint32,
            Kind::VectorInt64 => Kind::Int64,
            Kind::VectorUint64 => Kind::Uint64,
            Kind::VectorFloat => Kind::Float,
            Kind::VectorDouble => Kind::Double,
            Kind::VectorComplexFloat => Kind::ComplexFloat,
            Kind::VectorComplexDouble => Kind::ComplexDouble,
            Kind::VectorString => Kind::String,
            Kind::VectorBytes => Kind::Bytes,
            Kind::VectorNone => Kind::None,
            _ => return None,
        };
        Some(element)
    }

    /// Vector kind holding elements of this scalar kind.
    pub fn vector(self) -> Option<Kind> {
        Kind::ALL.iter().copied().find(|k| k.element() == Some(self))
    }

    /// Size in bytes of the fixed-width machine representation.
    ///
    /// These are also the kinds an NDARRAY may hold.
    pub fn fixed_size(self) -> Option<usize> {
        let size = match self {
            Kind::Bool | Kind::Char | Kind::Int8 | Kind::Uint8 => 1,
            Kind::Int16 | Kind::Uint16 => 2,
            Kind::Int32 | Kind::Uint32 | Kind::Float => 4,
            Kind::Int64 | Kind::Uint64 | Kind::Double | Kind::ComplexFloat => 8,
            Kind::ComplexDouble => 16,
            _ => return None,
        };
        Some(size)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Kinds serialize as their canonical names.
#[cfg(feature = "serde")]
impl serde::Serialize for Kind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Kind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        Kind::from_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown kind '{name}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<u16> = Kind::ALL.iter().map(|k| k.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), Kind::ALL.len());
    }

    #[test]
    fn test_vector_element_pairing() {
        for kind in Kind::ALL {
            if let Some(element) = kind.element() {
                assert!(element.is_scalar(), "{kind} element {element}");
                assert_eq!(element.vector(), Some(*kind));
            }
        }
        assert_eq!(Kind::Hash.vector(), None);
        assert_eq!(Kind::VectorHash.element(), None);
    }

    #[test]
    fn test_categories() {
        assert!(Kind::Int32.is_scalar());
        assert!(Kind::None.is_scalar());
        assert!(Kind::VectorString.is_vector());
        assert!(Kind::NdArray.is_composite());
        assert!(!Kind::Hash.is_attribute_kind());
        assert!(Kind::Char.is_numeric());
        assert!(!Kind::ComplexDouble.is_numeric());
        assert_eq!(Kind::ComplexDouble.fixed_size(), Some(16));
        assert_eq!(Kind::String.fixed_size(), None);
    }

    #[test]
    fn test_well_known_ids() {
        assert_eq!(Kind::Int32.id(), 12);
        assert_eq!(Kind::Hash.id(), 30);
        assert_eq!(Kind::Schema.id(), 47);
        assert_eq!(Kind::VectorHash.name(), "VECTOR_HASH");
    }

    #[test]
    fn test_name_lookup() {
        for kind in Kind::ALL {
            assert_eq!(Kind::from_name(kind.name()), Some(*kind));
        }
        assert_eq!(Kind::from_name("INT"), None);
    }
}
