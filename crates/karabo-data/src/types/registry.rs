// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Lookup tables from wire ids and names to kinds.

use super::Kind;
use crate::error::{Error, Result};
use std::collections::HashMap;

/// Names older producers write for some kinds.
const LEGACY_NAMES: &[(&str, Kind)] = &[
    ("BYTE_ARRAY", Kind::Bytes),
    ("VECTOR_BYTE_ARRAY", Kind::VectorBytes),
    ("SIGNED_CHAR", Kind::Int8),
    ("VECTOR_SIGNED_CHAR", Kind::VectorInt8),
    ("UNSIGNED_CHAR", Kind::Uint8),
    ("VECTOR_UNSIGNED_CHAR", Kind::VectorUint8),
    ("SHORT", Kind::Int16),
    ("VECTOR_SHORT", Kind::VectorInt16),
    ("UNSIGNED_SHORT", Kind::Uint16),
    ("VECTOR_UNSIGNED_SHORT", Kind::VectorUint16),
    ("INT", Kind::Int32),
    ("VECTOR_INT", Kind::VectorInt32),
    ("UNSIGNED_INT", Kind::Uint32),
    ("VECTOR_UNSIGNED_INT", Kind::VectorUint32),
    ("LONG_LONG", Kind::Int64),
    ("VECTOR_LONG_LONG", Kind::VectorInt64),
    ("UNSIGNED_LONG_LONG", Kind::Uint64),
    ("VECTOR_UNSIGNED_LONG_LONG", Kind::VectorUint64),
    ("NDARRAY_HASH", Kind::NdArray),
];

/// Maps wire ids and names to [`Kind`]s.
///
/// Codecs own one and receive it at construction; there is no global table.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    by_id: HashMap<u32, Kind>,
    by_name: HashMap<String, Kind>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl TypeRegistry {
    /// Registry with every kind and the legacy name aliases.
    pub fn standard() -> Self {
        let mut registry = Self::strict();
        for (name, kind) in LEGACY_NAMES {
            registry.by_name.insert((*name).to_string(), *kind);
        }
        registry
    }

    /// Registry with canonical names only.
    pub fn strict() -> Self {
        let by_id = Kind::ALL.iter().map(|k| (u32::from(k.id()), *k)).collect();
        let by_name = Kind::ALL
            .iter()
            .map(|k| (k.name().to_string(), *k))
            .collect();
        Self { by_id, by_name }
    }

    /// Remove a kind from the registry, making it undecodable.
    pub fn without(mut self, kind: Kind) -> Self {
        self.by_id.retain(|_, k| *k != kind);
        self.by_name.retain(|_, k| *k != kind);
        self
    }

    pub fn kind_from_id(&self, id: u32) -> Result<Kind> {
        self.by_id
            .get(&id)
            .copied()
            .ok_or_else(|| Error::UnknownKind(format!("id {id}")))
    }

    pub fn kind_from_name(&self, name: &str) -> Result<Kind> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownKind(name.to_string()))
    }

    pub fn contains(&self, kind: Kind) -> bool {
        self.by_id.contains_key(&u32::from(kind.id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_and_name_lookup() {
        let registry = TypeRegistry::standard();
        for kind in Kind::ALL {
            assert_eq!(registry.kind_from_id(u32::from(kind.id())).ok(), Some(*kind));
            assert_eq!(registry.kind_from_name(kind.name()).ok(), Some(*kind));
        }
    }

    #[test]
    fn test_unknown_kind() {
        let registry = TypeRegistry::standard();
        let err = registry.kind_from_id(99).expect_err("99 is unassigned");
        assert_eq!(err.code(), crate::ErrorCode::UnknownKind);
        assert!(registry.kind_from_name("QUATERNION").is_err());
    }

    #[test]
    fn test_legacy_names() {
        assert_eq!(
            TypeRegistry::standard().kind_from_name("BYTE_ARRAY").ok(),
            Some(Kind::Bytes)
        );
        assert!(TypeRegistry::strict().kind_from_name("BYTE_ARRAY").is_err());
    }

    #[test]
    fn test_without() {
        let registry = TypeRegistry::standard().without(Kind::NdArray);
        assert!(!registry.contains(Kind::NdArray));
        assert!(registry.kind_from_id(52).is_err());
        assert!(registry.contains(Kind::Hash));
    }
}
