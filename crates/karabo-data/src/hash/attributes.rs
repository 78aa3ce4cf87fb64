// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-node attributes: a flat ordered map of scalar and vector values.

use crate::error::{Error, Result};
use crate::types::{FromValue, Kind, Value};

/// Ordered attribute map.
///
/// Only scalar and vector kinds are accepted; nested containers belong in
/// the node value, never in an attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    entries: Vec<(String, Value)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.position(name).map(|i| &self.entries[i].1)
    }

    /// Typed attribute access.
    pub fn get_as<T: FromValue>(&self, name: &str) -> Result<T> {
        let value = self.get(name).ok_or_else(|| Error::KeyMissing {
            path: name.to_string(),
        })?;
        T::from_value(value).map_err(|e| e.at(name))
    }

    /// Insert or replace; a replaced attribute keeps its position.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        if name.is_empty() {
            return Err(Error::InvalidPath {
                path: String::new(),
                detail: "empty attribute name".into(),
            });
        }
        if !value.kind().is_attribute_kind() {
            return Err(Error::KindMismatch {
                path: name.to_string(),
                detail: format!("{} is not allowed as an attribute", value.kind()),
            });
        }
        match self.position(name) {
            Some(i) => self.entries[i].1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
        Ok(())
    }

    /// Like [`Self::set`], failing if `value` is not of `kind`.
    pub fn set_as(&mut self, name: &str, value: impl Into<Value>, kind: Kind) -> Result<()> {
        let value = value.into();
        if value.kind() != kind {
            return Err(Error::KindMismatch {
                path: name.to_string(),
                detail: format!("declared {kind}, value is {}", value.kind()),
            });
        }
        self.set(name, value)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.position(name).map(|i| self.entries.remove(i).1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Hash;

    #[test]
    fn test_set_keeps_order_and_position() {
        let mut attrs = Attributes::new();
        attrs.set("unit", "m").expect("string");
        attrs.set("min", 0i32).expect("int");
        attrs.set("unit", "mm").expect("replace");
        let names: Vec<_> = attrs.names().collect();
        assert_eq!(names, vec!["unit", "min"]);
        assert_eq!(attrs.get_as::<String>("unit").expect("unit"), "mm");
    }

    #[test]
    fn test_rejects_composite_kinds() {
        let mut attrs = Attributes::new();
        let err = attrs.set("nested", Hash::new()).expect_err("HASH attribute");
        assert_eq!(err.code(), crate::ErrorCode::KindMismatch);
        assert!(attrs.set("tags", vec!["a", "b"]).is_ok());
    }

    #[test]
    fn test_set_as_checks_kind() {
        let mut attrs = Attributes::new();
        assert!(attrs.set_as("sec", 5u64, Kind::Uint64).is_ok());
        assert!(attrs.set_as("sec", 5i32, Kind::Uint64).is_err());
    }

    #[test]
    fn test_get_as_missing() {
        let attrs = Attributes::new();
        let err = attrs.get_as::<i32>("x").expect_err("missing");
        assert_eq!(err.code(), crate::ErrorCode::KeyMissing);
    }
}
