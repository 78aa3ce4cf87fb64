// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Merging and subtracting hashes.

use super::{path, Attributes, Hash};
use crate::error::{Error, Result};
use crate::types::Value;

/// How [`Hash::merge`] resolves entries present on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MergePolicy {
    /// Recurse into nested hashes; the incoming leaf wins and the incoming
    /// attributes replace the existing set.
    #[default]
    Replace,
    /// Recurse into nested hashes; the incoming leaf wins (tables as a
    /// whole) and attributes merge name by name.
    Merge,
    /// Recurse into nested hashes; any leaf or attribute present on both
    /// sides with different values is a Conflict.
    Reject,
}

impl Hash {
    /// Merge `other` into `self`. New keys append in `other`'s order.
    ///
    /// With [`MergePolicy::Reject`] a conflict leaves `self` untouched.
    pub fn merge(&mut self, other: &Hash, policy: MergePolicy) -> Result<()> {
        if policy == MergePolicy::Reject {
            let mut staged = self.clone();
            merge_into(&mut staged, other, policy, "")?;
            *self = staged;
            Ok(())
        } else {
            merge_into(self, other, policy, "")
        }
    }

    /// Remove every entry of `other` from `self`, recursing where both
    /// sides hold a non-empty HASH.
    pub fn subtract(&mut self, other: &Hash) {
        for node in other.iter() {
            let Some(pos) = self.position(node.key()) else {
                continue;
            };
            let recurse = matches!(
                (&self.nodes[pos].value, node.value()),
                (Value::Hash(_), Value::Hash(theirs)) if !theirs.is_empty()
            );
            if !recurse {
                self.nodes.remove(pos);
            } else if let (Value::Hash(mine), Value::Hash(theirs)) =
                (&mut self.nodes[pos].value, node.value())
            {
                mine.subtract(theirs);
            }
        }
    }
}

fn merge_into(target: &mut Hash, source: &Hash, policy: MergePolicy, prefix: &str) -> Result<()> {
    for node in source.iter() {
        let here = path::child(prefix, node.key());
        let Some(pos) = target.position(node.key()) else {
            target.nodes.push(node.clone());
            continue;
        };
        let existing = &mut target.nodes[pos];
        merge_attributes(&mut existing.attributes, node.attributes(), policy, &here)?;
        match (&mut existing.value, node.value()) {
            (Value::Hash(mine), Value::Hash(theirs)) => merge_into(mine, theirs, policy, &here)?,
            (mine, theirs) => {
                if policy == MergePolicy::Reject && *mine != *theirs {
                    return Err(Error::Conflict {
                        path: here,
                        detail: format!("{} differs from incoming {}", mine.kind(), theirs.kind()),
                    });
                }
                *mine = theirs.clone();
            }
        }
    }
    Ok(())
}

fn merge_attributes(
    target: &mut Attributes,
    source: &Attributes,
    policy: MergePolicy,
    path: &str,
) -> Result<()> {
    match policy {
        MergePolicy::Replace => *target = source.clone(),
        MergePolicy::Merge | MergePolicy::Reject => {
            for (name, value) in source.iter() {
                if policy == MergePolicy::Reject {
                    if let Some(existing) = target.get(name) {
                        if existing != value {
                            return Err(Error::Conflict {
                                path: format!("{path}@{name}"),
                                detail: "attribute differs".into(),
                            });
                        }
                    }
                }
                target.set(name, value.clone())?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (Hash, Hash) {
        let mut c1 = Hash::new();
        c1.set("a", 1i32).expect("a");
        c1.set("b.c", 2i32).expect("b.c");
        let mut c2 = Hash::new();
        c2.set("a", 3i32).expect("a");
        c2.set("b.d", 4i32).expect("b.d");
        (c1, c2)
    }

    #[test]
    fn test_replace_recurses_and_later_wins() {
        let (mut c1, c2) = pair();
        c1.merge(&c2, MergePolicy::Replace).expect("replace never conflicts");
        assert_eq!(c1.get::<i32>("a").expect("a"), 3);
        assert_eq!(c1.get::<i32>("b.c").expect("b.c"), 2);
        assert_eq!(c1.get::<i32>("b.d").expect("b.d"), 4);
        assert_eq!(c1.get_hash("b").expect("b").keys().collect::<Vec<_>>(), vec!["c", "d"]);
    }

    #[test]
    fn test_attribute_policies() {
        let mut base = Hash::new();
        base.set("x", 1i32).expect("x");
        base.set_attribute("x", "unit", "m").expect("unit");
        base.set_attribute("x", "alias", 7i32).expect("alias");
        let mut incoming = Hash::new();
        incoming.set("x", 2i32).expect("x");
        incoming.set_attribute("x", "unit", "mm").expect("unit");

        let mut replaced = base.clone();
        replaced.merge(&incoming, MergePolicy::Replace).expect("replace");
        assert_eq!(replaced.attributes("x").expect("attrs").len(), 1);

        let mut merged = base.clone();
        merged.merge(&incoming, MergePolicy::Merge).expect("merge");
        let attrs = merged.attributes("x").expect("attrs");
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.get_as::<String>("unit").expect("unit"), "mm");
    }

    #[test]
    fn test_reject_is_atomic() {
        let (mut c1, c2) = pair();
        let before = c1.clone();
        let err = c1.merge(&c2, MergePolicy::Reject).expect_err("a differs");
        assert_eq!(err.code(), crate::ErrorCode::Conflict);
        assert_eq!(err.path(), Some("a"));
        assert_eq!(c1, before);

        let mut disjoint = Hash::new();
        disjoint.set("a", 1i32).expect("same value");
        disjoint.set("b.e", 5i32).expect("new leaf");
        c1.merge(&disjoint, MergePolicy::Reject).expect("no conflict");
        assert!(c1.has("b.e"));
    }

    #[test]
    fn test_tables_replaced_whole() {
        let mut c1 = Hash::new();
        c1.set("t[0].x", 1i32).expect("row 0");
        c1.set("t[1].x", 2i32).expect("row 1");
        let mut c2 = Hash::new();
        c2.set("t[0].y", 9i32).expect("row 0");
        c1.merge(&c2, MergePolicy::Merge).expect("merge");
        let rows = c1.get_value("t").expect("t").as_vector_hash().expect("table");
        assert_eq!(rows.len(), 1);
        assert!(rows[0].has("y") && !rows[0].has("x"));
    }

    #[test]
    fn test_subtract() {
        let (mut c1, _) = pair();
        c1.set("b.e", 5i32).expect("b.e");
        let mut remove = Hash::new();
        remove.set("b.c", 0i32).expect("b.c");
        remove.set("missing", 0i32).expect("missing");
        c1.subtract(&remove);
        assert!(!c1.has("b.c"));
        assert!(c1.has("b.e"));
        assert!(c1.has("a"));
    }
}
