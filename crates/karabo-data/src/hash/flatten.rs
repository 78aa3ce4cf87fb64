// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Flat views keyed by full dotted paths.

use super::{path, Hash, MergePolicy, Node};
use crate::error::Result;
use crate::types::Value;

impl Hash {
    /// One-level hash whose keys are full dotted paths.
    ///
    /// Tables stay single leaves. A nested hash that is empty or carries
    /// attributes also emits a marker entry (an empty HASH with those
    /// attributes) ahead of its children, so that [`Hash::unflatten`]
    /// restores it exactly.
    ///
    /// Flat keys contain `.`; read them back with [`Hash::node`], not with
    /// path accessors.
    pub fn flatten(&self) -> Hash {
        let mut flat = Hash::new();
        flatten_into(self, "", &mut flat);
        flat
    }

    /// Inverse of [`Hash::flatten`].
    pub fn unflatten(&self) -> Result<Hash> {
        let mut out = Hash::new();
        for node in self.iter() {
            let key = node.key();
            match node.value() {
                Value::Hash(inner) if out.has(key) => {
                    out.get_hash_mut(key)?.merge(inner, MergePolicy::Merge)?;
                }
                value => out.set(key, value.clone())?,
            }
            let attributes = out.attributes_mut(key)?;
            for (name, value) in node.attributes().iter() {
                attributes.set(name, value.clone())?;
            }
        }
        Ok(out)
    }
}

fn flatten_into(hash: &Hash, prefix: &str, flat: &mut Hash) {
    for node in hash.iter() {
        let here = path::child(prefix, node.key());
        match node.value() {
            Value::Hash(inner) => {
                if inner.is_empty() || !node.attributes().is_empty() {
                    flat.nodes.push(Node::with_attributes(
                        here.clone(),
                        Value::Hash(Hash::new()),
                        node.attributes().clone(),
                    ));
                }
                flatten_into(inner, &here, flat);
            }
            value => flat.nodes.push(Node::with_attributes(
                here,
                value.clone(),
                node.attributes().clone(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Hash {
        let mut h = Hash::new();
        h.set("a", 1i32).expect("a");
        h.set("b.c", "x").expect("b.c");
        h.set("b.empty", Hash::new()).expect("empty");
        h.set_attribute("b", "displayedName", "B").expect("attr on node");
        h.set_attribute("b.c", "unit", "m").expect("attr on leaf");
        h.set("t[0].v", 1.5f64).expect("table");
        h.set("z", Value::None).expect("z");
        h
    }

    #[test]
    fn test_flatten_keys() {
        let flat = sample().flatten();
        let keys: Vec<_> = flat.keys().collect();
        assert_eq!(keys, vec!["a", "b", "b.c", "b.empty", "t", "z"]);
        assert_eq!(flat.node("b.c").expect("leaf").value(), &Value::from("x"));
        assert!(flat.node("b").expect("marker").attributes().contains("displayedName"));
    }

    #[test]
    fn test_unflatten_inverse() {
        let h = sample();
        assert_eq!(h.flatten().unflatten().expect("valid flat keys"), h);
    }

    #[test]
    fn test_unflatten_plain_flat_hash() {
        let mut flat = Hash::new();
        flat.push_node(Node::new("x.y", Value::Int32(1))).expect("x.y");
        flat.push_node(Node::new("x.z", Value::Int32(2))).expect("x.z");
        let tree = flat.unflatten().expect("tree");
        assert_eq!(tree.get::<i32>("x.z").expect("x.z"), 2);
        assert_eq!(tree.len(), 1);
    }
}
