// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Hash: the typed, ordered, attributed container
//!
//! A [`Hash`] is an ordered sequence of named [`Node`]s. Each node carries
//! a [`Value`] and an [`Attributes`] map. Nested hashes and tables
//! (VECTOR_HASH) are addressed with dotted paths:
//!
//! ```rust
//! use karabo_data::Hash;
//!
//! let mut h = Hash::new();
//! h.set("motor.position", 1.5f64).unwrap();
//! h.set("rows[0].x", 1i32).unwrap();
//! h.set_attribute("motor.position", "unitSymbol", "mm").unwrap();
//!
//! assert!(h.has("motor"));
//! assert_eq!(h.get::<f64>("motor.position").unwrap(), 1.5);
//! assert_eq!(h.get_hash("rows[0]").unwrap().get::<i32>("x").unwrap(), 1);
//! ```
//!
//! Operations never log; every failure surfaces as an [`Error`].

mod attributes;
mod flatten;
mod merge;
pub(crate) mod path;


pub use attributes::Attributes;
pub use merge::MergePolicy;
pub use path::validate_key;

use crate::error::{Error, Result};
use crate::types::{Conversion, FromValue, Kind, Value};
use path::Segment;
use std::fmt;

/// One named entry of a [`Hash`].
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    key: String,
    value: Value,
    attributes: Attributes,
}

impl Node {
    pub(crate) fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
            attributes: Attributes::new(),
        }
    }

    pub(crate) fn with_attributes(key: impl Into<String>, value: Value, attributes: Attributes) -> Self {
        Self {
            key: key.into(),
            value,
            attributes,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    pub fn kind(&self) -> Kind {
        self.value.kind()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    pub fn into_parts(self) -> (String, Value, Attributes) {
        (self.key, self.value, self.attributes)
    }
}

/// Ordered map of named, typed, attributed values.
///
/// Equality is full equality: same keys in the same order, equal values
/// and equal attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hash {
    nodes: Vec<Node>,
}

/// Position addressed by a path.
enum Located<'a> {
    Node(&'a Node),
    Row(&'a Hash),
    Root(&'a Hash),
}

enum LocatedMut<'a> {
    Node(&'a mut Node),
    Row(&'a mut Hash),
    Root(&'a mut Hash),
}

fn not_a_container(segments: &[Segment<'_>], found: Kind, expected: Kind) -> Error {
    Error::KindMismatch {
        path: path::join(segments),
        detail: format!("{found} is not {expected}"),
    }
}

fn row_not_a_hash(path: &str, found: Kind) -> Error {
    Error::KindMismatch {
        path: path.to_string(),
        detail: format!("table rows are HASH, got {found}"),
    }
}

impl Hash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries at this level.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Entries at this level in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Node> {
        self.nodes.iter_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(Node::key)
    }

    /// Entry at this level by exact key; no path parsing.
    pub fn node(&self, key: &str) -> Option<&Node> {
        self.position(key).map(|i| &self.nodes[i])
    }

    pub(crate) fn position(&self, key: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.key == key)
    }

    /// Append a node without path parsing. Used by decoders and flatten,
    /// whose keys may not be valid path segments.
    pub(crate) fn push_node(&mut self, node: Node) -> Result<()> {
        if self.position(&node.key).is_some() {
            return Err(Error::Malformed(format!("duplicate key '{}'", node.key)));
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Append a node whose key is known to be absent at this level, such
    /// as one produced by walking another container's unique keys.
    pub(crate) fn push_unique(&mut self, node: Node) {
        debug_assert!(self.position(&node.key).is_none(), "duplicate key '{}'", node.key);
        self.nodes.push(node);
    }

    fn locate(&self, segments: &[Segment<'_>]) -> Result<Located<'_>> {
        let mut current = self;
        let last = segments.len().saturating_sub(1);
        for (i, segment) in segments.iter().enumerate() {
            let node = current.node(segment.name).ok_or_else(|| Error::KeyMissing {
                path: path::join(&segments[..=i]),
            })?;
            match segment.index {
                Some(index) => {
                    let rows = node.value.as_vector_hash().ok_or_else(|| {
                        not_a_container(&segments[..=i], node.kind(), Kind::VectorHash)
                    })?;
                    let row = rows.get(index).ok_or_else(|| Error::IndexOutOfRange {
                        path: path::join(&segments[..=i]),
                        index,
                        len: rows.len(),
                    })?;
                    if i == last {
                        return Ok(Located::Row(row));
                    }
                    current = row;
                }
                None => {
                    if i == last {
                        return Ok(Located::Node(node));
                    }
                    current = node.value.as_hash().ok_or_else(|| {
                        not_a_container(&segments[..=i], node.kind(), Kind::Hash)
                    })?;
                }
            }
        }
        Ok(Located::Root(current))
    }

    fn locate_mut(&mut self, segments: &[Segment<'_>]) -> Result<LocatedMut<'_>> {
        let mut current = self;
        let last = segments.len().saturating_sub(1);
        for (i, segment) in segments.iter().enumerate() {
            let pos = current.position(segment.name).ok_or_else(|| Error::KeyMissing {
                path: path::join(&segments[..=i]),
            })?;
            let node = &mut current.nodes[pos];
            let kind = node.kind();
            match segment.index {
                Some(index) => {
                    let rows = node
                        .value
                        .as_vector_hash_mut()
                        .ok_or_else(|| not_a_container(&segments[..=i], kind, Kind::VectorHash))?;
                    let len = rows.len();
                    let row = rows.get_mut(index).ok_or_else(|| Error::IndexOutOfRange {
                        path: path::join(&segments[..=i]),
                        index,
                        len,
                    })?;
                    if i == last {
                        return Ok(LocatedMut::Row(row));
                    }
                    current = row;
                }
                None => {
                    if i == last {
                        return Ok(LocatedMut::Node(node));
                    }
                    current = node
                        .value
                        .as_hash_mut()
                        .ok_or_else(|| not_a_container(&segments[..=i], kind, Kind::Hash))?;
                }
            }
        }
        Ok(LocatedMut::Root(current))
    }

    /// Node at `path`. Table rows and the root are not nodes.
    pub fn get_node(&self, path: &str) -> Result<&Node> {
        match self.locate(&path::parse(path)?)? {
            Located::Node(node) => Ok(node),
            _ => Err(Error::InvalidPath {
                path: path.to_string(),
                detail: "path does not address a named entry".into(),
            }),
        }
    }

    pub fn get_node_mut(&mut self, path: &str) -> Result<&mut Node> {
        match self.locate_mut(&path::parse(path)?)? {
            LocatedMut::Node(node) => Ok(node),
            _ => Err(Error::InvalidPath {
                path: path.to_string(),
                detail: "path does not address a named entry".into(),
            }),
        }
    }

    /// Stored value at `path`.
    pub fn get_value(&self, path: &str) -> Result<&Value> {
        self.get_node(path).map(Node::value)
    }

    pub fn get_value_mut(&mut self, path: &str) -> Result<&mut Value> {
        self.get_node_mut(path).map(Node::value_mut)
    }

    /// Typed copy of the value at `path`.
    pub fn get<T: FromValue>(&self, path: &str) -> Result<T> {
        T::from_value(self.get_value(path)?).map_err(|e| e.at(path))
    }

    /// Value at `path` converted (exactly) to `kind`.
    pub fn get_as(&self, path: &str, kind: Kind) -> Result<Value> {
        self.get_value(path)?
            .convert(kind, Conversion::Exact)
            .map_err(|e| e.at(path))
    }

    /// Nested hash at `path`: a HASH value, a table row (`a[1]`) or, for
    /// the empty path, `self`.
    pub fn get_hash(&self, path: &str) -> Result<&Hash> {
        match self.locate(&path::parse(path)?)? {
            Located::Node(node) => node.value.as_hash().ok_or_else(|| Error::KindMismatch {
                path: path.to_string(),
                detail: format!("{} is not HASH", node.kind()),
            }),
            Located::Row(hash) | Located::Root(hash) => Ok(hash),
        }
    }

    pub fn get_hash_mut(&mut self, path: &str) -> Result<&mut Hash> {
        match self.locate_mut(&path::parse(path)?)? {
            LocatedMut::Node(node) => {
                let kind = node.kind();
                node.value.as_hash_mut().ok_or_else(|| Error::KindMismatch {
                    path: path.to_string(),
                    detail: format!("{kind} is not HASH"),
                })
            }
            LocatedMut::Row(hash) | LocatedMut::Root(hash) => Ok(hash),
        }
    }

    /// Whether `path` addresses something. Never fails.
    pub fn has(&self, path: &str) -> bool {
        path::parse(path).is_ok_and(|segments| self.locate(&segments).is_ok())
    }

    /// Insert or replace the value at `path`, creating missing intermediate
    /// hashes. A replaced entry keeps its position and attributes.
    ///
    /// An indexed final segment (`rows[2]`) sets a whole table row and
    /// accepts only HASH values; index `len` appends.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let segments = path::parse(path)?;
        let Some((last, parents)) = segments.split_last() else {
            return Err(Error::InvalidPath {
                path: String::new(),
                detail: "cannot replace the root".into(),
            });
        };
        if last.index.is_some() && value.kind() != Kind::Hash {
            return Err(row_not_a_hash(path, value.kind()));
        }
        self.check_set(&segments)?;

        let mut current = self;
        for (i, segment) in parents.iter().enumerate() {
            current = current.child_for_set(segment, &segments[..=i])?;
        }
        match last.index {
            None => {
                current.insert(last.name, value);
                Ok(())
            }
            Some(index) => {
                let kind = value.kind();
                let Value::Hash(row) = value else {
                    return Err(row_not_a_hash(path, kind));
                };
                let rows = current.rows_for_set(last, &segments)?;
                if index < rows.len() {
                    rows[index] = row;
                } else {
                    rows.push(row);
                }
                Ok(())
            }
        }
    }

    /// Like [`Self::set`], failing with KindMismatch if `value` is not of `kind`.
    pub fn set_as(&mut self, path: &str, value: impl Into<Value>, kind: Kind) -> Result<()> {
        let value = value.into();
        if value.kind() != kind {
            return Err(Error::KindMismatch {
                path: path.to_string(),
                detail: format!("declared {kind}, value is {}", value.kind()),
            });
        }
        self.set(path, value)
    }

    fn insert(&mut self, key: &str, value: Value) {
        match self.position(key) {
            Some(i) => self.nodes[i].value = value,
            None => self.nodes.push(Node::new(key, value)),
        }
    }

    /// Walk `segments` read-only and fail where [`Self::set`] would, so a
    /// failed set creates nothing.
    fn check_set(&self, segments: &[Segment<'_>]) -> Result<()> {
        let last = segments.len().saturating_sub(1);
        let mut current = Some(self);
        for (i, segment) in segments.iter().enumerate() {
            let prefix = &segments[..=i];
            let node = current.and_then(|hash| hash.node(segment.name));
            current = match (node, segment.index) {
                (None, None | Some(0)) => None,
                (None, Some(index)) => {
                    return Err(Error::OutOfRange {
                        path: path::join(prefix),
                        detail: format!("index {index} on a missing table"),
                    })
                }
                (Some(_), None) if i == last => None,
                (Some(node), None) => Some(
                    node.value
                        .as_hash()
                        .ok_or_else(|| not_a_container(prefix, node.kind(), Kind::Hash))?,
                ),
                (Some(node), Some(index)) => {
                    let rows = node
                        .value
                        .as_vector_hash()
                        .ok_or_else(|| not_a_container(prefix, node.kind(), Kind::VectorHash))?;
                    if index > rows.len() {
                        return Err(Error::OutOfRange {
                            path: path::join(prefix),
                            detail: format!("index {index} past table length {}", rows.len()),
                        });
                    }
                    rows.get(index)
                }
            };
        }
        Ok(())
    }

    fn child_for_set(&mut self, segment: &Segment<'_>, prefix: &[Segment<'_>]) -> Result<&mut Hash> {
        match segment.index {
            None => {
                let pos = match self.position(segment.name) {
                    Some(pos) => pos,
                    None => {
                        self.nodes.push(Node::new(segment.name, Value::Hash(Hash::new())));
                        self.nodes.len() - 1
                    }
                };
                let node = &mut self.nodes[pos];
                let kind = node.kind();
                node.value
                    .as_hash_mut()
                    .ok_or_else(|| not_a_container(prefix, kind, Kind::Hash))
            }
            Some(index) => {
                let rows = self.rows_for_set(segment, prefix)?;
                if index == rows.len() {
                    rows.push(Hash::new());
                }
                Ok(&mut rows[index])
            }
        }
    }

    /// Table addressed by an indexed segment, created when absent. Fails
    /// unless the index is at most the current length.
    fn rows_for_set(&mut self, segment: &Segment<'_>, prefix: &[Segment<'_>]) -> Result<&mut Vec<Hash>> {
        let index = segment.index.unwrap_or(0);
        let pos = match self.position(segment.name) {
            Some(pos) => pos,
            None if index == 0 => {
                self.nodes.push(Node::new(segment.name, Value::VectorHash(Vec::new())));
                self.nodes.len() - 1
            }
            None => {
                return Err(Error::OutOfRange {
                    path: path::join(prefix),
                    detail: format!("index {index} on a missing table"),
                })
            }
        };
        let node = &mut self.nodes[pos];
        let kind = node.kind();
        let rows = node
            .value
            .as_vector_hash_mut()
            .ok_or_else(|| not_a_container(prefix, kind, Kind::VectorHash))?;
        if index > rows.len() {
            return Err(Error::OutOfRange {
                path: path::join(prefix),
                detail: format!("index {index} past table length {}", rows.len()),
            });
        }
        Ok(rows)
    }

    /// Remove the entry (or table row) at `path`. Later rows shift down.
    pub fn erase(&mut self, path: &str) -> bool {
        match path::parse(path) {
            Ok(segments) => self.erase_segments(&segments),
            Err(_) => false,
        }
    }

    /// Like [`Self::erase`], then also remove parent hashes left empty.
    pub fn erase_path(&mut self, path: &str) -> bool {
        let Ok(segments) = path::parse(path) else {
            return false;
        };
        if !self.erase_segments(&segments) {
            return false;
        }
        for end in (1..segments.len()).rev() {
            let parent = &segments[..end];
            let empty = matches!(
                self.locate(parent),
                Ok(Located::Node(Node { value: Value::Hash(h), .. })) if h.is_empty()
            );
            if !empty {
                break;
            }
            self.erase_segments(parent);
        }
        true
    }

    fn erase_segments(&mut self, segments: &[Segment<'_>]) -> bool {
        let Some((last, parents)) = segments.split_last() else {
            return false;
        };
        let parent = match self.locate_mut(parents) {
            Ok(LocatedMut::Node(node)) => match node.value.as_hash_mut() {
                Some(hash) => hash,
                None => return false,
            },
            Ok(LocatedMut::Row(hash)) | Ok(LocatedMut::Root(hash)) => hash,
            Err(_) => return false,
        };
        let Some(pos) = parent.position(last.name) else {
            return false;
        };
        match last.index {
            None => {
                parent.nodes.remove(pos);
                true
            }
            Some(index) => match parent.nodes[pos].value.as_vector_hash_mut() {
                Some(rows) if index < rows.len() => {
                    rows.remove(index);
                    true
                }
                _ => false,
            },
        }
    }

    /// Attributes of the entry at `path`.
    pub fn attributes(&self, path: &str) -> Result<&Attributes> {
        self.get_node(path).map(Node::attributes)
    }

    pub fn attributes_mut(&mut self, path: &str) -> Result<&mut Attributes> {
        self.get_node_mut(path).map(Node::attributes_mut)
    }

    pub fn get_attribute(&self, path: &str, name: &str) -> Result<&Value> {
        self.attributes(path)?
            .get(name)
            .ok_or_else(|| Error::KeyMissing {
                path: format!("{path}@{name}"),
            })
    }

    pub fn set_attribute(&mut self, path: &str, name: &str, value: impl Into<Value>) -> Result<()> {
        self.attributes_mut(path)?
            .set(name, value)
            .map_err(|e| e.at(path))
    }

    pub fn set_attribute_as(
        &mut self,
        path: &str,
        name: &str,
        value: impl Into<Value>,
        kind: Kind,
    ) -> Result<()> {
        self.attributes_mut(path)?.set_as(name, value, kind)
    }

    /// Paths of all leaves, depth first. Empty hashes and tables count as
    /// leaves.
    pub fn paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_paths("", &mut out);
        out
    }

    fn collect_paths(&self, prefix: &str, out: &mut Vec<String>) {
        for node in &self.nodes {
            let here = path::child(prefix, &node.key);
            match &node.value {
                Value::Hash(h) if !h.is_empty() => h.collect_paths(&here, out),
                _ => out.push(here),
            }
        }
    }

    /// Depth-first walk over every node, rows included (`rows[0].x`).
    ///
    /// The visitor returns `false` to stop; `visit` then returns `false`.
    pub fn visit<F>(&self, visitor: &mut F) -> bool
    where
        F: FnMut(&str, &Node) -> bool,
    {
        self.visit_from("", visitor)
    }

    fn visit_from<F>(&self, prefix: &str, visitor: &mut F) -> bool
    where
        F: FnMut(&str, &Node) -> bool,
    {
        for node in &self.nodes {
            let here = path::child(prefix, &node.key);
            if !visitor(&here, node) {
                return false;
            }
            let keep_going = match &node.value {
                Value::Hash(h) => h.visit_from(&here, visitor),
                Value::VectorHash(rows) => rows
                    .iter()
                    .enumerate()
                    .all(|(i, row)| row.visit_from(&format!("{here}[{i}]"), visitor)),
                _ => true,
            };
            if !keep_going {
                return false;
            }
        }
        true
    }

    /// Same structure: keys, order and kinds agree recursively; values and
    /// attributes are ignored.
    pub fn similar(&self, other: &Hash) -> bool {
        self.nodes.len() == other.nodes.len()
            && self.nodes.iter().zip(&other.nodes).all(|(a, b)| {
                a.key == b.key
                    && match (&a.value, &b.value) {
                        (Value::Hash(x), Value::Hash(y)) => x.similar(y),
                        (Value::VectorHash(x), Value::VectorHash(y)) => {
                            x.len() == y.len() && x.iter().zip(y).all(|(r, s)| r.similar(s))
                        }
                        (x, y) => x.kind() == y.kind(),
                    }
            })
    }

    /// Full equality, attributes and order included. Same as `==`.
    pub fn fully_equals(&self, other: &Hash) -> bool {
        self == other
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        for node in &self.nodes {
            write!(f, "{:indent$}{}", "", node.key, indent = depth * 2)?;
            for (name, value) in node.attributes.iter() {
                write!(f, " {name}=\"{value}\"")?;
            }
            match &node.value {
                Value::Hash(h) => {
                    writeln!(f, " +")?;
                    h.fmt_indented(f, depth + 1)?;
                }
                Value::VectorHash(rows) => {
                    writeln!(f, " @")?;
                    for (i, row) in rows.iter().enumerate() {
                        writeln!(f, "{:indent$}[{i}]", "", indent = (depth + 1) * 2)?;
                        row.fmt_indented(f, depth + 2)?;
                    }
                }
                other => writeln!(f, " => {other} {}", other.kind())?,
            }
        }
        Ok(())
    }
}

/// Indented dump, one node per line: `key => value KIND`, `key +` for
/// nested hashes and `key @` for tables.
impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

impl<'a> IntoIterator for &'a Hash {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
