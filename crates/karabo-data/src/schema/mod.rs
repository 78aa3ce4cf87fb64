// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schemas: container-shaped parameter descriptions.
//!
//! A [`Schema`] is a root name plus a [`Hash`] in which every entry is a
//! parameter descriptor: its attributes ([`attr`]) say what the parameter
//! is, its value holds nested descriptors.
//!
//! | nodeType          | value                    | walk kind   |
//! |-------------------|--------------------------|-------------|
//! | LEAF              | NONE                     | valueType   |
//! | LEAF (table)      | HASH (row schema)        | VECTOR_HASH |
//! | NODE              | HASH (children)          | HASH        |
//! | NODE (slot)       | empty HASH               | NONE        |
//! | CHOICE_OF_NODES   | HASH (one node per option) | HASH      |
//! | LIST_OF_NODES     | HASH (one node per option) | VECTOR_HASH |
//!
//! Schemas are built with [`SchemaBuilder`] and travel through either codec
//! as SCHEMA values.

mod builder;
mod descriptor;
mod meta;
pub(crate) mod rules;


pub use builder::SchemaBuilder;
pub use descriptor::{
    ChoiceDescriptor, Descriptor, LeafDescriptor, ListDescriptor, NodeDescriptor, Overwrite,
    SlotDescriptor, TableDescriptor,
};
pub use meta::{AccessLevel, AccessMode, ArchivePolicy, Assignment, DaqPolicy, NodeType};

use crate::config::{CLASS_ID_SLOT, PATH_SEPARATOR};
use crate::error::{Error, Result};
use crate::hash::path::child as child_path;
use crate::hash::{validate_key, Attributes, Hash, Node};
use crate::types::{Kind, Value};

/// Descriptor attribute names.
pub mod attr {
    pub const NODE_TYPE: &str = "nodeType";
    pub const VALUE_TYPE: &str = "valueType";
    pub const CLASS_ID: &str = "classId";
    pub const ACCESS_MODE: &str = "accessMode";
    pub const ASSIGNMENT: &str = "assignment";
    pub const REQUIRED_ACCESS_LEVEL: &str = "requiredAccessLevel";
    pub const DESCRIPTION: &str = "description";
    pub const DISPLAYED_NAME: &str = "displayedName";
    pub const DEFAULT_VALUE: &str = "defaultValue";
    pub const OPTIONS: &str = "options";
    pub const MIN_INC: &str = "minInc";
    pub const MAX_INC: &str = "maxInc";
    pub const MIN_EXC: &str = "minExc";
    pub const MAX_EXC: &str = "maxExc";
    pub const MIN_SIZE: &str = "minSize";
    pub const MAX_SIZE: &str = "maxSize";
    pub const UNIT_SYMBOL: &str = "unitSymbol";
    pub const METRIC_PREFIX_SYMBOL: &str = "metricPrefixSymbol";
    pub const DISPLAY_TYPE: &str = "displayType";
    pub const ALLOWED_STATES: &str = "allowedStates";
    pub const ALIAS: &str = "alias";
    pub const TAGS: &str = "tags";
    pub const ARCHIVE_POLICY: &str = "archivePolicy";
    pub const DAQ_POLICY: &str = "daqPolicy";
}

/// A class whose parameters are described by a schema.
///
/// Subclasses extend their parent by calling its `expected_parameters`
/// first:
///
/// ```rust
/// use karabo_data::schema::{Configurable, LeafDescriptor, Overwrite, SchemaBuilder};
///
/// struct Device;
/// impl Configurable for Device {
///     const CLASS_ID: &'static str = "Device";
///     fn expected_parameters(s: SchemaBuilder) -> SchemaBuilder {
///         s.add(LeafDescriptor::string("state").read_only().default_value("UNKNOWN"))
///     }
/// }
///
/// struct Motor;
/// impl Configurable for Motor {
///     const CLASS_ID: &'static str = "Motor";
///     fn expected_parameters(s: SchemaBuilder) -> SchemaBuilder {
///         Device::expected_parameters(s)
///             .add(LeafDescriptor::double("speed").reconfigurable())
///             .add(Overwrite::new("state").default_value("OFF"))
///     }
/// }
///
/// let schema = Motor::class_schema().unwrap();
/// assert_eq!(schema.root_name(), "Motor");
/// assert_eq!(schema.paths(), ["state", "speed"]);
/// ```
pub trait Configurable {
    const CLASS_ID: &'static str;

    fn expected_parameters(schema: SchemaBuilder) -> SchemaBuilder;

    fn class_schema() -> Result<Schema> {
        Self::expected_parameters(SchemaBuilder::new(Self::CLASS_ID)).build()
    }
}

/// One descriptor as yielded by [`Schema::walk`].
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaEntry<'a> {
    pub path: String,
    pub kind: Kind,
    pub attributes: &'a Attributes,
}

/// Parameter description of one class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    root_name: String,
    parameters: Hash,
}

fn missing_attribute(path: &str, name: &str) -> Error {
    Error::KeyMissing {
        path: format!("{path}@{name}"),
    }
}

fn int_attribute(node: &Node, path: &str, name: &str) -> Result<Option<i32>> {
    match node.attributes().get(name) {
        None => Ok(None),
        Some(Value::Int32(v)) => Ok(Some(*v)),
        Some(other) => Err(Error::KindMismatch {
            path: path.to_string(),
            detail: format!("{name} is {}, expected INT32", other.kind()),
        }),
    }
}

fn decode_code<T>(code: i32, path: &str, name: &str, from: fn(i32) -> Option<T>) -> Result<T> {
    from(code).ok_or_else(|| Error::OutOfRange {
        path: path.to_string(),
        detail: format!("{name} {code} is not a known code"),
    })
}

fn node_type_of(node: &Node) -> Option<NodeType> {
    match node.attributes().get(attr::NODE_TYPE) {
        Some(Value::Int32(code)) => NodeType::from_i32(*code),
        _ => None,
    }
}

fn is_slot(node: &Node) -> bool {
    node.attributes().get(attr::CLASS_ID).and_then(Value::as_str) == Some(CLASS_ID_SLOT)
}

fn is_table(node: &Node) -> bool {
    node_type_of(node) == Some(NodeType::Leaf)
        && node.attributes().get(attr::VALUE_TYPE).and_then(Value::as_str)
            == Some(Kind::VectorHash.name())
}

/// Kind reported by [`Schema::walk`] for a descriptor.
fn walk_kind(node: &Node) -> Kind {
    match node_type_of(node) {
        Some(NodeType::Leaf) => node
            .attributes()
            .get(attr::VALUE_TYPE)
            .and_then(Value::as_str)
            .and_then(Kind::from_name)
            .unwrap_or(Kind::None),
        Some(NodeType::Node) if is_slot(node) => Kind::None,
        Some(NodeType::ListOfNodes) => Kind::VectorHash,
        _ => Kind::Hash,
    }
}

/// Whether walking and path lookup descend into this descriptor.
fn has_children(node: &Node) -> bool {
    matches!(
        node_type_of(node),
        Some(NodeType::Node | NodeType::ChoiceOfNodes | NodeType::ListOfNodes)
    ) && !is_slot(node)
}

impl Schema {
    /// Wrap an already composed parameter container.
    pub fn from_parts(root_name: impl Into<String>, parameters: Hash) -> Self {
        Self {
            root_name: root_name.into(),
            parameters,
        }
    }

    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// The schema as a container.
    pub fn parameters(&self) -> &Hash {
        &self.parameters
    }

    pub fn into_parts(self) -> (String, Hash) {
        (self.root_name, self.parameters)
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Descriptor node at a dotted parameter path. Lookup descends into
    /// nodes, choice options and list options only; table columns are
    /// reached through [`Self::row_schema`].
    pub fn descriptor(&self, path: &str) -> Result<&Node> {
        let mut current = &self.parameters;
        let mut keys = path.split(PATH_SEPARATOR).peekable();
        while let Some(key) = keys.next() {
            validate_key(key).map_err(|_| Error::InvalidPath {
                path: path.to_string(),
                detail: format!("bad parameter key '{key}'"),
            })?;
            let node = current.node(key).ok_or_else(|| Error::KeyMissing {
                path: path.to_string(),
            })?;
            if keys.peek().is_none() {
                return Ok(node);
            }
            if !has_children(node) {
                return Err(Error::KeyMissing {
                    path: path.to_string(),
                });
            }
            current = node.value().as_hash().ok_or_else(|| Error::KeyMissing {
                path: path.to_string(),
            })?;
        }
        Err(Error::InvalidPath {
            path: String::new(),
            detail: "empty parameter path".into(),
        })
    }

    pub fn has(&self, path: &str) -> bool {
        self.descriptor(path).is_ok()
    }

    pub fn node_type(&self, path: &str) -> Result<NodeType> {
        let node = self.descriptor(path)?;
        let code = int_attribute(node, path, attr::NODE_TYPE)?
            .ok_or_else(|| missing_attribute(path, attr::NODE_TYPE))?;
        decode_code(code, path, attr::NODE_TYPE, NodeType::from_i32)
    }

    /// Declared kind of a leaf or table.
    pub fn value_type(&self, path: &str) -> Result<Kind> {
        let name = self
            .descriptor(path)?
            .attributes()
            .get(attr::VALUE_TYPE)
            .ok_or_else(|| missing_attribute(path, attr::VALUE_TYPE))?;
        let name = name.as_str().ok_or_else(|| Error::KindMismatch {
            path: path.to_string(),
            detail: format!("{} is {}, expected STRING", attr::VALUE_TYPE, name.kind()),
        })?;
        Kind::from_name(name).ok_or_else(|| Error::UnknownKind(name.to_string()))
    }

    pub fn access_mode(&self, path: &str) -> Result<AccessMode> {
        let node = self.descriptor(path)?;
        let code = int_attribute(node, path, attr::ACCESS_MODE)?
            .ok_or_else(|| missing_attribute(path, attr::ACCESS_MODE))?;
        decode_code(code, path, attr::ACCESS_MODE, AccessMode::from_i32)
    }

    pub fn assignment(&self, path: &str) -> Result<Assignment> {
        let node = self.descriptor(path)?;
        let code = int_attribute(node, path, attr::ASSIGNMENT)?
            .ok_or_else(|| missing_attribute(path, attr::ASSIGNMENT))?;
        decode_code(code, path, attr::ASSIGNMENT, Assignment::from_i32)
    }

    /// Required access level; descriptors without one need none.
    pub fn required_access_level(&self, path: &str) -> Result<u32> {
        let node = self.descriptor(path)?;
        match int_attribute(node, path, attr::REQUIRED_ACCESS_LEVEL)? {
            None => Ok(0),
            Some(level) => u32::try_from(level).map_err(|_| Error::OutOfRange {
                path: path.to_string(),
                detail: format!("negative access level {level}"),
            }),
        }
    }

    fn optional(&self, path: &str, name: &str) -> Result<Option<&Value>> {
        Ok(self.descriptor(path)?.attributes().get(name))
    }

    fn optional_text(&self, path: &str, name: &str) -> Result<Option<&str>> {
        match self.optional(path, name)? {
            None => Ok(None),
            Some(Value::String(text)) => Ok(Some(text)),
            Some(other) => Err(Error::KindMismatch {
                path: path.to_string(),
                detail: format!("{name} is {}, expected STRING", other.kind()),
            }),
        }
    }

    pub fn default_value(&self, path: &str) -> Result<Option<&Value>> {
        self.optional(path, attr::DEFAULT_VALUE)
    }

    pub fn options(&self, path: &str) -> Result<Option<&Value>> {
        self.optional(path, attr::OPTIONS)
    }

    pub fn alias(&self, path: &str) -> Result<Option<&Value>> {
        self.optional(path, attr::ALIAS)
    }

    pub fn allowed_states(&self, path: &str) -> Result<Option<&[String]>> {
        match self.optional(path, attr::ALLOWED_STATES)? {
            None => Ok(None),
            Some(Value::VectorString(states)) => Ok(Some(states)),
            Some(other) => Err(Error::KindMismatch {
                path: path.to_string(),
                detail: format!("{} is {}", attr::ALLOWED_STATES, other.kind()),
            }),
        }
    }

    pub fn unit_symbol(&self, path: &str) -> Result<Option<&str>> {
        self.optional_text(path, attr::UNIT_SYMBOL)
    }

    pub fn display_type(&self, path: &str) -> Result<Option<&str>> {
        self.optional_text(path, attr::DISPLAY_TYPE)
    }

    pub fn description(&self, path: &str) -> Result<Option<&str>> {
        self.optional_text(path, attr::DESCRIPTION)
    }

    pub fn displayed_name(&self, path: &str) -> Result<Option<&str>> {
        self.optional_text(path, attr::DISPLAYED_NAME)
    }

    pub fn class_id(&self, path: &str) -> Result<Option<&str>> {
        self.optional_text(path, attr::CLASS_ID)
    }

    /// Row schema of a table, named after the table.
    pub fn row_schema(&self, path: &str) -> Result<Schema> {
        let node = self.descriptor(path)?;
        if !is_table(node) {
            return Err(Error::KindMismatch {
                path: path.to_string(),
                detail: "not a table".into(),
            });
        }
        let rows = node.value().as_hash().cloned().unwrap_or_default();
        Ok(Schema::from_parts(node.key(), rows))
    }

    /// Parameters below a node, choice or list, named after it.
    pub fn sub_schema(&self, path: &str) -> Result<Schema> {
        let node = self.descriptor(path)?;
        match node.value().as_hash() {
            Some(children) if has_children(node) => {
                Ok(Schema::from_parts(node.key(), children.clone()))
            }
            _ => Err(Error::KindMismatch {
                path: path.to_string(),
                detail: "descriptor has no sub-parameters".into(),
            }),
        }
    }

    /// Every descriptor with its path and walk kind, in declaration order.
    pub fn walk(&self) -> Vec<SchemaEntry<'_>> {
        let mut out = Vec::new();
        walk_into(&self.parameters, "", &mut out);
        out
    }

    /// All descriptor paths in declaration order.
    pub fn paths(&self) -> Vec<String> {
        self.walk().into_iter().map(|entry| entry.path).collect()
    }

    /// Paths of leaves (including tables).
    pub fn leaves(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_leaves(&self.parameters, "", &mut out);
        out
    }

    /// Paths of parameters a running device accepts updates for.
    pub fn reconfigurable_paths(&self) -> Vec<String> {
        self.leaves()
            .into_iter()
            .filter(|p| self.access_mode(p).ok() == Some(AccessMode::Write))
            .collect()
    }
}

fn walk_into<'a>(hash: &'a Hash, prefix: &str, out: &mut Vec<SchemaEntry<'a>>) {
    for node in hash.iter() {
        let path = child_path(prefix, node.key());
        out.push(SchemaEntry {
            path: path.clone(),
            kind: walk_kind(node),
            attributes: node.attributes(),
        });
        if has_children(node) {
            if let Some(children) = node.value().as_hash() {
                walk_into(children, &path, out);
            }
        }
    }
}

fn collect_leaves(hash: &Hash, prefix: &str, out: &mut Vec<String>) {
    for node in hash.iter() {
        let path = child_path(prefix, node.key());
        if node_type_of(node) == Some(NodeType::Leaf) {
            out.push(path);
        } else if has_children(node) {
            if let Some(children) = node.value().as_hash() {
                collect_leaves(children, &path, out);
            }
        }
    }
}
