// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Parameter descriptors.
//!
//! Each descriptor turns into one schema node: a [`Node`] whose attributes
//! describe the parameter and whose value holds nested descriptors (nodes,
//! choices, lists) or the row schema (tables).

use super::attr;
use super::meta::{AccessLevel, AccessMode, ArchivePolicy, Assignment, DaqPolicy, NodeType};
use super::rules;
use super::{Configurable, Schema};
use crate::config::{CLASS_ID_SLOT, DISPLAY_TYPE_TABLE};
use crate::error::{Error, Result};
use crate::hash::{validate_key, Attributes, Hash, Node};
use crate::types::{Conversion, Kind, Value};
use std::cmp::Ordering;

// ============================================================================
// Shared metadata
// ============================================================================

/// What a descriptor stands for when defaults are filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    /// Leaves, tables, choices and lists.
    Parameter,
    Node,
    Slot,
}

/// Descriptor metadata. Unset fields are either filled with defaults when
/// a descriptor is declared or left alone by an [`Overwrite`].
#[derive(Debug, Clone, Default, PartialEq)]
struct Meta {
    access_mode: Option<AccessMode>,
    assignment: Option<Assignment>,
    required_access_level: Option<u32>,
    description: Option<String>,
    displayed_name: Option<String>,
    unit_symbol: Option<String>,
    metric_prefix_symbol: Option<String>,
    display_type: Option<String>,
    allowed_states: Option<Vec<String>>,
    alias: Option<Value>,
    tags: Option<Vec<String>>,
    archive_policy: Option<ArchivePolicy>,
    daq_policy: Option<DaqPolicy>,
    extra: Vec<(String, Value)>,
}

impl Meta {
    fn resolve(mut self, key: &str, role: Role) -> Self {
        match role {
            Role::Parameter => {
                let mode = *self.access_mode.get_or_insert(AccessMode::Init);
                self.assignment.get_or_insert(Assignment::Optional);
                let level = match mode {
                    AccessMode::Read => AccessLevel::Observer,
                    AccessMode::Init | AccessMode::Write => AccessLevel::User,
                };
                self.required_access_level.get_or_insert(level.level());
            }
            Role::Slot => {
                self.required_access_level
                    .get_or_insert(AccessLevel::User.level());
            }
            Role::Node => {}
        }
        self.description.get_or_insert_with(String::new);
        self.displayed_name.get_or_insert_with(|| key.to_string());
        self
    }

    fn apply(&self, attributes: &mut Attributes) -> Result<()> {
        if let Some(mode) = self.access_mode {
            attributes.set(attr::ACCESS_MODE, mode.as_i32())?;
        }
        if let Some(assignment) = self.assignment {
            attributes.set(attr::ASSIGNMENT, assignment.as_i32())?;
        }
        if let Some(level) = self.required_access_level {
            let level = i32::try_from(level).map_err(|_| Error::OutOfRange {
                path: String::new(),
                detail: format!("access level {level} does not fit INT32"),
            })?;
            attributes.set(attr::REQUIRED_ACCESS_LEVEL, level)?;
        }
        let texts = [
            (attr::DESCRIPTION, &self.description),
            (attr::DISPLAYED_NAME, &self.displayed_name),
            (attr::UNIT_SYMBOL, &self.unit_symbol),
            (attr::METRIC_PREFIX_SYMBOL, &self.metric_prefix_symbol),
            (attr::DISPLAY_TYPE, &self.display_type),
        ];
        for (name, text) in texts {
            if let Some(text) = text {
                attributes.set(name, text.as_str())?;
            }
        }
        if let Some(states) = &self.allowed_states {
            attributes.set(attr::ALLOWED_STATES, states.clone())?;
        }
        if let Some(alias) = &self.alias {
            attributes.set(attr::ALIAS, alias.clone())?;
        }
        if let Some(tags) = &self.tags {
            attributes.set(attr::TAGS, tags.clone())?;
        }
        if let Some(policy) = self.archive_policy {
            attributes.set(attr::ARCHIVE_POLICY, policy.as_i32())?;
        }
        if let Some(policy) = self.daq_policy {
            attributes.set(attr::DAQ_POLICY, policy.as_i32())?;
        }
        for (name, value) in &self.extra {
            attributes.set(name, value.clone())?;
        }
        Ok(())
    }
}

/// Value constraints, converted to the leaf's kind when applied.
#[derive(Debug, Clone, Default, PartialEq)]
struct ValueRules {
    default_value: Option<Value>,
    options: Option<Value>,
    min_inc: Option<Value>,
    max_inc: Option<Value>,
    min_exc: Option<Value>,
    max_exc: Option<Value>,
    min_size: Option<u32>,
    max_size: Option<u32>,
}

fn to_kind(value: &Value, kind: Kind, name: &str) -> Result<Value> {
    value
        .convert(kind, Conversion::Exact)
        .map_err(|e| Error::kind_mismatch(format!("{name}: {e}")))
}

impl ValueRules {
    fn apply(&self, kind: Kind, attributes: &mut Attributes) -> Result<()> {
        if let Some(default) = &self.default_value {
            attributes.set(attr::DEFAULT_VALUE, to_kind(default, kind, attr::DEFAULT_VALUE)?)?;
        }
        if let Some(options) = &self.options {
            let vector = kind
                .vector()
                .filter(|_| kind.is_scalar())
                .ok_or_else(|| {
                    Error::kind_mismatch(format!("{} need a scalar kind, not {kind}", attr::OPTIONS))
                })?;
            attributes.set(attr::OPTIONS, to_kind(options, vector, attr::OPTIONS)?)?;
        }
        let bounds = [
            (attr::MIN_INC, &self.min_inc),
            (attr::MAX_INC, &self.max_inc),
            (attr::MIN_EXC, &self.min_exc),
            (attr::MAX_EXC, &self.max_exc),
        ];
        for (name, bound) in bounds {
            if let Some(bound) = bound {
                if !kind.is_numeric() {
                    return Err(Error::kind_mismatch(format!("{name} on non-numeric {kind}")));
                }
                attributes.set(name, to_kind(bound, kind, name)?)?;
            }
        }
        for (name, size) in [(attr::MIN_SIZE, self.min_size), (attr::MAX_SIZE, self.max_size)] {
            if let Some(size) = size {
                if !kind.is_vector() && kind != Kind::VectorHash {
                    return Err(Error::kind_mismatch(format!("{name} on non-vector {kind}")));
                }
                attributes.set(name, size)?;
            }
        }
        Ok(())
    }
}

fn inconsistent(detail: String) -> Error {
    Error::OutOfRange {
        path: String::new(),
        detail,
    }
}

/// Checks run on the final attributes of a parameter.
fn check_parameter(attributes: &Attributes) -> Result<()> {
    let mode = attributes.get(attr::ACCESS_MODE);
    let assignment = attributes.get(attr::ASSIGNMENT);
    if mode == Some(&Value::Int32(AccessMode::Read.as_i32()))
        && assignment == Some(&Value::Int32(Assignment::Mandatory.as_i32()))
    {
        return Err(Error::Conflict {
            path: String::new(),
            detail: "a read-only parameter cannot be mandatory".into(),
        });
    }

    let lower = [attr::MIN_INC, attr::MIN_EXC];
    let upper = [attr::MAX_INC, attr::MAX_EXC];
    for low in lower {
        for high in upper {
            let (Some(a), Some(b)) = (attributes.get(low), attributes.get(high)) else {
                continue;
            };
            let exclusive = low == attr::MIN_EXC || high == attr::MAX_EXC;
            let fine = match a.compare_numeric(b) {
                Some(Ordering::Less) => true,
                Some(Ordering::Equal) => !exclusive,
                _ => false,
            };
            if !fine {
                return Err(inconsistent(format!("{low} {a} does not lie below {high} {b}")));
            }
        }
    }

    if let (Some(Value::Uint32(min)), Some(Value::Uint32(max))) =
        (attributes.get(attr::MIN_SIZE), attributes.get(attr::MAX_SIZE))
    {
        if min > max {
            return Err(inconsistent(format!(
                "{} {min} exceeds {} {max}",
                attr::MIN_SIZE,
                attr::MAX_SIZE
            )));
        }
    }

    if let Some(default) = attributes.get(attr::DEFAULT_VALUE) {
        rules::check(attributes, default).map_err(|violation| {
            inconsistent(format!("{}: {}", attr::DEFAULT_VALUE, violation.detail))
        })?;
    }
    Ok(())
}

fn node_attributes(node_type: NodeType) -> Result<Attributes> {
    let mut attributes = Attributes::new();
    attributes.set(attr::NODE_TYPE, node_type.as_i32())?;
    Ok(attributes)
}

// ============================================================================
// Option methods
// ============================================================================

macro_rules! common_options {
    ($($ty:ident),*) => {$(
        impl $ty {
            pub fn description(mut self, text: impl Into<String>) -> Self {
                self.meta.description = Some(text.into());
                self
            }

            pub fn displayed_name(mut self, name: impl Into<String>) -> Self {
                self.meta.displayed_name = Some(name.into());
                self
            }

            /// Writable at instantiation only.
            pub fn init(mut self) -> Self {
                self.meta.access_mode = Some(AccessMode::Init);
                self
            }

            pub fn read_only(mut self) -> Self {
                self.meta.access_mode = Some(AccessMode::Read);
                self
            }

            pub fn reconfigurable(mut self) -> Self {
                self.meta.access_mode = Some(AccessMode::Write);
                self
            }

            pub fn assignment_optional(mut self) -> Self {
                self.meta.assignment = Some(Assignment::Optional);
                self
            }

            pub fn assignment_mandatory(mut self) -> Self {
                self.meta.assignment = Some(Assignment::Mandatory);
                self
            }

            pub fn assignment_internal(mut self) -> Self {
                self.meta.assignment = Some(Assignment::Internal);
                self
            }

            pub fn required_access_level(mut self, level: impl Into<u32>) -> Self {
                self.meta.required_access_level = Some(level.into());
                self
            }

            pub fn allowed_states<I, S>(mut self, states: I) -> Self
            where
                I: IntoIterator<Item = S>,
                S: Into<String>,
            {
                self.meta.allowed_states = Some(states.into_iter().map(Into::into).collect());
                self
            }

            pub fn unit_symbol(mut self, symbol: impl Into<String>) -> Self {
                self.meta.unit_symbol = Some(symbol.into());
                self
            }

            pub fn metric_prefix_symbol(mut self, symbol: impl Into<String>) -> Self {
                self.meta.metric_prefix_symbol = Some(symbol.into());
                self
            }

            pub fn display_type(mut self, display_type: impl Into<String>) -> Self {
                self.meta.display_type = Some(display_type.into());
                self
            }

            pub fn alias(mut self, alias: impl Into<Value>) -> Self {
                self.meta.alias = Some(alias.into());
                self
            }

            pub fn tags<I, S>(mut self, tags: I) -> Self
            where
                I: IntoIterator<Item = S>,
                S: Into<String>,
            {
                self.meta.tags = Some(tags.into_iter().map(Into::into).collect());
                self
            }

            pub fn archive_policy(mut self, policy: ArchivePolicy) -> Self {
                self.meta.archive_policy = Some(policy);
                self
            }

            pub fn daq_policy(mut self, policy: DaqPolicy) -> Self {
                self.meta.daq_policy = Some(policy);
                self
            }

            /// Any other attribute. Kept in the schema, ignored by the validator.
            pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
                self.meta.extra.push((name.into(), value.into()));
                self
            }
        }
    )*};
}

macro_rules! value_options {
    ($($ty:ident),*) => {$(
        impl $ty {
            pub fn default_value(mut self, value: impl Into<Value>) -> Self {
                self.values.default_value = Some(value.into());
                self
            }

            /// Allowed values; a vector or a comma separated string.
            pub fn options(mut self, options: impl Into<Value>) -> Self {
                self.values.options = Some(options.into());
                self
            }

            pub fn min_inc(mut self, bound: impl Into<Value>) -> Self {
                self.values.min_inc = Some(bound.into());
                self
            }

            pub fn max_inc(mut self, bound: impl Into<Value>) -> Self {
                self.values.max_inc = Some(bound.into());
                self
            }

            pub fn min_exc(mut self, bound: impl Into<Value>) -> Self {
                self.values.min_exc = Some(bound.into());
                self
            }

            pub fn max_exc(mut self, bound: impl Into<Value>) -> Self {
                self.values.max_exc = Some(bound.into());
                self
            }
        }
    )*};
}

macro_rules! size_options {
    ($($ty:ident),*) => {$(
        impl $ty {
            pub fn min_size(mut self, size: u32) -> Self {
                self.values.min_size = Some(size);
                self
            }

            pub fn max_size(mut self, size: u32) -> Self {
                self.values.max_size = Some(size);
                self
            }
        }
    )*};
}

// ============================================================================
// Descriptors
// ============================================================================

/// A typed parameter.
#[derive(Debug, Clone)]
pub struct LeafDescriptor {
    key: String,
    kind: Kind,
    meta: Meta,
    values: ValueRules,
}

macro_rules! leaf_constructors {
    ($($name:ident => $kind:ident,)*) => {
        impl LeafDescriptor {
            $(
                pub fn $name(key: impl Into<String>) -> Self {
                    Self::new(key, Kind::$kind)
                }
            )*
        }
    };
}

leaf_constructors! {
    bool => Bool,
    char => Char,
    int8 => Int8,
    uint8 => Uint8,
    int16 => Int16,
    uint16 => Uint16,
    int32 => Int32,
    uint32 => Uint32,
    int64 => Int64,
    uint64 => Uint64,
    float => Float,
    double => Double,
    complex_float => ComplexFloat,
    complex_double => ComplexDouble,
    string => String,
    bytes => Bytes,
    vector_bool => VectorBool,
    vector_char => VectorChar,
    vector_int8 => VectorInt8,
    vector_uint8 => VectorUint8,
    vector_int16 => VectorInt16,
    vector_uint16 => VectorUint16,
    vector_int32 => VectorInt32,
    vector_uint32 => VectorUint32,
    vector_int64 => VectorInt64,
    vector_uint64 => VectorUint64,
    vector_float => VectorFloat,
    vector_double => VectorDouble,
    vector_complex_float => VectorComplexFloat,
    vector_complex_double => VectorComplexDouble,
    vector_string => VectorString,
    vector_bytes => VectorBytes,
    ndarray => NdArray,
}

impl LeafDescriptor {
    /// Leaf of any scalar, vector or NDARRAY kind.
    pub fn new(key: impl Into<String>, kind: Kind) -> Self {
        Self {
            key: key.into(),
            kind,
            meta: Meta::default(),
            values: ValueRules::default(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    fn into_node(self, key: &str) -> Result<Node> {
        if self.kind.is_composite() && self.kind != Kind::NdArray {
            return Err(Error::kind_mismatch(format!(
                "{} cannot be a leaf kind",
                self.kind
            )));
        }
        let mut attributes = node_attributes(NodeType::Leaf)?;
        attributes.set(attr::VALUE_TYPE, self.kind.name())?;
        self.meta.resolve(key, Role::Parameter).apply(&mut attributes)?;
        self.values.apply(self.kind, &mut attributes)?;
        check_parameter(&attributes)?;
        Ok(Node::with_attributes(key, Value::None, attributes))
    }
}

/// Where the children of a node (or the rows of a table) come from.
#[derive(Debug, Clone)]
enum Source {
    Empty,
    Schema(Schema),
    Class {
        class_id: &'static str,
        schema: fn() -> Result<Schema>,
    },
}

impl Source {
    fn resolve(self) -> Result<(Hash, Option<String>)> {
        match self {
            Source::Empty => Ok((Hash::new(), None)),
            Source::Schema(schema) => {
                let (root, parameters) = schema.into_parts();
                Ok((parameters, Some(root).filter(|r| !r.is_empty())))
            }
            Source::Class { class_id, schema } => {
                Ok((schema()?.into_parts().1, Some(class_id.to_string())))
            }
        }
    }

    fn of<T: Configurable>() -> Self {
        Source::Class {
            class_id: T::CLASS_ID,
            schema: T::class_schema,
        }
    }
}

/// A group of parameters. Children come from an embedded class, a prebuilt
/// schema, or later descriptors with dotted keys (`node.child`).
#[derive(Debug, Clone)]
pub struct NodeDescriptor {
    key: String,
    source: Source,
    meta: Meta,
}

impl NodeDescriptor {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            source: Source::Empty,
            meta: Meta::default(),
        }
    }

    /// Node holding the parameters of `T`.
    pub fn of<T: Configurable>(key: impl Into<String>) -> Self {
        Self {
            source: Source::of::<T>(),
            ..Self::new(key)
        }
    }

    /// Node holding the parameters of `schema`.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.source = Source::Schema(schema);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn into_node(self, key: &str) -> Result<Node> {
        let (children, class_id) = self.source.resolve()?;
        let mut attributes = node_attributes(NodeType::Node)?;
        if let Some(class_id) = class_id {
            attributes.set(attr::CLASS_ID, class_id)?;
        }
        self.meta.resolve(key, Role::Node).apply(&mut attributes)?;
        Ok(Node::with_attributes(key, Value::Hash(children), attributes))
    }
}

/// A VECTOR_HASH parameter whose rows follow a row schema.
#[derive(Debug, Clone)]
pub struct TableDescriptor {
    key: String,
    rows: Source,
    meta: Meta,
    values: ValueRules,
}

impl TableDescriptor {
    pub fn new(key: impl Into<String>, row_schema: Schema) -> Self {
        Self {
            key: key.into(),
            rows: Source::Schema(row_schema),
            meta: Meta::default(),
            values: ValueRules::default(),
        }
    }

    /// Table whose rows follow the parameters of `T`.
    pub fn of<T: Configurable>(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            rows: Source::of::<T>(),
            meta: Meta::default(),
            values: ValueRules::default(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn into_node(mut self, key: &str) -> Result<Node> {
        let (row_schema, _) = self.rows.resolve()?;
        let mut attributes = node_attributes(NodeType::Leaf)?;
        attributes.set(attr::VALUE_TYPE, Kind::VectorHash.name())?;
        self.meta
            .display_type
            .get_or_insert_with(|| DISPLAY_TYPE_TABLE.to_string());
        self.meta.resolve(key, Role::Parameter).apply(&mut attributes)?;
        self.values.apply(Kind::VectorHash, &mut attributes)?;
        check_parameter(&attributes)?;
        Ok(Node::with_attributes(key, Value::Hash(row_schema), attributes))
    }
}

/// A command a device exposes. Carries no value.
#[derive(Debug, Clone)]
pub struct SlotDescriptor {
    key: String,
    meta: Meta,
}

impl SlotDescriptor {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            meta: Meta::default(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn into_node(self, key: &str) -> Result<Node> {
        let mut attributes = node_attributes(NodeType::Node)?;
        attributes.set(attr::CLASS_ID, CLASS_ID_SLOT)?;
        self.meta.resolve(key, Role::Slot).apply(&mut attributes)?;
        Ok(Node::with_attributes(key, Value::Hash(Hash::new()), attributes))
    }
}

fn option_nodes(options: Vec<NodeDescriptor>) -> Result<Hash> {
    let mut hash = Hash::new();
    for option in options {
        let key = option.key.clone();
        validate_key(&key)?;
        let node = option.into_node(&key).map_err(|e| e.at(&key))?;
        hash.push_node(node).map_err(|_| Error::Conflict {
            path: key.clone(),
            detail: "option declared twice".into(),
        })?;
    }
    Ok(hash)
}

/// Exactly one of several nodes.
#[derive(Debug, Clone)]
pub struct ChoiceDescriptor {
    key: String,
    options: Vec<NodeDescriptor>,
    default_option: Option<String>,
    meta: Meta,
}

impl ChoiceDescriptor {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            options: Vec::new(),
            default_option: None,
            meta: Meta::default(),
        }
    }

    /// Add an option; its key is the option name.
    pub fn option(mut self, option: NodeDescriptor) -> Self {
        self.options.push(option);
        self
    }

    /// Add the parameters of `T` as option `T::CLASS_ID`.
    pub fn option_of<T: Configurable>(self) -> Self {
        self.option(NodeDescriptor::of::<T>(T::CLASS_ID))
    }

    pub fn default_option(mut self, name: impl Into<String>) -> Self {
        self.default_option = Some(name.into());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn into_node(self, key: &str) -> Result<Node> {
        let options = option_nodes(self.options)?;
        let mut attributes = node_attributes(NodeType::ChoiceOfNodes)?;
        self.meta.resolve(key, Role::Parameter).apply(&mut attributes)?;
        if let Some(name) = self.default_option {
            if options.node(&name).is_none() {
                return Err(inconsistent(format!("default option '{name}' is not declared")));
            }
            attributes.set(attr::DEFAULT_VALUE, name)?;
        }
        check_parameter(&attributes)?;
        Ok(Node::with_attributes(key, Value::Hash(options), attributes))
    }
}

/// An ordered selection of nodes, each picked from a set of options.
#[derive(Debug, Clone)]
pub struct ListDescriptor {
    key: String,
    options: Vec<NodeDescriptor>,
    default_list: Option<Vec<String>>,
    meta: Meta,
    values: ValueRules,
}

impl ListDescriptor {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            options: Vec::new(),
            default_list: None,
            meta: Meta::default(),
            values: ValueRules::default(),
        }
    }

    pub fn option(mut self, option: NodeDescriptor) -> Self {
        self.options.push(option);
        self
    }

    pub fn option_of<T: Configurable>(self) -> Self {
        self.option(NodeDescriptor::of::<T>(T::CLASS_ID))
    }

    /// Option names selected when nothing is configured.
    pub fn default_list<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_list = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn into_node(self, key: &str) -> Result<Node> {
        let options = option_nodes(self.options)?;
        let mut attributes = node_attributes(NodeType::ListOfNodes)?;
        self.meta.resolve(key, Role::Parameter).apply(&mut attributes)?;
        self.values.apply(Kind::VectorString, &mut attributes)?;
        if let Some(names) = self.default_list {
            if let Some(name) = names.iter().find(|n| options.node(n).is_none()) {
                return Err(inconsistent(format!("default entry '{name}' is not declared")));
            }
            attributes.set(attr::DEFAULT_VALUE, names)?;
        }
        check_parameter(&attributes)?;
        Ok(Node::with_attributes(key, Value::Hash(options), attributes))
    }
}

/// Changes attributes of an already declared parameter.
///
/// Only the options set on the overwrite are touched; the kind of the
/// target never changes.
#[derive(Debug, Clone)]
pub struct Overwrite {
    path: String,
    meta: Meta,
    values: ValueRules,
}

impl Overwrite {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            meta: Meta::default(),
            values: ValueRules::default(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn apply_to(&self, node: &mut Node) -> Result<()> {
        let kind = match node.attributes().get(attr::VALUE_TYPE) {
            Some(Value::String(name)) => Kind::from_name(name),
            _ => None,
        };
        let attributes = node.attributes_mut();
        self.meta.apply(attributes)?;
        if self.values != ValueRules::default() {
            let kind = kind.ok_or_else(|| {
                Error::kind_mismatch("value options on a parameter without valueType")
            })?;
            self.values.apply(kind, attributes)?;
        }
        check_parameter(attributes)
    }
}

common_options!(
    LeafDescriptor,
    NodeDescriptor,
    TableDescriptor,
    SlotDescriptor,
    ChoiceDescriptor,
    ListDescriptor,
    Overwrite
);
value_options!(LeafDescriptor, Overwrite);
size_options!(LeafDescriptor, TableDescriptor, ListDescriptor, Overwrite);

// ============================================================================
// Descriptor
// ============================================================================

/// Anything a [`super::SchemaBuilder`] accepts.
#[derive(Debug, Clone)]
pub enum Descriptor {
    Leaf(LeafDescriptor),
    Node(NodeDescriptor),
    Table(TableDescriptor),
    Slot(SlotDescriptor),
    Choice(ChoiceDescriptor),
    List(ListDescriptor),
    Overwrite(Overwrite),
}

impl Descriptor {
    /// Declared key, or the target path of an overwrite. May be dotted.
    pub fn key(&self) -> &str {
        match self {
            Descriptor::Leaf(d) => d.key(),
            Descriptor::Node(d) => d.key(),
            Descriptor::Table(d) => d.key(),
            Descriptor::Slot(d) => d.key(),
            Descriptor::Choice(d) => d.key(),
            Descriptor::List(d) => d.key(),
            Descriptor::Overwrite(d) => d.path(),
        }
    }

    /// Schema node for a declaring descriptor, named `key`. `None` for
    /// overwrites.
    pub(crate) fn into_node(self, key: &str) -> Option<Result<Node>> {
        let node = match self {
            Descriptor::Leaf(d) => d.into_node(key),
            Descriptor::Node(d) => d.into_node(key),
            Descriptor::Table(d) => d.into_node(key),
            Descriptor::Slot(d) => d.into_node(key),
            Descriptor::Choice(d) => d.into_node(key),
            Descriptor::List(d) => d.into_node(key),
            Descriptor::Overwrite(_) => return None,
        };
        Some(node)
    }
}

macro_rules! into_descriptor {
    ($($ty:ident => $variant:ident),*) => {$(
        impl From<$ty> for Descriptor {
            fn from(descriptor: $ty) -> Self {
                Descriptor::$variant(descriptor)
            }
        }
    )*};
}

into_descriptor!(
    LeafDescriptor => Leaf,
    NodeDescriptor => Node,
    TableDescriptor => Table,
    SlotDescriptor => Slot,
    ChoiceDescriptor => Choice,
    ListDescriptor => List,
    Overwrite => Overwrite
);
