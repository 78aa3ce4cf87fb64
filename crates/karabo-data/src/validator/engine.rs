// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema-driven walk producing the validated container.

use super::{Context, Origin, Report, ValidationRules};
use crate::config::TIMESTAMP_SEC;
use crate::error::{Error, ErrorCode};
use crate::hash::path::child as child_path;
use crate::hash::{Attributes, Hash, Node};
use crate::schema::{attr, rules, AccessMode, Assignment, NodeType, Schema};
use crate::types::{Conversion, Kind, Value};

pub(super) struct Outcome {
    pub config: Hash,
    pub report: Report,
    pub has_reconfigurable: bool,
}

pub(super) fn run(
    rules: &ValidationRules,
    schema: &Schema,
    input: &Hash,
    ctx: &Context,
) -> Outcome {
    let mut engine = Engine {
        rules,
        ctx,
        report: Report::new(),
        has_reconfigurable: false,
    };
    let config = match engine.unwrap_root(schema, input) {
        Some(parameters) => engine.level(schema.parameters(), parameters, ""),
        None => Hash::new(),
    };
    Outcome {
        config,
        report: engine.report,
        has_reconfigurable: engine.has_reconfigurable,
    }
}

// ============================================================================
// Descriptor attribute readers
// ============================================================================

fn int(attributes: &Attributes, name: &str) -> Option<i32> {
    match attributes.get(name) {
        Some(Value::Int32(v)) => Some(*v),
        _ => None,
    }
}

fn node_type(attributes: &Attributes) -> Option<NodeType> {
    int(attributes, attr::NODE_TYPE).and_then(NodeType::from_i32)
}

fn value_type(attributes: &Attributes) -> Option<Kind> {
    attributes
        .get(attr::VALUE_TYPE)
        .and_then(Value::as_str)
        .and_then(Kind::from_name)
}

fn access_mode(attributes: &Attributes) -> AccessMode {
    int(attributes, attr::ACCESS_MODE)
        .and_then(AccessMode::from_i32)
        .unwrap_or(AccessMode::Init)
}

fn assignment(attributes: &Attributes) -> Assignment {
    int(attributes, attr::ASSIGNMENT)
        .and_then(Assignment::from_i32)
        .unwrap_or(Assignment::Optional)
}

fn required_level(attributes: &Attributes) -> u32 {
    int(attributes, attr::REQUIRED_ACCESS_LEVEL)
        .and_then(|level| u32::try_from(level).ok())
        .unwrap_or(0)
}

fn is_slot(attributes: &Attributes) -> bool {
    attributes.get(attr::CLASS_ID).and_then(Value::as_str) == Some(crate::config::CLASS_ID_SLOT)
}

fn conversion_detail(err: &Error) -> String {
    match err {
        Error::KindMismatch { detail, .. } => detail.clone(),
        other => other.to_string(),
    }
}

/// A one-entry container `{name: inner}`.
fn single(name: &str, inner: Hash) -> Hash {
    let mut hash = Hash::new();
    hash.push_unique(Node::new(name, Value::Hash(inner)));
    hash
}

// ============================================================================
// Engine
// ============================================================================

struct Engine<'a> {
    rules: &'a ValidationRules,
    ctx: &'a Context,
    report: Report,
    has_reconfigurable: bool,
}

impl Engine<'_> {
    /// Parameters of a `{rootName: {...}}` input, or the input itself.
    fn unwrap_root<'i>(&mut self, schema: &Schema, input: &'i Hash) -> Option<&'i Hash> {
        let root = schema.root_name();
        if input.len() == 1 && !root.is_empty() && schema.parameters().node(root).is_none() {
            if let Some(Value::Hash(inner)) = input.node(root).map(Node::value) {
                return Some(inner);
            }
        }
        if self.rules.allow_unrooted_configuration {
            return Some(input);
        }
        self.report.error(
            "",
            ErrorCode::UnknownKey,
            format!("expected a single '{root}' entry"),
        );
        None
    }

    /// Validate one container level against the descriptors of `schema`.
    fn level(&mut self, schema: &Hash, input: &Hash, prefix: &str) -> Hash {
        let mut out = Hash::new();
        for descriptor in schema.iter() {
            let path = child_path(prefix, descriptor.key());
            let given = input.node(descriptor.key());
            let attributes = descriptor.attributes();
            let produced = match node_type(attributes) {
                Some(NodeType::Leaf) if value_type(attributes) == Some(Kind::VectorHash) => {
                    self.table(descriptor, given, &path)
                }
                Some(NodeType::Leaf) => self.leaf(descriptor, given, &path),
                Some(NodeType::Node) if is_slot(attributes) => {
                    if given.is_some() {
                        self.report.error(
                            &path,
                            ErrorCode::WriteToReadOnly,
                            "slots take no configuration",
                        );
                    }
                    None
                }
                Some(NodeType::Node) => self.node(descriptor, given, &path),
                Some(NodeType::ChoiceOfNodes) => self.choice(descriptor, given, &path),
                Some(NodeType::ListOfNodes) => self.list(descriptor, given, &path),
                None => {
                    log::debug!("validator: '{path}' has no usable nodeType, skipped");
                    None
                }
            };
            if let Some(node) = produced {
                out.push_unique(node);
            }
        }

        for node in input.iter() {
            if schema.node(node.key()).is_some() {
                continue;
            }
            let path = child_path(prefix, node.key());
            if self.ctx.strict {
                self.report
                    .error(&path, ErrorCode::UnknownKey, "not described by the schema");
            } else {
                self.report
                    .warning(&path, ErrorCode::UnknownKey, "not described by the schema, dropped");
            }
        }
        out
    }

    fn note_write(&mut self, attributes: &Attributes) {
        if access_mode(attributes) == AccessMode::Write {
            self.has_reconfigurable = true;
        }
    }

    /// Access rules for a user-supplied value.
    ///
    /// When defaults are injected, supplying the default yields the same
    /// output as omitting it, so such a value passes. Without injection
    /// (reconfiguration) it is a real write and every rule applies.
    fn permitted(&mut self, attributes: &Attributes, equals_default: bool, path: &str) -> bool {
        if self.ctx.origin == Origin::Device || (equals_default && self.rules.inject_defaults) {
            return true;
        }
        let mode = access_mode(attributes);
        let level = required_level(attributes);
        let state_allowed = || {
            let Some(state) = &self.ctx.current_state else {
                return true;
            };
            match attributes.get(attr::ALLOWED_STATES) {
                Some(Value::VectorString(states)) => states.contains(state),
                _ => true,
            }
        };

        let refusal = if assignment(attributes) == Assignment::Internal {
            Some((
                ErrorCode::WriteToReadOnly,
                "internal parameters are set by the framework".to_string(),
            ))
        } else if mode == AccessMode::Read {
            Some((ErrorCode::WriteToReadOnly, "parameter is read-only".to_string()))
        } else if mode == AccessMode::Init && self.rules.reject_init_only {
            Some((
                ErrorCode::WriteToReadOnly,
                "init-only parameter cannot be reconfigured".to_string(),
            ))
        } else if level > self.ctx.access_level {
            Some((
                ErrorCode::AccessDenied,
                format!("requires access level {level}, caller has {}", self.ctx.access_level),
            ))
        } else if mode == AccessMode::Write && !state_allowed() {
            Some((
                ErrorCode::StateForbidden,
                format!(
                    "not settable in state '{}'",
                    self.ctx.current_state.as_deref().unwrap_or_default()
                ),
            ))
        } else {
            None
        };

        match refusal {
            Some((code, detail)) => {
                self.report.error(path, code, detail);
                false
            }
            None => true,
        }
    }

    /// Report every bound, size and options violation of `value`.
    fn constrained(&mut self, attributes: &Attributes, value: &Value, path: &str) -> bool {
        let violations = rules::violations(attributes, value);
        let clean = violations.is_empty();
        for violation in violations {
            self.report.error(path, violation.code, violation.detail);
        }
        clean
    }

    fn missing(&mut self, attributes: &Attributes, path: &str) {
        if assignment(attributes) == Assignment::Mandatory && !self.rules.allow_missing_keys {
            self.report.error(
                path,
                ErrorCode::MissingMandatory,
                "mandatory parameter has no value and no default",
            );
        }
    }

    fn stamp(&self, attributes: &mut Attributes, path: &str) {
        if !self.rules.inject_timestamps {
            return;
        }
        let Some(timestamp) = self.ctx.timestamp else {
            return;
        };
        if self.rules.force_injected_timestamp || !attributes.contains(TIMESTAMP_SEC) {
            if let Err(e) = timestamp.to_attributes(attributes) {
                log::debug!("validator: cannot stamp '{path}': {e}");
            }
        }
    }

    fn leaf(&mut self, descriptor: &Node, given: Option<&Node>, path: &str) -> Option<Node> {
        let attributes = descriptor.attributes();
        let Some(kind) = value_type(attributes) else {
            self.report
                .error(path, ErrorCode::UnknownKind, "descriptor has no usable valueType");
            return None;
        };
        let default = attributes.get(attr::DEFAULT_VALUE);

        let Some(given) = given else {
            return match default {
                Some(value) if self.rules.inject_defaults => {
                    if !self.constrained(attributes, value, path) {
                        return None;
                    }
                    let mut out_attributes = Attributes::new();
                    self.stamp(&mut out_attributes, path);
                    Some(Node::with_attributes(descriptor.key(), value.clone(), out_attributes))
                }
                _ => {
                    self.missing(attributes, path);
                    None
                }
            };
        };

        let value = match given.value().convert(kind, Conversion::Exact) {
            Ok(value) => value,
            Err(e) => {
                self.report
                    .error(path, ErrorCode::KindMismatch, conversion_detail(&e));
                return None;
            }
        };
        if !self.permitted(attributes, default == Some(&value), path) {
            return None;
        }
        if !self.constrained(attributes, &value, path) {
            return None;
        }
        self.note_write(attributes);
        let mut out_attributes = given.attributes().clone();
        self.stamp(&mut out_attributes, path);
        Some(Node::with_attributes(descriptor.key(), value, out_attributes))
    }

    fn table(&mut self, descriptor: &Node, given: Option<&Node>, path: &str) -> Option<Node> {
        let attributes = descriptor.attributes();
        let Some(given) = given else {
            self.missing(attributes, path);
            return None;
        };
        let Value::VectorHash(rows) = given.value() else {
            self.report.error(
                path,
                ErrorCode::KindMismatch,
                format!("expected VECTOR_HASH, found {}", given.kind()),
            );
            return None;
        };
        if !self.permitted(attributes, false, path) {
            return None;
        }
        if let Err(violation) = rules::check_len(attributes, rows.len()) {
            self.report.error(path, violation.code, violation.detail);
            return None;
        }
        let empty = Hash::new();
        let row_schema = descriptor.value().as_hash().unwrap_or(&empty);
        let validated = rows
            .iter()
            .enumerate()
            .map(|(i, row)| self.level(row_schema, row, &format!("{path}[{i}]")))
            .collect();
        self.note_write(attributes);
        let mut out_attributes = given.attributes().clone();
        self.stamp(&mut out_attributes, path);
        Some(Node::with_attributes(
            descriptor.key(),
            Value::VectorHash(validated),
            out_attributes,
        ))
    }

    fn node(&mut self, descriptor: &Node, given: Option<&Node>, path: &str) -> Option<Node> {
        let empty = Hash::new();
        let children = descriptor.value().as_hash().unwrap_or(&empty);
        let (input, out_attributes) = match given {
            Some(given) => match given.value() {
                Value::Hash(hash) => (hash, given.attributes().clone()),
                other => {
                    self.report.error(
                        path,
                        ErrorCode::KindMismatch,
                        format!("expected HASH, found {}", other.kind()),
                    );
                    return None;
                }
            },
            None => (&empty, Attributes::new()),
        };
        let validated = self.level(children, input, path);
        if given.is_none() && validated.is_empty() {
            return None;
        }
        Some(Node::with_attributes(
            descriptor.key(),
            Value::Hash(validated),
            out_attributes,
        ))
    }

    fn choice(&mut self, descriptor: &Node, given: Option<&Node>, path: &str) -> Option<Node> {
        let attributes = descriptor.attributes();
        let empty = Hash::new();
        let options = descriptor.value().as_hash().unwrap_or(&empty);
        let default = attributes.get(attr::DEFAULT_VALUE).and_then(Value::as_str);

        let (name, input, out_attributes) = match given {
            Some(given) => {
                let selected = match given.value() {
                    Value::String(name) => Some((name.as_str(), &empty)),
                    Value::Hash(hash) if hash.len() == 1 => hash
                        .iter()
                        .next()
                        .and_then(|n| n.value().as_hash().map(|inner| (n.key(), inner))),
                    Value::Hash(_) => None,
                    other => {
                        self.report.error(
                            path,
                            ErrorCode::KindMismatch,
                            format!("expected an option name or HASH, found {}", other.kind()),
                        );
                        return None;
                    }
                };
                let Some((name, input)) = selected.filter(|(n, _)| options.node(n).is_some())
                else {
                    let names: Vec<_> = options.keys().collect();
                    self.report.error(
                        path,
                        ErrorCode::NotInOptions,
                        format!("select exactly one of [{}]", names.join(",")),
                    );
                    return None;
                };
                if !self.permitted(attributes, default == Some(name), path) {
                    return None;
                }
                self.note_write(attributes);
                (name, input, given.attributes().clone())
            }
            None => match default {
                Some(name) if self.rules.inject_defaults => (name, &empty, Attributes::new()),
                _ => {
                    self.missing(attributes, path);
                    return None;
                }
            },
        };

        let option = options.node(name)?;
        let option_schema = option.value().as_hash().unwrap_or(&empty);
        let validated = self.level(option_schema, input, &child_path(path, name));
        Some(Node::with_attributes(
            descriptor.key(),
            Value::Hash(single(name, validated)),
            out_attributes,
        ))
    }

    fn list(&mut self, descriptor: &Node, given: Option<&Node>, path: &str) -> Option<Node> {
        let attributes = descriptor.attributes();
        let empty = Hash::new();
        let options = descriptor.value().as_hash().unwrap_or(&empty);
        let mut selections: Vec<(&str, &Hash)> = Vec::new();

        let out_attributes = match given {
            Some(given) => {
                match given.value() {
                    Value::VectorString(names) => {
                        selections.extend(names.iter().map(|n| (n.as_str(), &empty)));
                    }
                    Value::VectorHash(rows) => {
                        for (i, row) in rows.iter().enumerate() {
                            let entry = row
                                .iter()
                                .next()
                                .filter(|_| row.len() == 1)
                                .and_then(|n| n.value().as_hash().map(|inner| (n.key(), inner)));
                            let Some(entry) = entry else {
                                self.report.error(
                                    &format!("{path}[{i}]"),
                                    ErrorCode::KindMismatch,
                                    "each entry holds exactly one option HASH",
                                );
                                return None;
                            };
                            selections.push(entry);
                        }
                    }
                    other => {
                        self.report.error(
                            path,
                            ErrorCode::KindMismatch,
                            format!("expected VECTOR_STRING or VECTOR_HASH, found {}", other.kind()),
                        );
                        return None;
                    }
                }
                let equals_default = match attributes.get(attr::DEFAULT_VALUE) {
                    Some(Value::VectorString(names)) => {
                        names.len() == selections.len()
                            && names.iter().zip(&selections).all(|(a, (b, _))| a == b)
                    }
                    _ => false,
                };
                if !self.permitted(attributes, equals_default, path) {
                    return None;
                }
                self.note_write(attributes);
                given.attributes().clone()
            }
            None => match attributes.get(attr::DEFAULT_VALUE) {
                Some(Value::VectorString(names)) if self.rules.inject_defaults => {
                    selections.extend(names.iter().map(|n| (n.as_str(), &empty)));
                    Attributes::new()
                }
                _ => {
                    self.missing(attributes, path);
                    return None;
                }
            },
        };

        if let Err(violation) = rules::check_len(attributes, selections.len()) {
            self.report.error(path, violation.code, violation.detail);
            return None;
        }

        let mut rows = Vec::with_capacity(selections.len());
        let mut complete = true;
        for (i, (name, input)) in selections.into_iter().enumerate() {
            let entry_path = format!("{path}[{i}]");
            let Some(option) = options.node(name) else {
                self.report.error(
                    &entry_path,
                    ErrorCode::NotInOptions,
                    format!("'{name}' is not an option"),
                );
                complete = false;
                continue;
            };
            let option_schema = option.value().as_hash().unwrap_or(&empty);
            let validated = self.level(option_schema, input, &child_path(&entry_path, name));
            rows.push(single(name, validated));
        }
        if !complete {
            return None;
        }
        Some(Node::with_attributes(
            descriptor.key(),
            Value::VectorHash(rows),
            out_attributes,
        ))
    }
}
