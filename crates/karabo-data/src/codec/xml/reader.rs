// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! XML text -> container.

use super::{decode_base64, decode_text, parse_attribute, XmlConfig};
use crate::config::{
    MAX_NESTING_DEPTH, XML_ARTIFICIAL, XML_BIG_ENDIAN, XML_ELEMENT_TYPE, XML_ENCODING, XML_ITEM,
    XML_KEY, XML_LEGACY_TYPE, XML_NODE, XML_PREFIX, XML_ROOT, XML_SHAPE, XML_SIZE, XML_TYPE,
};
use crate::error::{Error, Result};
use crate::hash::{Attributes, Hash, Node};
use crate::schema::Schema;
use crate::types::{Kind, NdArray, TypeRegistry, Value};
use roxmltree::{Document, Node as XmlNode};

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

pub(super) fn read_document(
    text: &str,
    registry: &TypeRegistry,
    config: &XmlConfig,
) -> Result<Hash> {
    let document = Document::parse(text).map_err(|e| Error::Malformed(e.to_string()))?;
    let root = document.root_element();
    let mut reader = Reader {
        registry,
        config,
        legacy_seen: false,
    };
    if root.has_attribute(XML_ARTIFICIAL) {
        reader.entries(root, 0)
    } else {
        let mut hash = Hash::new();
        hash.push_node(reader.entry(root, 0)?)?;
        Ok(hash)
    }
}

struct Reader<'a> {
    registry: &'a TypeRegistry,
    config: &'a XmlConfig,
    legacy_seen: bool,
}

impl Reader<'_> {
    fn note_legacy(&mut self, what: &str) {
        if !self.legacy_seen {
            self.legacy_seen = true;
            log::warn!("deprecated XML form ({what}); re-save the document to upgrade it");
        }
    }

    fn entries(&mut self, parent: XmlNode<'_, '_>, depth: usize) -> Result<Hash> {
        if depth > MAX_NESTING_DEPTH {
            return Err(Error::Malformed(format!(
                "nesting deeper than {MAX_NESTING_DEPTH} below <{}>",
                parent.tag_name().name()
            )));
        }
        let mut hash = Hash::new();
        for child in parent.children().filter(XmlNode::is_element) {
            hash.push_node(self.entry(child, depth + 1)?)?;
        }
        Ok(hash)
    }

    /// Kind named by `KRB_Type`, or by a legacy `Type` attribute, or HASH.
    /// The flag tells whether the legacy attribute was consumed.
    fn kind_of(&mut self, element: XmlNode<'_, '_>, key: &str) -> Result<(Kind, bool)> {
        if let Some(name) = element.attribute(XML_TYPE) {
            return Ok((self.registry.kind_from_name(name)?, false));
        }
        if self.config.accept_legacy_types {
            if let Some(kind) = element
                .attribute(XML_LEGACY_TYPE)
                .and_then(|name| self.registry.kind_from_name(name).ok())
            {
                self.note_legacy(&format!("'{XML_LEGACY_TYPE}' attribute on '{key}'"));
                return Ok((kind, true));
            }
        }
        Ok((Kind::Hash, false))
    }

    fn entry(&mut self, element: XmlNode<'_, '_>, depth: usize) -> Result<Node> {
        let tag = element.tag_name().name();
        let key = if tag == XML_NODE {
            element
                .attribute(XML_KEY)
                .ok_or_else(|| Error::Malformed(format!("<{XML_NODE}> without {XML_KEY}")))?
        } else {
            tag
        };
        let (kind, legacy_type) = self.kind_of(element, key)?;

        let mut attributes = Attributes::new();
        for attribute in element.attributes() {
            let name = attribute.name();
            if attribute.namespace().is_some()
                || name.starts_with(XML_PREFIX)
                || (legacy_type && name == XML_LEGACY_TYPE)
            {
                continue;
            }
            let value = match parse_attribute(self.registry, attribute.value())? {
                Some(value) => value,
                None if self.config.accept_legacy_types => {
                    self.note_legacy(&format!("untyped attribute '{name}' on '{key}'"));
                    Value::String(attribute.value().to_string())
                }
                None => {
                    return Err(Error::Malformed(format!(
                        "attribute '{name}' on '{key}' has no kind prefix"
                    )))
                }
            };
            attributes.set(name, value)?;
        }

        let value = match kind {
            Kind::Hash => Value::Hash(self.entries(element, depth)?),
            Kind::VectorHash => {
                let mut rows = Vec::new();
                for item in element.children().filter(XmlNode::is_element) {
                    if item.tag_name().name() != XML_ITEM {
                        return Err(Error::Malformed(format!(
                            "<{}> inside table '{key}'",
                            item.tag_name().name()
                        )));
                    }
                    rows.push(self.entries(item, depth + 1)?);
                }
                Value::VectorHash(rows)
            }
            Kind::Schema => {
                let root = element.attribute(XML_ROOT).ok_or_else(|| {
                    Error::Malformed(format!("schema '{key}' without {XML_ROOT}"))
                })?;
                Value::Schema(Schema::from_parts(
                    root.to_string(),
                    self.entries(element, depth)?,
                ))
            }
            Kind::NdArray => Value::NdArray(self.ndarray(element, key)?),
            flat => {
                let text = element_text(element);
                let base64 = match element.attribute(XML_ENCODING) {
                    None => false,
                    Some("base64") => true,
                    Some(other) => {
                        return Err(Error::Malformed(format!(
                            "unknown encoding '{other}' on '{key}'"
                        )))
                    }
                };
                let size = element
                    .attribute(XML_SIZE)
                    .map(|n| {
                        n.parse::<usize>().map_err(|_| {
                            Error::Malformed(format!("bad {XML_SIZE} '{n}' on '{key}'"))
                        })
                    })
                    .transpose()?;
                decode_text(flat, &text, base64, size).map_err(|e| e.at(key))?
            }
        };
        log::trace!("xml decode: '{key}' {kind}");
        Ok(Node::with_attributes(key, value, attributes))
    }

    fn ndarray(&self, element: XmlNode<'_, '_>, key: &str) -> Result<NdArray> {
        let required = |name: &str| {
            element
                .attribute(name)
                .ok_or_else(|| Error::Malformed(format!("array '{key}' without {name}")))
        };
        let element_kind = self.registry.kind_from_name(required(XML_ELEMENT_TYPE)?)?;
        let shape_text = required(XML_SHAPE)?;
        let shape = if shape_text.is_empty() {
            Vec::new()
        } else {
            shape_text
                .split(',')
                .map(|d| {
                    d.trim()
                        .parse::<u64>()
                        .map_err(|_| Error::parse_failure(Kind::VectorUint64, shape_text))
                })
                .collect::<Result<Vec<_>>>()?
        };
        let big_endian = match required(XML_BIG_ENDIAN)? {
            "0" | "false" => false,
            "1" | "true" => true,
            other => {
                return Err(Error::Malformed(format!(
                    "{XML_BIG_ENDIAN} '{other}' on '{key}'"
                )))
            }
        };
        let data = decode_base64(Kind::NdArray, &element_text(element))?;
        NdArray::new(element_kind, shape, data, big_endian).map(NdArray::into_host_order)
    }
}

/// Concatenated text content; trimmed unless `xml:space="preserve"`.
fn element_text(element: XmlNode<'_, '_>) -> String {
    let text: String = element
        .children()
        .filter(XmlNode::is_text)
        .filter_map(|n| n.text())
        .collect();
    if element.attribute((XML_NAMESPACE, "space")) == Some("preserve") {
        text
    } else {
        text.trim_matches(|c| matches!(c, ' ' | '\t' | '\n' | '\r'))
            .to_string()
    }
}
