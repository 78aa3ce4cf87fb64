// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Container -> XML text.

use super::{encode_text, format_attribute, is_portable_name, XmlConfig};
use crate::config::{
    XML_ARTIFICIAL, XML_ARTIFICIAL_ROOT, XML_BIG_ENDIAN, XML_ELEMENT_TYPE, XML_ENCODING, XML_ITEM,
    XML_KEY, XML_NODE, XML_ROOT, XML_SHAPE, XML_SIZE, XML_TYPE,
};
use crate::error::{Error, Result};
use crate::hash::{Hash, Node};
use crate::types::{Kind, TypeRegistry, Value};
use base64::prelude::{Engine as _, BASE64_STANDARD};

const HOST_BIG_ENDIAN: bool = cfg!(target_endian = "big");

pub(super) fn write_document(
    hash: &Hash,
    registry: &TypeRegistry,
    config: &XmlConfig,
) -> Result<String> {
    let mut writer = Writer {
        registry,
        config,
        out: String::new(),
    };
    if config.declaration {
        writer.out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        writer.newline();
    }
    match rooted_entry(hash) {
        Some(node) => writer.entry(node, 0)?,
        None => {
            let mut element = Element::new(XML_ARTIFICIAL_ROOT);
            element.push(XML_ARTIFICIAL, "");
            writer.emit(&element, Body::Entries(hash), 0)?;
        }
    }
    Ok(writer.out)
}

/// The single HASH entry that becomes the document element, if any.
fn rooted_entry(hash: &Hash) -> Option<&Node> {
    match hash.iter().next() {
        Some(node) if hash.len() == 1 && matches!(node.value(), Value::Hash(_)) => Some(node),
        _ => None,
    }
}

fn is_xml_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#13;"),
            c => out.push(c),
        }
    }
}

fn escape_attribute(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            c => out.push(c),
        }
    }
}

struct Element {
    tag: String,
    /// Unescaped attribute values.
    attributes: Vec<(String, String)>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: Vec::new(),
        }
    }

    fn push(&mut self, name: &str, value: impl Into<String>) {
        self.attributes.push((name.to_string(), value.into()));
    }
}

enum Body<'a> {
    Text(String),
    Entries(&'a Hash),
    Rows(&'a [Hash]),
}

struct Writer<'a> {
    registry: &'a TypeRegistry,
    config: &'a XmlConfig,
    out: String,
}

impl Writer<'_> {
    fn indent(&mut self, depth: usize) {
        if let Some(width) = self.config.indent {
            self.out.extend(std::iter::repeat(' ').take(width * depth));
        }
    }

    fn newline(&mut self) {
        if self.config.indent.is_some() {
            self.out.push('\n');
        }
    }

    fn check_kind(&self, kind: Kind) -> Result<()> {
        if self.registry.contains(kind) {
            Ok(())
        } else {
            Err(Error::UnknownKind(format!("{kind} is not registered")))
        }
    }

    fn emit(&mut self, element: &Element, body: Body<'_>, depth: usize) -> Result<()> {
        self.indent(depth);
        self.out.push('<');
        self.out.push_str(&element.tag);
        for (name, value) in &element.attributes {
            self.out.push(' ');
            self.out.push_str(name);
            self.out.push_str("=\"");
            escape_attribute(value, &mut self.out);
            self.out.push('"');
        }
        match body {
            Body::Text(text) if !text.is_empty() => {
                self.out.push('>');
                escape_text(&text, &mut self.out);
                self.close(&element.tag);
            }
            Body::Entries(hash) if !hash.is_empty() => {
                self.out.push('>');
                self.newline();
                for node in hash.iter() {
                    self.entry(node, depth + 1)?;
                }
                self.indent(depth);
                self.close(&element.tag);
            }
            Body::Rows(rows) if !rows.is_empty() => {
                self.out.push('>');
                self.newline();
                let item = Element::new(XML_ITEM);
                for row in rows {
                    self.emit(&item, Body::Entries(row), depth + 1)?;
                }
                self.indent(depth);
                self.close(&element.tag);
            }
            _ => self.out.push_str("/>"),
        }
        self.newline();
        Ok(())
    }

    fn close(&mut self, tag: &str) {
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
    }

    fn entry(&mut self, node: &Node, depth: usize) -> Result<()> {
        let key = node.key();
        let kind = node.kind();
        self.check_kind(kind)?;

        let mut element = if is_portable_name(key) {
            Element::new(key)
        } else {
            let mut element = Element::new(XML_NODE);
            element.push(XML_KEY, key);
            element
        };
        element.push(XML_TYPE, kind.name());

        let body = match node.value() {
            Value::Hash(hash) => Body::Entries(hash),
            Value::VectorHash(rows) => Body::Rows(rows),
            Value::Schema(schema) => {
                element.push(XML_ROOT, schema.root_name());
                Body::Entries(schema.parameters())
            }
            Value::NdArray(array) => {
                self.check_kind(array.element_kind())?;
                let shape = array
                    .shape()
                    .iter()
                    .map(u64::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                element.push(XML_ELEMENT_TYPE, array.element_kind().name());
                element.push(XML_SHAPE, shape);
                element.push(XML_BIG_ENDIAN, if HOST_BIG_ENDIAN { "1" } else { "0" });
                element.push(XML_ENCODING, "base64");
                Body::Text(BASE64_STANDARD.encode(array.host_bytes()))
            }
            flat => {
                let form = encode_text(flat);
                if form.base64 {
                    element.push(XML_ENCODING, "base64");
                }
                if let Some(n) = form.size {
                    element.push(XML_SIZE, n.to_string());
                }
                Body::Text(form.text)
            }
        };

        for (name, value) in node.attributes().iter() {
            if !is_portable_name(name) {
                return Err(Error::Malformed(format!(
                    "attribute name '{name}' on '{key}' cannot be written as XML"
                )));
            }
            self.check_kind(value.kind())?;
            element.push(name, format_attribute(value));
        }

        if let Body::Text(text) = &body {
            if text.starts_with(is_xml_space) || text.ends_with(is_xml_space) {
                element.push("xml:space", "preserve");
            }
        }

        log::trace!("xml encode: '{key}' {kind}");
        self.emit(&element, body, depth)
    }
}
