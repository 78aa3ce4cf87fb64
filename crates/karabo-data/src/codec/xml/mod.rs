// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! XML container codec.
//!
//! # Document shape
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <root KRB_Artificial="">
//!   <speed KRB_Type="INT32" unitSymbol="KRB_STRING:m">50</speed>
//!   <motor KRB_Type="HASH">
//!     <limits KRB_Type="VECTOR_DOUBLE">0.0,10.5</limits>
//!   </motor>
//! </root>
//! ```
//!
//! A container holding exactly one HASH entry is written rooted: that entry
//! is the document element and no `KRB_Artificial` wrapper appears.
//!
//! Entry attributes keep their own names; their values carry the kind as a
//! `KRB_<KIND>:` prefix (`;base64` and `;size=N` flags go before the colon).
//! Element attributes starting with `KRB_` are reserved for the codec.

mod reader;
mod writer;


use super::HashCodec;
use crate::config::{XML_DEFAULT_INDENT, XML_PREFIX};
use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::types::{convert, Kind, TypeRegistry, Value};
use base64::prelude::{Engine as _, BASE64_STANDARD};

/// XML codec settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct XmlConfig {
    /// Spaces per nesting level; `None` writes everything on one line.
    pub indent: Option<usize>,
    /// Emit the `<?xml ...?>` declaration.
    pub declaration: bool,
    /// Read the unprefixed `Type` element attribute and untyped attribute
    /// values written by old producers.
    pub accept_legacy_types: bool,
}

impl Default for XmlConfig {
    fn default() -> Self {
        Self {
            indent: Some(XML_DEFAULT_INDENT),
            declaration: true,
            accept_legacy_types: true,
        }
    }
}

impl XmlConfig {
    /// Single-line output without declaration.
    pub fn compact() -> Self {
        Self {
            indent: None,
            declaration: false,
            ..Self::default()
        }
    }
}

/// Encoder/decoder for the XML wire form.
#[derive(Debug, Clone, Default)]
pub struct XmlCodec {
    registry: TypeRegistry,
    config: XmlConfig,
}

impl XmlCodec {
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            registry,
            config: XmlConfig::default(),
        }
    }

    pub fn with_config(mut self, config: XmlConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &XmlConfig {
        &self.config
    }

    pub fn encode(&self, hash: &Hash) -> Result<String> {
        let document = writer::write_document(hash, &self.registry, &self.config)?;
        log::debug!(
            "xml encode: {} top-level entries, {} bytes",
            hash.len(),
            document.len()
        );
        Ok(document)
    }

    pub fn decode(&self, text: &str) -> Result<Hash> {
        let hash = reader::read_document(text, &self.registry, &self.config)?;
        log::debug!(
            "xml decode: {} top-level entries from {} bytes",
            hash.len(),
            text.len()
        );
        Ok(hash)
    }
}

impl HashCodec for XmlCodec {
    type Encoded = String;
    type Input = str;

    fn encode(&self, hash: &Hash) -> Result<String> {
        XmlCodec::encode(self, hash)
    }

    fn decode(&self, input: &str) -> Result<Hash> {
        XmlCodec::decode(self, input)
    }
}

// ============================================================================
// Names
// ============================================================================

/// `[A-Za-z_][A-Za-z0-9_.-]*`, not starting with `xml` or the reserved prefix.
fn is_portable_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        && !name.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("xml"))
        && !name.starts_with(XML_PREFIX)
}

// ============================================================================
// Flat value text
// ============================================================================

/// Text of a flat value plus the flags needed to read it back.
#[derive(Debug, Default, PartialEq)]
struct TextForm {
    text: String,
    base64: bool,
    size: Option<usize>,
}

/// Characters XML 1.0 can carry. `\r` survives as a character reference.
fn is_xml_safe(text: &str) -> bool {
    text.chars().all(|c| {
        matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
    })
}

fn single_empty<T: AsRef<[u8]>>(items: &[T]) -> Option<usize> {
    (items.len() == 1 && items[0].as_ref().is_empty()).then_some(1)
}

fn escape_vector_string(items: &[String]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        for c in item.chars() {
            if matches!(c, '\\' | ',') {
                out.push('\\');
            }
            out.push(c);
        }
    }
    out
}

fn split_vector_string(text: &str) -> Vec<String> {
    let mut items = vec![String::new()];
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let (Some(next), Some(last)) = (chars.next(), items.last_mut()) {
                    last.push(next);
                }
            }
            ',' => items.push(String::new()),
            c => {
                if let Some(last) = items.last_mut() {
                    last.push(c);
                }
            }
        }
    }
    items
}

fn base64_join<T: AsRef<[u8]>>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| BASE64_STANDARD.encode(item))
        .collect::<Vec<_>>()
        .join(",")
}

fn encode_text(value: &Value) -> TextForm {
    match value {
        Value::Bytes(b) | Value::VectorChar(b) => TextForm {
            text: BASE64_STANDARD.encode(b),
            base64: true,
            size: None,
        },
        Value::String(s) if !is_xml_safe(s) => TextForm {
            text: BASE64_STANDARD.encode(s),
            base64: true,
            size: None,
        },
        Value::VectorString(items) if items.iter().all(|s| is_xml_safe(s)) => TextForm {
            text: escape_vector_string(items),
            base64: false,
            size: single_empty(items),
        },
        Value::VectorString(items) => TextForm {
            text: base64_join(items),
            base64: true,
            size: single_empty(items),
        },
        Value::VectorBytes(items) => TextForm {
            text: base64_join(items),
            base64: true,
            size: single_empty(items),
        },
        Value::VectorNone(n) => TextForm {
            text: String::new(),
            base64: false,
            size: Some(*n),
        },
        other => TextForm {
            text: convert::to_text(other),
            base64: false,
            size: None,
        },
    }
}

fn decode_base64(kind: Kind, text: &str) -> Result<Vec<u8>> {
    BASE64_STANDARD
        .decode(text.trim())
        .map_err(|_| Error::parse_failure(kind, text))
}

fn utf8(kind: Kind, bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| {
        Error::parse_failure(kind, &String::from_utf8_lossy(e.as_bytes()))
    })
}

fn split_base64(kind: Kind, text: &str, size: Option<usize>) -> Result<Vec<Vec<u8>>> {
    if text.is_empty() {
        return Ok(if size == Some(1) { vec![Vec::new()] } else { Vec::new() });
    }
    text.split(',').map(|part| decode_base64(kind, part)).collect()
}

fn decode_text(kind: Kind, text: &str, base64: bool, size: Option<usize>) -> Result<Value> {
    if base64 {
        return match kind {
            Kind::Bytes => Ok(Value::Bytes(decode_base64(kind, text)?)),
            Kind::VectorChar => Ok(Value::VectorChar(decode_base64(kind, text)?)),
            Kind::String => Ok(Value::String(utf8(kind, decode_base64(kind, text)?)?)),
            Kind::VectorBytes => Ok(Value::VectorBytes(split_base64(kind, text, size)?)),
            Kind::VectorString => split_base64(kind, text, size)?
                .into_iter()
                .map(|bytes| utf8(kind, bytes))
                .collect::<Result<Vec<_>>>()
                .map(Value::VectorString),
            other => Err(Error::Malformed(format!("base64 text on {other}"))),
        };
    }
    match kind {
        Kind::VectorString if text.is_empty() => Ok(Value::VectorString(
            if size == Some(1) { vec![String::new()] } else { Vec::new() },
        )),
        Kind::VectorString => Ok(Value::VectorString(split_vector_string(text))),
        Kind::VectorNone => Ok(Value::VectorNone(size.unwrap_or(0))),
        Kind::Bytes | Kind::VectorBytes => {
            Err(Error::Malformed(format!("{kind} text must be base64")))
        }
        _ => convert::parse_text(kind, text),
    }
}

// ============================================================================
// Typed attribute values
// ============================================================================

/// `KRB_<KIND>[;base64][;size=N]:<text>`
fn format_attribute(value: &Value) -> String {
    let form = encode_text(value);
    let mut out = format!("{XML_PREFIX}{}", value.kind().name());
    if form.base64 {
        out.push_str(";base64");
    }
    if let Some(n) = form.size {
        out.push_str(&format!(";size={n}"));
    }
    out.push(':');
    out.push_str(&form.text);
    out
}

/// Inverse of [`format_attribute`]. `Ok(None)` means the value has no
/// typed prefix.
fn parse_attribute(registry: &TypeRegistry, raw: &str) -> Result<Option<Value>> {
    let Some((header, text)) = raw
        .strip_prefix(XML_PREFIX)
        .and_then(|rest| rest.split_once(':'))
    else {
        return Ok(None);
    };
    let mut flags = header.split(';');
    let kind = registry.kind_from_name(flags.next().unwrap_or_default())?;
    if !kind.is_attribute_kind() {
        return Err(Error::Malformed(format!("{kind} is not an attribute kind")));
    }
    let mut base64 = false;
    let mut size = None;
    for flag in flags {
        if flag == "base64" {
            base64 = true;
        } else if let Some(n) = flag.strip_prefix("size=") {
            size = Some(
                n.parse::<usize>()
                    .map_err(|_| Error::Malformed(format!("bad size flag in '{header}'")))?,
            );
        } else {
            return Err(Error::Malformed(format!("unknown flag '{flag}' in '{header}'")));
        }
    }
    decode_text(kind, text, base64, size).map(Some)
}
