// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binary container framing.
//!
//! # Layout
//!
//! ```text
//! hash   := entryCount:u32 entry*
//! entry  := nameLen:u8 name kind:u32 attrCount:u32 attr* value
//! attr   := nameLen:u8 name kind:u32 value
//! ```
//!
//! All integers are little-endian. Value payloads:
//!
//! | Kind            | Payload                                                   |
//! |-----------------|-----------------------------------------------------------|
//! | fixed scalars   | LE bytes; BOOL is one byte 0/1; complex is re then im     |
//! | STRING, BYTES   | len:u32 bytes                                             |
//! | NONE            | u32 0                                                     |
//! | VECTOR_*        | len:u32 then `len` element payloads                       |
//! | HASH            | `hash`                                                    |
//! | VECTOR_HASH     | count:u32 then `count` `hash`                             |
//! | SCHEMA          | len:u32 rootLen:u8 root `hash`                            |
//! | NDARRAY         | elemKind:u32 rank:u32 shape:u64* bigEndian:u8 byteLen:u64 bytes |
//!
//! There is no version field and no padding.

use crate::config::{MAX_NAME_LEN, MAX_NESTING_DEPTH};
use crate::error::{Error, Result};
use crate::hash::{Attributes, Hash, Node};
use crate::schema::Schema;
use crate::types::{Kind, NdArray, TypeRegistry, Value};
use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;
use num_complex::{Complex32, Complex64};

use super::HashCodec;

const HOST_BIG_ENDIAN: bool = cfg!(target_endian = "big");

/// Smallest possible entry: 1-byte name, kind, attribute count, 1-byte value.
const MIN_ENTRY_LEN: usize = 1 + 1 + 4 + 4 + 1;

/// Smallest possible attribute: 1-byte name, kind, 1-byte value.
const MIN_ATTRIBUTE_LEN: usize = 1 + 1 + 4 + 1;

/// Where decoded NDARRAY storage lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecodeMode {
    /// Every array owns a fresh buffer.
    #[default]
    Copy,
    /// Arrays already in host order share the input [`Bytes`] buffer.
    /// Only [`BinaryCodec::decode_bytes`] can honour this.
    Borrowed,
}

/// Encoder/decoder for the binary wire form.
#[derive(Debug, Clone, Default)]
pub struct BinaryCodec {
    registry: TypeRegistry,
    mode: DecodeMode,
}

impl BinaryCodec {
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            registry,
            mode: DecodeMode::Copy,
        }
    }

    pub fn with_mode(mut self, mode: DecodeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn mode(&self) -> DecodeMode {
        self.mode
    }

    /// Encode a container into a fresh buffer.
    pub fn encode(&self, hash: &Hash) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.encode_into(hash, &mut out)?;
        Ok(out)
    }

    /// Append the encoding of `hash` to `out`. On error `out` is left as it was.
    pub fn encode_into(&self, hash: &Hash, out: &mut Vec<u8>) -> Result<()> {
        let start = out.len();
        let result = Writer {
            registry: &self.registry,
            out: &mut *out,
        }
        .hash(hash);
        match result {
            Ok(()) => {
                log::debug!(
                    "binary encode: {} top-level entries, {} bytes",
                    hash.len(),
                    out.len() - start
                );
                Ok(())
            }
            Err(e) => {
                out.truncate(start);
                Err(e)
            }
        }
    }

    /// Decode a container. Arrays always own their storage.
    pub fn decode(&self, input: &[u8]) -> Result<Hash> {
        self.decode_from(input, None)
    }

    /// Decode a container from a shared buffer, honouring [`DecodeMode`].
    pub fn decode_bytes(&self, input: &Bytes) -> Result<Hash> {
        let shared = (self.mode == DecodeMode::Borrowed).then_some(input);
        self.decode_from(input, shared)
    }

    fn decode_from(&self, input: &[u8], shared: Option<&Bytes>) -> Result<Hash> {
        let mut reader = Reader {
            registry: &self.registry,
            buf: input,
            pos: 0,
            shared,
        };
        let hash = reader.hash(0)?;
        if reader.remaining() != 0 {
            return Err(Error::Malformed(format!(
                "{} trailing bytes after offset {}",
                reader.remaining(),
                reader.pos
            )));
        }
        log::debug!(
            "binary decode: {} top-level entries from {} bytes",
            hash.len(),
            input.len()
        );
        Ok(hash)
    }
}

impl HashCodec for BinaryCodec {
    type Encoded = Vec<u8>;
    type Input = [u8];

    fn encode(&self, hash: &Hash) -> Result<Vec<u8>> {
        BinaryCodec::encode(self, hash)
    }

    fn decode(&self, input: &[u8]) -> Result<Hash> {
        BinaryCodec::decode(self, input)
    }
}

// ============================================================================
// Encoding
// ============================================================================

struct Writer<'a> {
    registry: &'a TypeRegistry,
    out: &'a mut Vec<u8>,
}

macro_rules! write_le_vector {
    ($w:ident, $items:expr) => {{
        $w.count($items.len())?;
        for item in $items {
            $w.raw(&item.to_le_bytes());
        }
    }};
}

impl Writer<'_> {
    fn raw(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }

    fn count(&mut self, n: usize) -> Result<()> {
        let n = u32::try_from(n)
            .map_err(|_| Error::Malformed(format!("{n} elements exceed the u32 length field")))?;
        self.raw(&n.to_le_bytes());
        Ok(())
    }

    fn blob(&mut self, bytes: &[u8]) -> Result<()> {
        self.count(bytes.len())?;
        self.raw(bytes);
        Ok(())
    }

    fn name(&mut self, name: &str) -> Result<()> {
        let len = name.len();
        if len == 0 || len > MAX_NAME_LEN {
            return Err(Error::NameTooLong(len));
        }
        self.out.push(len as u8);
        self.raw(name.as_bytes());
        Ok(())
    }

    fn kind(&mut self, kind: Kind) -> Result<()> {
        if !self.registry.contains(kind) {
            return Err(Error::UnknownKind(format!("{kind} is not registered")));
        }
        self.raw(&u32::from(kind.id()).to_le_bytes());
        Ok(())
    }

    fn hash(&mut self, hash: &Hash) -> Result<()> {
        self.count(hash.len())?;
        for node in hash.iter() {
            log::trace!("binary encode: '{}' {}", node.key(), node.kind());
            self.name(node.key())?;
            self.kind(node.kind())?;
            self.count(node.attributes().len())?;
            for (name, value) in node.attributes().iter() {
                self.name(name)?;
                self.kind(value.kind())?;
                self.value(value)?;
            }
            self.value(node.value())?;
        }
        Ok(())
    }

    fn complex32(&mut self, c: &Complex32) {
        self.raw(&c.re.to_le_bytes());
        self.raw(&c.im.to_le_bytes());
    }

    fn complex64(&mut self, c: &Complex64) {
        self.raw(&c.re.to_le_bytes());
        self.raw(&c.im.to_le_bytes());
    }

    fn value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Bool(v) => self.out.push(u8::from(*v)),
            Value::Char(v) | Value::Uint8(v) => self.out.push(*v),
            Value::Int8(v) => self.raw(&v.to_le_bytes()),
            Value::Int16(v) => self.raw(&v.to_le_bytes()),
            Value::Uint16(v) => self.raw(&v.to_le_bytes()),
            Value::Int32(v) => self.raw(&v.to_le_bytes()),
            Value::Uint32(v) => self.raw(&v.to_le_bytes()),
            Value::Int64(v) => self.raw(&v.to_le_bytes()),
            Value::Uint64(v) => self.raw(&v.to_le_bytes()),
            Value::Float(v) => self.raw(&v.to_le_bytes()),
            Value::Double(v) => self.raw(&v.to_le_bytes()),
            Value::ComplexFloat(c) => self.complex32(c),
            Value::ComplexDouble(c) => self.complex64(c),
            Value::String(s) => self.blob(s.as_bytes())?,
            Value::Bytes(b) => self.blob(b)?,
            Value::None => self.raw(&0u32.to_le_bytes()),

            Value::VectorBool(v) => {
                self.count(v.len())?;
                for b in v {
                    self.out.push(u8::from(*b));
                }
            }
            Value::VectorChar(v) | Value::VectorUint8(v) => self.blob(v)?,
            Value::VectorInt8(v) => write_le_vector!(self, v),
            Value::VectorInt16(v) => write_le_vector!(self, v),
            Value::VectorUint16(v) => write_le_vector!(self, v),
            Value::VectorInt32(v) => write_le_vector!(self, v),
            Value::VectorUint32(v) => write_le_vector!(self, v),
            Value::VectorInt64(v) => write_le_vector!(self, v),
            Value::VectorUint64(v) => write_le_vector!(self, v),
            Value::VectorFloat(v) => write_le_vector!(self, v),
            Value::VectorDouble(v) => write_le_vector!(self, v),
            Value::VectorComplexFloat(v) => {
                self.count(v.len())?;
                for c in v {
                    self.complex32(c);
                }
            }
            Value::VectorComplexDouble(v) => {
                self.count(v.len())?;
                for c in v {
                    self.complex64(c);
                }
            }
            Value::VectorString(v) => {
                self.count(v.len())?;
                for s in v {
                    self.blob(s.as_bytes())?;
                }
            }
            Value::VectorBytes(v) => {
                self.count(v.len())?;
                for b in v {
                    self.blob(b)?;
                }
            }
            Value::VectorNone(n) => {
                self.count(*n)?;
                for _ in 0..*n {
                    self.raw(&0u32.to_le_bytes());
                }
            }

            Value::Hash(h) => self.hash(h)?,
            Value::VectorHash(rows) => {
                self.count(rows.len())?;
                for row in rows {
                    self.hash(row)?;
                }
            }
            Value::Schema(schema) => self.schema(schema)?,
            Value::NdArray(array) => self.ndarray(array)?,
        }
        Ok(())
    }

    fn schema(&mut self, schema: &Schema) -> Result<()> {
        let root = schema.root_name();
        if root.len() > MAX_NAME_LEN {
            return Err(Error::NameTooLong(root.len()));
        }
        let mut body = Vec::new();
        let mut inner = Writer {
            registry: self.registry,
            out: &mut body,
        };
        inner.out.push(root.len() as u8);
        inner.raw(root.as_bytes());
        inner.hash(schema.parameters())?;
        self.blob(&body)
    }

    fn ndarray(&mut self, array: &NdArray) -> Result<()> {
        self.kind(array.element_kind())?;
        self.count(array.shape().len())?;
        for dim in array.shape() {
            self.raw(&dim.to_le_bytes());
        }
        self.out.push(u8::from(HOST_BIG_ENDIAN));
        let data = array.host_bytes();
        self.raw(&(data.len() as u64).to_le_bytes());
        self.raw(&data);
        Ok(())
    }
}

// ============================================================================
// Decoding
// ============================================================================

struct Reader<'a> {
    registry: &'a TypeRegistry,
    buf: &'a [u8],
    pos: usize,
    /// Set in Borrowed mode; `buf` is a prefix of it.
    shared: Option<&'a Bytes>,
}

impl<'a> Reader<'a> {
    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(Error::UnexpectedEnd {
                offset: self.pos,
                needed: n,
                available: self.remaining(),
            });
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Read a u32 element count and check that `count * min_len` bytes remain.
    fn count(&mut self, min_len: usize) -> Result<usize> {
        let offset = self.pos;
        let n = self.u32()? as usize;
        let needed = n.saturating_mul(min_len);
        if needed > self.remaining() {
            return Err(Error::UnexpectedEnd {
                offset,
                needed,
                available: self.remaining(),
            });
        }
        Ok(n)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn i8(&mut self) -> Result<i8> {
        Ok(self.u8()? as i8)
    }

    fn bool(&mut self) -> Result<bool> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            b => Err(Error::Malformed(format!(
                "boolean byte {b} at offset {}",
                self.pos - 1
            ))),
        }
    }

    fn i16(&mut self) -> Result<i16> {
        Ok(LittleEndian::read_i16(self.take(2)?))
    }

    fn u16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    fn i32(&mut self) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    fn i64(&mut self) -> Result<i64> {
        Ok(LittleEndian::read_i64(self.take(8)?))
    }

    fn u64(&mut self) -> Result<u64> {
        Ok(LittleEndian::read_u64(self.take(8)?))
    }

    fn f32(&mut self) -> Result<f32> {
        Ok(LittleEndian::read_f32(self.take(4)?))
    }

    fn f64(&mut self) -> Result<f64> {
        Ok(LittleEndian::read_f64(self.take(8)?))
    }

    fn complex32(&mut self) -> Result<Complex32> {
        Ok(Complex32::new(self.f32()?, self.f32()?))
    }

    fn complex64(&mut self) -> Result<Complex64> {
        Ok(Complex64::new(self.f64()?, self.f64()?))
    }

    fn utf8(&self, bytes: &[u8], what: &str) -> Result<String> {
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| Error::Malformed(format!("{what} before offset {} is not UTF-8", self.pos)))
    }

    fn name(&mut self) -> Result<String> {
        let len = usize::from(self.u8()?);
        if len == 0 {
            return Err(Error::NameTooLong(0));
        }
        let bytes = self.take(len)?;
        self.utf8(bytes, "name")
    }

    fn string(&mut self) -> Result<String> {
        let len = self.count(1)?;
        let bytes = self.take(len)?;
        self.utf8(bytes, "string")
    }

    fn blob(&mut self) -> Result<Vec<u8>> {
        let len = self.count(1)?;
        Ok(self.take(len)?.to_vec())
    }

    fn none(&mut self) -> Result<()> {
        match self.u32()? {
            0 => Ok(()),
            v => Err(Error::Malformed(format!(
                "NONE payload {v} at offset {}",
                self.pos - 4
            ))),
        }
    }

    fn kind(&mut self) -> Result<Kind> {
        let id = self.u32()?;
        self.registry.kind_from_id(id)
    }

    fn vector<T>(
        &mut self,
        min_len: usize,
        mut read: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let n = self.count(min_len)?;
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(read(self)?);
        }
        Ok(out)
    }

    fn hash(&mut self, depth: usize) -> Result<Hash> {
        if depth > MAX_NESTING_DEPTH {
            return Err(Error::Malformed(format!(
                "nesting deeper than {MAX_NESTING_DEPTH} at offset {}",
                self.pos
            )));
        }
        let count = self.count(MIN_ENTRY_LEN)?;
        let mut hash = Hash::new();
        for _ in 0..count {
            let key = self.name()?;
            let kind = self.kind()?;
            let attribute_count = self.count(MIN_ATTRIBUTE_LEN)?;
            let mut attributes = Attributes::new();
            for _ in 0..attribute_count {
                let name = self.name()?;
                let attribute_kind = self.kind()?;
                if !attribute_kind.is_attribute_kind() {
                    return Err(Error::Malformed(format!(
                        "attribute '{name}' of '{key}' has kind {attribute_kind}"
                    )));
                }
                if attributes.contains(&name) {
                    return Err(Error::Malformed(format!(
                        "duplicate attribute '{name}' on '{key}'"
                    )));
                }
                let value = self.value(attribute_kind, depth)?;
                attributes.set(&name, value)?;
            }
            let value = self.value(kind, depth)?;
            log::trace!("binary decode: '{key}' {kind}");
            hash.push_node(Node::with_attributes(key, value, attributes))?;
        }
        Ok(hash)
    }

    fn value(&mut self, kind: Kind, depth: usize) -> Result<Value> {
        let value = match kind {
            Kind::Bool => Value::Bool(self.bool()?),
            Kind::Char => Value::Char(self.u8()?),
            Kind::Int8 => Value::Int8(self.i8()?),
            Kind::Uint8 => Value::Uint8(self.u8()?),
            Kind::Int16 => Value::Int16(self.i16()?),
            Kind::Uint16 => Value::Uint16(self.u16()?),
            Kind::Int32 => Value::Int32(self.i32()?),
            Kind::Uint32 => Value::Uint32(self.u32()?),
            Kind::Int64 => Value::Int64(self.i64()?),
            Kind::Uint64 => Value::Uint64(self.u64()?),
            Kind::Float => Value::Float(self.f32()?),
            Kind::Double => Value::Double(self.f64()?),
            Kind::ComplexFloat => Value::ComplexFloat(self.complex32()?),
            Kind::ComplexDouble => Value::ComplexDouble(self.complex64()?),
            Kind::String => Value::String(self.string()?),
            Kind::Bytes => Value::Bytes(self.blob()?),
            Kind::None => {
                self.none()?;
                Value::None
            }

            Kind::VectorBool => Value::VectorBool(self.vector(1, Self::bool)?),
            Kind::VectorChar => Value::VectorChar(self.blob()?),
            Kind::VectorUint8 => Value::VectorUint8(self.blob()?),
            Kind::VectorInt8 => Value::VectorInt8(self.vector(1, Self::i8)?),
            Kind::VectorInt16 => Value::VectorInt16(self.vector(2, Self::i16)?),
            Kind::VectorUint16 => Value::VectorUint16(self.vector(2, Self::u16)?),
            Kind::VectorInt32 => Value::VectorInt32(self.vector(4, Self::i32)?),
            Kind::VectorUint32 => Value::VectorUint32(self.vector(4, Self::u32)?),
            Kind::VectorInt64 => Value::VectorInt64(self.vector(8, Self::i64)?),
            Kind::VectorUint64 => Value::VectorUint64(self.vector(8, Self::u64)?),
            Kind::VectorFloat => Value::VectorFloat(self.vector(4, Self::f32)?),
            Kind::VectorDouble => Value::VectorDouble(self.vector(8, Self::f64)?),
            Kind::VectorComplexFloat => {
                Value::VectorComplexFloat(self.vector(8, Self::complex32)?)
            }
            Kind::VectorComplexDouble => {
                Value::VectorComplexDouble(self.vector(16, Self::complex64)?)
            }
            Kind::VectorString => Value::VectorString(self.vector(4, Self::string)?),
            Kind::VectorBytes => Value::VectorBytes(self.vector(4, Self::blob)?),
            Kind::VectorNone => {
                let n = self.count(4)?;
                for _ in 0..n {
                    self.none()?;
                }
                Value::VectorNone(n)
            }

            Kind::Hash => Value::Hash(self.hash(depth + 1)?),
            Kind::VectorHash => Value::VectorHash(self.vector(4, |r| r.hash(depth + 1))?),
            Kind::Schema => Value::Schema(self.schema(depth + 1)?),
            Kind::NdArray => Value::NdArray(self.ndarray()?),
        };
        Ok(value)
    }

    fn schema(&mut self, depth: usize) -> Result<Schema> {
        let len = self.count(1)?;
        let end = self.pos + len;
        let mut inner = Reader {
            registry: self.registry,
            buf: &self.buf[..end],
            pos: self.pos,
            shared: self.shared,
        };
        let root_len = usize::from(inner.u8()?);
        let root_bytes = inner.take(root_len)?;
        let root = inner.utf8(root_bytes, "schema root name")?;
        let parameters = inner.hash(depth)?;
        if inner.pos != end {
            return Err(Error::Malformed(format!(
                "schema '{root}' declares {len} bytes but uses {}",
                len - inner.remaining()
            )));
        }
        self.pos = end;
        Ok(Schema::from_parts(root, parameters))
    }

    fn ndarray(&mut self) -> Result<NdArray> {
        let kind = self.kind()?;
        if kind.fixed_size().is_none() {
            return Err(Error::Malformed(format!("{kind} cannot be an array element")));
        }
        let rank = self.count(8)?;
        let shape = (0..rank).map(|_| self.u64()).collect::<Result<Vec<_>>>()?;
        let big_endian = self.bool()?;
        let byte_len = usize::try_from(self.u64()?)
            .map_err(|_| Error::Malformed("array byte length overflows usize".into()))?;
        let offset = self.pos;
        let raw = self.take(byte_len)?;
        let data = match self.shared {
            Some(shared) if big_endian == HOST_BIG_ENDIAN => shared.slice(offset..offset + byte_len),
            _ => Bytes::copy_from_slice(raw),
        };
        NdArray::new(kind, shape, data, big_endian).map(NdArray::into_host_order)
    }
}
