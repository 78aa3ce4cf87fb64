// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Container codecs.
//!
//! Two wire forms carry the same model:
//! - [`BinaryCodec`]: compact little-endian framing for transport.
//! - [`XmlCodec`]: UTF-8 text for configuration files and schemas.
//!
//! Both own a [`TypeRegistry`](crate::types::TypeRegistry) and both satisfy
//! `decode(encode(c)) == c`.

pub mod binary;
pub mod xml;

pub use binary::{BinaryCodec, DecodeMode};
pub use xml::{XmlCodec, XmlConfig};

use crate::error::Result;
use crate::hash::Hash;

/// Common surface of the binary and XML codecs.
pub trait HashCodec {
    /// Encoded form produced by [`HashCodec::encode`].
    type Encoded;
    /// Borrowed input accepted by [`HashCodec::decode`].
    type Input: ?Sized;

    fn encode(&self, hash: &Hash) -> Result<Self::Encoded>;
    fn decode(&self, input: &Self::Input) -> Result<Hash>;
}
