// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Global constants - single source of truth
//!
//! Wire limits, reserved XML names and time scales live here. Codec and
//! validator settings are plain structs next to the code that reads them
//! ([`crate::codec::XmlConfig`], [`crate::codec::DecodeMode`],
//! [`crate::validator::ValidationRules`]); their defaults refer back to
//! this module.

// =======================================================================
// Names and paths
// =======================================================================

/// Maximum encoded length of an entry or attribute name (binary `nameLen` is a u8).
pub const MAX_NAME_LEN: usize = 255;

/// Path separator between segments.
pub const PATH_SEPARATOR: char = '.';

// =======================================================================
// Time
// =======================================================================

/// Attoseconds per second. `TimePoint::frac` must stay strictly below this.
pub const ATTOSEC_PER_SEC: u64 = 1_000_000_000_000_000_000;

/// Timestamp attribute carrying whole seconds since the Unix epoch.
pub const TIMESTAMP_SEC: &str = "sec";

/// Timestamp attribute carrying the fractional part in attoseconds.
pub const TIMESTAMP_FRAC: &str = "frac";

/// Timestamp attribute carrying the train id.
pub const TIMESTAMP_TID: &str = "tid";

// =======================================================================
// XML wire format
// =======================================================================

/// Reserved prefix for framework attributes on XML elements.
///
/// User attribute names may never start with it.
pub const XML_PREFIX: &str = "KRB_";

/// Element attribute holding the canonical kind name.
pub const XML_TYPE: &str = "KRB_Type";

/// Element attribute naming the text encoding (only `base64` is defined).
pub const XML_ENCODING: &str = "KRB_Encoding";

/// Element attribute holding an explicit element count for vectors whose
/// text alone is ambiguous.
pub const XML_SIZE: &str = "KRB_Size";

/// Marks the synthetic document element wrapping an unrooted container.
pub const XML_ARTIFICIAL: &str = "KRB_Artificial";

/// Element name of one VECTOR_HASH row.
pub const XML_ITEM: &str = "KRB_Item";

/// Element name used when an entry name is not a portable XML name.
pub const XML_NODE: &str = "KRB_Node";

/// Holds the real entry name on a [`XML_NODE`] element.
pub const XML_KEY: &str = "KRB_Key";

/// Root name of an embedded SCHEMA value.
pub const XML_ROOT: &str = "KRB_Root";

/// NDARRAY element kind.
pub const XML_ELEMENT_TYPE: &str = "KRB_ElementType";

/// NDARRAY shape, comma separated.
pub const XML_SHAPE: &str = "KRB_Shape";

/// NDARRAY byte order flag (`0`/`1`).
pub const XML_BIG_ENDIAN: &str = "KRB_BigEndian";

/// Document element of an unrooted container.
pub const XML_ARTIFICIAL_ROOT: &str = "root";

/// Unprefixed kind attribute written by old producers.
pub const XML_LEGACY_TYPE: &str = "Type";

/// Default indentation of the XML writer.
pub const XML_DEFAULT_INDENT: usize = 2;

// =======================================================================
// Schema
// =======================================================================

/// `displayType` of table (VECTOR_HASH) leaves.
pub const DISPLAY_TYPE_TABLE: &str = "Table";

/// `classId` of slot nodes.
pub const CLASS_ID_SLOT: &str = "Slot";

// =======================================================================
// Decoding limits
// =======================================================================

/// Deepest HASH / VECTOR_HASH / SCHEMA nesting a decoder accepts.
///
/// Deeper input is rejected as Malformed instead of exhausting the stack.
pub const MAX_NESTING_DEPTH: usize = 256;
