// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # karabo-data - typed hierarchical configuration data
//!
//! The data model shared by every Karabo component: an ordered, typed tree
//! of named values with per-entry attributes, a binary and an XML wire form
//! for it, and a self-describing schema that validates configurations.
//!
//! ## Quick Start
//!
//! ```rust
//! use karabo_data::{BinaryCodec, Hash, Value};
//!
//! let mut config = Hash::new();
//! config.set("motor.speed", 42i32).unwrap();
//! config.set_attribute("motor.speed", "unit", "m/s").unwrap();
//!
//! let bytes = BinaryCodec::default().encode(&config).unwrap();
//! let back = BinaryCodec::default().decode(&bytes).unwrap();
//! assert_eq!(back, config);
//! assert_eq!(back.get_value("motor.speed").unwrap(), &Value::Int32(42));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------+
//! |   validator   Validator, Context, ValidationRules, Report     |
//! +--------------------------------------------------------------+
//! |   schema      SchemaBuilder, descriptors, Configurable        |
//! +--------------------------------------------------------------+
//! |   codec       BinaryCodec | XmlCodec                        |
//! +--------------------------------------------------------------+
//! |   hash        Hash, Node, Attributes, paths, merge, flatten   |
//! +--------------------------------------------------------------+
//! |   types       Kind, Value, TypeRegistry, NdArray, conversion  |
//! +--------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Hash`] | Ordered container of named, typed, attributed values |
//! | [`Value`] | One typed value; every [`Kind`] has a variant |
//! | [`TypeRegistry`] | Kind ids and names used on the wire |
//! | [`BinaryCodec`] | Compact little-endian wire form |
//! | [`XmlCodec`] | Human-readable wire form |
//! | [`Schema`] | Parameter descriptions of a configurable class |
//! | [`Validator`] | Checks a configuration against a schema |
//! | [`TimePoint`] | Attosecond timestamp with train id |
//!
//! ## Modules Overview
//!
//! - [`hash`] - the container (start here)
//! - [`types`] - kinds, values and conversions
//! - [`codec`] - binary and XML serialization
//! - [`schema`] - parameter descriptions
//! - [`validator`] - configuration validation
//! - [`time`] - timestamps
//! - [`config`] - wire and naming constants

pub mod codec;
pub mod config;
pub mod error;
pub mod hash;
pub mod schema;
pub mod time;
pub mod types;
pub mod validator;

pub use codec::{BinaryCodec, DecodeMode, HashCodec, XmlCodec, XmlConfig};
pub use error::{Error, ErrorCode, Result};
pub use hash::{Attributes, Hash, MergePolicy, Node};
pub use schema::{Configurable, Schema, SchemaBuilder};
pub use time::{FixedTime, TimePoint, TimeSource};
pub use types::{Conversion, FromValue, Kind, NdArray, TypeRegistry, Value};
pub use validator::{Context, Report, ValidationRules, Validator};
