// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Validation of configurations against a [`Schema`].
//!
//! The validator walks the schema in declaration order and produces a new,
//! canonical container: every value converted to its declared kind, bounds
//! and options checked, access rules enforced and (optionally) defaults and
//! timestamps injected. Findings accumulate in a [`Report`]; a run fails iff
//! the report holds an error.
//!
//! ```rust
//! use karabo_data::schema::{LeafDescriptor, SchemaBuilder};
//! use karabo_data::validator::{Context, Validator};
//! use karabo_data::Hash;
//!
//! let schema = SchemaBuilder::new("Motor")
//!     .add(LeafDescriptor::int32("speed").reconfigurable().min_inc(0).max_inc(100).default_value(10))
//!     .build()
//!     .unwrap();
//! let mut input = Hash::new();
//! input.set("speed", 150i32).unwrap();
//!
//! let report = Validator::default()
//!     .validate(&schema, &input, &Context::new(1))
//!     .unwrap_err();
//! assert_eq!(report.errors().count(), 1);
//! ```

mod engine;
mod report;

#[cfg(test)]
mod tests;

pub use report::{Record, Report, Severity};

use crate::hash::Hash;
use crate::schema::Schema;
use crate::time::TimePoint;

/// What a validation run does besides checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidationRules {
    /// Fill absent parameters from their `defaultValue`.
    pub inject_defaults: bool,
    /// Absent mandatory parameters are not an error.
    pub allow_missing_keys: bool,
    /// Accept input that is not wrapped in a single `{rootName: {...}}` entry.
    pub allow_unrooted_configuration: bool,
    /// Stamp validated leaves with [`Context::timestamp`].
    pub inject_timestamps: bool,
    /// Stamp even leaves whose input already carries a timestamp.
    pub force_injected_timestamp: bool,
    /// Reject user writes to init-only parameters.
    pub reject_init_only: bool,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            inject_defaults: true,
            allow_missing_keys: false,
            allow_unrooted_configuration: true,
            inject_timestamps: false,
            force_injected_timestamp: false,
            reject_init_only: false,
        }
    }
}

impl ValidationRules {
    /// Rules for updating a running instance: only the given parameters,
    /// no defaults, init-only parameters frozen.
    pub fn reconfiguration() -> Self {
        Self {
            inject_defaults: false,
            allow_missing_keys: true,
            reject_init_only: true,
            ..Self::default()
        }
    }
}

/// Who is writing the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Origin {
    /// A user or client; access rules apply.
    #[default]
    User,
    /// The device itself, publishing its own read-only and internal values.
    Device,
}

/// Caller state a validation run is evaluated against.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Context {
    /// Higher is more privileged.
    pub access_level: u32,
    /// Unknown keys are errors rather than dropped with a warning.
    pub strict: bool,
    /// Checked against `allowedStates` of reconfigurable parameters.
    pub current_state: Option<String>,
    pub origin: Origin,
    /// Stamp for [`ValidationRules::inject_timestamps`].
    pub timestamp: Option<TimePoint>,
}

impl Context {
    /// Strict user context at `access_level`.
    pub fn new(access_level: u32) -> Self {
        Self {
            access_level,
            strict: true,
            ..Self::default()
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.current_state = Some(state.into());
        self
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_timestamp(mut self, timestamp: TimePoint) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Successful validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    /// Canonical configuration, sharing nothing with the input.
    pub config: Hash,
    /// Warnings only.
    pub report: Report,
    /// Whether the input set any reconfigurable parameter.
    pub has_reconfigurable: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Validator {
    rules: ValidationRules,
}

impl Validator {
    pub fn new(rules: ValidationRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// Validate `input` against `schema`. Errors never stop the run; all of
    /// them are returned together.
    pub fn validate(
        &self,
        schema: &Schema,
        input: &Hash,
        ctx: &Context,
    ) -> Result<Validated, Report> {
        let outcome = engine::run(&self.rules, schema, input, ctx);
        log::debug!(
            "validated against '{}': {} parameters out, {} errors, {} warnings",
            schema.root_name(),
            outcome.config.len(),
            outcome.report.errors().count(),
            outcome.report.warnings().count()
        );
        if outcome.report.is_ok() {
            Ok(Validated {
                config: outcome.config,
                report: outcome.report,
                has_reconfigurable: outcome.has_reconfigurable,
            })
        } else {
            Err(outcome.report)
        }
    }
}
