// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types shared by the container, codecs, schema and validator.

use std::fmt;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Stable error codes.
///
/// Codes are what callers match on and translate for display; the
/// [`Error`] variants carry the context (path, detail) alongside them.
/// Validator-only codes (e.g. `MissingMandatory`) never appear in an
/// [`Error`] and are reported through [`crate::validator::Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorCode {
    InvalidPath,
    KeyMissing,
    IndexOutOfRange,
    KindMismatch,
    OutOfRange,
    NotInOptions,
    MissingMandatory,
    WriteToReadOnly,
    AccessDenied,
    StateForbidden,
    UnknownKey,
    UnknownKind,
    Malformed,
    UnexpectedEnd,
    ParseFailure,
    InvalidTimestamp,
    NameTooLong,
    Conflict,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidPath => "InvalidPath",
            Self::KeyMissing => "KeyMissing",
            Self::IndexOutOfRange => "IndexOutOfRange",
            Self::KindMismatch => "KindMismatch",
            Self::OutOfRange => "OutOfRange",
            Self::NotInOptions => "NotInOptions",
            Self::MissingMandatory => "MissingMandatory",
            Self::WriteToReadOnly => "WriteToReadOnly",
            Self::AccessDenied => "AccessDenied",
            Self::StateForbidden => "StateForbidden",
            Self::UnknownKey => "UnknownKey",
            Self::UnknownKind => "UnknownKind",
            Self::Malformed => "Malformed",
            Self::UnexpectedEnd => "UnexpectedEnd",
            Self::ParseFailure => "ParseFailure",
            Self::InvalidTimestamp => "InvalidTimestamp",
            Self::NameTooLong => "NameTooLong",
            Self::Conflict => "Conflict",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by container operations, codecs and schema construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("invalid path '{path}': {detail}")]
    InvalidPath { path: String, detail: String },

    #[error("key missing: '{path}'")]
    KeyMissing { path: String },

    #[error("index {index} out of range at '{path}' (length {len})")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("kind mismatch at '{path}': {detail}")]
    KindMismatch { path: String, detail: String },

    #[error("out of range at '{path}': {detail}")]
    OutOfRange { path: String, detail: String },

    #[error("unknown kind: {0}")]
    UnknownKind(String),

    #[error("malformed input: {0}")]
    Malformed(String),

    #[error("unexpected end of input at offset {offset}: need {needed} bytes, {available} left")]
    UnexpectedEnd {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("name length {0} is outside 1..=255")]
    NameTooLong(usize),

    #[error("cannot parse '{text}' as {kind}")]
    ParseFailure { kind: String, text: String },

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("conflict at '{path}': {detail}")]
    Conflict { path: String, detail: String },
}

impl Error {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidPath { .. } => ErrorCode::InvalidPath,
            Self::KeyMissing { .. } => ErrorCode::KeyMissing,
            Self::IndexOutOfRange { .. } => ErrorCode::IndexOutOfRange,
            Self::KindMismatch { .. } => ErrorCode::KindMismatch,
            Self::OutOfRange { .. } => ErrorCode::OutOfRange,
            Self::UnknownKind(_) => ErrorCode::UnknownKind,
            Self::Malformed(_) => ErrorCode::Malformed,
            Self::UnexpectedEnd { .. } => ErrorCode::UnexpectedEnd,
            Self::NameTooLong(_) => ErrorCode::NameTooLong,
            Self::ParseFailure { .. } => ErrorCode::ParseFailure,
            Self::InvalidTimestamp(_) => ErrorCode::InvalidTimestamp,
            Self::Conflict { .. } => ErrorCode::Conflict,
        }
    }

    /// Path the error refers to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::InvalidPath { path, .. }
            | Self::KeyMissing { path }
            | Self::IndexOutOfRange { path, .. }
            | Self::KindMismatch { path, .. }
            | Self::OutOfRange { path, .. }
            | Self::Conflict { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Fill in the path of a path-carrying error that was raised without one.
    pub(crate) fn at(mut self, at: &str) -> Self {
        match &mut self {
            Self::InvalidPath { path, .. }
            | Self::KeyMissing { path }
            | Self::IndexOutOfRange { path, .. }
            | Self::KindMismatch { path, .. }
            | Self::OutOfRange { path, .. }
            | Self::Conflict { path, .. }
                if path.is_empty() =>
            {
                *path = at.to_string();
            }
            _ => {}
        }
        self
    }

    pub(crate) fn kind_mismatch(detail: impl Into<String>) -> Self {
        Self::KindMismatch {
            path: String::new(),
            detail: detail.into(),
        }
    }

    pub(crate) fn parse_failure(kind: impl fmt::Display, text: &str) -> Self {
        Self::ParseFailure {
            kind: kind.to_string(),
            text: text.to_string(),
        }
    }
}
