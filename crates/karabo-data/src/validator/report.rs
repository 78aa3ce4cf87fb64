// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Validation findings.

use crate::error::ErrorCode;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    Error,
    /// Reported, but the configuration is still accepted.
    Warning,
}

/// One finding at one parameter path.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    pub severity: Severity,
    pub path: String,
    pub code: ErrorCode,
    pub detail: String,
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{severity} {} at '{}': {}", self.code, self.path, self.detail)
    }
}

/// Every finding of one validation run, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Report {
    records: Vec<Record>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff there is no error record.
    pub fn is_ok(&self) -> bool {
        !self.records.iter().any(|r| r.severity == Severity::Error)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn errors(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(|r| r.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Record> {
        self.records
            .iter()
            .filter(|r| r.severity == Severity::Warning)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub(crate) fn error(&mut self, path: &str, code: ErrorCode, detail: impl Into<String>) {
        self.push(Record {
            severity: Severity::Error,
            path: path.to_string(),
            code,
            detail: detail.into(),
        });
    }

    pub(crate) fn warning(&mut self, path: &str, code: ErrorCode, detail: impl Into<String>) {
        self.push(Record {
            severity: Severity::Warning,
            path: path.to_string(),
            code,
            detail: detail.into(),
        });
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errors = self.errors().count();
        write!(
            f,
            "validation: {errors} error(s), {} warning(s)",
            self.records.len() - errors
        )?;
        for record in &self.records {
            write!(f, "\n  {record}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Report {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_alone_are_ok() {
        let mut report = Report::new();
        assert!(report.is_ok());
        report.warning("x", ErrorCode::UnknownKey, "dropped");
        assert!(report.is_ok());
        report.error("y", ErrorCode::OutOfRange, "150 > maxInc 100");
        assert!(!report.is_ok());
        assert_eq!(report.errors().count(), 1);
        assert_eq!(report.warnings().count(), 1);
    }

    #[test]
    fn test_display_lists_records() {
        let mut report = Report::new();
        report.error("speed", ErrorCode::OutOfRange, "150 > maxInc 100");
        assert_eq!(
            report.to_string(),
            "validation: 1 error(s), 0 warning(s)\n  error OutOfRange at 'speed': 150 > maxInc 100"
        );
    }
}
