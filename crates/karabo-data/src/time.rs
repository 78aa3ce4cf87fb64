// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Timestamps with attosecond resolution and a train id.
//!
//! The crate never reads the system clock: whoever needs "now" supplies a
//! [`TimeSource`].

use crate::config::{ATTOSEC_PER_SEC, TIMESTAMP_FRAC, TIMESTAMP_SEC, TIMESTAMP_TID};
use crate::error::{Error, Result};
use crate::hash::Attributes;
use chrono::{DateTime, NaiveDateTime};
use std::cmp::Ordering;
use std::fmt;

/// Seconds since the Unix epoch, attoseconds within the second, train id.
///
/// Ordering and equality use `(sec, frac)` only; `tid` is a tag.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawTimePoint"))]
pub struct TimePoint {
    sec: u64,
    frac: u64,
    tid: u64,
}

/// Unchecked wire form; deserialization goes through [`TimePoint::new`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawTimePoint {
    sec: u64,
    frac: u64,
    tid: u64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawTimePoint> for TimePoint {
    type Error = Error;

    fn try_from(raw: RawTimePoint) -> Result<Self> {
        Self::new(raw.sec, raw.frac, raw.tid)
    }
}

impl TimePoint {
    /// Fails with InvalidTimestamp unless `frac < 10^18`.
    pub fn new(sec: u64, frac: u64, tid: u64) -> Result<Self> {
        if frac >= ATTOSEC_PER_SEC {
            return Err(Error::InvalidTimestamp(format!(
                "fraction {frac} is not below 10^18 attoseconds"
            )));
        }
        Ok(Self { sec, frac, tid })
    }

    pub fn sec(&self) -> u64 {
        self.sec
    }

    /// Fractional part in attoseconds.
    pub fn frac(&self) -> u64 {
        self.frac
    }

    pub fn tid(&self) -> u64 {
        self.tid
    }

    pub fn with_tid(self, tid: u64) -> Self {
        Self { tid, ..self }
    }

    /// Lossy conversion from fractional seconds.
    pub fn from_secs_f64(secs: f64, tid: u64) -> Result<Self> {
        if !secs.is_finite() || secs < 0.0 || secs >= u64::MAX as f64 {
            return Err(Error::InvalidTimestamp(format!("{secs} seconds")));
        }
        let whole = secs.trunc();
        // float noise can round the fraction up to a full second
        let frac = (((secs - whole) * ATTOSEC_PER_SEC as f64) as u64).min(ATTOSEC_PER_SEC - 1);
        Self::new(whole as u64, frac, tid)
    }

    /// Lossy conversion to fractional seconds.
    pub fn as_secs_f64(&self) -> f64 {
        self.sec as f64 + self.frac as f64 / ATTOSEC_PER_SEC as f64
    }

    fn total_attos(&self) -> i128 {
        i128::from(self.sec) * i128::from(ATTOSEC_PER_SEC) + i128::from(self.frac)
    }

    /// Signed distance `self - earlier` in attoseconds.
    pub fn diff(&self, earlier: &TimePoint) -> i128 {
        self.total_attos() - earlier.total_attos()
    }

    /// `YYYY-MM-DDTHH:MM:SS.ffffffffffffffffffZ` (UTC, 18 fraction digits).
    pub fn to_iso8601(&self) -> Result<String> {
        let secs = i64::try_from(self.sec)
            .map_err(|_| Error::InvalidTimestamp(format!("{} s is past the calendar", self.sec)))?;
        let date = DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| Error::InvalidTimestamp(format!("{secs} s is past the calendar")))?;
        Ok(format!(
            "{}.{:018}Z",
            date.format("%Y-%m-%dT%H:%M:%S"),
            self.frac
        ))
    }

    /// Parse the form written by [`Self::to_iso8601`]. The fraction may
    /// have 0 to 18 digits and the trailing `Z` is optional.
    pub fn from_iso8601(text: &str, tid: u64) -> Result<Self> {
        let bad = || Error::InvalidTimestamp(format!("'{text}' is not ISO-8601"));
        let body = text.strip_suffix('Z').unwrap_or(text);
        let (civil, digits) = match body.split_once('.') {
            Some((civil, digits)) => (civil, digits),
            None => (body, ""),
        };
        if digits.len() > 18 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let naive = NaiveDateTime::parse_from_str(civil, "%Y-%m-%dT%H:%M:%S").map_err(|_| bad())?;
        let sec = u64::try_from(naive.and_utc().timestamp()).map_err(|_| bad())?;
        let frac = if digits.is_empty() {
            0
        } else {
            let scale = 10u64.pow(18 - digits.len() as u32);
            digits.parse::<u64>().map_err(|_| bad())? * scale
        };
        Self::new(sec, frac, tid)
    }

    /// Write `sec`, `frac` and `tid` as UINT64 attributes.
    pub fn to_attributes(&self, attributes: &mut Attributes) -> Result<()> {
        attributes.set(TIMESTAMP_SEC, self.sec)?;
        attributes.set(TIMESTAMP_FRAC, self.frac)?;
        attributes.set(TIMESTAMP_TID, self.tid)
    }

    /// Read a timestamp back from attributes; `None` when `sec` or `frac`
    /// is absent. A missing `tid` reads as 0.
    pub fn from_attributes(attributes: &Attributes) -> Result<Option<Self>> {
        if !attributes.contains(TIMESTAMP_SEC) || !attributes.contains(TIMESTAMP_FRAC) {
            return Ok(None);
        }
        let sec = attributes.get_as::<u64>(TIMESTAMP_SEC)?;
        let frac = attributes.get_as::<u64>(TIMESTAMP_FRAC)?;
        let tid = if attributes.contains(TIMESTAMP_TID) {
            attributes.get_as::<u64>(TIMESTAMP_TID)?
        } else {
            0
        };
        Self::new(sec, frac, tid).map(Some)
    }
}

impl PartialEq for TimePoint {
    fn eq(&self, other: &Self) -> bool {
        (self.sec, self.frac) == (other.sec, other.frac)
    }
}

impl Eq for TimePoint {}

impl PartialOrd for TimePoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimePoint {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.sec, self.frac).cmp(&(other.sec, other.frac))
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_iso8601() {
            Ok(text) => write!(f, "{text} (train {})", self.tid),
            Err(_) => write!(f, "{}.{:018}s (train {})", self.sec, self.frac, self.tid),
        }
    }
}

/// Supplier of the current time, provided by the device runtime.
pub trait TimeSource {
    fn now(&self) -> TimePoint;
}

/// A clock that always answers the same instant.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedTime(pub TimePoint);

impl TimeSource for FixedTime {
    fn now(&self) -> TimePoint {
        self.0
    }
}

impl<F: Fn() -> TimePoint> TimeSource for F {
    fn now(&self) -> TimePoint {
        self()
    }
}
