//! Validated newtype wrappers for CbCR domain string types.
//!
//! Each newtype enforces a regex-based shape constraint at construction time
//! via [`TryFrom<&str>`]. Once constructed, the inner value is immutable (no
//! `DerefMut`). Serde `Deserialize` impls re-run validation so invalid data
//! cannot enter the type system from an untrusted parsed report.
use std::fmt;
use std::ops::Deref;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced when constructing a validated newtype from an invalid string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewtypeError {
    /// The string did not match the expected format.
    InvalidFormat {
        /// Name of the type that rejected the input.
        type_name: &'static str,
        /// A human-readable description of the expected format.
        expected: &'static str,
        /// The input that was rejected.
        got: String,
    },
}

impl fmt::Display for NewtypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat {
                type_name,
                expected,
                got,
            } => write!(f, "invalid {type_name}: expected {expected}, got {got:?}"),
        }
    }
}

impl std::error::Error for NewtypeError {}

// ---------------------------------------------------------------------------
// Regex statics
//
// All patterns are compile-time string literals; Regex::new never returns Err
// for them. The fallback branch exists only because the workspace denies
// unwrap/expect; "a^" never matches and is always a valid pattern itself.
// ---------------------------------------------------------------------------

fn fallback_regex() -> Regex {
    Regex::new("a^").unwrap_or_else(|_| Regex::new(".").unwrap_or_else(|_| Regex::default()))
}

static CALENDAR_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap_or_else(|_| fallback_regex()));

static COUNTRY_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").unwrap_or_else(|_| fallback_regex()));

static REF_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").unwrap_or_else(|_| fallback_regex()));

// ---------------------------------------------------------------------------
// CalendarDate
// ---------------------------------------------------------------------------

/// ISO 8601 calendar date in `YYYY-MM-DD` format.
///
/// Validates that the string matches `^\d{4}-\d{2}-\d{2}$`. No semantic
/// calendar validation (leap years, month lengths) is performed here; that
/// belongs to [`crate::dates`] and the validation engine. Round-trip
/// fidelity is preserved by storing the original string. Lexicographic
/// ordering on the stored string matches chronological ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(String);

impl TryFrom<&str> for CalendarDate {
    type Error = NewtypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        if CALENDAR_DATE_RE.is_match(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(NewtypeError::InvalidFormat {
                type_name: "CalendarDate",
                expected: "YYYY-MM-DD (e.g. 2026-02-19)",
                got: s.to_owned(),
            })
        }
    }
}

impl Deref for CalendarDate {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Self::try_from(s.as_str()).map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// CountryCode
// ---------------------------------------------------------------------------

/// ISO 3166-1 alpha-2 country code: exactly two uppercase ASCII letters.
///
/// Regex: `^[A-Z]{2}$`. No lookup against the official country list is
/// performed here; that belongs to [`crate::reference`] and the validation
/// engine.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CountryCode(String);

impl CountryCode {
    /// Borrows the two-letter code, for call sites that read more clearly
    /// than the bare `Deref` coercion (`reference::country_info(code.as_str())`).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for CountryCode {
    type Error = NewtypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        if COUNTRY_CODE_RE.is_match(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(NewtypeError::InvalidFormat {
                type_name: "CountryCode",
                expected: "two uppercase ASCII letters (e.g. US, DE)",
                got: s.to_owned(),
            })
        }
    }
}

impl Deref for CountryCode {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for CountryCode {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CountryCode {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Self::try_from(s.as_str()).map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// RefId (shared shape for messageRefId / docRefId / corrMessageRefId / corrDocRefId)
// ---------------------------------------------------------------------------

/// A `messageRefId` / `docRefId`-shaped token: one or more of
/// `[A-Za-z0-9._-]`.
///
/// Length limits (170 for message refs, 200 for doc refs) are enforced by
/// validators, not by this newtype, since the limit depends on which field
/// is being validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefId(String);

impl TryFrom<&str> for RefId {
    type Error = NewtypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        if !s.is_empty() && REF_ID_RE.is_match(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(NewtypeError::InvalidFormat {
                type_name: "RefId",
                expected: "one or more of [A-Za-z0-9._-]",
                got: s.to_owned(),
            })
        }
    }
}

impl Deref for RefId {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for RefId {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RefId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Self::try_from(s.as_str()).map_err(de::Error::custom)
    }
}
