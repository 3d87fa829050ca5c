//! ldapdn type definitions
//!
//! Small enums shared across the engine, the compiler and the collaborators.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Desired existence state of the managed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Ensure {
    /// The declared attribute values must be present.
    #[default]
    Present,
    /// The declared attribute values must be removed.
    Absent,
}

impl Ensure {
    /// Get the string representation used in manifests.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Ensure::Present => "present",
            Ensure::Absent => "absent",
        }
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        matches!(self, Ensure::Present)
    }
}

impl fmt::Display for Ensure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Ensure {
    type Err = ParseEnsureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "present" => Ok(Ensure::Present),
            "absent" => Ok(Ensure::Absent),
            _ => Err(ParseEnsureError(s.to_string())),
        }
    }
}

/// Error parsing an ensure value from string.
#[derive(Debug, Clone)]
pub struct ParseEnsureError(String);

impl fmt::Display for ParseEnsureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid ensure value '{}', expected one of: present, absent",
            self.0
        )
    }
}

impl std::error::Error for ParseEnsureError {}

/// Which write the apply collaborator has to perform.
///
/// `Create` maps to an `ldapadd` of a plain LDIF record, `Modify` to an
/// `ldapmodify` of a `changetype: modify` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyKind {
    Create,
    Modify,
}

impl ApplyKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplyKind::Create => "add",
            ApplyKind::Modify => "modify",
        }
    }
}

impl fmt::Display for ApplyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
