//! Type-safe enumerations for quality check results.
//!
//! Priorities and error types arrive as strings or small integers from the
//! quality service; these enums give them a fixed, ordered representation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Severity of a quality error.
///
/// Declaration order is severity order: `Fatal` sorts before `Warning`,
/// which sorts before `Info`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Blocks acceptance of the dataset.
    Fatal,
    /// Should be reviewed.
    Warning,
    /// Informational only.
    Info,
}

impl Priority {
    /// All priorities in severity order.
    pub const ALL: [Self; 3] = [Self::Fatal, Self::Warning, Self::Info];

    /// Stable key used for tree lookup.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fatal => "fatal",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fatal => "Fatal",
            Self::Warning => "Warning",
            Self::Info => "Info",
        }
    }

    /// Numeric code used by the quality service (1 = fatal).
    pub fn code(&self) -> u8 {
        match self {
            Self::Fatal => 1,
            Self::Warning => 2,
            Self::Info => 3,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Priority {
    type Err = ModelError;

    /// Accepts names (case-insensitive) and the service's numeric codes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fatal" | "1" => Ok(Self::Fatal),
            "warning" | "2" => Ok(Self::Warning),
            "info" | "3" => Ok(Self::Info),
            _ => Err(ModelError::UnknownPriority(s.to_string())),
        }
    }
}

/// Kind of quality check that produced an error.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    Attribute,
    Geometry,
    Topology,
    Continuity,
}

impl ErrorType {
    /// All error types in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Attribute,
        Self::Geometry,
        Self::Topology,
        Self::Continuity,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Attribute => "Attribute error",
            Self::Geometry => "Geometry error",
            Self::Topology => "Topology error",
            Self::Continuity => "Continuity error",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for ErrorType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "attribute" | "1" => Ok(Self::Attribute),
            "geometry" | "2" => Ok(Self::Geometry),
            "topology" | "3" => Ok(Self::Topology),
            "continuity" | "4" => Ok(Self::Continuity),
            _ => Err(ModelError::UnknownErrorType(s.to_string())),
        }
    }
}

/// Label of the "show user processed" switch.
pub const USER_PROCESSED_LABEL: &str = "Show user processed";
