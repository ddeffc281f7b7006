//! Rule Errors - "could not run" is never "value is invalid"
//!
//! A broken rule is an `Ok` outcome. Everything here means the rule could
//! not be evaluated at all.

use thiserror::Error;

use crate::scalar::ScalarKind;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    // --- Configuration ---
    #[error("Property name must not be empty")]
    EmptyPropertyName,

    #[error("Maximum length for {property} must not be negative, got {max}")]
    NegativeLength { property: String, max: i32 },

    #[error("Unsupported scalar kind: {0}")]
    UnsupportedKind(String),

    #[error("Invalid bound for {property}: {reason}")]
    InvalidBound { property: String, reason: String },

    // --- Access ---
    #[error("Property not found: {0}")]
    PropertyNotFound(String),

    #[error("Property not readable: {property} ({reason})")]
    PropertyNotReadable { property: String, reason: String },

    #[error("Property {property} is not text, found {found}")]
    NotText { property: String, found: &'static str },

    #[error("Cannot convert {property} value {value} to {kind}")]
    Conversion {
        property: String,
        value: String,
        kind: ScalarKind,
    },

    #[error("Cannot compare {value} with {bound}")]
    KindMismatch { value: ScalarKind, bound: ScalarKind },
}

/// Broad category of a [`RuleError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// The rule itself is misconfigured.
    Configuration,
    /// The target could not be read or its value could not be interpreted.
    Access,
}

impl RuleError {
    pub fn class(&self) -> ErrorClass {
        match self {
            RuleError::EmptyPropertyName
            | RuleError::NegativeLength { .. }
            | RuleError::UnsupportedKind(_)
            | RuleError::InvalidBound { .. } => ErrorClass::Configuration,
            RuleError::PropertyNotFound(_)
            | RuleError::PropertyNotReadable { .. }
            | RuleError::NotText { .. }
            | RuleError::Conversion { .. }
            | RuleError::KindMismatch { .. } => ErrorClass::Access,
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.class() == ErrorClass::Configuration
    }
}
