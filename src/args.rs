//! Rule Arguments - which property a rule applies to, and with what bound
//!
//! Arguments are immutable once built. Their `Display` form is the
//! canonical identity of a rule instance: `Age` or `Age!120`.

use std::fmt;

use serde::Serialize;

use crate::error::RuleError;

/// Separator between property name and bound in the canonical form.
pub const BOUND_SEPARATOR: char = '!';

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RuleArgs {
    property_name: String,
}

impl RuleArgs {
    /// Fails with [`RuleError::EmptyPropertyName`] on a blank name.
    pub fn new(property_name: impl Into<String>) -> Result<Self, RuleError> {
        let property_name = property_name.into();
        if property_name.trim().is_empty() {
            return Err(RuleError::EmptyPropertyName);
        }
        Ok(Self { property_name })
    }

    pub fn property_name(&self) -> &str {
        &self.property_name
    }
}

impl fmt::Display for RuleArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.property_name)
    }
}

/// [`RuleArgs`] plus one rule-specific bound.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ParameterizedRuleArgs<T> {
    #[serde(flatten)]
    base: RuleArgs,
    bound: T,
}

impl<T> ParameterizedRuleArgs<T> {
    pub fn new(property_name: impl Into<String>, bound: T) -> Result<Self, RuleError> {
        Ok(Self {
            base: RuleArgs::new(property_name)?,
            bound,
        })
    }

    pub fn from_base(base: RuleArgs, bound: T) -> Self {
        Self { base, bound }
    }

    pub fn property_name(&self) -> &str {
        self.base.property_name()
    }

    pub fn base(&self) -> &RuleArgs {
        &self.base
    }

    pub fn bound(&self) -> &T {
        &self.bound
    }
}

impl<T: fmt::Display> fmt::Display for ParameterizedRuleArgs<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.base, BOUND_SEPARATOR, self.bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name_rejected() {
        assert_eq!(RuleArgs::new(""), Err(RuleError::EmptyPropertyName));
        assert_eq!(RuleArgs::new("   "), Err(RuleError::EmptyPropertyName));
        assert_eq!(
            ParameterizedRuleArgs::new("", 5),
            Err(RuleError::EmptyPropertyName)
        );
    }

    #[test]
    fn test_canonical_form() {
        let args = RuleArgs::new("Name").unwrap();
        assert_eq!(args.to_string(), "Name");

        let args = ParameterizedRuleArgs::new("Age", 120).unwrap();
        assert_eq!(args.to_string(), "Age!120");
        assert_eq!(*args.bound(), 120);
        assert_eq!(args.property_name(), "Age");
        assert_eq!(args.base(), &RuleArgs::new("Age").unwrap());

        let args = ParameterizedRuleArgs::new("Grade", 'C').unwrap();
        assert_eq!(args.to_string(), "Grade!C");
    }

    #[test]
    fn test_canonical_form_is_deterministic() {
        let a = ParameterizedRuleArgs::new("Ratio", 0.25f64).unwrap();
        let b = ParameterizedRuleArgs::new("Ratio", 0.25f64).unwrap();
        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(a, b);
    }

    #[test]
    fn test_serializes_flat() {
        let args = ParameterizedRuleArgs::new("Age", 120u8).unwrap();
        let json = serde_json::to_value(&args).unwrap();
        assert_eq!(json, serde_json::json!({"property_name": "Age", "bound": 120}));
    }
}
