//! Rule Catalog - rules declared as JSON
//!
//! A rule file holds an array of [`RuleSpec`] objects:
//!
//! ```json
//! [
//!   { "rule": "string_required", "property": "Name" },
//!   { "rule": "max_value", "property": "Age", "kind": "u8", "bound": 120 }
//! ]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::accessor::{PropertyAccessor, PropertyValue};
use crate::args::{ParameterizedRuleArgs, RuleArgs};
use crate::error::{ErrorClass, RuleError};
use crate::rules::{self, Rule, RuleOutcome};
use crate::scalar::{ScalarKind, ScalarValue};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid rule file {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid rule #{index} in {}: {source}", .path.display())]
    Rule {
        path: PathBuf,
        index: usize,
        #[source]
        source: RuleError,
    },
}

/// Serialized form of one configured rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleSpec {
    StringRequired {
        property: String,
    },
    StringMaxLength {
        property: String,
        max: i32,
    },
    IntegerMaxValue {
        property: String,
        max: i32,
    },
    MaxValue {
        property: String,
        kind: String,
        bound: Value,
    },
    MinValue {
        property: String,
        kind: String,
        bound: Value,
    },
}

impl RuleSpec {
    pub fn property(&self) -> &str {
        match self {
            RuleSpec::StringRequired { property }
            | RuleSpec::StringMaxLength { property, .. }
            | RuleSpec::IntegerMaxValue { property, .. }
            | RuleSpec::MaxValue { property, .. }
            | RuleSpec::MinValue { property, .. } => property,
        }
    }

    /// Validate the declaration and construct the rule it describes.
    pub fn build(&self) -> Result<Box<dyn Rule>, RuleError> {
        let rule: Box<dyn Rule> = match self {
            RuleSpec::StringRequired { property } => {
                Box::new(rules::StringRequired::new(RuleArgs::new(property.as_str())?))
            }
            RuleSpec::StringMaxLength { property, max } => Box::new(rules::StringMaxLength::new(
                ParameterizedRuleArgs::new(property.as_str(), *max)?,
            )?),
            RuleSpec::IntegerMaxValue { property, max } => Box::new(
                rules::IntegerMaxValue::new(ParameterizedRuleArgs::new(property.as_str(), *max)?),
            ),
            RuleSpec::MaxValue {
                property,
                kind,
                bound,
            } => Box::new(rules::MaxValue::new(scalar_args(property, kind, bound)?)),
            RuleSpec::MinValue {
                property,
                kind,
                bound,
            } => Box::new(rules::MinValue::new(scalar_args(property, kind, bound)?)),
        };
        Ok(rule)
    }
}

fn scalar_args(
    property: &str,
    kind: &str,
    bound: &Value,
) -> Result<ParameterizedRuleArgs<ScalarValue>, RuleError> {
    let base = RuleArgs::new(property)?;
    let kind: ScalarKind = kind.parse()?;
    let raw = PropertyValue::from_json(bound).ok_or_else(|| RuleError::InvalidBound {
        property: property.to_string(),
        reason: "bound must be a scalar".to_string(),
    })?;
    let bound = ScalarValue::from_property(&raw, kind, property).map_err(|e| {
        RuleError::InvalidBound {
            property: property.to_string(),
            reason: e.to_string(),
        }
    })?;
    Ok(ParameterizedRuleArgs::from_base(base, bound))
}

/// Overall result of checking a target, worst first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// At least one rule could not be evaluated.
    Failed,
    /// Every rule ran and at least one is broken.
    Broken,
    Passed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RuleResult {
    Evaluated(RuleOutcome),
    Failed { error: String, class: ErrorClass },
}

/// One rule's line in a [`CheckReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleReport {
    pub rule: &'static str,
    pub args: String,
    #[serde(flatten)]
    pub result: RuleResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckReport {
    pub status: CheckStatus,
    pub results: Vec<RuleReport>,
}

/// Catalog - built rules in declaration order
#[derive(Default)]
pub struct RuleCatalog {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_specs(specs: &[RuleSpec]) -> Result<Self, RuleError> {
        let rules = specs
            .iter()
            .map(RuleSpec::build)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Load a rule file, or every `*.json` file of a directory in file name order.
    ///
    /// Malformed files are errors, never skipped.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        if path.is_dir() {
            let io_err = |source| CatalogError::Io {
                path: path.to_path_buf(),
                source,
            };
            let mut files = vec![];
            for entry in fs::read_dir(path).map_err(io_err)? {
                let file = entry.map_err(io_err)?.path();
                if file.extension().is_some_and(|e| e == "json") {
                    files.push(file);
                }
            }
            files.sort();
            for file in &files {
                catalog.load_file(file)?;
            }
        } else {
            catalog.load_file(path)?;
        }
        tracing::info!(path = %path.display(), rules = catalog.len(), "rule catalog loaded");
        Ok(catalog)
    }

    fn load_file(&mut self, path: &Path) -> Result<(), CatalogError> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let specs: Vec<RuleSpec> =
            serde_json::from_str(&content).map_err(|source| CatalogError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        for (index, spec) in specs.iter().enumerate() {
            let rule = spec.build().map_err(|source| {
                tracing::warn!(path = %path.display(), index, error = %source, "rejected rule");
                CatalogError::Rule {
                    path: path.to_path_buf(),
                    index,
                    source,
                }
            })?;
            self.rules.push(rule);
        }
        Ok(())
    }

    /// Evaluate every rule against `target`, in order.
    ///
    /// Errors are reported per rule and never stop the remaining rules.
    pub fn check(&self, target: &dyn PropertyAccessor) -> CheckReport {
        let mut status = CheckStatus::Passed;
        let mut results = Vec::with_capacity(self.rules.len());

        for rule in &self.rules {
            let result = match rule.evaluate(target) {
                Ok(outcome) => {
                    if !outcome.passed {
                        status = status.min(CheckStatus::Broken);
                    }
                    RuleResult::Evaluated(outcome)
                }
                Err(e) => {
                    tracing::warn!(rule = rule.name(), args = %rule.args(), error = %e, "rule could not run");
                    status = CheckStatus::Failed;
                    RuleResult::Failed {
                        error: e.to_string(),
                        class: e.class(),
                    }
                }
            };
            results.push(RuleReport {
                rule: rule.name(),
                args: rule.args(),
                result,
            });
        }

        CheckReport { status, results }
    }

    pub fn push(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(value: Value) -> RuleSpec {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_spec_builds_rule() {
        let rule = spec(json!({"rule": "max_value", "property": "Age", "kind": "u8", "bound": 120}))
            .build()
            .unwrap();
        assert_eq!(rule.name(), "max_value");
        assert_eq!(rule.args(), "Age!120");

        let outcome = rule.evaluate(&json!({"Age": 150})).unwrap();
        assert_eq!(outcome.description(), "Age can not exceed 120");
    }

    #[test]
    fn test_unsupported_kind() {
        let err = spec(json!({"rule": "min_value", "property": "Price", "kind": "decimal", "bound": 1}))
            .build()
            .err()
            .unwrap();
        assert_eq!(err, RuleError::UnsupportedKind("decimal".into()));
    }

    #[test]
    fn test_bound_must_fit_kind() {
        let err = spec(json!({"rule": "max_value", "property": "Age", "kind": "u8", "bound": 300}))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, RuleError::InvalidBound { .. }));
        assert!(err.is_configuration());

        let err = spec(json!({"rule": "max_value", "property": "Age", "kind": "i32", "bound": [1]}))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, RuleError::InvalidBound { .. }));
    }

    #[test]
    fn test_negative_length_rejected_at_build() {
        let err = spec(json!({"rule": "string_max_length", "property": "Name", "max": -3}))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, RuleError::NegativeLength { max: -3, .. }));
    }

    #[test]
    fn test_unknown_rule_is_decode_error() {
        let parsed: Result<RuleSpec, _> =
            serde_json::from_value(json!({"rule": "regex", "property": "Name"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_from_specs_keeps_order() {
        let specs = vec![
            spec(json!({"rule": "string_required", "property": "Name"})),
            spec(json!({"rule": "integer_max_value", "property": "Age", "max": 120})),
        ];
        let mut catalog = RuleCatalog::from_specs(&specs).unwrap();
        catalog.push(spec(json!({"rule": "min_value", "property": "Age", "kind": "char", "bound": "A"})).build().unwrap());
        let names: Vec<_> = catalog.rules().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["string_required", "integer_max_value", "min_value"]);
        assert!(!catalog.is_empty());
        assert_eq!(specs[1].property(), "Age");
    }
}
