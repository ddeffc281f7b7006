//! PropRules Core - Property Validation Rule Engine
//!
//! # Contracts
//! 1. Rules Read, Never Write (targets are only seen through `PropertyAccessor`)
//! 2. Broken Is Not Failed (a broken rule is `Ok`, a rule that cannot run is `Err`)
//! 3. Closed Kinds (bounds are one of twelve native scalar kinds)
//! 4. Exact Conversion (no silent truncation, wraparound or rounding into range)
//! 5. Deterministic Identity (canonical args depend only on property and bound)

pub mod accessor;
pub mod args;
pub mod catalog;
pub mod error;
pub mod rules;
pub mod scalar;

pub use accessor::{FieldTable, PropertyAccessor, PropertyMap, PropertyValue};
pub use args::{ParameterizedRuleArgs, RuleArgs};
pub use catalog::{
    CatalogError, CheckReport, CheckStatus, RuleCatalog, RuleReport, RuleResult, RuleSpec,
};
pub use error::{ErrorClass, RuleError};
pub use rules::{
    integer_max_value, max_value, min_value, string_max_length, string_required, IntegerMaxValue,
    MaxValue, MinValue, Rule, RuleOutcome, StringMaxLength, StringRequired,
};
pub use scalar::{within, Limit, Scalar, ScalarKind, ScalarValue};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
