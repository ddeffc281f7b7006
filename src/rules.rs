//! Rules - property checks that pass, break, or fail to run
//!
//! A rule reads one property through a [`PropertyAccessor`] and returns a
//! [`RuleOutcome`]. A broken rule is `Ok` with `passed == false`; `Err` is
//! reserved for rules that could not be evaluated.

use serde::Serialize;

use crate::accessor::{PropertyAccessor, PropertyValue};
use crate::args::{ParameterizedRuleArgs, RuleArgs};
use crate::error::RuleError;
use crate::scalar::{within, Limit, Scalar, ScalarValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleOutcome {
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RuleOutcome {
    pub fn pass() -> Self {
        Self {
            passed: true,
            description: None,
        }
    }

    pub fn broken(description: String) -> Self {
        Self {
            passed: false,
            description: Some(description),
        }
    }

    /// Failure description, empty when the rule passed.
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

/// Rule trait - one configured check against one property
pub trait Rule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Canonical form of the rule's arguments, e.g. `Age!120`.
    fn args(&self) -> String;

    fn evaluate(&self, target: &dyn PropertyAccessor) -> Result<RuleOutcome, RuleError>;
}

fn broken(rule: &'static str, property: &str, description: String) -> RuleOutcome {
    tracing::debug!(rule, property, %description, "rule broken");
    RuleOutcome::broken(description)
}

fn read_text(target: &dyn PropertyAccessor, property: &str) -> Result<Option<String>, RuleError> {
    match target.get(property)? {
        PropertyValue::Null => Ok(None),
        PropertyValue::Text(s) => Ok(Some(s)),
        other => Err(RuleError::NotText {
            property: property.to_string(),
            found: other.type_name(),
        }),
    }
}

// --- Rule functions ---

/// Null or empty text breaks the rule.
pub fn string_required(
    target: &dyn PropertyAccessor,
    args: &RuleArgs,
) -> Result<RuleOutcome, RuleError> {
    let property = args.property_name();
    match read_text(target, property)? {
        Some(text) if !text.is_empty() => Ok(RuleOutcome::pass()),
        _ => Ok(broken(
            StringRequired::NAME,
            property,
            format!("{property} required"),
        )),
    }
}

/// Text longer than the bound (in chars) breaks the rule. Null and empty
/// text always pass; combine with [`string_required`] to forbid them.
pub fn string_max_length(
    target: &dyn PropertyAccessor,
    args: &ParameterizedRuleArgs<i32>,
) -> Result<RuleOutcome, RuleError> {
    let property = args.property_name();
    let max = *args.bound();
    let limit = usize::try_from(max).map_err(|_| RuleError::NegativeLength {
        property: property.to_string(),
        max,
    })?;

    let text = read_text(target, property)?.unwrap_or_default();
    if text.chars().count() > limit {
        return Ok(broken(
            StringMaxLength::NAME,
            property,
            format!("{property} can not exceed {max} characters"),
        ));
    }
    Ok(RuleOutcome::pass())
}

pub fn integer_max_value(
    target: &dyn PropertyAccessor,
    args: &ParameterizedRuleArgs<i32>,
) -> Result<RuleOutcome, RuleError> {
    check_limit(IntegerMaxValue::NAME, target, args, Limit::Max)
}

/// Passes when the property is at most the bound, compared in the bound's kind.
pub fn max_value<T: Scalar>(
    target: &dyn PropertyAccessor,
    args: &ParameterizedRuleArgs<T>,
) -> Result<RuleOutcome, RuleError> {
    check_limit(MaxValue::<T>::NAME, target, args, Limit::Max)
}

/// Passes when the property is at least the bound, compared in the bound's kind.
pub fn min_value<T: Scalar>(
    target: &dyn PropertyAccessor,
    args: &ParameterizedRuleArgs<T>,
) -> Result<RuleOutcome, RuleError> {
    check_limit(MinValue::<T>::NAME, target, args, Limit::Min)
}

fn check_limit<T: Scalar>(
    rule: &'static str,
    target: &dyn PropertyAccessor,
    args: &ParameterizedRuleArgs<T>,
    limit: Limit,
) -> Result<RuleOutcome, RuleError> {
    let property = args.property_name();
    let bound = args.bound().to_scalar();
    let raw = target.get(property)?;
    let value = ScalarValue::from_property(&raw, bound.kind(), property)?;

    if within(value, bound, limit)? {
        return Ok(RuleOutcome::pass());
    }
    let description = match limit {
        Limit::Max => format!("{property} can not exceed {bound}"),
        Limit::Min => format!("{property} can not be less than {bound}"),
    };
    Ok(broken(rule, property, description))
}

// --- Concrete Rules ---

pub struct StringRequired {
    args: RuleArgs,
}

impl StringRequired {
    pub const NAME: &'static str = "string_required";

    pub fn new(args: RuleArgs) -> Self {
        Self { args }
    }
}

impl Rule for StringRequired {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn args(&self) -> String {
        self.args.to_string()
    }

    fn evaluate(&self, target: &dyn PropertyAccessor) -> Result<RuleOutcome, RuleError> {
        string_required(target, &self.args)
    }
}

pub struct StringMaxLength {
    args: ParameterizedRuleArgs<i32>,
}

impl StringMaxLength {
    pub const NAME: &'static str = "string_max_length";

    /// Rejects a negative maximum up front.
    pub fn new(args: ParameterizedRuleArgs<i32>) -> Result<Self, RuleError> {
        if *args.bound() < 0 {
            return Err(RuleError::NegativeLength {
                property: args.property_name().to_string(),
                max: *args.bound(),
            });
        }
        Ok(Self { args })
    }
}

impl Rule for StringMaxLength {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn args(&self) -> String {
        self.args.to_string()
    }

    fn evaluate(&self, target: &dyn PropertyAccessor) -> Result<RuleOutcome, RuleError> {
        string_max_length(target, &self.args)
    }
}

/// `MaxValue<i32>` under its own name.
pub struct IntegerMaxValue {
    args: ParameterizedRuleArgs<i32>,
}

impl IntegerMaxValue {
    pub const NAME: &'static str = "integer_max_value";

    pub fn new(args: ParameterizedRuleArgs<i32>) -> Self {
        Self { args }
    }
}

impl Rule for IntegerMaxValue {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn args(&self) -> String {
        self.args.to_string()
    }

    fn evaluate(&self, target: &dyn PropertyAccessor) -> Result<RuleOutcome, RuleError> {
        integer_max_value(target, &self.args)
    }
}

pub struct MaxValue<T: Scalar> {
    args: ParameterizedRuleArgs<T>,
}

impl<T: Scalar> MaxValue<T> {
    pub const NAME: &'static str = "max_value";

    pub fn new(args: ParameterizedRuleArgs<T>) -> Self {
        Self { args }
    }
}

impl<T: Scalar> Rule for MaxValue<T> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn args(&self) -> String {
        self.args.to_string()
    }

    fn evaluate(&self, target: &dyn PropertyAccessor) -> Result<RuleOutcome, RuleError> {
        max_value(target, &self.args)
    }
}

pub struct MinValue<T: Scalar> {
    args: ParameterizedRuleArgs<T>,
}

impl<T: Scalar> MinValue<T> {
    pub const NAME: &'static str = "min_value";

    pub fn new(args: ParameterizedRuleArgs<T>) -> Self {
        Self { args }
    }
}

impl<T: Scalar> Rule for MinValue<T> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn args(&self) -> String {
        self.args.to_string()
    }

    fn evaluate(&self, target: &dyn PropertyAccessor) -> Result<RuleOutcome, RuleError> {
        min_value(target, &self.args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::PropertyMap;

    fn person(age: i64) -> PropertyMap {
        PropertyMap::new().with("Name", "Ada").with("Age", age)
    }

    #[test]
    fn test_max_value_end_to_end() {
        let rule = MaxValue::new(ParameterizedRuleArgs::new("Age", 120i32).unwrap());

        let outcome = rule.evaluate(&person(150)).unwrap();
        assert!(!outcome.passed);
        assert_eq!(outcome.description(), "Age can not exceed 120");

        let outcome = rule.evaluate(&person(30)).unwrap();
        assert!(outcome.passed);
        assert_eq!(outcome.description(), "");
    }

    #[test]
    fn test_min_value_wording() {
        let rule = MinValue::new(ParameterizedRuleArgs::new("Age", 18u8).unwrap());
        let outcome = rule.evaluate(&person(17)).unwrap();
        assert_eq!(outcome.description(), "Age can not be less than 18");
        assert!(rule.evaluate(&person(18)).unwrap().passed);
    }

    #[test]
    fn test_string_required() {
        let args = RuleArgs::new("Name").unwrap();
        assert!(string_required(&person(1), &args).unwrap().passed);

        let empty = PropertyMap::new().with("Name", "");
        let outcome = string_required(&empty, &args).unwrap();
        assert_eq!(outcome, RuleOutcome::broken("Name required".into()));

        let missing: Option<&str> = None;
        let null = PropertyMap::new().with("Name", missing);
        assert!(!string_required(&null, &args).unwrap().passed);
    }

    #[test]
    fn test_string_required_rejects_non_text() {
        let args = RuleArgs::new("Age").unwrap();
        let err = string_required(&person(3), &args).unwrap_err();
        assert_eq!(
            err,
            RuleError::NotText {
                property: "Age".into(),
                found: "int",
            }
        );
    }

    #[test]
    fn test_string_max_length_counts_chars() {
        let rule = StringMaxLength::new(ParameterizedRuleArgs::new("Name", 5).unwrap()).unwrap();

        let accented = PropertyMap::new().with("Name", "héllo");
        assert!(rule.evaluate(&accented).unwrap().passed);

        let long = PropertyMap::new().with("Name", "hello!");
        assert_eq!(
            rule.evaluate(&long).unwrap().description(),
            "Name can not exceed 5 characters"
        );
    }

    #[test]
    fn test_string_max_length_negative_bound() {
        let args = ParameterizedRuleArgs::new("Name", -1).unwrap();
        assert!(matches!(
            StringMaxLength::new(args.clone()),
            Err(RuleError::NegativeLength { max: -1, .. })
        ));
        // The free function refuses to run rather than reporting a broken rule.
        assert!(string_max_length(&person(1), &args).is_err());
    }

    #[test]
    fn test_integer_max_value() {
        let rule = IntegerMaxValue::new(ParameterizedRuleArgs::new("Age", 120).unwrap());
        assert_eq!(rule.name(), "integer_max_value");
        assert_eq!(rule.args(), "Age!120");
        assert_eq!(
            rule.evaluate(&person(121)).unwrap().description(),
            "Age can not exceed 120"
        );
    }

    #[test]
    fn test_access_errors_propagate() {
        let rule = MaxValue::new(ParameterizedRuleArgs::new("Height", 2.0f64).unwrap());
        assert_eq!(
            rule.evaluate(&person(1)).unwrap_err(),
            RuleError::PropertyNotFound("Height".into())
        );

        let rule = MaxValue::new(ParameterizedRuleArgs::new("Age", 100u8).unwrap());
        assert!(matches!(
            rule.evaluate(&person(-5)),
            Err(RuleError::Conversion { .. })
        ));
    }

    #[test]
    fn test_rules_are_object_safe() {
        let rules: Vec<Box<dyn Rule>> = vec![
            Box::new(StringRequired::new(RuleArgs::new("Name").unwrap())),
            Box::new(MaxValue::new(ParameterizedRuleArgs::new("Age", 120i64).unwrap())),
            Box::new(MinValue::new(ParameterizedRuleArgs::new("Age", 0i64).unwrap())),
        ];
        let target = person(42);
        for rule in &rules {
            assert!(rule.evaluate(&target).unwrap().passed, "{}", rule.name());
        }
    }
}
