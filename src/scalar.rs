//! Scalar Kinds - closed set of natively compared primitives
//!
//! Every bound a comparison rule carries is one of these kinds. Property
//! values are converted to the bound's kind exactly (no truncation) and then
//! compared with that kind's own ordering.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::accessor::PropertyValue;
use crate::error::RuleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Bool,
    Char,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 12] = [
        ScalarKind::I8,
        ScalarKind::I16,
        ScalarKind::I32,
        ScalarKind::I64,
        ScalarKind::U8,
        ScalarKind::U16,
        ScalarKind::U32,
        ScalarKind::U64,
        ScalarKind::F32,
        ScalarKind::F64,
        ScalarKind::Bool,
        ScalarKind::Char,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::U8 => "u8",
            ScalarKind::U16 => "u16",
            ScalarKind::U32 => "u32",
            ScalarKind::U64 => "u64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::Bool => "bool",
            ScalarKind::Char => "char",
        }
    }

    pub fn is_integer(&self) -> bool {
        !matches!(
            self,
            ScalarKind::F32 | ScalarKind::F64 | ScalarKind::Bool | ScalarKind::Char
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, ScalarKind::F32 | ScalarKind::F64)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScalarKind {
    type Err = RuleError;

    /// Kind names are the primitive type names, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        ScalarKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| RuleError::UnsupportedKind(s.to_string()))
    }
}

/// A value of one of the scalar kinds, in its native representation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Bool(bool),
    Char(char),
}

impl ScalarValue {
    pub fn kind(&self) -> ScalarKind {
        match self {
            ScalarValue::I8(_) => ScalarKind::I8,
            ScalarValue::I16(_) => ScalarKind::I16,
            ScalarValue::I32(_) => ScalarKind::I32,
            ScalarValue::I64(_) => ScalarKind::I64,
            ScalarValue::U8(_) => ScalarKind::U8,
            ScalarValue::U16(_) => ScalarKind::U16,
            ScalarValue::U32(_) => ScalarKind::U32,
            ScalarValue::U64(_) => ScalarKind::U64,
            ScalarValue::F32(_) => ScalarKind::F32,
            ScalarValue::F64(_) => ScalarKind::F64,
            ScalarValue::Bool(_) => ScalarKind::Bool,
            ScalarValue::Char(_) => ScalarKind::Char,
        }
    }

    /// Convert a property value into `kind`.
    ///
    /// Fails with [`RuleError::Conversion`] when the value has no exact
    /// representation in `kind`: out of range, fractional where an integer is
    /// needed, null, or of an unrelated category (e.g. bool into u8).
    ///
    /// Text goes through the kind's own `FromStr`, so `"120.0"` is refused
    /// for integer kinds even though the float `120.0` converts. Floats
    /// narrowed to `f32` must survive the round trip through `f64` unchanged.
    pub fn from_property(
        value: &PropertyValue,
        kind: ScalarKind,
        property: &str,
    ) -> Result<Self, RuleError> {
        let converted = convert(value, kind);
        tracing::trace!(property, %value, %kind, ok = converted.is_some(), "scalar conversion");
        converted.ok_or_else(|| RuleError::Conversion {
            property: property.to_string(),
            value: value.to_string(),
            kind,
        })
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::I8(v) => write!(f, "{v}"),
            ScalarValue::I16(v) => write!(f, "{v}"),
            ScalarValue::I32(v) => write!(f, "{v}"),
            ScalarValue::I64(v) => write!(f, "{v}"),
            ScalarValue::U8(v) => write!(f, "{v}"),
            ScalarValue::U16(v) => write!(f, "{v}"),
            ScalarValue::U32(v) => write!(f, "{v}"),
            ScalarValue::U64(v) => write!(f, "{v}"),
            ScalarValue::F32(v) => write!(f, "{v}"),
            ScalarValue::F64(v) => write!(f, "{v}"),
            ScalarValue::Bool(v) => write!(f, "{v}"),
            ScalarValue::Char(v) => write!(f, "{v}"),
        }
    }
}

// --- Conversion ---

fn convert(value: &PropertyValue, kind: ScalarKind) -> Option<ScalarValue> {
    Some(match kind {
        ScalarKind::I8 => ScalarValue::I8(to_integer(value)?),
        ScalarKind::I16 => ScalarValue::I16(to_integer(value)?),
        ScalarKind::I32 => ScalarValue::I32(to_integer(value)?),
        ScalarKind::I64 => ScalarValue::I64(to_integer(value)?),
        ScalarKind::U8 => ScalarValue::U8(to_integer(value)?),
        ScalarKind::U16 => ScalarValue::U16(to_integer(value)?),
        ScalarKind::U32 => ScalarValue::U32(to_integer(value)?),
        ScalarKind::U64 => ScalarValue::U64(to_integer(value)?),
        ScalarKind::F32 => ScalarValue::F32(to_f32(value)?),
        ScalarKind::F64 => ScalarValue::F64(to_f64(value)?),
        ScalarKind::Bool => ScalarValue::Bool(to_bool(value)?),
        ScalarKind::Char => ScalarValue::Char(to_char(value)?),
    })
}

fn to_integer<T>(value: &PropertyValue) -> Option<T>
where
    T: TryFrom<i128> + FromStr,
{
    let wide = match value {
        PropertyValue::Int(i) => i128::from(*i),
        PropertyValue::UInt(u) => i128::from(*u),
        // `as` saturates beyond i128, which no target kind can hold anyway
        PropertyValue::Float(x) if x.is_finite() && x.fract() == 0.0 => *x as i128,
        PropertyValue::Text(s) => return s.trim().parse().ok(),
        _ => return None,
    };
    T::try_from(wide).ok()
}

fn integer_of(value: &PropertyValue) -> Option<i128> {
    match value {
        PropertyValue::Int(i) => Some(i128::from(*i)),
        PropertyValue::UInt(u) => Some(i128::from(*u)),
        _ => None,
    }
}

fn to_f64(value: &PropertyValue) -> Option<f64> {
    if let Some(wide) = integer_of(value) {
        let x = wide as f64;
        return (x as i128 == wide).then_some(x);
    }
    match value {
        PropertyValue::Float(x) => Some(*x),
        PropertyValue::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn to_f32(value: &PropertyValue) -> Option<f32> {
    if let Some(wide) = integer_of(value) {
        let x = wide as f32;
        return (x as i128 == wide).then_some(x);
    }
    let x = match value {
        PropertyValue::Float(x) => *x,
        PropertyValue::Text(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !x.is_finite() {
        return Some(x as f32);
    }
    // Rounding, underflow to zero and overflow to infinity all fail the round trip.
    let narrow = x as f32;
    (f64::from(narrow) == x).then_some(narrow)
}

fn to_bool(value: &PropertyValue) -> Option<bool> {
    match value {
        PropertyValue::Bool(b) => Some(*b),
        PropertyValue::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn to_char(value: &PropertyValue) -> Option<char> {
    match value {
        PropertyValue::Char(c) => Some(*c),
        PropertyValue::Text(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            }
        }
        _ => None,
    }
}

// --- Comparison dispatch ---

/// Direction of a bound check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// value <= bound
    Max,
    /// value >= bound
    Min,
}

impl Limit {
    fn admits(self, ordering: Ordering) -> bool {
        match self {
            Limit::Max => ordering != Ordering::Greater,
            Limit::Min => ordering != Ordering::Less,
        }
    }
}

/// Check `value` against `bound` with the native ordering of their kind.
///
/// Floats that compare unordered (NaN) are never within a limit. Bools have
/// no useful ordering, so both limits require `value == bound`.
pub fn within(value: ScalarValue, bound: ScalarValue, limit: Limit) -> Result<bool, RuleError> {
    use ScalarValue as S;

    let admitted = match (value, bound) {
        (S::I8(v), S::I8(b)) => limit.admits(v.cmp(&b)),
        (S::I16(v), S::I16(b)) => limit.admits(v.cmp(&b)),
        (S::I32(v), S::I32(b)) => limit.admits(v.cmp(&b)),
        (S::I64(v), S::I64(b)) => limit.admits(v.cmp(&b)),
        (S::U8(v), S::U8(b)) => limit.admits(v.cmp(&b)),
        (S::U16(v), S::U16(b)) => limit.admits(v.cmp(&b)),
        (S::U32(v), S::U32(b)) => limit.admits(v.cmp(&b)),
        (S::U64(v), S::U64(b)) => limit.admits(v.cmp(&b)),
        (S::F32(v), S::F32(b)) => v.partial_cmp(&b).is_some_and(|o| limit.admits(o)),
        (S::F64(v), S::F64(b)) => v.partial_cmp(&b).is_some_and(|o| limit.admits(o)),
        (S::Bool(v), S::Bool(b)) => v == b,
        (S::Char(v), S::Char(b)) => limit.admits(v.cmp(&b)),
        _ => {
            return Err(RuleError::KindMismatch {
                value: value.kind(),
                bound: bound.kind(),
            })
        }
    };
    tracing::trace!(%value, %bound, ?limit, admitted, "scalar comparison");
    Ok(admitted)
}

// --- Scalar capability ---

mod sealed {
    pub trait Sealed {}
}

/// Types usable as the bound of a comparison rule.
///
/// Sealed: implemented for the twelve native primitives and for
/// [`ScalarValue`], whose kind is only known at runtime.
pub trait Scalar: sealed::Sealed + Copy + fmt::Debug + fmt::Display + Send + Sync + 'static {
    fn to_scalar(self) -> ScalarValue;
}

macro_rules! native_scalar {
    ($($t:ty => $variant:ident),+ $(,)?) => {
        $(
            impl sealed::Sealed for $t {}

            impl Scalar for $t {
                fn to_scalar(self) -> ScalarValue {
                    ScalarValue::$variant(self)
                }
            }

            impl From<$t> for ScalarValue {
                fn from(v: $t) -> Self {
                    ScalarValue::$variant(v)
                }
            }
        )+
    };
}

native_scalar!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    bool => Bool,
    char => Char,
);

impl sealed::Sealed for ScalarValue {}

impl Scalar for ScalarValue {
    fn to_scalar(self) -> ScalarValue {
        self
    }
}
