//! Property Access - the capability rules read targets through
//!
//! Rules never look at a target directly. They ask a [`PropertyAccessor`]
//! for a named property and get back a loosely typed [`PropertyValue`].

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::error::RuleError;

/// Loosely typed property value as returned by an accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Char(char),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl PropertyValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Null => "null",
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Char(_) => "char",
            PropertyValue::Int(_) => "int",
            PropertyValue::UInt(_) => "uint",
            PropertyValue::Float(_) => "float",
            PropertyValue::Text(_) => "text",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    /// Interpret a JSON value. Arrays and objects have no scalar reading.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(PropertyValue::Null),
            Value::Bool(b) => Some(PropertyValue::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(PropertyValue::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Some(PropertyValue::UInt(u))
                } else {
                    n.as_f64().map(PropertyValue::Float)
                }
            }
            Value::String(s) => Some(PropertyValue::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Null => f.write_str("null"),
            PropertyValue::Bool(b) => write!(f, "{b}"),
            PropertyValue::Char(c) => write!(f, "{c:?}"),
            PropertyValue::Int(i) => write!(f, "{i}"),
            PropertyValue::UInt(u) => write!(f, "{u}"),
            PropertyValue::Float(x) => write!(f, "{x}"),
            PropertyValue::Text(s) => write!(f, "{s:?}"),
        }
    }
}

macro_rules! property_value_from {
    ($variant:ident as $wide:ty: $($t:ty),+) => {
        $(
            impl From<$t> for PropertyValue {
                fn from(v: $t) -> Self {
                    PropertyValue::$variant(<$wide>::from(v))
                }
            }
        )+
    };
}

property_value_from!(Int as i64: i8, i16, i32, i64);
property_value_from!(UInt as u64: u8, u16, u32, u64);
property_value_from!(Float as f64: f32, f64);

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<char> for PropertyValue {
    fn from(v: char) -> Self {
        PropertyValue::Char(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::Text(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::Text(v)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(PropertyValue::Null, Into::into)
    }
}

/// Read access to the named properties of one target object.
pub trait PropertyAccessor {
    fn get(&self, property: &str) -> Result<PropertyValue, RuleError>;
}

impl<A: PropertyAccessor + ?Sized> PropertyAccessor for &A {
    fn get(&self, property: &str) -> Result<PropertyValue, RuleError> {
        (**self).get(property)
    }
}

// --- Property map ---

#[derive(Debug, Clone)]
enum Slot {
    Readable(PropertyValue),
    WriteOnly,
}

/// Name -> value map standing in for a target object.
#[derive(Debug, Clone, Default)]
pub struct PropertyMap {
    slots: BTreeMap<String, Slot>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Declare a property that exists but can not be read.
    pub fn write_only(mut self, name: impl Into<String>) -> Self {
        self.slots.insert(name.into(), Slot::WriteOnly);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        self.slots.insert(name.into(), Slot::Readable(value.into()));
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }
}

impl PropertyAccessor for PropertyMap {
    fn get(&self, property: &str) -> Result<PropertyValue, RuleError> {
        match self.slots.get(property) {
            Some(Slot::Readable(value)) => Ok(value.clone()),
            Some(Slot::WriteOnly) => Err(RuleError::PropertyNotReadable {
                property: property.to_string(),
                reason: "write-only".to_string(),
            }),
            None => Err(RuleError::PropertyNotFound(property.to_string())),
        }
    }
}

// --- Field tables ---

/// Getter table over a concrete struct type.
///
/// ```
/// use proprules_core::accessor::{FieldTable, PropertyAccessor, PropertyValue};
///
/// struct Person { age: u8 }
///
/// let fields = FieldTable::new().field("Age", |p: &Person| p.age.into());
/// let person = Person { age: 30 };
/// assert_eq!(fields.bind(&person).get("Age").unwrap(), PropertyValue::UInt(30));
/// ```
pub struct FieldTable<T> {
    getters: BTreeMap<&'static str, fn(&T) -> PropertyValue>,
}

impl<T> FieldTable<T> {
    pub fn new() -> Self {
        Self {
            getters: BTreeMap::new(),
        }
    }

    pub fn field(mut self, name: &'static str, getter: fn(&T) -> PropertyValue) -> Self {
        self.getters.insert(name, getter);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.getters.keys().copied()
    }

    pub fn bind<'a>(&'a self, target: &'a T) -> BoundFields<'a, T> {
        BoundFields {
            table: self,
            target,
        }
    }
}

impl<T> Default for FieldTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A [`FieldTable`] paired with the target it reads from.
pub struct BoundFields<'a, T> {
    table: &'a FieldTable<T>,
    target: &'a T,
}

impl<T> PropertyAccessor for BoundFields<'_, T> {
    fn get(&self, property: &str) -> Result<PropertyValue, RuleError> {
        self.table
            .getters
            .get(property)
            .map(|getter| getter(self.target))
            .ok_or_else(|| RuleError::PropertyNotFound(property.to_string()))
    }
}

// --- JSON targets ---

impl PropertyAccessor for Map<String, Value> {
    fn get(&self, property: &str) -> Result<PropertyValue, RuleError> {
        let value = Map::get(self, property)
            .ok_or_else(|| RuleError::PropertyNotFound(property.to_string()))?;
        PropertyValue::from_json(value).ok_or_else(|| RuleError::PropertyNotReadable {
            property: property.to_string(),
            reason: "composite value".to_string(),
        })
    }
}

impl PropertyAccessor for Value {
    fn get(&self, property: &str) -> Result<PropertyValue, RuleError> {
        match self {
            Value::Object(map) => PropertyAccessor::get(map, property),
            _ => Err(RuleError::PropertyNotReadable {
                property: property.to_string(),
                reason: "target is not an object".to_string(),
            }),
        }
    }
}
