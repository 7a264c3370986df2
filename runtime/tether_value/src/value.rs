//! Dynamically typed runtime value.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tether_ir::TypeId;

use crate::ObjectValue;

/// A runtime value passed to and returned from extension functions.
///
/// Heap variants are `Arc`-shared, so cloning a value is cheap and values
/// can cross threads freely.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    List(Arc<Vec<Value>>),
    /// String-keyed mapping.
    Map(Arc<BTreeMap<String, Value>>),
    Object(Arc<ObjectValue>),
}

impl Value {
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Arc::new(items))
    }

    pub fn map(entries: BTreeMap<String, Value>) -> Self {
        Value::Map(Arc::new(entries))
    }

    /// Build a map from `(key, value)` pairs.
    pub fn map_from<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn object(object: ObjectValue) -> Self {
        Value::Object(Arc::new(object))
    }

    /// The runtime type used for dispatch. `Null` has none.
    pub fn runtime_type(&self) -> Option<TypeId> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(TypeId::BOOL),
            Value::Int(_) => Some(TypeId::INT),
            Value::Float(_) => Some(TypeId::FLOAT),
            Value::Str(_) => Some(TypeId::STR),
            Value::List(_) => Some(TypeId::LIST),
            Value::Map(_) => Some(TypeId::MAP),
            Value::Object(obj) => Some(obj.type_id()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(&**s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(entries) => Some(&**entries),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Value::Object(obj) => Some(&**obj),
            _ => None,
        }
    }

    /// Short name of the variant, for messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<ObjectValue> for Value {
    fn from(obj: ObjectValue) -> Self {
        Value::object(obj)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k:?}: {v}")?;
                }
                write!(f, "}}")
            }
            Value::Object(obj) => write!(f, "<object {:?}>", obj.type_id()),
        }
    }
}

#[cfg(test)]
mod tests;
