//! # Wire Values
//!
//! [`Value`] is the in-memory form of everything that crosses the wire: call
//! arguments, response payloads and the response envelope itself. It mirrors the
//! XML-RPC/JSON-RPC data model the server speaks, so a transport only has to map
//! its own encoding onto these eight variants.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// Date format used by the server for `dateTime.iso8601` values.
pub const WIRE_DATE_FORMAT: &str = "%Y%m%dT%H:%M:%SZ";

/// A single wire value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    DateTime(DateTime<Utc>),
    Array(Vec<Value>),
    Struct(BTreeMap<String, Value>),
}

impl Value {
    /// Short name of the variant, used in decode error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::DateTime(_) => "dateTime",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Struct(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_struct_mut(&mut self) -> Option<&mut BTreeMap<String, Value>> {
        match self {
            Value::Struct(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up `key` when this value is a struct.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_struct().and_then(|map| map.get(key))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str(""),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::String(s) => f.write_str(s),
            Value::DateTime(dt) => write!(f, "{}", dt.format(WIRE_DATE_FORMAT)),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Struct(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
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
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Struct(map)
    }
}

/// Builds a [`Value::Struct`] from `key => value` pairs.
///
/// ```
/// use xenapi::wire_struct;
/// let v = wire_struct! { "Status" => "Success", "Value" => 3i64 };
/// assert_eq!(v.get("Status").and_then(|s| s.as_str()), Some("Success"));
/// ```
#[macro_export]
macro_rules! wire_struct {
    ($($key:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut map = ::std::collections::BTreeMap::<::std::string::String, $crate::framework::Value>::new();
        $( map.insert(::std::string::String::from($key), $crate::framework::Value::from($value)); )*
        $crate::framework::Value::Struct(map)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_nested_values() {
        let value = Value::Array(vec![
            Value::from("a"),
            Value::Int(2),
            wire_struct! { "k" => true },
        ]);
        assert_eq!(value.to_string(), "[a, 2, {k: true}]");
    }

    #[test]
    fn get_only_works_on_structs() {
        let value = wire_struct! { "Status" => "Success" };
        assert_eq!(value.get("Status"), Some(&Value::from("Success")));
        assert_eq!(Value::Int(1).get("Status"), None);
    }
}
