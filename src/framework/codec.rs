//! # Wire Codec
//!
//! Conversion between native Rust types and [`Value`].
//!
//! Decoding is lenient in the ways the server needs: 64-bit integers may arrive
//! as strings, dates as `YYYYMMDDTHH:MM:SSZ` strings, and booleans as `"true"`.
//! Anything whose shape does not match fails with
//! [`Error::BadServerResponse`]; that is the only validation performed.

use crate::framework::error::{Error, Result};
use crate::framework::value::{Value, WIRE_DATE_FORMAT};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Decodes a native value from a wire value.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self>;
}

/// Encodes a native value as a wire value.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

/// Types usable as wire map keys. Wire maps are always keyed by strings.
pub trait MapKey: Sized {
    fn to_key(&self) -> String;
    fn from_key(key: &str) -> Result<Self>;
}

/// A record: the full field snapshot of one remote object.
pub trait Record: Sized + Default {
    fn from_fields(fields: &BTreeMap<String, Value>) -> Result<Self>;
    fn to_fields(&self) -> BTreeMap<String, Value>;
}

/// Key and value types of a map-valued field.
pub trait MapField {
    type Key;
    type Val;
}

impl<K, V> MapField for HashMap<K, V> {
    type Key = K;
    type Val = V;
}

/// Element type of a set-valued field.
pub trait SetField {
    type Item;
}

impl<T> SetField for Vec<T> {
    type Item = T;
}

pub fn unexpected(expected: &str, got: &Value) -> Error {
    Error::BadServerResponse(format!("expected {expected}, got {}", got.kind()))
}

/// Reads one record field, substituting the type default when the key is
/// absent or nil.
pub fn field<T: FromValue + Default>(fields: &BTreeMap<String, Value>, key: &str) -> Result<T> {
    match fields.get(key) {
        None | Some(Value::Nil) => Ok(T::default()),
        Some(value) => T::from_value(value).map_err(|e| e.in_field(key)),
    }
}

pub fn record_from_value<R: Record>(value: &Value) -> Result<R> {
    match value {
        Value::Struct(fields) => R::from_fields(fields),
        other => Err(unexpected("struct", other)),
    }
}

/// Parses the date formats the server is known to emit.
pub fn parse_wire_date(s: &str) -> Option<DateTime<Utc>> {
    const FORMATS: [&str; 3] = [WIRE_DATE_FORMAT, "%Y%m%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%SZ"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
        .or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}

// -----------------------------------------------------------------------------
// Decoding
// -----------------------------------------------------------------------------

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

/// Void results come back as an empty string or nil; both are accepted.
impl FromValue for () {
    fn from_value(_: &Value) -> Result<Self> {
        Ok(())
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(unexpected("string", other)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Int(i) => Ok(*i),
            Value::String(s) => s
                .parse()
                .map_err(|_| Error::BadServerResponse(format!("expected int, got {s:?}"))),
            other => Err(unexpected("int", other)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Double(d) => Ok(*d),
            Value::Int(i) => Ok(*i as f64),
            Value::String(s) => s
                .parse()
                .map_err(|_| Error::BadServerResponse(format!("expected double, got {s:?}"))),
            other => Err(unexpected("double", other)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::Int(i) => Ok(*i != 0),
            Value::String(s) if s.eq_ignore_ascii_case("true") || s == "1" => Ok(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") || s == "0" => Ok(false),
            other => Err(unexpected("boolean", other)),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::DateTime(dt) => Ok(*dt),
            Value::String(s) => parse_wire_date(s)
                .ok_or_else(|| Error::BadServerResponse(format!("expected dateTime, got {s:?}"))),
            other => Err(unexpected("dateTime", other)),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Array(items) => items.iter().map(T::from_value).collect(),
            other => Err(unexpected("array", other)),
        }
    }
}

impl<K: MapKey + Eq + Hash, V: FromValue> FromValue for HashMap<K, V> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Struct(map) => map
                .iter()
                .map(|(k, v)| Ok::<_, Error>((K::from_key(k)?, V::from_value(v)?)))
                .collect(),
            other => Err(unexpected("struct", other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Nil => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

// -----------------------------------------------------------------------------
// Encoding
// -----------------------------------------------------------------------------

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToValue for i64 {
    fn to_value(&self) -> Value {
        Value::Int(*self)
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Double(*self)
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl ToValue for DateTime<Utc> {
    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<K: MapKey, V: ToValue> ToValue for HashMap<K, V> {
    fn to_value(&self) -> Value {
        Value::Struct(
            self.iter()
                .map(|(k, v)| (k.to_key(), v.to_value()))
                .collect(),
        )
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Nil,
        }
    }
}

// -----------------------------------------------------------------------------
// Map keys
// -----------------------------------------------------------------------------

impl MapKey for String {
    fn to_key(&self) -> String {
        self.clone()
    }

    fn from_key(key: &str) -> Result<Self> {
        Ok(key.to_string())
    }
}

impl MapKey for i64 {
    fn to_key(&self) -> String {
        self.to_string()
    }

    fn from_key(key: &str) -> Result<Self> {
        key.parse()
            .map_err(|_| Error::BadServerResponse(format!("expected int map key, got {key:?}")))
    }
}
