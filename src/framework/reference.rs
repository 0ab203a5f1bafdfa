//! # Opaque References
//!
//! The server hands out opaque handles (`OpaqueRef:...`) for every object it
//! manages. [`Ref<K>`] wraps one such handle and tags it with the kind of object
//! it points to, so a VM reference cannot be passed where a VDI is expected.
//! The handle is never parsed: equality, ordering and hashing use the raw string.

use crate::framework::codec::{unexpected, FromValue, MapKey, ToValue};
use crate::framework::error::Result;
use crate::framework::value::Value;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

/// The null reference, valid for every kind.
pub const NULL_REF: &str = "OpaqueRef:NULL";

/// A kind of remote object.
pub trait Class: 'static {
    /// Class name as used in method names (`VM`, `VDI`, `session`).
    const NAME: &'static str;
}

/// Typed reference to a remote object of kind `K`.
pub struct Ref<K> {
    opaque: Arc<str>,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Ref<K> {
    pub fn new(opaque: impl Into<Arc<str>>) -> Self {
        Self {
            opaque: opaque.into(),
            _kind: PhantomData,
        }
    }

    pub fn null() -> Self {
        Self::new(NULL_REF)
    }

    pub fn is_null(&self) -> bool {
        &*self.opaque == NULL_REF
    }

    pub fn as_str(&self) -> &str {
        &self.opaque
    }
}

impl<K> Clone for Ref<K> {
    fn clone(&self) -> Self {
        Self {
            opaque: Arc::clone(&self.opaque),
            _kind: PhantomData,
        }
    }
}

impl<K> Default for Ref<K> {
    fn default() -> Self {
        Self::null()
    }
}

impl<K> PartialEq for Ref<K> {
    fn eq(&self, other: &Self) -> bool {
        self.opaque == other.opaque
    }
}

impl<K> Eq for Ref<K> {}

impl<K> PartialOrd for Ref<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for Ref<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.opaque.cmp(&other.opaque)
    }
}

impl<K> Hash for Ref<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.opaque.hash(state);
    }
}

impl<K: Class> fmt::Debug for Ref<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ref<{}>({})", K::NAME, self.opaque)
    }
}

impl<K> fmt::Display for Ref<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.opaque)
    }
}

impl<K> From<&str> for Ref<K> {
    fn from(opaque: &str) -> Self {
        Self::new(opaque)
    }
}

impl<K> From<String> for Ref<K> {
    fn from(opaque: String) -> Self {
        Self::new(opaque)
    }
}

impl<K> From<&Ref<K>> for Ref<K> {
    fn from(r: &Ref<K>) -> Self {
        r.clone()
    }
}

impl<K> FromValue for Ref<K> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(Self::new(s.as_str())),
            other => Err(unexpected("reference", other)),
        }
    }
}

impl<K> ToValue for Ref<K> {
    fn to_value(&self) -> Value {
        Value::String(self.opaque.to_string())
    }
}

impl<K> MapKey for Ref<K> {
    fn to_key(&self) -> String {
        self.opaque.to_string()
    }

    fn from_key(key: &str) -> Result<Self> {
        Ok(Self::new(key))
    }
}
