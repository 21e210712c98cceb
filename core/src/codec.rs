//! Wire-representation codec.
//!
//! # Design
//! Every domain entity implements [`Repr`]: `to_repr` produces the server's
//! JSON shape (camelCase keys, `_`-prefixed bookkeeping timestamps) and
//! `from_repr` is its inverse. Decoding goes through [`Fields`], which reads
//! one key at a time and reports precisely what went wrong: a missing
//! required key, a value of the wrong JSON type, or an unacceptable value.
//! Missing and `null` optional keys both decode to `None` / empty.
//!
//! The codecs are written by hand rather than derived because the wire names,
//! the per-entity timestamp formats and the error classes all differ from
//! what a derive would produce.

use serde_json::{Map, Value};

use crate::error::DecodeError;

/// Bidirectional mapping between an entity and its JSON representation.
pub trait Repr: Sized {
    fn to_repr(&self) -> Value;

    fn from_repr(raw: &Value) -> Result<Self, DecodeError>;
}

/// Decode a list of entities.
pub fn list_from_repr<T: Repr>(raw: &[Value]) -> Result<Vec<T>, DecodeError> {
    raw.iter().map(T::from_repr).collect()
}

pub fn list_to_repr<T: Repr>(items: &[T]) -> Value {
    Value::Array(items.iter().map(Repr::to_repr).collect())
}

/// Read-only view over one JSON object being decoded as `entity`.
pub(crate) struct Fields<'a> {
    entity: &'static str,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub fn of(entity: &'static str, raw: &'a Value) -> Result<Self, DecodeError> {
        match raw {
            Value::Object(map) => Ok(Self { entity, map }),
            _ => Err(DecodeError::InvalidType {
                entity,
                field: "<root>",
                expected: "an object",
            }),
        }
    }

    /// The raw value, with `null` folded into absence.
    pub fn value(&self, key: &'static str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    pub fn required(&self, key: &'static str) -> Result<&'a Value, DecodeError> {
        self.value(key).ok_or(DecodeError::MissingField {
            entity: self.entity,
            field: key,
        })
    }

    fn mismatch(&self, key: &'static str, expected: &'static str) -> DecodeError {
        DecodeError::InvalidType {
            entity: self.entity,
            field: key,
            expected,
        }
    }

    pub fn opt_str(&self, key: &'static str) -> Result<Option<String>, DecodeError> {
        match self.value(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.mismatch(key, "a string")),
        }
    }

    pub fn str(&self, key: &'static str) -> Result<String, DecodeError> {
        match self.required(key)? {
            Value::String(s) => Ok(s.clone()),
            _ => Err(self.mismatch(key, "a string")),
        }
    }

    /// Integer field, used for epoch-second timestamps.
    pub fn opt_i64(&self, key: &'static str) -> Result<Option<i64>, DecodeError> {
        match self.value(key) {
            None => Ok(None),
            Some(v) => v.as_i64().map(Some).ok_or_else(|| self.mismatch(key, "an integer")),
        }
    }

    pub fn u64(&self, key: &'static str) -> Result<u64, DecodeError> {
        self.required(key)?
            .as_u64()
            .ok_or_else(|| self.mismatch(key, "a non-negative integer"))
    }

    pub fn opt_bool(&self, key: &'static str) -> Result<Option<bool>, DecodeError> {
        match self.value(key) {
            None => Ok(None),
            Some(v) => v.as_bool().map(Some).ok_or_else(|| self.mismatch(key, "a boolean")),
        }
    }

    pub fn f64(&self, key: &'static str) -> Result<f64, DecodeError> {
        self.required(key)?
            .as_f64()
            .ok_or_else(|| self.mismatch(key, "a number"))
    }

    /// Object field; absent decodes to an empty mapping.
    pub fn object(&self, key: &'static str) -> Result<Map<String, Value>, DecodeError> {
        match self.value(key) {
            None => Ok(Map::new()),
            Some(Value::Object(map)) => Ok(map.clone()),
            Some(_) => Err(self.mismatch(key, "an object")),
        }
    }

    /// Array field; absent decodes to an empty slice.
    pub fn array(&self, key: &'static str) -> Result<&'a [Value], DecodeError> {
        match self.value(key) {
            None => Ok(&[]),
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(self.mismatch(key, "a list")),
        }
    }

    /// Array of entities; absent decodes to an empty list.
    pub fn list<T: Repr>(&self, key: &'static str) -> Result<Vec<T>, DecodeError> {
        list_from_repr(self.array(key)?)
    }

    /// Array of opaque values; absent decodes to an empty list.
    pub fn values(&self, key: &'static str) -> Result<Vec<Value>, DecodeError> {
        Ok(self.array(key)?.to_vec())
    }

    pub fn opt_entity<T: Repr>(&self, key: &'static str) -> Result<Option<T>, DecodeError> {
        self.value(key).map(T::from_repr).transpose()
    }

    pub fn entity<T: Repr>(&self, key: &'static str) -> Result<T, DecodeError> {
        T::from_repr(self.required(key)?)
    }
}

/// Variant decoder of a polymorphic entity.
pub(crate) type Decoder<T> = fn(&Fields<'_>) -> Result<T, DecodeError>;

/// Read the `type` discriminator of `raw` and hand the object to the decoder
/// registered for it. An unregistered discriminator is an error, never a
/// fallback.
pub(crate) fn dispatch<T>(kind: &'static str, table: &[(&str, Decoder<T>)], raw: &Value) -> Result<T, DecodeError> {
    let fields = Fields::of(kind, raw)?;
    let tag = fields.str("type")?;
    let decoder = table
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, decoder)| decoder)
        .ok_or(DecodeError::UnknownType { kind, value: tag })?;
    decoder(&fields)
}

/// Optional scalar to JSON, `None` as `null`.
pub(crate) fn opt<T: Into<Value> + Clone>(value: &Option<T>) -> Value {
    value.clone().map(Into::into).unwrap_or(Value::Null)
}
