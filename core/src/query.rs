//! Query-parameter assembly.
//!
//! Only values that are present are ever written: an unset filter produces no
//! key at all, never a null. Datetimes are rendered as integer epoch seconds
//! and booleans as `true`/`false`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::ApiError;

/// Ordered query-parameter mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing an earlier value for the same key.
    pub fn push(&mut self, key: &str, value: impl ToString) -> &mut Self {
        let value = value.to_string();
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((key.to_string(), value)),
        }
        self
    }

    pub fn push_opt<T: ToString>(&mut self, key: &str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    pub fn push_str(&mut self, key: &str, value: Option<&str>) -> &mut Self {
        self.push_opt(key, value)
    }

    pub fn push_ts(&mut self, key: &str, value: Option<DateTime<Utc>>) -> &mut Self {
        self.push_opt(key, value.map(|ts| ts.timestamp()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }
}

/// Sort direction of one `order` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A listing order: comma-separated fields, each optionally prefixed with
/// `+` (ascending, the default) or `-` (descending).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Order {
    fields: Vec<(String, Direction)>,
}

impl Order {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asc(mut self, field: impl Into<String>) -> Self {
        self.fields.push((field.into(), Direction::Ascending));
        self
    }

    pub fn desc(mut self, field: impl Into<String>) -> Self {
        self.fields.push((field.into(), Direction::Descending));
        self
    }

    pub fn fields(&self) -> &[(String, Direction)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, direction)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if *direction == Direction::Descending {
                f.write_str("-")?;
            }
            f.write_str(field)?;
        }
        Ok(())
    }
}

impl FromStr for Order {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut order = Order::new();
        for token in s.split(',').map(str::trim) {
            let (name, direction) = match token.as_bytes().first() {
                Some(b'-') => (&token[1..], Direction::Descending),
                Some(b'+') => (&token[1..], Direction::Ascending),
                _ => (token, Direction::Ascending),
            };
            if name.is_empty() {
                return Err(ApiError::InvalidArgument(format!("empty field in order [{s}]")));
            }
            order.fields.push((name.to_string(), direction));
        }
        Ok(order)
    }
}
