//! Norms attached to tasks and profiles.

use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};

use crate::codec::{opt, Fields, Repr};
use crate::error::DecodeError;

/// Comparison operator of a [`Norm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormOperator {
    Equals,
    LessThan,
    GreaterThan,
    LessEquals,
    GreaterEquals,
}

impl NormOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            NormOperator::Equals => "EQUALS",
            NormOperator::LessThan => "LESS_THAN",
            NormOperator::GreaterThan => "GREATER_THAN",
            NormOperator::LessEquals => "LESS_EQUALS",
            NormOperator::GreaterEquals => "GREATER_EQUALS",
        }
    }
}

impl fmt::Display for NormOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NormOperator {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EQUALS" => Ok(NormOperator::Equals),
            "LESS_THAN" => Ok(NormOperator::LessThan),
            "GREATER_THAN" => Ok(NormOperator::GreaterThan),
            "LESS_EQUALS" => Ok(NormOperator::LessEquals),
            "GREATER_EQUALS" => Ok(NormOperator::GreaterEquals),
            other => Err(DecodeError::InvalidValue {
                kind: "norm operator",
                value: other.to_string(),
            }),
        }
    }
}

/// A rule over one attribute: `attribute <operator> comparison`, optionally
/// negated. `comparison` is any JSON value.
#[derive(Debug, Clone, PartialEq)]
pub struct Norm {
    pub norm_id: Option<String>,
    pub attribute: String,
    pub operator: NormOperator,
    pub comparison: Value,
    pub negation: bool,
}

impl Repr for Norm {
    fn to_repr(&self) -> Value {
        json!({
            "id": opt(&self.norm_id),
            "attribute": self.attribute,
            "operator": self.operator.as_str(),
            "comparison": self.comparison,
            "negation": self.negation,
        })
    }

    fn from_repr(raw: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of("norm", raw)?;
        Ok(Self {
            norm_id: fields.opt_str("id")?,
            attribute: fields.str("attribute")?,
            operator: fields.str("operator")?.parse()?,
            comparison: fields.value("comparison").cloned().unwrap_or(Value::Null),
            negation: fields.opt_bool("negation")?.unwrap_or(false),
        })
    }
}
