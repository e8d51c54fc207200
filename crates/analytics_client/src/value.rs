use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Number, json};
use thiserror::Error;

/// A nested property mapping, as handed to `AnalyticsClient::send_event`
/// and as supplied by callers at trigger time.
pub type PropertyMap = BTreeMap<String, Value>;

/// The closed set of values that can flow through runtime and event properties.
///
/// Numbers keep their JSON representation, so integers stay integers and
/// 64-bit ids are not rounded through `f64`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Number(Number),
    Bool(bool),
    Map(PropertyMap),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    #[error("null is not a property value")]
    Null,

    #[error("arrays are not property values")]
    Array,

    #[error("number {0} has no JSON representation")]
    Number(f64),

    #[error("expected a JSON object, got {0}")]
    NotAnObject(String),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        if let Value::Number(n) = self {
            Some(n)
        } else {
            None
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().and_then(Number::as_f64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Bool(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    pub fn as_map(&self) -> Option<&PropertyMap> {
        if let Value::Map(m) = self {
            Some(m)
        } else {
            None
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::String(s) => json!(s),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::Bool(b) => json!(b),
            Value::Map(m) => serde_json::Value::Object(
                m.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = ValueError;

    /// Nulls and arrays nested inside objects are dropped; at the top level
    /// they are rejected.
    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::String(s) => Ok(Value::String(s)),
            serde_json::Value::Number(n) => Ok(Value::Number(n)),
            serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
            serde_json::Value::Object(o) => Ok(Value::Map(
                o.into_iter()
                    .filter_map(|(k, v)| Some((k, Value::try_from(v).ok()?)))
                    .collect(),
            )),
            serde_json::Value::Array(_) => Err(ValueError::Array),
            serde_json::Value::Null => Err(ValueError::Null),
        }
    }
}

/// Convert a JSON object into a `PropertyMap`.
pub fn props_from_json(value: serde_json::Value) -> Result<PropertyMap, ValueError> {
    match value {
        serde_json::Value::Object(_) => match Value::try_from(value)? {
            Value::Map(m) => Ok(m),
            other => Err(ValueError::NotAnObject(other.to_json().to_string())),
        },
        other => Err(ValueError::NotAnObject(other.to_string())),
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

impl TryFrom<f64> for Value {
    type Error = ValueError;

    /// NaN and infinities are rejected.
    fn try_from(n: f64) -> Result<Self, Self::Error> {
        Number::from_f64(n)
            .map(Value::Number)
            .ok_or(ValueError::Number(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<PropertyMap> for Value {
    fn from(m: PropertyMap) -> Self {
        Value::Map(m)
    }
}
