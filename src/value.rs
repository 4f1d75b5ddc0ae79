//! Helpers for the engine's typed values.
//!
//! `proto::Value` carries event data and execution inputs/outputs. These
//! constructors keep call sites free of nested `Kind` literals, and the JSON
//! bridge is used to log structured payloads.

use std::collections::HashMap;

use crate::proto::value::Kind;
use crate::proto::{ListValue, NullValue, Struct, Value};

impl Value {
    pub fn null() -> Self {
        Self {
            kind: Some(Kind::NullValue(NullValue::NullValue as i32)),
        }
    }

    /// String payload, if this value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            Some(Kind::StringValue(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            Some(Kind::BoolValue(b)) => Some(b),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match &self.kind {
            None | Some(Kind::NullValue(_)) => serde_json::Value::Null,
            Some(Kind::NumberValue(n)) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Some(Kind::StringValue(s)) => serde_json::Value::String(s.clone()),
            Some(Kind::BoolValue(b)) => serde_json::Value::Bool(*b),
            Some(Kind::StructValue(s)) => s.to_json(),
            Some(Kind::ListValue(list)) => {
                serde_json::Value::Array(list.values.iter().map(Value::to_json).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self {
            kind: Some(Kind::StringValue(s)),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self {
            kind: Some(Kind::BoolValue(b)),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self {
            kind: Some(Kind::NumberValue(n)),
        }
    }
}

impl From<Struct> for Value {
    fn from(s: Struct) -> Self {
        Self {
            kind: Some(Kind::StructValue(s)),
        }
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Self {
            kind: Some(Kind::ListValue(ListValue { values })),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::null(),
            serde_json::Value::Bool(b) => b.into(),
            serde_json::Value::Number(n) => n.as_f64().unwrap_or_default().into(),
            serde_json::Value::String(s) => s.into(),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(Value::from)
                .collect::<Vec<_>>()
                .into(),
            serde_json::Value::Object(map) => map.into_iter().collect::<Struct>().into(),
        }
    }
}

impl Struct {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// String value of `field`, `None` when missing or not a string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl<K, V> FromIterator<(K, V)> for Struct
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect::<HashMap<_, _>>(),
        }
    }
}
