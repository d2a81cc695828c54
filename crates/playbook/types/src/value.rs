//! Loosely-typed values for step inputs and outputs
//!
//! Playbook steps are authored declaratively, so their inputs cannot
//! be statically typed. `Value` is the closed union the engine moves
//! around; typed access happens at the step-context seam via
//! [`FromValue`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Value ────────────────────────────────────────────────────────────

/// A loosely-typed input/output value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Map(HashMap<String, Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Render the value as the string a human would have typed.
    ///
    /// Scalars render bare (no quotes); lists and maps render as JSON.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Value::Bool(b) => b.to_string(),
            Value::List(_) | Value::Map(_) => {
                serde_json::to_string(self).unwrap_or_default()
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

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(entries: HashMap<String, Value>) -> Self {
        Value::Map(entries)
    }
}

// ── Typed extraction ─────────────────────────────────────────────────

/// Conversion from a [`Value`] into a concrete type.
///
/// Used by the step context's typed getters. Conversions are
/// shape-strict except for `String`, which also renders scalars —
/// declaratively authored inputs routinely hold `5` where the action
/// reads a string.
pub trait FromValue: Sized {
    /// Human-readable description of the expected shape, used in
    /// input validation errors.
    fn expected() -> &'static str;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    fn expected() -> &'static str {
        "any value"
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for String {
    fn expected() -> &'static str {
        "a string"
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(_) | Value::Map(_) => None,
            scalar => Some(scalar.to_display_string()),
        }
    }
}

impl FromValue for f64 {
    fn expected() -> &'static str {
        "a number"
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(*n),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn expected() -> &'static str {
        "an integer"
    }

    fn from_value(value: &Value) -> Option<Self> {
        let n = f64::from_value(value)?;
        if n.fract() == 0.0 {
            Some(n as i64)
        } else {
            None
        }
    }
}

impl FromValue for bool {
    fn expected() -> &'static str {
        "a boolean"
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

impl FromValue for Vec<Value> {
    fn expected() -> &'static str {
        "a list"
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_list().map(|items| items.to_vec())
    }
}

impl FromValue for HashMap<String, Value> {
    fn expected() -> &'static str {
        "a map"
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_map().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_serde_round_trip() {
        let value = Value::Map(HashMap::from([
            ("channel".to_string(), Value::String("#ops".to_string())),
            ("retries".to_string(), Value::Number(3.0)),
            ("urgent".to_string(), Value::Bool(true)),
            (
                "tags".to_string(),
                Value::List(vec![Value::String("a".into()), Value::String("b".into())]),
            ),
        ]));

        let json = serde_json::to_string(&value).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_deserializes_plain_json() {
        let value: Value = serde_json::from_str(r#"{"seconds": 30}"#).unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.get("seconds").unwrap().as_number(), Some(30.0));
    }

    #[test]
    fn test_string_conversion_renders_scalars() {
        assert_eq!(String::from_value(&Value::Number(5.0)), Some("5".to_string()));
        assert_eq!(String::from_value(&Value::Bool(true)), Some("true".to_string()));
        assert_eq!(
            String::from_value(&Value::String("hi".into())),
            Some("hi".to_string())
        );
        assert_eq!(String::from_value(&Value::List(vec![])), None);
    }

    #[test]
    fn test_number_conversion_parses_strings() {
        assert_eq!(f64::from_value(&Value::String(" 2.5 ".into())), Some(2.5));
        assert_eq!(f64::from_value(&Value::String("nope".into())), None);
        assert_eq!(i64::from_value(&Value::Number(3.0)), Some(3));
        assert_eq!(i64::from_value(&Value::Number(3.5)), None);
    }

    #[test]
    fn test_bool_conversion() {
        assert_eq!(bool::from_value(&Value::String("TRUE".into())), Some(true));
        assert_eq!(bool::from_value(&Value::String("false".into())), Some(false));
        assert_eq!(bool::from_value(&Value::Number(1.0)), None);
    }

    #[test]
    fn test_display_string() {
        assert_eq!(Value::Number(3.5).to_display_string(), "3.5");
        assert_eq!(Value::Number(4.0).to_display_string(), "4");
        assert_eq!(
            Value::List(vec![Value::Number(1.0)]).to_display_string(),
            "[1.0]"
        );
    }
}
