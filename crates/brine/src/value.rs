/*
 * value.rs
 * Copyright (c) 2026 The brine developers
 */

//! Runtime values.
//!
//! [`Value`] is the data type templates are rendered against. Callers can
//! build values directly or convert them from `serde_json::Value`.
//!
//! Two rules here are deliberate policy and covered by tests:
//!
//! - **Truthiness**: only `nil`, the undefined sentinel and `false` are
//!   falsy. Empty strings, zero and empty collections are truthy.
//! - **Mixed-type comparison**: `==` compares Integer/Float numerically,
//!   treats `nil` and undefined as equal, and reports any other cross-type
//!   pair as not equal. The ordering operators are defined for
//!   number/number and string/string only; anything else is a type error.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::error::{TemplateError, TemplateResult};

/// A template runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The `nil` literal / JSON null.
    Nil,

    /// The result of resolving a missing path in lenient mode. Renders as
    /// empty text and is falsy; never supplied by callers.
    Undefined,

    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),

    /// String-keyed mapping. A `BTreeMap` keeps iteration and output
    /// deterministic.
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Truthiness for conditionals: `nil`, undefined and `false` are falsy,
    /// everything else (including `""`, `0`, `[]`, `{}`) is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Undefined | Value::Bool(false))
    }

    /// A human-readable type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Undefined => "undefined",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Render this value to output text.
    ///
    /// Arrays concatenate their rendered elements; objects render as JSON;
    /// floats use `{:?}` so `42.0` does not collapse to `42`.
    pub fn render_to_string(&self) -> String {
        match self {
            Value::Nil | Value::Undefined => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => format!("{f:?}"),
            Value::String(s) => s.clone(),
            Value::Array(items) => items.iter().map(|v| v.render_to_string()).collect(),
            Value::Object(_) => serde_json::to_string(self).unwrap_or_default(),
        }
    }

    /// True for `""`, `[]` and `{}` — the values the `empty` keyword
    /// compares equal to.
    pub fn is_empty_value(&self) -> bool {
        match self {
            Value::String(s) => s.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }

    /// True for everything `blank` compares equal to: empty or
    /// whitespace-only strings, empty collections, `nil` and `false`.
    pub fn is_blank_value(&self) -> bool {
        match self {
            Value::String(s) => s.trim().is_empty(),
            Value::Nil | Value::Undefined | Value::Bool(false) => true,
            _ => self.is_empty_value(),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Equality under the documented mixed-type rule.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                *a as f64 == *b
            }
            (Value::Nil | Value::Undefined, Value::Nil | Value::Undefined) => true,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equals(y))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.equals(vb))
            }
            _ => self == other,
        }
    }

    /// Ordering under the documented rule: numbers order numerically
    /// (mixed integer/float is fine), strings lexicographically, and any
    /// other operand pair is a type error.
    pub fn compare(&self, other: &Value) -> TemplateResult<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Ok(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).ok_or_else(|| {
                    TemplateError::type_error("cannot order NaN")
                }),
                _ => Err(TemplateError::type_error(format!(
                    "cannot order {} and {}",
                    self.type_name(),
                    other.type_name()
                ))),
            },
        }
    }

    /// The `contains` operator: substring test on strings, membership on
    /// arrays, key test on objects. Anything else is a type error.
    pub fn contains(&self, needle: &Value) -> TemplateResult<bool> {
        match self {
            Value::String(s) => Ok(s.contains(&needle.render_to_string())),
            Value::Array(items) => Ok(items.iter().any(|v| v.equals(needle))),
            Value::Object(map) => match needle {
                Value::String(key) => Ok(map.contains_key(key)),
                other => Err(TemplateError::type_error(format!(
                    "object membership requires a string key, not {}",
                    other.type_name()
                ))),
            },
            other => Err(TemplateError::type_error(format!(
                "'contains' requires a string, array or object on the left, not {}",
                other.type_name()
            ))),
        }
    }
}

// Nil and Undefined both serialize as null, matching how they render.
impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Nil | Value::Undefined => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => items.serialize(serializer),
            Value::Object(map) => map.serialize(serializer),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Nil | Value::Undefined => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Integer(i) => serde_json::Value::from(i),
            Value::Float(f) => serde_json::Value::from(f),
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
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
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}
