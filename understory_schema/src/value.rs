// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Semantic property types and value coercion.
//!
//! Property values are plain JSON values ([`Value`]). A [`SemanticType`]
//! describes what a property accepts, supplies the type default, and coerces
//! loosely typed settings input (for example the string `"true"` coming from
//! a declarative view) into the declared shape.

use core::fmt;

use serde_json::{Number, Value};

/// The declared type of a property.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use understory_schema::SemanticType;
///
/// let ty = SemanticType::parse("boolean").unwrap();
/// assert_eq!(ty.default_value(), json!(false));
/// assert_eq!(ty.coerce(json!("true")), Ok(json!(true)));
/// assert!(ty.coerce(json!("maybe")).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SemanticType {
    /// `true` / `false`.
    Boolean,
    /// A signed integer.
    Int,
    /// A floating point number.
    Float,
    /// A string.
    String,
    /// An ordered list of strings.
    StringArray,
    /// A JSON object (or `null`).
    Object,
    /// Any JSON value; never coerced, never rejected.
    Any,
    /// One of a fixed list of string values.
    Enum(Vec<String>),
}

impl SemanticType {
    /// Parses a type tag as used in static descriptors.
    ///
    /// Enumerations are not expressible as a bare tag; see
    /// [`SemanticType::Enum`] and the `values` list of a
    /// [`PropertyDescriptor`](crate::PropertyDescriptor).
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        Some(match tag {
            "boolean" | "bool" => Self::Boolean,
            "int" => Self::Int,
            "float" => Self::Float,
            "string" => Self::String,
            "string[]" => Self::StringArray,
            "object" => Self::Object,
            "any" => Self::Any,
            _ => return None,
        })
    }

    /// Returns the descriptor tag for this type.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::StringArray => "string[]",
            Self::Object => "object",
            Self::Any => "any",
            Self::Enum(_) => "enum",
        }
    }

    /// Returns the value a property of this type holds when its descriptor
    /// declares no explicit default.
    #[must_use]
    pub fn default_value(&self) -> Value {
        match self {
            Self::Boolean => Value::Bool(false),
            Self::Int => Value::from(0),
            Self::Float => Value::from(0.0),
            Self::String => Value::String(String::new()),
            Self::StringArray => Value::Array(Vec::new()),
            Self::Object | Self::Any => Value::Null,
            Self::Enum(values) => values
                .first()
                .map_or(Value::Null, |v| Value::String(v.clone())),
        }
    }

    /// Returns `true` if `value` already has the shape of this type.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Any, _) => true,
            (Self::Boolean, Value::Bool(_)) => true,
            (Self::Int, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (Self::Float, Value::Number(_)) => true,
            (Self::String, Value::String(_)) => true,
            (Self::StringArray, Value::Array(items)) => items.iter().all(Value::is_string),
            (Self::Object, Value::Object(_) | Value::Null) => true,
            (Self::Enum(values), Value::String(s)) => values.iter().any(|v| v == s),
            _ => false,
        }
    }

    /// Coerces a settings value into this type.
    ///
    /// Values that already conform are returned unchanged. On failure the
    /// original value is handed back so the caller can report it.
    pub fn coerce(&self, value: Value) -> Result<Value, Value> {
        if self.accepts(&value) {
            return Ok(value);
        }
        match (self, &value) {
            (Self::Boolean, Value::String(s)) => match s.trim() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(value),
            },
            (Self::Int, Value::String(s)) => {
                s.trim().parse::<i64>().map(Value::from).map_err(|_| value)
            }
            (Self::Int, Value::Number(n)) => match n.as_f64() {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "only integral values in range are converted"
                )]
                Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Ok(Value::from(f as i64)),
                _ => Err(value),
            },
            (Self::Float, Value::String(s)) => match s.trim().parse::<f64>() {
                Ok(f) => Number::from_f64(f).map(Value::Number).ok_or(value),
                Err(_) => Err(value),
            },
            (Self::String, Value::Number(n)) => Ok(Value::String(n.to_string())),
            (Self::String, Value::Bool(b)) => Ok(Value::String(b.to_string())),
            (Self::StringArray, Value::String(s)) => {
                Ok(Value::Array(vec![Value::String(s.clone())]))
            }
            _ => Err(value),
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enum(values) => write!(f, "enum({})", values.join("|")),
            other => f.write_str(other.tag()),
        }
    }
}
