//! Hydration: turning nested WD JSON into flat typed records.
//!
//! # Design
//! Each record type declares a `Shape`, a static table of rules consulted by
//! a single `reshape` routine:
//!
//! - `FieldMap` copies the value at a dotted source path (`style.name`) to a
//!   flat destination key (`style_name`).
//! - `Nested` reshapes a sub-object (or each element of a sub-array) with
//!   the nested type's own shape.
//! - `Derived` computes a destination value from the raw source map.
//!
//! Remaining top-level keys are copied through unless a rule consumed their
//! root or the shape ignores them. The flattened object is then handed to
//! serde, which enforces required fields and types. Unknown keys are dropped
//! by serde, unless the record captures them as custom fields.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{ApiError, Result};

/// Copy the value at `source` (dot-separated) into `dest`.
#[derive(Debug, Clone, Copy)]
pub struct FieldMap {
    pub dest: &'static str,
    pub source: &'static str,
}

/// Reshape the value at `source` with a nested record's shape and store it
/// under `dest`. Arrays are reshaped element by element.
#[derive(Debug, Clone, Copy)]
pub struct Nested {
    pub dest: &'static str,
    pub source: &'static str,
    pub reshape: fn(Value) -> Value,
}

/// Compute `dest` from the raw source object. `None` leaves it unset.
#[derive(Debug, Clone, Copy)]
pub struct Derived {
    pub dest: &'static str,
    pub compute: fn(&Map<String, Value>) -> Option<Value>,
}

/// Declarative mapping table for one record type.
#[derive(Debug, Clone, Copy)]
pub struct Shape {
    pub fields: &'static [FieldMap],
    pub nested: &'static [Nested],
    pub derived: &'static [Derived],
    /// Top-level source keys that are neither copied nor captured.
    pub ignored: &'static [&'static str],
}

impl Shape {
    /// Shape with no rules: top-level keys map by name.
    pub const FLAT: Shape = Shape {
        fields: &[],
        nested: &[],
        derived: &[],
        ignored: &[],
    };

    /// Flatten `source` according to this shape. Non-object values are
    /// returned unchanged and left for serde to reject.
    pub fn reshape(&self, source: Value) -> Value {
        let Value::Object(source) = source else {
            return source;
        };
        let mut out = Map::new();

        for rule in self.fields {
            match lookup(&source, rule.source) {
                Some(Value::Null) | None => {}
                Some(value) => {
                    out.insert(rule.dest.to_string(), value.clone());
                }
            }
        }

        for rule in self.nested {
            let reshaped = match lookup(&source, rule.source) {
                Some(Value::Null) | None => continue,
                Some(Value::Array(items)) => {
                    Value::Array(items.iter().cloned().map(rule.reshape).collect())
                }
                Some(value) => (rule.reshape)(value.clone()),
            };
            out.insert(rule.dest.to_string(), reshaped);
        }

        for rule in self.derived {
            if let Some(value) = (rule.compute)(&source) {
                out.insert(rule.dest.to_string(), value);
            }
        }

        for (key, value) in source {
            if out.contains_key(&key) || self.consumes(&key) {
                continue;
            }
            out.insert(key, value);
        }

        Value::Object(out)
    }

    fn consumes(&self, key: &str) -> bool {
        self.ignored.contains(&key)
            || self.fields.iter().any(|rule| root(rule.source) == key)
            || self.nested.iter().any(|rule| root(rule.source) == key)
    }
}

fn root(path: &str) -> &str {
    path.split('.').next().unwrap_or(path)
}

/// Resolve a dot-separated path through nested objects.
pub fn lookup<'a>(source: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = source.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// A record that can be built from a WD response object.
pub trait Hydrate: DeserializeOwned {
    /// Name used in hydration errors.
    const NAME: &'static str;

    const SHAPE: Shape = Shape::FLAT;

    fn reshape(source: Value) -> Value {
        Self::SHAPE.reshape(source)
    }

    /// # Errors
    ///
    /// `ApiError::Hydration` if `source` is not an object, a required field
    /// is missing, or a value has the wrong type.
    fn hydrate(source: Value) -> Result<Self> {
        if !source.is_object() {
            return Err(ApiError::Hydration {
                target: Self::NAME,
                reason: format!("expected an object, got {}", kind(&source)),
            });
        }
        serde_json::from_value(Self::reshape(source)).map_err(|e| ApiError::Hydration {
            target: Self::NAME,
            reason: e.to_string(),
        })
    }

    /// Hydrate every element of a JSON array.
    ///
    /// # Errors
    ///
    /// `ApiError::Response` if `source` is not an array, otherwise the first
    /// element's hydration error.
    fn hydrate_list(source: Value) -> Result<Vec<Self>> {
        match source {
            Value::Array(items) => items.into_iter().map(Self::hydrate).collect(),
            other => Err(ApiError::Response(format!(
                "expected a list of {}, got {}",
                Self::NAME,
                kind(&other)
            ))),
        }
    }
}

pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Numeric view of a JSON value that may carry a decimal as a string.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Deserializers for the loosely typed scalars the WD API emits: decimals
/// as strings, flags as `0`/`1`, codes as bare numbers.
pub mod lenient {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::{as_number, kind};

    pub fn opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            value => as_number(&value)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("expected a number, got {}", kind(&value)))),
        }
    }

    pub fn f64_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let value = Value::deserialize(deserializer)?;
        as_number(&value)
            .ok_or_else(|| D::Error::custom(format!("expected a number, got {}", kind(&value))))
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            Value::Number(n) => Ok(Some(n.to_string())),
            value => Err(D::Error::custom(format!(
                "expected a string, got {}",
                kind(&value)
            ))),
        }
    }

    pub fn string_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        opt_string(deserializer)?.ok_or_else(|| D::Error::custom("expected a string, got null"))
    }

    /// `true`/`false`, or an integer flag where only `1` is true.
    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(false),
            Value::Bool(b) => Ok(b),
            Value::Number(n) => Ok(n.as_i64() == Some(1)),
            value => Err(D::Error::custom(format!(
                "expected a boolean flag, got {}",
                kind(&value)
            ))),
        }
    }
}
