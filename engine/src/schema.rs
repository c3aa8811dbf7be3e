//! Model shapes.
//!
//! A shape is the ordered list of fields a model's records carry, each with
//! the kind its prototype serialized to. Shapes are introspected once, at
//! registration. The kinds describe the prototype only: an enum or an
//! optional struct may serialize to a different kind on another value, so
//! stored records are held to the identity field alone.

use crate::{error::Result, Error};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Kind a prototype field serialized to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "fields", rename_all = "lowercase")]
pub enum FieldKind {
    /// The record's identity
    Identity,
    String,
    Integer,
    Float,
    Boolean,
    /// Nested object with its own fields
    Object(Vec<FieldDef>),
    List,
    /// Unknown from the prototype (it was `null`)
    Any,
}

impl FieldKind {
    /// Infer the kind of a prototype value.
    pub fn infer(value: &Value) -> FieldKind {
        match value {
            Value::Null => FieldKind::Any,
            Value::Bool(_) => FieldKind::Boolean,
            Value::Number(n) if n.is_f64() => FieldKind::Float,
            Value::Number(_) => FieldKind::Integer,
            Value::String(_) => FieldKind::String,
            Value::Array(_) => FieldKind::List,
            Value::Object(map) => FieldKind::Object(infer_fields(map, None)),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Identity => "Identity",
            FieldKind::String => "String",
            FieldKind::Integer => "Integer",
            FieldKind::Float => "Float",
            FieldKind::Boolean => "Boolean",
            FieldKind::Object(_) => "Object",
            FieldKind::List => "List",
            FieldKind::Any => "Any",
        };
        f.write_str(name)
    }
}

fn value_kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "Null",
        Value::Bool(_) => "Boolean",
        Value::Number(n) if n.is_f64() => "Float",
        Value::Number(_) => "Integer",
        Value::String(_) => "String",
        Value::Array(_) => "List",
        Value::Object(_) => "Object",
    }
}

/// A named field with its prototype kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

fn infer_fields(map: &Map<String, Value>, identity_field: Option<&str>) -> Vec<FieldDef> {
    map.iter()
        .map(|(name, value)| {
            let kind = if Some(name.as_str()) == identity_field {
                FieldKind::Identity
            } else {
                FieldKind::infer(value)
            };
            FieldDef::new(name.clone(), kind)
        })
        .collect()
}

/// The shape of a model's records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    /// Top-level fields in declaration order
    pub fields: Vec<FieldDef>,
    /// Name of the identity field
    pub identity_field: String,
}

impl Shape {
    /// Introspect a shape from a serialized prototype.
    ///
    /// The prototype must be an object containing `identity_field`.
    pub fn from_prototype(model: &str, prototype: &Value, identity_field: &str) -> Result<Self> {
        let map = prototype.as_object().ok_or_else(|| Error::InvalidShape {
            model: model.to_string(),
            reason: format!(
                "prototype serializes to {}, expected an object",
                value_kind_name(prototype)
            ),
        })?;

        if !map.contains_key(identity_field) {
            return Err(Error::InvalidShape {
                model: model.to_string(),
                reason: format!("missing identity field '{}'", identity_field),
            });
        }

        Ok(Self {
            fields: infer_fields(map, Some(identity_field)),
            identity_field: identity_field.to_string(),
        })
    }

    /// Look up a top-level field.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check a stored payload against this shape.
    ///
    /// The payload must be an object, and its identity field, when present,
    /// must be a string. Returns a human-readable reason on mismatch.
    pub fn check(&self, payload: &Value) -> std::result::Result<(), String> {
        let map = payload.as_object().ok_or_else(|| {
            format!(
                "payload is {}, expected an object",
                value_kind_name(payload)
            )
        })?;

        match map.get(&self.identity_field) {
            None | Some(Value::String(_)) => Ok(()),
            Some(other) => Err(format!(
                "field '{}': expected {}, got {}",
                self.identity_field,
                FieldKind::Identity,
                value_kind_name(other)
            )),
        }
    }
}
