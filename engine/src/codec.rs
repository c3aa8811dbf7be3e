//! Record codec: conversion between typed entities and stored payloads.
//!
//! Each registered model gets its codec by monomorphization over the entity
//! type, so no runtime reflection is involved. Decoding trusts the entity's
//! own deserializer; a record it rejects is a [`DecodeMismatch`](Error::DecodeMismatch).

use crate::record::{Entity, Identity, Record};
use crate::schema::Shape;
use crate::{error::Result, Error};
use serde::Deserialize;
use serde_json::Value;

/// Introspect the shape of a prototype entity.
pub fn prototype_shape<T: Entity>(model: &str, prototype: &T, identity_field: &str) -> Result<Shape> {
    let value = serde_json::to_value(prototype).map_err(|e| Error::InvalidShape {
        model: model.to_string(),
        reason: e.to_string(),
    })?;
    Shape::from_prototype(model, &value, identity_field)
}

/// Encode an entity into a payload.
///
/// An unassigned identity is replaced by a freshly generated one. `value`
/// itself is not touched; the store writes the identity back once the
/// record is committed. The identity field of the payload always holds the
/// returned identity.
pub fn encode<T: Entity>(shape: &Shape, value: &T) -> Result<(Identity, Value)> {
    let id = value
        .entity_id()
        .get()
        .cloned()
        .unwrap_or_else(Identity::generate);
    let payload = to_payload(shape, value, &id)?;
    Ok((id, payload))
}

/// Encode an entity that must already carry an identity.
pub fn encode_existing<T: Entity>(model: &str, shape: &Shape, value: &T) -> Result<(Identity, Value)> {
    let id = value
        .entity_id()
        .get()
        .cloned()
        .ok_or_else(|| Error::IdentityUnassigned(model.to_string()))?;
    let payload = to_payload(shape, value, &id)?;
    Ok((id, payload))
}

fn to_payload<T: Entity>(shape: &Shape, value: &T, id: &Identity) -> Result<Value> {
    let mut payload =
        serde_json::to_value(value).map_err(|e| Error::InvalidPayload(e.to_string()))?;
    let map = payload
        .as_object_mut()
        .ok_or_else(|| Error::InvalidPayload("entity must serialize to an object".into()))?;
    map.insert(shape.identity_field.clone(), Value::from(id));
    Ok(payload)
}

/// Decode a stored record into an entity.
///
/// The shape only vouches for the identity field. Everything else is up to
/// `T`'s deserializer, so fields whose serialized kind varies with their
/// value (enums, optional structs) decode as long as `T` accepts them.
pub fn decode<T: Entity>(model: &str, shape: &Shape, record: &Record) -> Result<T> {
    let mismatch = |reason: String| Error::DecodeMismatch {
        model: model.to_string(),
        id: record.id.to_string(),
        reason,
    };

    shape.check(&record.payload).map_err(mismatch)?;
    let mut value = T::deserialize(&record.payload).map_err(|e| mismatch(e.to_string()))?;

    if !value.entity_id().is_assigned() {
        value.entity_id_mut().assign(record.id.clone());
    }
    Ok(value)
}
