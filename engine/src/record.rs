//! Record and identity types.

use crate::{CollectionName, Version};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a record within its collection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Generate a fresh identity from 128 random bits.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for Identity {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<Identity> for serde_json::Value {
    fn from(id: Identity) -> Self {
        serde_json::Value::String(id.0)
    }
}

impl From<&Identity> for serde_json::Value {
    fn from(id: &Identity) -> Self {
        serde_json::Value::String(id.0.clone())
    }
}

/// Identity slot carried by a typed entity: either assigned, or waiting for
/// the store to generate one on create.
///
/// Serializes as the identity string, or `null` while unassigned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Option<Identity>);

impl EntityId {
    /// An unassigned identity.
    pub fn unassigned() -> Self {
        Self(None)
    }

    /// An identity chosen by the caller.
    pub fn assigned(id: impl Into<Identity>) -> Self {
        Self(Some(id.into()))
    }

    pub fn is_assigned(&self) -> bool {
        self.0.is_some()
    }

    pub fn get(&self) -> Option<&Identity> {
        self.0.as_ref()
    }

    pub(crate) fn assign(&mut self, id: Identity) {
        self.0 = Some(id);
    }
}

impl From<Identity> for EntityId {
    fn from(id: Identity) -> Self {
        Self(Some(id))
    }
}

/// A typed value that can be stored in a model.
///
/// The identity slot must serialize under the store's configured identity
/// field (`"id"` by default).
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use tome_engine::{Entity, EntityId};
///
/// #[derive(Debug, Default, Serialize, Deserialize)]
/// struct Book {
///     id: EntityId,
///     title: String,
/// }
///
/// impl Entity for Book {
///     fn entity_id(&self) -> &EntityId {
///         &self.id
///     }
///     fn entity_id_mut(&mut self) -> &mut EntityId {
///         &mut self.id
///     }
/// }
/// ```
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    fn entity_id(&self) -> &EntityId;
    fn entity_id_mut(&mut self) -> &mut EntityId;
}

/// A stored record, as held by the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Identity within the collection
    pub id: Identity,
    /// Collection (model name) this record belongs to
    pub collection: CollectionName,
    /// The encoded payload
    pub payload: serde_json::Value,
    /// Version assigned by the log, incremented on each put
    pub version: Version,
}

impl Record {
    pub fn new(
        id: impl Into<Identity>,
        collection: impl Into<CollectionName>,
        payload: serde_json::Value,
        version: Version,
    ) -> Self {
        Self {
            id: id.into(),
            collection: collection.into(),
            payload,
            version,
        }
    }
}
