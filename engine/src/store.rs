//! Store - the model registry and the engine behind every model operation.
//!
//! A [`Store`] owns a registry of models and a handle to the record log.
//! [`Model`] handles run create/save/delete/find against it.
//!
//! ## Consistency
//!
//! - Writes to one model are serialized by a per-model lock held across each
//!   record's existence check and put.
//! - A find sees every write that completed before it was called. Its scan is
//!   a snapshot taken at call time: writes landing while it runs are not
//!   observed, and no record is ever seen half-written.
//! - Closing waits for in-flight operations. Afterwards every operation,
//!   including another close, fails with [`Error::Closed`].

use crate::codec;
use crate::config::StoreConfig;
use crate::log::{MemoryLog, RecordLog};
use crate::query::Query;
use crate::record::{Entity, Identity, Record};
use crate::schema::Shape;
use crate::sort::sort_records;
use crate::{error::Result, Error, ModelName};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock, RwLockReadGuard};
use std::any::{type_name, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Registry entry for one model.
#[derive(Debug)]
struct ModelState {
    name: ModelName,
    shape: Shape,
    type_id: TypeId,
    type_name: &'static str,
    /// Serializes writes to this model's collection
    write_lock: Mutex<()>,
}

struct StoreInner {
    config: StoreConfig,
    log: Arc<dyn RecordLog>,
    models: DashMap<ModelName, Arc<ModelState>>,
    /// Open/closed gate: operations hold a read guard, close takes the write side
    closed: RwLock<bool>,
}

impl StoreInner {
    fn gate(&self) -> Result<RwLockReadGuard<'_, bool>> {
        let guard = self.closed.read();
        if *guard {
            return Err(Error::Closed);
        }
        Ok(guard)
    }
}

/// Handle to a document store. Cheap to clone and safe to share between
/// threads; all clones refer to the same store.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("label", &self.inner.config.label)
            .field("models", &self.inner.models.len())
            .field("closed", &*self.inner.closed.read())
            .finish()
    }
}

impl Store {
    /// Open a store over the given log.
    pub fn open(config: StoreConfig, log: Arc<dyn RecordLog>) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, log))
    }

    /// Open a store backed by a fresh [`MemoryLog`].
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        Self::open(config, Arc::new(MemoryLog::new()))
    }

    /// Open a store with the default configuration and a fresh [`MemoryLog`].
    pub fn in_memory() -> Self {
        // The default configuration always validates.
        Self::from_parts(StoreConfig::default(), Arc::new(MemoryLog::new()))
    }

    /// Build a store from an already validated configuration.
    fn from_parts(config: StoreConfig, log: Arc<dyn RecordLog>) -> Self {
        tracing::info!(store = %config.label, "Opening store");
        Self {
            inner: Arc::new(StoreInner {
                config,
                log,
                models: DashMap::new(),
                closed: RwLock::new(false),
            }),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Register a model, using `T::default()` as the prototype.
    pub fn register<T: Entity + Default>(&self, name: impl Into<ModelName>) -> Result<Model<T>> {
        self.register_with(name, &T::default())
    }

    /// Register a model whose shape is introspected from `prototype`.
    ///
    /// Fails with [`Error::DuplicateModel`] if the name is taken and with
    /// [`Error::InvalidShape`] if the prototype has no usable field structure.
    pub fn register_with<T: Entity>(
        &self,
        name: impl Into<ModelName>,
        prototype: &T,
    ) -> Result<Model<T>> {
        let _open = self.inner.gate()?;
        let name = name.into();

        let shape = codec::prototype_shape(&name, prototype, &self.inner.config.identity_field)?;
        let state = Arc::new(ModelState {
            name: name.clone(),
            shape,
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            write_lock: Mutex::new(()),
        });

        match self.inner.models.entry(name.clone()) {
            Entry::Occupied(_) => return Err(Error::DuplicateModel(name)),
            Entry::Vacant(slot) => {
                slot.insert(state.clone());
            }
        }

        tracing::info!(
            store = %self.inner.config.label,
            model = %name,
            fields = state.shape.fields.len(),
            "Model registered"
        );

        Ok(Model::new(self.inner.clone(), state))
    }

    /// Get a handle to an already registered model.
    pub fn model<T: Entity>(&self, name: &str) -> Result<Model<T>> {
        let _open = self.inner.gate()?;
        let state = self
            .inner
            .models
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::ModelNotFound(name.to_string()))?;

        if state.type_id != TypeId::of::<T>() {
            return Err(Error::InvalidShape {
                model: name.to_string(),
                reason: format!(
                    "registered for {}, requested as {}",
                    state.type_name,
                    type_name::<T>()
                ),
            });
        }

        Ok(Model::new(self.inner.clone(), state))
    }

    /// Names of all registered models, sorted.
    pub fn model_names(&self) -> Result<Vec<ModelName>> {
        let _open = self.inner.gate()?;
        let mut names: Vec<_> = self.inner.models.iter().map(|e| e.key().clone()).collect();
        names.sort();
        Ok(names)
    }

    /// Whether the store has been closed.
    pub fn is_closed(&self) -> bool {
        *self.inner.closed.read()
    }

    /// Close the store: wait for in-flight operations, flush and release the
    /// log. Every later operation fails with [`Error::Closed`].
    pub fn close(&self) -> Result<()> {
        let mut closed = self.inner.closed.write();
        if *closed {
            return Err(Error::Closed);
        }
        *closed = true;

        // The store counts as closed even if releasing the log fails.
        self.inner.log.flush()?;
        self.inner.log.close()?;

        tracing::info!(store = %self.inner.config.label, "Store closed");
        Ok(())
    }
}

/// Typed handle to a registered model.
pub struct Model<T> {
    store: Arc<StoreInner>,
    state: Arc<ModelState>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for Model<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            state: self.state.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Model<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.state.name)
            .field("type", &self.state.type_name)
            .finish()
    }
}

impl<T: Entity> Model<T> {
    fn new(store: Arc<StoreInner>, state: Arc<ModelState>) -> Self {
        Self {
            store,
            state,
            _entity: PhantomData,
        }
    }

    /// The model (and collection) name.
    pub fn name(&self) -> &str {
        &self.state.name
    }

    /// The shape introspected at registration.
    pub fn shape(&self) -> &Shape {
        &self.state.shape
    }

    /// Create records from `values`, in order.
    ///
    /// Values without an identity get a generated one, written back into the
    /// value once its record is stored. Stops at the first failure; records
    /// created before it stay committed and values from the failed one on
    /// are left as they were. A supplied identity that already exists fails
    /// with [`Error::AlreadyExists`].
    ///
    /// `values` is drained before the store is entered.
    pub fn create<'a, I>(&self, values: I) -> Result<Vec<Identity>>
    where
        I: IntoIterator<Item = &'a mut T>,
    {
        let values: Vec<&'a mut T> = values.into_iter().collect();

        let _open = self.store.gate()?;
        let mut created = Vec::with_capacity(values.len());

        for value in values {
            let _write = self.state.write_lock.lock();
            let (id, payload) = codec::encode(&self.state.shape, value)?;

            if self.store.log.get(&self.state.name, &id)?.is_some() {
                return Err(Error::AlreadyExists {
                    collection: self.state.name.clone(),
                    id: id.to_string(),
                });
            }

            let version = self.store.log.put(&self.state.name, &id, payload)?;
            if !value.entity_id().is_assigned() {
                value.entity_id_mut().assign(id.clone());
            }

            tracing::debug!(model = %self.state.name, id = %id, version, "Record created");
            created.push(id);
        }

        Ok(created)
    }

    /// Create a single record and return its identity.
    pub fn create_one(&self, value: &mut T) -> Result<Identity> {
        let mut ids = self.create(std::iter::once(value))?;
        ids.pop()
            .ok_or_else(|| Error::InvalidPayload("nothing was created".into()))
    }

    /// Replace an existing record with `value`.
    ///
    /// Never creates: fails with [`Error::IdentityUnassigned`] when `value`
    /// has no identity and [`Error::NotFound`] when no record has it.
    pub fn save(&self, value: &T) -> Result<()> {
        let _open = self.store.gate()?;
        let (id, payload) = codec::encode_existing(&self.state.name, &self.state.shape, value)?;

        let _write = self.state.write_lock.lock();
        if self.store.log.get(&self.state.name, &id)?.is_none() {
            return Err(Error::NotFound {
                collection: self.state.name.clone(),
                id: id.to_string(),
            });
        }

        let version = self.store.log.put(&self.state.name, &id, payload)?;
        tracing::debug!(model = %self.state.name, id = %id, version, "Record saved");
        Ok(())
    }

    /// Delete a record. Deleting a missing identity succeeds.
    pub fn delete(&self, id: &Identity) -> Result<()> {
        let _open = self.store.gate()?;
        let _write = self.state.write_lock.lock();

        let existed = self.store.log.delete(&self.state.name, id)?;
        tracing::debug!(model = %self.state.name, id = %id, existed, "Record deleted");
        Ok(())
    }

    /// Whether a record with this identity exists.
    pub fn has(&self, id: &Identity) -> Result<bool> {
        let _open = self.store.gate()?;
        Ok(self.store.log.get(&self.state.name, id)?.is_some())
    }

    /// Fetch one record by identity.
    pub fn find_by_id(&self, id: &Identity) -> Result<T> {
        let _open = self.store.gate()?;
        let record = self
            .store
            .log
            .get(&self.state.name, id)?
            .ok_or_else(|| Error::NotFound {
                collection: self.state.name.clone(),
                id: id.to_string(),
            })?;
        self.decode(&record)
    }

    /// Run `query` and replace the contents of `out` with the matches.
    ///
    /// On error `out` is left untouched.
    pub fn find(&self, out: &mut Vec<T>, query: &Query) -> Result<()> {
        let _open = self.store.gate()?;
        let matches = self.matching(query)?;

        let decoded = matches
            .iter()
            .map(|record| self.decode(record))
            .collect::<Result<Vec<T>>>()?;

        tracing::debug!(
            model = %self.state.name,
            query = %query,
            results = decoded.len(),
            "Find completed"
        );

        *out = decoded;
        Ok(())
    }

    /// Run `query` and return the matches.
    pub fn query(&self, query: &Query) -> Result<Vec<T>> {
        let mut out = Vec::new();
        self.find(&mut out, query)?;
        Ok(out)
    }

    /// Count the records matching `query` without decoding them.
    pub fn count(&self, query: &Query) -> Result<usize> {
        let _open = self.store.gate()?;
        let snapshot = self.store.log.scan(&self.state.name)?;
        Ok(snapshot.iter().filter(|r| query.matches(&r.payload)).count())
    }

    /// Scan, filter and sort. Callers hold the gate.
    fn matching(&self, query: &Query) -> Result<Vec<Record>> {
        let mut records = self.store.log.scan(&self.state.name)?;
        records.retain(|r| query.matches(&r.payload));
        sort_records(&mut records, query.order());
        Ok(records)
    }

    fn decode(&self, record: &Record) -> Result<T> {
        codec::decode(&self.state.name, &self.state.shape, record).map_err(|e| {
            tracing::warn!(model = %self.state.name, id = %record.id, error = %e, "Stored record does not decode");
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntityId, Version};
    use serde::{Deserialize, Serialize};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct User {
        id: EntityId,
        name: String,
        age: i64,
    }

    impl Entity for User {
        fn entity_id(&self) -> &EntityId {
            &self.id
        }
        fn entity_id_mut(&mut self) -> &mut EntityId {
            &mut self.id
        }
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Post {
        id: EntityId,
        title: String,
    }

    impl Entity for Post {
        fn entity_id(&self) -> &EntityId {
            &self.id
        }
        fn entity_id_mut(&mut self) -> &mut EntityId {
            &mut self.id
        }
    }

    fn user(name: &str, age: i64) -> User {
        User {
            id: EntityId::unassigned(),
            name: name.into(),
            age,
        }
    }

    fn test_store() -> (Store, Model<User>) {
        let store = Store::in_memory();
        let users = store.register::<User>("users").unwrap();
        (store, users)
    }

    /// Log wrapper that starts failing puts after a fixed number of them.
    struct FailingLog {
        inner: MemoryLog,
        puts_left: AtomicUsize,
    }

    impl FailingLog {
        fn new(puts: usize) -> Self {
            Self {
                inner: MemoryLog::new(),
                puts_left: AtomicUsize::new(puts),
            }
        }
    }

    impl RecordLog for FailingLog {
        fn put(&self, collection: &str, id: &Identity, payload: Value) -> Result<Version> {
            let left = self.puts_left.load(Ordering::SeqCst);
            if left == 0 {
                return Err(Error::StorageFailure("disk full".into()));
            }
            self.puts_left.store(left - 1, Ordering::SeqCst);
            self.inner.put(collection, id, payload)
        }
        fn get(&self, collection: &str, id: &Identity) -> Result<Option<Record>> {
            self.inner.get(collection, id)
        }
        fn delete(&self, collection: &str, id: &Identity) -> Result<bool> {
            self.inner.delete(collection, id)
        }
        fn scan(&self, collection: &str) -> Result<Vec<Record>> {
            self.inner.scan(collection)
        }
        fn flush(&self) -> Result<()> {
            self.inner.flush()
        }
        fn close(&self) -> Result<()> {
            self.inner.close()
        }
    }

    #[test]
    fn register_model() {
        let (store, users) = test_store();
        assert_eq!(users.name(), "users");
        assert_eq!(users.shape().fields.len(), 3);
        assert_eq!(store.model_names().unwrap(), ["users"]);
    }

    #[test]
    fn register_duplicate() {
        let (store, _users) = test_store();
        let result = store.register::<Post>("users");
        assert_eq!(result.unwrap_err(), Error::DuplicateModel("users".into()));
    }

    #[test]
    fn register_without_identity_field() {
        let store = Store::with_config(StoreConfig::new().with_identity_field("key")).unwrap();
        let result = store.register::<User>("users");
        assert!(matches!(result, Err(Error::InvalidShape { .. })));
        assert!(store.model_names().unwrap().is_empty());
    }

    #[test]
    fn open_rejects_invalid_config() {
        let result = Store::with_config(StoreConfig::new().with_identity_field(""));
        assert!(matches!(result, Err(Error::Config(_))));

        let result = Store::open(
            StoreConfig::new().with_identity_field("meta.id"),
            Arc::new(MemoryLog::new()),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn in_memory_uses_default_config() {
        let store = Store::in_memory();
        assert_eq!(store.config(), &StoreConfig::default());
        assert!(store.config().validate().is_ok());
    }

    #[test]
    fn lookup_model() {
        let (store, _users) = test_store();
        assert!(store.model::<User>("users").is_ok());
        assert_eq!(
            store.model::<User>("posts").unwrap_err(),
            Error::ModelNotFound("posts".into())
        );
        assert!(matches!(
            store.model::<Post>("users"),
            Err(Error::InvalidShape { .. })
        ));
    }

    #[test]
    fn create_assigns_identities() {
        let (_store, users) = test_store();
        let mut alice = user("Alice", 30);
        let mut bob = user("Bob", 25);

        let ids = users.create([&mut alice, &mut bob]).unwrap();

        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        assert_eq!(alice.id.get(), Some(&ids[0]));
        assert_eq!(bob.id.get(), Some(&ids[1]));
        assert_eq!(users.find_by_id(&ids[0]).unwrap(), alice);
    }

    #[test]
    fn create_with_supplied_identity() {
        let (_store, users) = test_store();
        let mut alice = User {
            id: EntityId::assigned("alice"),
            ..user("Alice", 30)
        };
        let id = users.create_one(&mut alice).unwrap();
        assert_eq!(id.as_str(), "alice");

        let mut again = alice.clone();
        let result = users.create_one(&mut again);
        assert!(matches!(result, Err(Error::AlreadyExists { id, .. }) if id == "alice"));
    }

    #[test]
    fn create_batch_keeps_prior_puts() {
        let store = Store::open(StoreConfig::default(), Arc::new(FailingLog::new(2))).unwrap();
        let users = store.register::<User>("users").unwrap();

        let mut batch = vec![user("A", 1), user("B", 2), user("C", 3)];
        let result = users.create(batch.iter_mut());

        assert_eq!(result.unwrap_err(), Error::StorageFailure("disk full".into()));
        assert_eq!(users.count(&Query::new()).unwrap(), 2);
        assert!(users.has(batch[0].id.get().unwrap()).unwrap());
        assert!(users.has(batch[1].id.get().unwrap()).unwrap());
        // The failed value never got an identity.
        assert!(!batch[2].id.is_assigned());
    }

    #[test]
    fn create_rejected_duplicate_keeps_value_unassigned() {
        let (_store, users) = test_store();
        let mut alice = User {
            id: EntityId::assigned("alice"),
            ..user("Alice", 30)
        };
        users.create_one(&mut alice).unwrap();

        let mut fresh = user("Bob", 25);
        let result = users.create([&mut alice.clone(), &mut fresh]);
        assert!(matches!(result, Err(Error::AlreadyExists { .. })));
        assert!(!fresh.id.is_assigned());
        assert_eq!(users.count(&Query::new()).unwrap(), 1);
    }

    #[test]
    fn create_drains_values_before_entering_store() {
        let (store, users) = test_store();
        let closer = store.clone();
        let mut alice = user("Alice", 30);

        let values = std::iter::once(&mut alice).inspect(move |_| closer.close().unwrap());
        assert_eq!(users.create(values).unwrap_err(), Error::Closed);
        assert!(store.is_closed());
        assert!(!alice.id.is_assigned());
    }

    #[test]
    fn save_replaces_record() {
        let (_store, users) = test_store();
        let mut alice = user("Alice", 30);
        let id = users.create_one(&mut alice).unwrap();

        alice.age = 31;
        users.save(&alice).unwrap();

        assert_eq!(users.find_by_id(&id).unwrap().age, 31);
        assert_eq!(users.count(&Query::new()).unwrap(), 1);
    }

    #[test]
    fn save_never_creates() {
        let (_store, users) = test_store();

        let result = users.save(&user("Ghost", 0));
        assert_eq!(result.unwrap_err(), Error::IdentityUnassigned("users".into()));

        let ghost = User {
            id: EntityId::assigned("ghost"),
            ..user("Ghost", 0)
        };
        let result = users.save(&ghost);
        assert!(matches!(result, Err(Error::NotFound { id, .. }) if id == "ghost"));
        assert_eq!(users.count(&Query::new()).unwrap(), 0);
    }

    #[test]
    fn delete_is_idempotent() {
        let (_store, users) = test_store();
        let mut alice = user("Alice", 30);
        let id = users.create_one(&mut alice).unwrap();

        users.delete(&id).unwrap();
        users.delete(&id).unwrap();

        assert!(!users.has(&id).unwrap());
        assert!(matches!(users.find_by_id(&id), Err(Error::NotFound { .. })));
    }

    #[test]
    fn find_replaces_destination() {
        let (_store, users) = test_store();
        users
            .create([&mut user("Alice", 30), &mut user("Bob", 25)])
            .unwrap();

        let mut out = vec![user("Stale", 99); 5];
        users
            .find(&mut out, &Query::where_field("age").gt(26))
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Alice");
    }

    #[test]
    fn find_sorted() {
        let (_store, users) = test_store();
        users
            .create([
                &mut user("Carol", 41),
                &mut user("Alice", 30),
                &mut user("Bob", 25),
            ])
            .unwrap();

        let names = |q: Query| -> Vec<String> {
            users.query(&q).unwrap().into_iter().map(|u| u.name).collect()
        };
        assert_eq!(names(Query::new().order_by("age")), ["Bob", "Alice", "Carol"]);
        assert_eq!(names(Query::new().order_by_desc("name")), ["Carol", "Bob", "Alice"]);
    }

    #[test]
    fn find_fails_on_undecodable_record_and_keeps_destination() {
        let log = Arc::new(MemoryLog::new());
        let store = Store::open(StoreConfig::default(), log.clone()).unwrap();
        let users = store.register::<User>("users").unwrap();
        users.create_one(&mut user("Alice", 30)).unwrap();

        log.put(
            "users",
            &Identity::from("broken"),
            json!({"id": "broken", "name": "Broken", "age": "old"}),
        )
        .unwrap();

        let mut out = vec![user("Keep", 1)];
        let result = users.find(&mut out, &Query::new());
        assert!(matches!(result, Err(Error::DecodeMismatch { id, .. }) if id == "broken"));
        assert_eq!(out, vec![user("Keep", 1)]);

        // Filtering the broken record out lets the find succeed.
        let found = users.query(&Query::where_field("name").eq("Alice")).unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn models_use_separate_collections() {
        let (store, users) = test_store();
        let posts = store.register::<Post>("posts").unwrap();

        users.create_one(&mut user("Alice", 30)).unwrap();
        posts
            .create_one(&mut Post {
                id: EntityId::unassigned(),
                title: "Hello".into(),
            })
            .unwrap();

        assert_eq!(users.count(&Query::new()).unwrap(), 1);
        assert_eq!(posts.count(&Query::new()).unwrap(), 1);
    }

    #[test]
    fn closed_store_rejects_operations() {
        let log = Arc::new(MemoryLog::new());
        let store = Store::open(StoreConfig::default(), log.clone()).unwrap();
        let users = store.register::<User>("users").unwrap();
        let id = users.create_one(&mut user("Alice", 30)).unwrap();

        store.close().unwrap();
        assert!(store.is_closed());
        assert!(log.is_closed());

        assert_eq!(users.create_one(&mut user("Bob", 1)).unwrap_err(), Error::Closed);
        assert_eq!(users.save(&user("Bob", 1)).unwrap_err(), Error::Closed);
        assert_eq!(users.delete(&id).unwrap_err(), Error::Closed);
        assert_eq!(users.find_by_id(&id).unwrap_err(), Error::Closed);
        assert_eq!(users.query(&Query::new()).unwrap_err(), Error::Closed);
        assert_eq!(store.register::<Post>("posts").unwrap_err(), Error::Closed);
        assert_eq!(store.model::<User>("users").unwrap_err(), Error::Closed);
        assert_eq!(store.close().unwrap_err(), Error::Closed);
    }

    #[test]
    fn clones_share_state() {
        let (store, users) = test_store();
        let other = store.clone();
        let same_users = other.model::<User>("users").unwrap();

        users.create_one(&mut user("Alice", 30)).unwrap();
        assert_eq!(same_users.count(&Query::new()).unwrap(), 1);

        other.close().unwrap();
        assert!(store.is_closed());
    }

    #[test]
    fn concurrent_saves_do_not_interleave() {
        let (_store, users) = test_store();
        let mut alice = user("Alice", 0);
        let id = users.create_one(&mut alice).unwrap();

        std::thread::scope(|s| {
            for t in 0..8i64 {
                let users = users.clone();
                let base = alice.clone();
                s.spawn(move || {
                    for i in 0..50 {
                        let value = User {
                            name: format!("writer-{t}"),
                            age: t * 1000 + i,
                            ..base.clone()
                        };
                        users.save(&value).unwrap();
                    }
                });
            }
        });

        let stored = users.find_by_id(&id).unwrap();
        let writer: i64 = stored.name.trim_start_matches("writer-").parse().unwrap();
        assert_eq!(stored.age / 1000, writer);
    }

    #[test]
    fn concurrent_creates_and_finds() {
        let (_store, users) = test_store();

        std::thread::scope(|s| {
            for t in 0..4 {
                let users = users.clone();
                s.spawn(move || {
                    for i in 0..25 {
                        users.create_one(&mut user(&format!("u{t}-{i}"), i)).unwrap();
                    }
                });
            }
            for _ in 0..2 {
                let users = users.clone();
                s.spawn(move || {
                    for _ in 0..25 {
                        let found = users.query(&Query::new()).unwrap();
                        assert!(found.len() <= 100);
                    }
                });
            }
        });

        assert_eq!(users.count(&Query::new()).unwrap(), 100);
    }
}
