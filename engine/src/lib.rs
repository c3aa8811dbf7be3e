//! # Tome Engine
//!
//! A typed, schema-flexible local document store.
//!
//! Applications register named record types ("models"), create, save and
//! delete typed values, and answer composable boolean queries over arbitrary
//! nested fields with multi-key sorting.
//!
//! ## Design Principles
//!
//! - **Storage is a collaborator**: the store talks to a [`RecordLog`] and
//!   knows nothing about files or replication
//! - **Total evaluation**: missing fields and kind mismatches are plain
//!   non-matches, never errors
//! - **Immutable queries**: every builder step returns a new value
//! - **Explicit lifecycle**: a [`Store`] is opened, shared, and closed
//!
//! ## Core Concepts
//!
//! ### Models
//!
//! A model maps a name to a [`Shape`] introspected from a prototype value.
//! Any type implementing [`Entity`] (serde plus an [`EntityId`] slot) can be
//! registered. Names are unique within a store.
//!
//! ### Queries
//!
//! [`Query`] builds an expression tree of [`Predicate`]s:
//! - `Query::where_field("author").eq("Herbert")` - a single predicate
//! - `.and(path)` / `.or(query)` / `.not()` - combinators
//! - `.order_by(path)` / `.order_by_desc(path)` - ordering keys
//!
//! Field paths are dot-separated (`"meta.total_reads"`) and descend through
//! nested objects.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use tome_engine::{Entity, EntityId, Query, Store};
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct Book {
//!     id: EntityId,
//!     title: String,
//!     reads: u64,
//! }
//!
//! impl Entity for Book {
//!     fn entity_id(&self) -> &EntityId {
//!         &self.id
//!     }
//!     fn entity_id_mut(&mut self) -> &mut EntityId {
//!         &mut self.id
//!     }
//! }
//!
//! // 1. Open a store and register a model
//! let store = Store::in_memory();
//! let books = store.register::<Book>("books").unwrap();
//!
//! // 2. Create records
//! let mut dune = Book { title: "Dune".into(), reads: 150, ..Default::default() };
//! let mut emma = Book { title: "Emma".into(), reads: 100, ..Default::default() };
//! books.create([&mut dune, &mut emma]).unwrap();
//! assert!(dune.id.is_assigned());
//!
//! // 3. Query them
//! let popular = books
//!     .query(&Query::where_field("reads").gt(120).order_by("title"))
//!     .unwrap();
//! assert_eq!(popular.len(), 1);
//! assert_eq!(popular[0].title, "Dune");
//!
//! // 4. Close
//! store.close().unwrap();
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod log;
pub mod path;
pub mod predicate;
pub mod query;
pub mod record;
pub mod schema;
pub mod sort;
pub mod store;

// Re-export main types at crate root
pub use config::{ConfigError, StoreConfig};
pub use error::{Error, Result};
pub use log::{MemoryLog, RecordLog};
pub use path::FieldPath;
pub use predicate::{Op, Predicate};
pub use query::{Criterion, Expr, Query};
pub use record::{Entity, EntityId, Identity, Record};
pub use schema::{FieldDef, FieldKind, Shape};
pub use sort::{Direction, OrderSpec};
pub use store::{Model, Store};

/// Type aliases for clarity
pub type ModelName = String;
pub type CollectionName = String;
pub type Version = u64;
