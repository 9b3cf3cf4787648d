//! Records module
//!
//! Generic typed access to remote tables: schemas, the `Entity` trait and
//! the `RecordClient` every entity service is built from.

pub mod client;
pub mod entity;
pub mod locks;
pub mod schema;

pub use client::RecordClient;
pub use entity::{Entity, Reference};
pub use locks::KeyLocks;
pub use schema::{NameRule, NameTemplate, SchemaField, TableSchema, TableSchemaBuilder};
