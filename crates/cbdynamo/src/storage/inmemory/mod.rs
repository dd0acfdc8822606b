//! In-memory storage backend for testing.
//!
//! This module provides an in-memory implementation of the
//! [`TableStore`](cbdynamo_core::storage::TableStore) trait. Tables live in a
//! `HashMap` wrapped in `Arc<RwLock<_>>` and must be registered with their key
//! schema before use.
//!
//! # Example
//!
//! ```rust,ignore
//! use cbdynamo::storage::inmemory::InMemoryStore;
//! use cbdynamo_core::schema::KeySchemaElement;
//!
//! let store = InMemoryStore::new();
//! store.create_table("messages", vec![KeySchemaElement::hash("message_id")], vec![]).await;
//! ```

mod store;

pub use store::{InMemoryStore, DEFAULT_PAGE_SIZE};
