//! In-memory document storage backend for postbox.
//!
//! This crate provides a thread-safe, in-memory implementation of the
//! `StoreBackend` trait. It backs the test suite and local development runs
//! (`STORE_BACKEND=memory`).
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using an async-aware RwLock
//! - **Store-assigned identifiers** - Fresh `ObjectId`s on every insert
//! - **Filter support** - Evaluates the core query AST against stored BSON
//! - **Unique indexes** - Inserts that repeat a uniquely indexed value are rejected
//!
//! # Quick Start
//!
//! ```ignore
//! use postbox_core::store::DocumentStore;
//! use postbox_memory::InMemoryStore;
//!
//! let store = DocumentStore::new(InMemoryStore::new());
//! let users = store.typed_collection::<User>();
//! ```

#[allow(unused_extern_crates)]
extern crate self as postbox_memory;

pub mod store;
pub mod evaluator;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
