//! MongoDB backend implementation for postbox.
//!
//! This crate provides a MongoDB-based implementation of the `StoreBackend`
//! trait. Identifiers are the server-assigned `ObjectId`s, batched lookups use
//! `$in`, and unique index violations surface as `DocumentAlreadyExists`.
//!
//! # Connection
//!
//! The builder takes a connection string and database name and pings the
//! server before returning, so a bad `MONGO_URL` fails at startup.
//!
//! ```ignore
//! use postbox_core::backend::StoreBackendBuilder;
//! use postbox_mongodb::MongoDbStore;
//!
//! let backend = MongoDbStore::builder("mongodb://localhost:27017", "P5DB")
//!     .build()
//!     .await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as postbox_mongodb;

pub mod store;
pub mod query;

pub use store::{MongoDbStore, MongoDbStoreBuilder};
