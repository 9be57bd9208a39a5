//! GraphQL API over a users/posts/comments document store.
//!
//! The server exposes read queries for all three entity types and a single
//! `createUser` mutation. Users hold references to their posts, comments and
//! liked posts; `User.posts` and `User.comments` are resolved lazily from
//! those references with one batched lookup each.
//!
//! # Layout
//!
//! - [`resolvers`] - data access behind every GraphQL field, returning [`error::ApiError`]
//! - [`schema`] - async-graphql objects delegating to the resolvers
//! - [`context`] - per-request collection handles and store preparation
//! - [`config`] - environment configuration
//!
//! # Quick Start
//!
//! ```ignore
//! use postbox::{config::GraphQLConfig, context::{Collections, prepare_store}, memory::InMemoryStore, schema::build_schema, store::DocumentStore};
//!
//! let store = DocumentStore::new(InMemoryStore::new());
//! prepare_store(&store).await?;
//!
//! let collections = Collections::new(&store);
//! let schema = build_schema(&GraphQLConfig::default());
//!
//! let request = async_graphql::Request::new("{ users { id name } }");
//! let response = schema.execute(collections.attach(request)).await;
//! ```
//!
//! # Backends
//!
//! - [`memory`] - in-memory storage for development and tests
//! - [`mongodb`] - MongoDB storage (requires the `mongodb` feature)

pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod password;
pub mod resolvers;
pub mod schema;

pub use postbox_core::{backend, collection, document, id, query, store};
pub use postbox_core::error::{DocumentStoreError, DocumentStoreResult};

pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use postbox_memory::{InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use postbox_mongodb::{MongoDbStore, MongoDbStoreBuilder};
}
