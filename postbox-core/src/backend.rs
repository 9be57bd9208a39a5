//! Storage backend abstraction for the document store.
//!
//! The [`StoreBackend`] trait is the capability interface every storage
//! implementation provides: insertion with store-assigned identifiers, batched
//! lookup by identifier, filtered scans, and a little collection management.
//! Implementations must be `Send + Sync` and safe for concurrent use; the API
//! layer shares one backend across all requests.
//!
//! ```ignore
//! use postbox_core::backend::StoreBackend;
//! use bson::{Bson, doc};
//!
//! let id = backend.insert_document(Bson::Document(doc! { "name": "Ada" }), "users").await?;
//! let docs = backend.get_documents(vec![id], "users").await?;
//! ```

use async_trait::async_trait;
use bson::{Bson, oid::ObjectId};
use std::{fmt::Debug, sync::Arc};

use crate::{error::DocumentStoreResult, query::Query};

/// Abstract interface for document storage backends.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Persists a new document and returns the identifier the store assigned to it.
    ///
    /// Any `_id` already present on `document` is replaced. Violating a unique
    /// index fails with `DocumentAlreadyExists`.
    async fn insert_document(&self, document: Bson, collection: &str) -> DocumentStoreResult<ObjectId>;

    /// Fetches every document whose identifier is in `ids`, in a single lookup.
    ///
    /// Identifiers with no matching document are silently omitted. Result
    /// order is unspecified.
    async fn get_documents(
        &self,
        ids: Vec<ObjectId>,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Bson>>;

    /// Returns the documents matching `query`. An empty query returns the whole collection.
    async fn query_documents(
        &self,
        query: Query,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Bson>>;

    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()>;

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>>;

    /// Creates an index on `field`; with `unique` set, later inserts that repeat a value fail.
    async fn add_index(
        &self,
        collection: &str,
        field: &str,
        unique: bool,
    ) -> DocumentStoreResult<()>;
}

#[async_trait]
impl<B> StoreBackend for Arc<B>
where
    B: StoreBackend + ?Sized,
{
    async fn insert_document(&self, document: Bson, collection: &str) -> DocumentStoreResult<ObjectId> {
        (**self)
            .insert_document(document, collection)
            .await
    }

    async fn get_documents(
        &self,
        ids: Vec<ObjectId>,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Bson>> {
        (**self)
            .get_documents(ids, collection)
            .await
    }

    async fn query_documents(
        &self,
        query: Query,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Bson>> {
        (**self)
            .query_documents(query, collection)
            .await
    }

    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        (**self).create_collection(name).await
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        (**self).list_collections().await
    }

    async fn add_index(
        &self,
        collection: &str,
        field: &str,
        unique: bool,
    ) -> DocumentStoreResult<()> {
        (**self)
            .add_index(collection, field, unique)
            .await
    }
}

/// Factory trait for creating backend instances.
#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> DocumentStoreResult<Self::Backend>;
}
