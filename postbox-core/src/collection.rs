//! Typed collection handles.
//!
//! A [`TypedCollection`] binds a document type to its collection name and a
//! shared backend. Handles are cheap to clone and own their backend reference,
//! so they can be stored in long-lived contexts and passed into every request.
//!
//! ```ignore
//! let users = store.typed_collection::<User>();
//! let everyone = users.find_all().await?;
//! let taken = users.exists_by_field("email", "ada@example.com").await?;
//! ```

use bson::{Bson, oid::ObjectId};
use std::{fmt, marker::PhantomData, sync::Arc};
use tracing::debug;

use crate::{
    backend::StoreBackend,
    document::{Document, DocumentExt},
    error::DocumentStoreResult,
    query::{Filter, Query},
};

pub struct TypedCollection<D: Document> {
    name: String,
    backend: Arc<dyn StoreBackend>,
    _marker: PhantomData<fn() -> D>,
}

impl<D: Document> Clone for TypedCollection<D> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            backend: Arc::clone(&self.backend),
            _marker: PhantomData,
        }
    }
}

impl<D: Document> fmt::Debug for TypedCollection<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedCollection")
            .field("name", &self.name)
            .field("backend", &self.backend)
            .finish()
    }
}

impl<D: Document> TypedCollection<D> {
    pub(crate) fn new(name: String, backend: Arc<dyn StoreBackend>) -> Self {
        Self { name, backend, _marker: PhantomData }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns every document in the collection.
    pub async fn find_all(&self) -> DocumentStoreResult<Vec<D>> {
        self.query(Query::new()).await
    }

    /// Looks up exactly one document by identifier.
    pub async fn find_by_id(&self, id: &ObjectId) -> DocumentStoreResult<Option<D>> {
        Ok(self
            .find_by_ids(std::slice::from_ref(id))
            .await?
            .into_iter()
            .next())
    }

    /// Fetches all documents whose identifier is in `ids` with one backend call.
    ///
    /// Unknown identifiers are omitted from the result.
    pub async fn find_by_ids(&self, ids: &[ObjectId]) -> DocumentStoreResult<Vec<D>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        debug!(collection = %self.name, count = ids.len(), "batched lookup");

        self.backend
            .get_documents(ids.to_vec(), &self.name)
            .await?
            .into_iter()
            .map(D::from_bson)
            .collect()
    }

    /// Persists `document` and returns it carrying the store-assigned identifier.
    pub async fn insert(&self, document: D) -> DocumentStoreResult<D> {
        let id = self
            .backend
            .insert_document(document.to_bson()?, &self.name)
            .await?;

        debug!(collection = %self.name, %id, "document inserted");

        Ok(document.with_id(id))
    }

    /// Returns whether any document has `field` equal to `value`.
    pub async fn exists_by_field(
        &self,
        field: &str,
        value: impl Into<Bson>,
    ) -> DocumentStoreResult<bool> {
        Ok(!self
            .backend
            .query_documents(
                Query::builder()
                    .filter(Filter::eq(field, value))
                    .limit(1)
                    .build(),
                &self.name,
            )
            .await?
            .is_empty())
    }

    pub async fn query(&self, query: Query) -> DocumentStoreResult<Vec<D>> {
        self.backend
            .query_documents(query, &self.name)
            .await?
            .into_iter()
            .map(D::from_bson)
            .collect()
    }
}
