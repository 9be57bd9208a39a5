//! Main document store handle.
//!
//! [`DocumentStore`] owns a shared, dynamically dispatched backend. It is
//! created once at process start and hands out [`TypedCollection`] handles
//! that can be cloned freely into request contexts.
//!
//! ```ignore
//! use postbox_core::store::DocumentStore;
//!
//! let store = DocumentStore::new(backend);
//! store.ensure_collection("users").await?;
//! let users = store.typed_collection::<User>();
//! ```

use std::sync::Arc;
use tracing::info;

use crate::{
    backend::StoreBackend,
    collection::TypedCollection,
    document::Document,
    error::DocumentStoreResult,
};

#[derive(Debug, Clone)]
pub struct DocumentStore {
    backend: Arc<dyn StoreBackend>,
}

impl DocumentStore {
    pub fn new<B: StoreBackend + 'static>(backend: B) -> Self {
        Self { backend: Arc::new(backend) }
    }

    pub fn typed_collection<D: Document>(&self) -> TypedCollection<D> {
        TypedCollection::new(D::collection_name().to_string(), Arc::clone(&self.backend))
    }

    /// Creates the collection unless the backend already lists it.
    pub async fn ensure_collection(&self, name: &str) -> DocumentStoreResult<()> {
        if self
            .backend
            .list_collections()
            .await?
            .iter()
            .any(|existing| existing == name)
        {
            return Ok(());
        }

        info!(collection = %name, "creating collection");

        self.backend.create_collection(name).await
    }

    pub async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        self.backend.list_collections().await
    }

    pub async fn add_index(
        &self,
        collection: &str,
        field: &str,
        unique: bool,
    ) -> DocumentStoreResult<()> {
        info!(collection = %collection, field = %field, unique, "ensuring index");

        self.backend
            .add_index(collection, field, unique)
            .await
    }
}
