//! In-memory storage implementation for document stores.
//!
//! Documents are kept as BSON values in ordered maps behind async-aware
//! read-write locks.

use std::{collections::{BTreeMap, HashMap, HashSet}, sync::Arc};
use async_trait::async_trait;
use mea::rwlock::RwLock;
use bson::{Bson, oid::ObjectId};
use tracing::debug;

use postbox_core::{
    query::Query,
    error::{DocumentStoreError, DocumentStoreResult},
    backend::{StoreBackend, StoreBackendBuilder},
};

use crate::evaluator::{DocumentEvaluator, Comparable};

type CollectionMap = BTreeMap<ObjectId, Bson>;
type StoreMap = HashMap<String, CollectionMap>;
type UniqueIndexMap = HashMap<String, Vec<String>>;


/// Thread-safe in-memory document storage backend.
///
/// `InMemoryStore` is cloneable and uses `Arc`-wrapped internal state, so
/// clones share the same data. Scans iterate documents in identifier order,
/// which makes repeated reads without intervening writes return identical
/// sequences.
///
/// Unique indexes are honoured on insert; non-unique indexes are accepted and
/// ignored.
///
/// # Example
///
/// ```ignore
/// use postbox_memory::InMemoryStore;
/// use postbox_core::backend::StoreBackend;
/// use bson::{Bson, doc};
///
/// let store = InMemoryStore::new();
/// let id = store.insert_document(Bson::Document(doc! { "name": "Ada" }), "users").await?;
/// let docs = store.get_documents(vec![id], "users").await?;
/// assert_eq!(docs.len(), 1);
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// collection_name -> (document_id -> document)
    store: Arc<RwLock<StoreMap>>,
    /// collection_name -> uniquely indexed fields
    unique_indexes: Arc<RwLock<UniqueIndexMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for constructing an `InMemoryStore`.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }
}

/// Returns the first uniquely indexed field of `document` whose value is already taken.
fn find_unique_conflict<'a>(
    collection_map: &CollectionMap,
    unique_fields: &'a [String],
    document: &bson::Document,
) -> Option<(&'a str, String)> {
    unique_fields.iter().find_map(|field| {
        let value = document.get(field)?;
        let candidate = Comparable::from(value);

        collection_map
            .values()
            .filter_map(|existing| existing.as_document()?.get(field))
            .any(|existing| Comparable::from(existing) == candidate)
            .then(|| (field.as_str(), display_value(value)))
    })
}

fn display_value(value: &Bson) -> String {
    match value {
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn insert_document(&self, document: Bson, collection: &str) -> DocumentStoreResult<ObjectId> {
        let mut document = match document {
            Bson::Document(doc) => doc,
            other => return Err(DocumentStoreError::InvalidDocument(
                format!("expected a document, got {:?}", other.element_type())
            )),
        };

        let unique_fields = self.unique_indexes
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default();

        let mut store = self.store.write().await;
        let collection_map = store
            .entry(collection.to_string())
            .or_default();

        if let Some((field, value)) = find_unique_conflict(collection_map, &unique_fields, &document) {
            debug!(collection = %collection, field = %field, "unique index violation");

            return Err(DocumentStoreError::DocumentAlreadyExists(value, collection.to_string()));
        }

        let id = ObjectId::new();
        document.insert("_id", id);
        collection_map.insert(id, Bson::Document(document));

        Ok(id)
    }

    async fn get_documents(&self, ids: Vec<ObjectId>, collection: &str) -> DocumentStoreResult<Vec<Bson>> {
        let store = self.store.read().await;
        let collection_map = match store.get(collection) {
            Some(col) => col,
            None => return Ok(vec![]),
        };

        let mut seen = HashSet::with_capacity(ids.len());
        let mut documents = Vec::with_capacity(ids.len());

        for id in ids {
            if !seen.insert(id) {
                continue;
            }

            if let Some(doc) = collection_map.get(&id) {
                documents.push(doc.clone());
            }
        }

        Ok(documents)
    }

    async fn query_documents(&self, query: Query, collection: &str) -> DocumentStoreResult<Vec<Bson>> {
        let store = self.store.read().await;
        let collection_map = match store.get(collection) {
            Some(col) => col,
            None => return Ok(vec![]),
        };

        let filtered_docs = match &query.filter {
            Some(filter) => DocumentEvaluator::filter_documents(
                collection_map.values(),
                filter,
            )?,
            None => collection_map
                .values()
                .cloned()
                .collect::<Vec<_>>(),
        };

        Ok(
            filtered_docs
                .into_iter()
                .take(query.limit.unwrap_or(usize::MAX))
                .collect()
        )
    }

    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        self.store
            .write()
            .await
            .entry(name.to_string())
            .or_default();

        Ok(())
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        Ok(
            self.store
                .read()
                .await
                .keys()
                .cloned()
                .collect()
        )
    }

    async fn add_index(&self, collection: &str, field: &str, unique: bool) -> DocumentStoreResult<()> {
        // Only unique indexes change behaviour in memory
        if !unique {
            return Ok(());
        }

        let store = self.store.read().await;

        if let Some(collection_map) = store.get(collection) {
            let mut seen: Vec<Comparable<'_>> = Vec::new();

            for value in collection_map
                .values()
                .filter_map(|doc| doc.as_document()?.get(field))
            {
                let value = Comparable::from(value);

                if seen.contains(&value) {
                    return Err(DocumentStoreError::DocumentAlreadyExists(
                        format!("duplicate values for unique field {field}"),
                        collection.to_string(),
                    ));
                }

                seen.push(value);
            }
        }

        let mut indexes = self.unique_indexes.write().await;
        let fields = indexes
            .entry(collection.to_string())
            .or_default();

        if !fields.iter().any(|existing| existing == field) {
            fields.push(field.to_string());
        }

        Ok(())
    }
}

/// Builder for constructing [`InMemoryStore`] instances.
#[derive(Default)]
pub struct InMemoryStoreBuilder;

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        Ok(InMemoryStore::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn user(email: &str) -> Bson {
        Bson::Document(doc! { "name": "someone", "email": email })
    }

    #[tokio::test]
    async fn insert_assigns_fresh_identifiers() {
        let store = InMemoryStore::new();

        let first = store.insert_document(user("a@example.com"), "users").await.unwrap();
        let second = store.insert_document(user("b@example.com"), "users").await.unwrap();
        assert_ne!(first, second);

        let docs = store.get_documents(vec![first], "users").await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].as_document().unwrap().get_object_id("_id").unwrap(), first);
    }

    #[tokio::test]
    async fn insert_replaces_caller_id() {
        let store = InMemoryStore::new();
        let supplied = ObjectId::new();

        let assigned = store
            .insert_document(Bson::Document(doc! { "_id": supplied, "name": "x" }), "users")
            .await
            .unwrap();

        assert_ne!(assigned, supplied);
        assert!(store.get_documents(vec![supplied], "users").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_documents_omits_missing_and_duplicate_ids() {
        let store = InMemoryStore::new();
        let id = store.insert_document(user("a@example.com"), "users").await.unwrap();

        let docs = store
            .get_documents(vec![id, ObjectId::new(), id], "users")
            .await
            .unwrap();

        assert_eq!(docs.len(), 1);
        assert!(store.get_documents(vec![id], "nowhere").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unique_index_rejects_duplicates() {
        let store = InMemoryStore::new();
        store.add_index("users", "email", true).await.unwrap();
        store.insert_document(user("a@example.com"), "users").await.unwrap();

        let err = store
            .insert_document(user("a@example.com"), "users")
            .await
            .unwrap_err();

        assert!(matches!(err, DocumentStoreError::DocumentAlreadyExists(_, c) if c == "users"));
        assert_eq!(store.query_documents(Query::new(), "users").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unique_index_creation_fails_on_existing_duplicates() {
        let store = InMemoryStore::new();
        store.insert_document(user("a@example.com"), "users").await.unwrap();
        store.insert_document(user("a@example.com"), "users").await.unwrap();

        assert!(store.add_index("users", "email", true).await.is_err());
        assert!(store.add_index("users", "name", false).await.is_ok());
    }

    #[tokio::test]
    async fn query_is_stable_and_limited() {
        let store = InMemoryStore::new();
        for n in 0..5 {
            store.insert_document(user(&format!("{n}@example.com")), "users").await.unwrap();
        }

        let first = store.query_documents(Query::new(), "users").await.unwrap();
        let second = store.query_documents(Query::new(), "users").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);

        let limited = store
            .query_documents(Query::builder().limit(2).build(), "users")
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn collections_are_listed_once_created() {
        let store = InMemoryStore::builder().build().await.unwrap();
        store.create_collection("posts").await.unwrap();
        store.create_collection("posts").await.unwrap();

        assert_eq!(store.list_collections().await.unwrap(), vec!["posts".to_string()]);
    }
}
