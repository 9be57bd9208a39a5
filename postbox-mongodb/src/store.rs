use async_trait::async_trait;
use futures::TryStreamExt;
use bson::{Document, Bson, doc, oid::ObjectId};
use mongodb::{
    Client, Collection as MongoCollection, IndexModel,
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::{ClientOptions, FindOptions, IndexOptions},
};
use tracing::{debug, info};
use postbox_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    error::{DocumentStoreError, DocumentStoreResult},
    query::{Query, QueryVisitor},
};

use crate::query::MongoQueryTranslator;

/// Server error code for a unique index violation.
const DUPLICATE_KEY: i32 = 11000;
/// Server error code for creating a collection that already exists.
const NAMESPACE_EXISTS: i32 = 48;

#[derive(Debug)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(collection_name)
    }

    fn prepare_document(&self, document: Bson) -> DocumentStoreResult<Document> {
        match document {
            Bson::Document(mut doc) => {
                // The server assigns identifiers
                doc.remove("_id");
                Ok(doc)
            }
            other => Err(DocumentStoreError::InvalidDocument(
                format!("expected a document, got {:?}", other.element_type())
            )),
        }
    }
}

/// Maps a driver error, surfacing unique index violations as `DocumentAlreadyExists`.
fn map_error(err: MongoError, collection: &str) -> DocumentStoreError {
    let duplicate = match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY => {
            Some(write_error.message.clone())
        }
        ErrorKind::Command(command_error) if command_error.code == DUPLICATE_KEY => {
            Some(command_error.message.clone())
        }
        _ => None,
    };

    match duplicate {
        Some(message) => DocumentStoreError::DocumentAlreadyExists(message, collection.to_string()),
        None => DocumentStoreError::Backend(err.to_string()),
    }
}

/// Another process created the collection between our listing and our create.
fn is_namespace_exists(err: &MongoError) -> bool {
    matches!(err.kind.as_ref(), ErrorKind::Command(command_error) if command_error.code == NAMESPACE_EXISTS)
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    async fn insert_document(&self, document: Bson, collection: &str) -> DocumentStoreResult<ObjectId> {
        let result = self.get_collection(collection)
            .insert_one(self.prepare_document(document)?)
            .await
            .map_err(|e| map_error(e, collection))?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| DocumentStoreError::Backend(
                format!("server assigned a non-ObjectId identifier: {}", result.inserted_id)
            ))
    }

    async fn get_documents(&self, ids: Vec<ObjectId>, collection: &str) -> DocumentStoreResult<Vec<Bson>> {
        debug!(collection = %collection, count = ids.len(), "find by ids");

        Ok(
            self.get_collection(collection)
                .find(doc! { "_id": { "$in": ids } })
                .await
                .map_err(|e| map_error(e, collection))?
                .try_collect::<Vec<Document>>()
                .await
                .map_err(|e| map_error(e, collection))?
                .into_iter()
                .map(Bson::Document)
                .collect()
        )
    }

    async fn query_documents(&self, query: Query, collection: &str) -> DocumentStoreResult<Vec<Bson>> {
        let mut options = FindOptions::default();

        if let Some(limit) = query.limit {
            options.limit = Some(limit as i64);
        }

        Ok(
            self.get_collection(collection)
                .find(
                    if let Some(expr) = &query.filter {
                        MongoQueryTranslator.visit_expr(expr)?
                    } else {
                        doc! {}
                    },
                )
                .with_options(options)
                .await
                .map_err(|e| map_error(e, collection))?
                .try_collect::<Vec<Document>>()
                .await
                .map_err(|e| map_error(e, collection))?
                .into_iter()
                .map(Bson::Document)
                .collect()
        )
    }

    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        match self.client.database(&self.database).create_collection(name).await {
            Ok(()) => Ok(()),
            Err(err) if is_namespace_exists(&err) => {
                debug!(collection = %name, "collection already exists");
                Ok(())
            }
            Err(err) => Err(map_error(err, name)),
        }
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        self.client
            .database(&self.database)
            .list_collection_names()
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))
    }

    async fn add_index(&self, collection: &str, field: &str, unique: bool) -> DocumentStoreResult<()> {
        self.get_collection(collection)
            .create_index(
                IndexModel::builder()
                .keys(doc! { field: 1 })
                .options(
                    IndexOptions::builder()
                    .unique(unique)
                    .build()
                )
                .build()
            )
            .await
            .map_err(|e| map_error(e, collection))?;

        Ok(())
    }
}

pub struct MongoDbStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        let client = Client::with_options(
            ClientOptions::parse(&self.dsn)
                .await
                .map_err(|e| DocumentStoreError::Initialization(e.to_string()))?,
        )
        .map_err(|e| DocumentStoreError::Initialization(e.to_string()))?;

        // Fail at startup rather than on the first request
        client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| DocumentStoreError::Initialization(e.to_string()))?;

        info!(database = %self.database, "connected to MongoDB");

        Ok(MongoDbStore::new(client, self.database))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::deserialize_from_document;
    use mongodb::error::CommandError;

    fn command_error(code: i32, code_name: &str) -> MongoError {
        let command_error: CommandError = deserialize_from_document(doc! {
            "code": code,
            "codeName": code_name,
            "errmsg": "server said no",
        })
        .unwrap();

        MongoError::from(ErrorKind::Command(command_error))
    }

    #[test]
    fn existing_namespace_is_recognized() {
        assert!(is_namespace_exists(&command_error(NAMESPACE_EXISTS, "NamespaceExists")));
        assert!(!is_namespace_exists(&command_error(DUPLICATE_KEY, "DuplicateKey")));
    }

    #[test]
    fn duplicate_key_maps_to_already_exists() {
        match map_error(command_error(DUPLICATE_KEY, "DuplicateKey"), "users") {
            DocumentStoreError::DocumentAlreadyExists(_, collection) => assert_eq!(collection, "users"),
            other => panic!("expected DocumentAlreadyExists, got {other:?}"),
        }

        assert!(matches!(
            map_error(command_error(NAMESPACE_EXISTS, "NamespaceExists"), "users"),
            DocumentStoreError::Backend(_)
        ));
    }
}
