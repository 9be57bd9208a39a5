//! Core traits for document representation and serialization.
//!
//! Every stored type implements [`Document`]. Identifiers are assigned by the
//! backend on insertion, so a document only carries an id once it has been
//! read back from (or written to) a store.

use bson::{Bson, de::deserialize_from_bson, oid::ObjectId, ser::serialize_to_bson};
use serde::{Deserialize, Serialize};

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// Core trait that all documents stored in a document store must implement.
///
/// Implementors are expected to serialize their identifier under `_id` and to
/// skip it while it is `None`, so that the backend can assign one.
///
/// # Example
///
/// ```ignore
/// use postbox_core::document::Document;
/// use bson::oid::ObjectId;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct Tag {
///     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
///     pub id: Option<ObjectId>,
///     pub label: String,
/// }
///
/// impl Document for Tag {
///     fn id(&self) -> Option<&ObjectId> {
///         self.id.as_ref()
///     }
///
///     fn with_id(self, id: ObjectId) -> Self {
///         Self { id: Some(id), ..self }
///     }
///
///     fn collection_name() -> &'static str {
///         "tags"
///     }
/// }
/// ```
pub trait Document: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// Returns this document's store-assigned identifier, if it has one yet.
    fn id(&self) -> Option<&ObjectId>;

    /// Returns this document carrying the given identifier.
    fn with_id(self, id: ObjectId) -> Self;

    /// Returns the name of the collection this document belongs to.
    fn collection_name() -> &'static str;
}

/// Extension trait providing BSON conversion for documents.
///
/// Implemented for all types that implement [`Document`].
pub trait DocumentExt: Document {
    /// Converts this document to a BSON value for storage.
    fn to_bson(&self) -> DocumentStoreResult<Bson>;

    /// Creates a document from a stored BSON value.
    fn from_bson(bson: Bson) -> DocumentStoreResult<Self>;
}

impl<D: Document> DocumentExt for D {
    fn to_bson(&self) -> DocumentStoreResult<Bson> {
        match serialize_to_bson(self)? {
            doc @ Bson::Document(_) => Ok(doc),
            other => Err(DocumentStoreError::InvalidDocument(format!(
                "{} serialized to {:?}, expected a document",
                D::collection_name(),
                other.element_type(),
            ))),
        }
    }

    fn from_bson(bson: Bson) -> DocumentStoreResult<Self> {
        Ok(deserialize_from_bson(bson)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
        id: Option<ObjectId>,
        body: String,
    }

    impl Document for Note {
        fn id(&self) -> Option<&ObjectId> {
            self.id.as_ref()
        }

        fn with_id(self, id: ObjectId) -> Self {
            Self { id: Some(id), ..self }
        }

        fn collection_name() -> &'static str {
            "notes"
        }
    }

    #[test]
    fn unassigned_id_is_not_serialized() {
        let note = Note { id: None, body: "hello".into() };
        let bson = note.to_bson().unwrap();

        assert_eq!(bson, Bson::Document(doc! { "body": "hello" }));
    }

    #[test]
    fn reads_back_assigned_id() {
        let id = ObjectId::new();
        let note = Note::from_bson(Bson::Document(doc! { "_id": id, "body": "hi" })).unwrap();

        assert_eq!(note.id(), Some(&id));
        assert_eq!(note.with_id(id).body, "hi");
    }
}
