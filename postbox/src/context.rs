//! Per-request resolver context.
//!
//! [`Collections`] is built once at startup from the shared [`DocumentStore`]
//! and cloned into every GraphQL request. It holds no mutable state.

use async_graphql::Request;
use postbox_core::{collection::TypedCollection, document::Document, error::DocumentStoreResult, store::DocumentStore};

use crate::models::{CommentDocument, PostDocument, UserDocument};

#[derive(Debug, Clone)]
pub struct Collections {
    pub users: TypedCollection<UserDocument>,
    pub posts: TypedCollection<PostDocument>,
    pub comments: TypedCollection<CommentDocument>,
}

impl Collections {
    pub fn new(store: &DocumentStore) -> Self {
        Self {
            users: store.typed_collection(),
            posts: store.typed_collection(),
            comments: store.typed_collection(),
        }
    }

    /// Attaches a copy of these handles to a GraphQL request.
    pub fn attach(&self, request: Request) -> Request {
        request.data(self.clone())
    }
}

/// Creates the three collections if missing and the unique index on user emails.
pub async fn prepare_store(store: &DocumentStore) -> DocumentStoreResult<()> {
    for name in [
        UserDocument::collection_name(),
        PostDocument::collection_name(),
        CommentDocument::collection_name(),
    ] {
        store.ensure_collection(name).await?;
    }

    store
        .add_index(UserDocument::collection_name(), "email", true)
        .await
}
