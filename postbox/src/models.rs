//! Stored document shapes for the three collections.
//!
//! References between entities are plain `ObjectId`s held on the user; posts
//! and comments carry no back-references.

use bson::oid::ObjectId;
use postbox_core::document::Document;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    /// Argon2id PHC string.
    pub password: String,
    #[serde(default)]
    pub posts: Vec<ObjectId>,
    #[serde(default)]
    pub comments: Vec<ObjectId>,
    #[serde(rename = "likedPosts", default)]
    pub liked_posts: Vec<ObjectId>,
}

impl UserDocument {
    pub const KIND: &'static str = "User";
}

impl Document for UserDocument {
    fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }

    fn with_id(self, id: ObjectId) -> Self {
        Self { id: Some(id), ..self }
    }

    fn collection_name() -> &'static str {
        "users"
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<ObjectId>,
}

impl PostDocument {
    pub const KIND: &'static str = "Post";
}

impl Document for PostDocument {
    fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }

    fn with_id(self, id: ObjectId) -> Self {
        Self { id: Some(id), ..self }
    }

    fn collection_name() -> &'static str {
        "posts"
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<ObjectId>,
}

impl CommentDocument {
    pub const KIND: &'static str = "Comment";
}

impl Document for CommentDocument {
    fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }

    fn with_id(self, id: ObjectId) -> Self {
        Self { id: Some(id), ..self }
    }

    fn collection_name() -> &'static str {
        "comments"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{Bson, doc};
    use postbox_core::document::DocumentExt;

    #[test]
    fn user_references_use_stored_field_names() {
        let liked = ObjectId::new();
        let user = UserDocument {
            id: None,
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "hash".into(),
            posts: vec![],
            comments: vec![],
            liked_posts: vec![liked],
        };

        let stored = user.to_bson().unwrap();
        let stored = stored.as_document().unwrap();

        assert!(stored.get("_id").is_none());
        assert_eq!(stored.get_array("likedPosts").unwrap(), &vec![Bson::ObjectId(liked)]);
    }

    #[test]
    fn sparse_post_documents_deserialize() {
        let id = ObjectId::new();
        let post = PostDocument::from_bson(Bson::Document(doc! { "_id": id })).unwrap();

        assert_eq!(post.id, Some(id));
        assert!(post.title.is_none() && post.content.is_none() && post.author.is_none());
    }
}
