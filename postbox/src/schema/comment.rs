//! Comment schema and resolvers

use async_graphql::{Context, ErrorExtensions, ID, Object, Result as GraphQLResult, SimpleObject};

use crate::{models::CommentDocument, resolvers};

#[derive(SimpleObject, Clone, Debug)]
pub struct Comment {
    pub id: ID,
    pub content: Option<String>,
    pub author: Option<ID>,
    pub post: Option<ID>,
}

impl From<CommentDocument> for Comment {
    fn from(comment: CommentDocument) -> Self {
        Comment {
            id: comment.id.map(|id| id.to_hex()).unwrap_or_default().into(),
            content: comment.content,
            author: comment.author.map(|id| id.to_hex().into()),
            post: comment.post.map(|id| id.to_hex().into()),
        }
    }
}

#[derive(Default)]
pub struct CommentQuery;

#[Object]
impl CommentQuery {
    async fn comments(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<Comment>> {
        let collections = super::collections(ctx)?;

        resolvers::list_comments(collections)
            .await
            .map(|comments| comments.into_iter().map(Comment::from).collect())
            .map_err(|e| e.extend())
    }

    async fn comment(&self, ctx: &Context<'_>, id: ID) -> GraphQLResult<Option<Comment>> {
        let collections = super::collections(ctx)?;

        resolvers::get_comment_by_id(collections, &id)
            .await
            .map(|comment| Some(comment.into()))
            .map_err(|e| e.extend())
    }
}
