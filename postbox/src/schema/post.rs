//! Post schema and resolvers

use async_graphql::{Context, ErrorExtensions, ID, Object, Result as GraphQLResult, SimpleObject};

use crate::{models::PostDocument, resolvers};

#[derive(SimpleObject, Clone, Debug)]
pub struct Post {
    pub id: ID,
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<ID>,
}

impl From<PostDocument> for Post {
    fn from(post: PostDocument) -> Self {
        Post {
            id: post.id.map(|id| id.to_hex()).unwrap_or_default().into(),
            title: post.title,
            content: post.content,
            author: post.author.map(|id| id.to_hex().into()),
        }
    }
}

#[derive(Default)]
pub struct PostQuery;

#[Object]
impl PostQuery {
    /// All posts. Unpaginated.
    async fn posts(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<Post>> {
        let collections = super::collections(ctx)?;

        resolvers::list_posts(collections)
            .await
            .map(|posts| posts.into_iter().map(Post::from).collect())
            .map_err(|e| e.extend())
    }

    async fn post(&self, ctx: &Context<'_>, id: ID) -> GraphQLResult<Option<Post>> {
        let collections = super::collections(ctx)?;

        resolvers::get_post_by_id(collections, &id)
            .await
            .map(|post| Some(post.into()))
            .map_err(|e| e.extend())
    }
}
