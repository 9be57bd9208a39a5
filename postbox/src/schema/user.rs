//! User schema and resolvers

use async_graphql::{Context, ErrorExtensions, ID, Object, Result as GraphQLResult};
use tracing::warn;

use super::{comment::Comment, post::Post};
use crate::{
    error::ApiError,
    models::UserDocument,
    resolvers::{self, CreateUserRequest},
};

/// A user. `posts` and `comments` are resolved from the stored references
/// only when selected.
pub struct User(pub UserDocument);

impl From<UserDocument> for User {
    fn from(user: UserDocument) -> Self {
        User(user)
    }
}

#[Object]
impl User {
    async fn id(&self) -> GraphQLResult<ID> {
        self.0
            .id
            .map(|id| ID(id.to_hex()))
            .ok_or_else(|| ApiError::Internal("user document has no identifier".into()).extend())
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn email(&self) -> &str {
        &self.0.email
    }

    /// Posts this user references. References to missing posts are skipped.
    async fn posts(&self, ctx: &Context<'_>) -> GraphQLResult<Option<Vec<Post>>> {
        let collections = super::collections(ctx)?;

        resolvers::user_posts(collections, &self.0)
            .await
            .map(|posts| Some(posts.into_iter().map(Post::from).collect()))
            .map_err(|e| e.extend())
    }

    /// Comments this user references. References to missing comments are skipped.
    async fn comments(&self, ctx: &Context<'_>) -> GraphQLResult<Option<Vec<Comment>>> {
        let collections = super::collections(ctx)?;

        resolvers::user_comments(collections, &self.0)
            .await
            .map(|comments| Some(comments.into_iter().map(Comment::from).collect()))
            .map_err(|e| e.extend())
    }

    async fn liked_posts(&self) -> Vec<ID> {
        self.0
            .liked_posts
            .iter()
            .map(|id| ID(id.to_hex()))
            .collect()
    }
}

#[derive(Default)]
pub struct UserQuery;

#[Object]
impl UserQuery {
    /// All users. Unpaginated.
    async fn users(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<User>> {
        let collections = super::collections(ctx)?;

        resolvers::list_users(collections)
            .await
            .map(|users| users.into_iter().map(User::from).collect())
            .map_err(|e| e.extend())
    }

    async fn user(&self, ctx: &Context<'_>, id: ID) -> GraphQLResult<Option<User>> {
        let collections = super::collections(ctx)?;

        resolvers::get_user_by_id(collections, &id)
            .await
            .map(|user| Some(user.into()))
            .map_err(|e| e.extend())
    }
}

#[derive(Default)]
pub struct UserMutation;

#[Object]
impl UserMutation {
    /// Create a user. Fails with `ALREADY_EXISTS` when the email is taken.
    #[allow(clippy::too_many_arguments)]
    async fn create_user(
        &self,
        ctx: &Context<'_>,
        #[graphql(desc = "Ignored. Identifiers are always assigned by the store.")]
        id: Option<ID>,
        name: String,
        password: String,
        email: String,
        #[graphql(default)] posts: Vec<ID>,
        #[graphql(default)] comments: Vec<ID>,
        #[graphql(default)] liked_posts: Vec<ID>,
    ) -> GraphQLResult<User> {
        let collections = super::collections(ctx)?;

        if let Some(id) = id {
            warn!(supplied_id = %id.as_str(), "createUser called with an id; it is ignored");
        }

        let request = CreateUserRequest {
            name,
            password,
            email,
            posts: posts.into_iter().map(|id| id.0).collect(),
            comments: comments.into_iter().map(|id| id.0).collect(),
            liked_posts: liked_posts.into_iter().map(|id| id.0).collect(),
        };

        resolvers::create_user(collections, request)
            .await
            .map(User::from)
            .map_err(|e| e.extend())
    }
}
