//! Data-access operations behind every GraphQL field.
//!
//! Each function takes the request's [`Collections`], coerces identifier
//! strings before touching the store, and reports failures as [`ApiError`].
//! The GraphQL types in [`crate::schema`] are thin adapters over these.

use bson::oid::ObjectId;
use postbox_core::{
    collection::TypedCollection,
    document::Document,
    error::DocumentStoreError,
    id::{parse_object_id, parse_object_ids},
};
use tracing::{debug, info};

use crate::{
    context::Collections,
    error::{ApiError, ApiResult},
    models::{CommentDocument, PostDocument, UserDocument},
    password::hash_password,
};

/// Validated arguments of `createUser`.
///
/// Has no `id` field: identifiers are always assigned by the store.
#[derive(Debug, Clone, Default)]
pub struct CreateUserRequest {
    pub name: String,
    pub password: String,
    pub email: String,
    pub posts: Vec<String>,
    pub comments: Vec<String>,
    pub liked_posts: Vec<String>,
}

fn coerce_id(argument: &'static str, value: &str) -> ApiResult<ObjectId> {
    parse_object_id(value).map_err(|_| ApiError::InvalidArgument {
        argument,
        value: value.to_string(),
    })
}

fn coerce_ids(argument: &'static str, values: &[String]) -> ApiResult<Vec<ObjectId>> {
    parse_object_ids(values).map_err(|err| match err {
        DocumentStoreError::InvalidId(value) => ApiError::InvalidArgument { argument, value },
        other => other.into(),
    })
}

async fn get_by_id<D: Document>(
    collection: &TypedCollection<D>,
    kind: &'static str,
    id: &str,
) -> ApiResult<D> {
    let object_id = coerce_id("id", id)?;

    debug!(kind, %object_id, "lookup by id");

    collection
        .find_by_id(&object_id)
        .await?
        .ok_or_else(|| ApiError::NotFound { kind, id: id.to_string() })
}

pub async fn list_users(ctx: &Collections) -> ApiResult<Vec<UserDocument>> {
    Ok(ctx.users.find_all().await?)
}

pub async fn list_posts(ctx: &Collections) -> ApiResult<Vec<PostDocument>> {
    Ok(ctx.posts.find_all().await?)
}

pub async fn list_comments(ctx: &Collections) -> ApiResult<Vec<CommentDocument>> {
    Ok(ctx.comments.find_all().await?)
}

pub async fn get_user_by_id(ctx: &Collections, id: &str) -> ApiResult<UserDocument> {
    get_by_id(&ctx.users, UserDocument::KIND, id).await
}

pub async fn get_post_by_id(ctx: &Collections, id: &str) -> ApiResult<PostDocument> {
    get_by_id(&ctx.posts, PostDocument::KIND, id).await
}

pub async fn get_comment_by_id(ctx: &Collections, id: &str) -> ApiResult<CommentDocument> {
    get_by_id(&ctx.comments, CommentDocument::KIND, id).await
}

/// Creates a user after checking that the email is unused.
///
/// All reference lists are coerced before any store access, so a malformed
/// entry writes nothing.
pub async fn create_user(ctx: &Collections, request: CreateUserRequest) -> ApiResult<UserDocument> {
    let posts = coerce_ids("posts", &request.posts)?;
    let comments = coerce_ids("comments", &request.comments)?;
    let liked_posts = coerce_ids("likedPosts", &request.liked_posts)?;

    let email_taken = || ApiError::AlreadyExists {
        kind: UserDocument::KIND,
        field: "email",
        value: request.email.clone(),
    };

    if ctx.users.exists_by_field("email", request.email.as_str()).await? {
        return Err(email_taken());
    }

    let plaintext = request.password.clone();
    let password = tokio::task::spawn_blocking(move || hash_password(&plaintext))
        .await
        .map_err(|e| ApiError::Internal(format!("password hashing task failed: {e}")))??;

    let user = ctx
        .users
        .insert(UserDocument {
            id: None,
            name: request.name.clone(),
            email: request.email.clone(),
            password,
            posts,
            comments,
            liked_posts,
        })
        .await
        .map_err(|err| match err {
            // Lost a race against a concurrent insert; the unique index caught it
            DocumentStoreError::DocumentAlreadyExists(..) => email_taken(),
            other => other.into(),
        })?;

    info!(user_id = ?user.id, "user created");

    Ok(user)
}

/// Resolves the posts a user references with a single batched lookup.
///
/// References to missing posts are omitted.
pub async fn user_posts(ctx: &Collections, user: &UserDocument) -> ApiResult<Vec<PostDocument>> {
    Ok(ctx.posts.find_by_ids(&user.posts).await?)
}

/// Resolves the comments a user references with a single batched lookup.
pub async fn user_comments(ctx: &Collections, user: &UserDocument) -> ApiResult<Vec<CommentDocument>> {
    Ok(ctx.comments.find_by_ids(&user.comments).await?)
}
