//! GraphQL schema: users, posts and comments.

pub mod comment;
pub mod post;
pub mod user;

use async_graphql::{Context, EmptySubscription, MergedObject, Result as GraphQLResult, Schema};

use crate::{config::GraphQLConfig, context::Collections};

/// Root query object
#[derive(MergedObject, Default)]
pub struct QueryRoot(user::UserQuery, post::PostQuery, comment::CommentQuery);

/// Root mutation object
#[derive(MergedObject, Default)]
pub struct MutationRoot(user::UserMutation);

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema. Store handles are not registered here; they are attached
/// to each request with [`Collections::attach`].
pub fn build_schema(config: &GraphQLConfig) -> AppSchema {
    let builder = Schema::build(QueryRoot::default(), MutationRoot::default(), EmptySubscription)
        .limit_depth(config.max_depth)
        .limit_complexity(config.max_complexity);

    if config.introspection {
        builder.finish()
    } else {
        builder.disable_introspection().finish()
    }
}

pub(crate) fn collections<'a>(ctx: &Context<'a>) -> GraphQLResult<&'a Collections> {
    ctx.data::<Collections>()
        .map_err(|_| "Store collections not attached to request".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_builds() {
        let schema = build_schema(&GraphQLConfig::default());
        let sdl = schema.sdl();

        assert!(sdl.contains("type Query"));
        assert!(sdl.contains("type Mutation"));
        assert!(sdl.contains("createUser("));
        assert!(sdl.contains("likedPosts"));
    }
}
