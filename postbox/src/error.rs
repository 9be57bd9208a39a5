//! Resolver error taxonomy and its GraphQL representation.
//!
//! Every variant maps to a stable `extensions.code` so clients can branch on
//! the failure kind rather than parse messages.

use async_graphql::ErrorExtensions;
use postbox_core::error::DocumentStoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{kind} with ID {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("Invalid identifier {value:?} for argument `{argument}`")]
    InvalidArgument { argument: &'static str, value: String },

    #[error("{kind} with {field} {value:?} already exists")]
    AlreadyExists {
        kind: &'static str,
        field: &'static str,
        value: String,
    },

    /// The document store failed; not recovered locally.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            ApiError::AlreadyExists { .. } => "ALREADY_EXISTS",
            ApiError::Unavailable(_) => "UNAVAILABLE",
            ApiError::Internal(_) => "INTERNAL",
        }
    }
}

impl From<DocumentStoreError> for ApiError {
    fn from(err: DocumentStoreError) -> Self {
        match err {
            DocumentStoreError::InvalidId(value) => ApiError::InvalidArgument { argument: "id", value },
            DocumentStoreError::Serialization(msg) | DocumentStoreError::InvalidDocument(msg) => {
                ApiError::Internal(msg)
            }
            other => ApiError::Unavailable(other.to_string()),
        }
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, ext| {
            ext.set("code", self.code());

            match self {
                ApiError::NotFound { kind, id } => {
                    ext.set("kind", *kind);
                    ext.set("id", id.as_str());
                }
                ApiError::InvalidArgument { argument, value } => {
                    ext.set("argument", *argument);
                    ext.set("value", value.as_str());
                }
                ApiError::AlreadyExists { kind, field, value } => {
                    ext.set("kind", *kind);
                    ext.set("field", *field);
                    ext.set("value", value.as_str());
                }
                ApiError::Unavailable(_) | ApiError::Internal(_) => {}
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::Value;

    #[test]
    fn not_found_carries_kind_and_id() {
        let err = ApiError::NotFound { kind: "Post", id: "abc".into() }.extend();
        let ext = err.extensions.expect("extensions set");

        assert_eq!(err.message, "Post with ID abc not found");
        assert_eq!(ext.get("code"), Some(&Value::from("NOT_FOUND")));
        assert_eq!(ext.get("kind"), Some(&Value::from("Post")));
        assert_eq!(ext.get("id"), Some(&Value::from("abc")));
    }

    #[test]
    fn store_errors_map_onto_taxonomy() {
        let invalid: ApiError = DocumentStoreError::InvalidId("zz".into()).into();
        let backend: ApiError = DocumentStoreError::Backend("socket closed".into()).into();
        let bad_doc: ApiError = DocumentStoreError::Serialization("missing field".into()).into();

        assert_eq!(invalid.code(), "INVALID_ARGUMENT");
        assert_eq!(backend.code(), "UNAVAILABLE");
        assert_eq!(bad_doc.code(), "INTERNAL");
    }
}
