//! Coercion of client-supplied identifier strings into store identifiers.
//!
//! Identifiers are validated here before any backend is touched, so a
//! malformed id never reaches a query.

use bson::oid::ObjectId;

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// Parses a single identifier string.
pub fn parse_object_id(value: &str) -> DocumentStoreResult<ObjectId> {
    ObjectId::parse_str(value).map_err(|_| DocumentStoreError::InvalidId(value.to_string()))
}

/// Parses every identifier string, failing on the first malformed entry.
pub fn parse_object_ids<S: AsRef<str>>(values: &[S]) -> DocumentStoreResult<Vec<ObjectId>> {
    values
        .iter()
        .map(|value| parse_object_id(value.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_identifier() {
        let id = ObjectId::new();

        assert_eq!(parse_object_id(&id.to_hex()).unwrap(), id);
    }

    #[test]
    fn rejects_malformed_identifier() {
        for value in ["", "not-an-id", "123", "zzzzzzzzzzzzzzzzzzzzzzzz"] {
            match parse_object_id(value) {
                Err(DocumentStoreError::InvalidId(v)) => assert_eq!(v, value),
                other => panic!("expected InvalidId for {value:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn fails_on_first_bad_entry() {
        let good = ObjectId::new().to_hex();
        let err = parse_object_ids(&[good.as_str(), "bad", "worse"]).unwrap_err();

        assert!(matches!(err, DocumentStoreError::InvalidId(v) if v == "bad"));
    }
}
