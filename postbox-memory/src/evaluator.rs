//! Query expression evaluation for in-memory document filtering.

use std::collections::HashMap;
use bson::{Bson, oid::ObjectId};

use postbox_core::{
    query::{QueryVisitor, Expr, FieldOp},
    error::{DocumentStoreError, DocumentStoreResult},
};


#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(f64),
    ObjectId(ObjectId),
    String(&'a str),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::ObjectId(value) => Comparable::ObjectId(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>()
            ),
            // Other types are not comparable
            _ => Comparable::Null,
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}


pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Bson,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Bson) -> Self {
        Self { document }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> DocumentStoreResult<bool> {
        self.visit_expr(expr)
    }

    pub fn filter_documents(
        documents: impl IntoIterator<Item = &'a Bson>,
        expr: &Expr,
    ) -> DocumentStoreResult<Vec<Bson>> {
        let mut matched = Vec::new();

        for doc in documents {
            if DocumentEvaluator::new(doc).evaluate(expr)? {
                matched.push(doc.clone());
            }
        }

        Ok(matched)
    }

    fn field(&self, field: &str) -> Option<&'a Bson> {
        self.document
            .as_document()
            .and_then(|doc| doc.get(field))
    }
}

/// Whether any element of `candidates` appears in (or equals) `field_value`.
fn shares_any(field_value: &Comparable<'_>, candidates: &Comparable<'_>) -> bool {
    match (field_value, candidates) {
        (Comparable::Array(array), Comparable::Array(values)) => values
            .iter()
            .any(|val| array.iter().any(|item| item == val)),
        (Comparable::Array(array), single_value) => array
            .iter()
            .any(|item| item == single_value),
        (single_value, Comparable::Array(values)) => values
            .iter()
            .any(|val| val == single_value),
        _ => false,
    }
}

impl<'a> QueryVisitor for DocumentEvaluator<'a> {
    type Output = bool;
    type Error = DocumentStoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if self.visit_expr(expr)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        Ok(!self.visit_expr(expr)?)
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        let expected = Comparable::from(value);

        match self.field(field) {
            Some(field_value) => {
                let actual = Comparable::from(field_value);

                Ok(match op {
                    FieldOp::Eq => actual == expected,
                    FieldOp::Ne => actual != expected,
                    FieldOp::AnyOf => shares_any(&actual, &expected),
                    FieldOp::NoneOf => !shares_any(&actual, &expected),
                })
            },
            // A missing field matches only the negative operators
            None => Ok(matches!(op, FieldOp::Ne | FieldOp::NoneOf)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{bson, doc};
    use postbox_core::query::Filter;

    fn matches(document: &Bson, expr: &Expr) -> bool {
        DocumentEvaluator::new(document).evaluate(expr).unwrap()
    }

    #[test]
    fn eq_compares_strings_and_object_ids() {
        let id = ObjectId::new();
        let document = Bson::Document(doc! { "_id": id, "email": "ada@example.com" });

        assert!(matches(&document, &Filter::eq("email", "ada@example.com")));
        assert!(!matches(&document, &Filter::eq("email", "bob@example.com")));
        assert!(matches(&document, &Filter::eq("_id", id)));
        assert!(!matches(&document, &Filter::eq("_id", ObjectId::new())));
    }

    #[test]
    fn any_of_checks_membership() {
        let wanted = ObjectId::new();
        let document = Bson::Document(doc! { "_id": wanted });

        assert!(matches(&document, &Filter::any_of("_id", bson!([ObjectId::new(), wanted]))));
        assert!(!matches(&document, &Filter::any_of("_id", bson!([ObjectId::new()]))));
        assert!(matches(&document, &Filter::none_of("_id", bson!([ObjectId::new()]))));
    }

    #[test]
    fn any_of_on_array_field() {
        let post = ObjectId::new();
        let document = Bson::Document(doc! { "posts": [post, ObjectId::new()] });

        assert!(matches(&document, &Filter::any_of("posts", post)));
        assert!(matches(&document, &Filter::any_of("posts", bson!([post]))));
    }

    #[test]
    fn logical_operators_combine() {
        let document = Bson::Document(doc! { "name": "Ada", "email": "ada@example.com" });

        let both = Filter::eq("name", "Ada").and(Filter::eq("email", "ada@example.com"));
        let either = Filter::eq("name", "Bob").or(Filter::eq("email", "ada@example.com"));

        assert!(matches(&document, &both));
        assert!(matches(&document, &either));
        assert!(!matches(&document, &both.not()));
    }

    #[test]
    fn missing_field_only_matches_negations() {
        let document = Bson::Document(doc! { "name": "Ada" });

        assert!(!matches(&document, &Filter::eq("email", "x")));
        assert!(matches(&document, &Filter::ne("email", "x")));
    }
}
