//! Query translation from the core filter AST to MongoDB filter documents.

use bson::{Document, Bson, doc};

use postbox_core::{
    query::{QueryVisitor, Expr, FieldOp},
    error::DocumentStoreError,
};


pub(crate) struct MongoQueryTranslator;

/// `$in`/`$nin` take an array; a scalar operand is treated as a one-element set.
fn as_array(value: &Bson) -> Bson {
    match value {
        Bson::Array(_) => value.clone(),
        other => Bson::Array(vec![other.clone()]),
    }
}

impl QueryVisitor for MongoQueryTranslator {
    type Output = Document;
    type Error = DocumentStoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$and": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$or": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        let negated = self.visit_expr(expr)?;

        Ok(doc! {
            "$nor": [negated],
        })
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: match op {
                FieldOp::Eq => doc! { "$eq": value.clone() },
                FieldOp::Ne => doc! { "$ne": value.clone() },
                FieldOp::AnyOf => doc! { "$in": as_array(value) },
                FieldOp::NoneOf => doc! { "$nin": as_array(value) },
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;
    use postbox_core::query::Filter;

    #[test]
    fn translates_equality() {
        let filter = MongoQueryTranslator
            .visit_expr(&Filter::eq("email", "ada@example.com"))
            .unwrap();

        assert_eq!(filter, doc! { "email": { "$eq": "ada@example.com" } });
    }

    #[test]
    fn any_of_wraps_scalars() {
        let id = ObjectId::new();
        let filter = MongoQueryTranslator
            .visit_expr(&Filter::any_of("_id", id))
            .unwrap();

        assert_eq!(filter, doc! { "_id": { "$in": [id] } });
    }

    #[test]
    fn negation_uses_nor() {
        let filter = MongoQueryTranslator
            .visit_expr(&Filter::eq("name", "Ada").not())
            .unwrap();

        assert_eq!(filter, doc! { "$nor": [{ "name": { "$eq": "Ada" } }] });
    }

    #[test]
    fn conjunction_nests_clauses() {
        let filter = MongoQueryTranslator
            .visit_expr(&Filter::and([Filter::eq("a", 1), Filter::ne("b", 2)]))
            .unwrap();

        assert_eq!(
            filter,
            doc! { "$and": [{ "a": { "$eq": 1 } }, { "b": { "$ne": 2 } }] }
        );
    }
}
