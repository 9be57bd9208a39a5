//! Query construction and filtering API for document stores.
//!
//! Queries are plain data. Each backend walks the filter tree with a
//! [`QueryVisitor`]: the in-memory backend evaluates it against documents, the
//! MongoDB backend translates it into a filter document.
//!
//! ```ignore
//! use postbox_core::query::{Query, Filter};
//!
//! let query = Query::builder()
//!     .filter(Filter::eq("email", "ada@example.com"))
//!     .limit(1)
//!     .build();
//! ```

use bson::Bson;

use crate::error::DocumentStoreError;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    Eq,
    Ne,
    /// Field equals any element of the array value (or shares one, for array fields).
    AnyOf,
    NoneOf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
    Field {
        field: String,
        op: FieldOp,
        value: Bson,
    },
}

impl Expr {
    pub fn field(field: String, op: FieldOp, value: Bson) -> Self {
        Expr::Field { field, op, value }
    }

    pub fn and(self, other: Expr) -> Self {
        match self {
            Expr::And(mut list) => {
                list.push(other);
                Expr::And(list)
            }
            _ => Expr::And(vec![self, other]),
        }
    }

    pub fn or(self, other: Expr) -> Self {
        match self {
            Expr::Or(mut list) => {
                list.push(other);
                Expr::Or(list)
            }
            _ => Expr::Or(vec![self, other]),
        }
    }

    pub fn not(self) -> Self {
        Expr::Not(Box::new(self))
    }
}

/// A filtered, optionally limited scan over one collection.
///
/// The default query matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filter: Option<Expr>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Query::default()
    }

    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }
}

pub struct Filter;

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Eq, value.into())
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Ne, value.into())
    }

    pub fn any_of(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::AnyOf, value.into())
    }

    pub fn none_of(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::NoneOf, value.into())
    }

    pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::And(exprs.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    pub fn new() -> Self {
        QueryBuilder::default()
    }

    pub fn filter(mut self, filter: Expr) -> Self {
        self.query.filter = Some(filter);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    pub fn build(self) -> Query {
        self.query
    }
}

/// Walks a filter expression tree.
pub trait QueryVisitor {
    type Output;
    type Error: Into<DocumentStoreError>;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error>;
    fn visit_field(
        &mut self,
        field: &str,
        op: &FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error>;

    fn visit_expr(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        match expr {
            Expr::And(exprs) => self.visit_and(exprs),
            Expr::Or(exprs) => self.visit_or(exprs),
            Expr::Not(expr) => self.visit_not(expr),
            Expr::Field { field, op, value } => self.visit_field(field, op, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chained_and_flattens() {
        let expr = Filter::eq("a", 1).and(Filter::eq("b", 2)).and(Filter::ne("c", 3));

        match expr {
            Expr::And(list) => assert_eq!(list.len(), 3),
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn builder_sets_filter_and_limit() {
        let query = Query::builder()
            .filter(Filter::eq("email", "a@b.c"))
            .limit(1)
            .build();

        assert_eq!(query.limit, Some(1));
        assert_eq!(query.filter, Some(Filter::eq("email", "a@b.c")));
        assert_eq!(Query::new(), Query::default());
    }
}
