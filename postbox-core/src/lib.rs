//! Document store abstraction used by the postbox GraphQL gateway.
//!
//! This crate provides:
//!
//! - **Document traits** ([`document`]) - the trait stored types implement and BSON conversion
//! - **Store backend abstraction** ([`backend`]) - the capability interface backends implement
//! - **Query and filtering API** ([`query`]) - a small filter AST walked by each backend
//! - **Collections interface** ([`collection`]) - typed, cloneable collection handles
//! - **Document store** ([`store`]) - the shared handle collections are obtained from
//! - **Identifier coercion** ([`id`]) - parsing client-supplied id strings
//! - **Error handling** ([`error`]) - the store error taxonomy

#[allow(unused_extern_crates)]
extern crate self as postbox_core;

pub mod backend;
pub mod collection;
pub mod document;
pub mod error;
pub mod id;
pub mod query;
pub mod store;
