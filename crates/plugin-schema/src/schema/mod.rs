//! Wire-level schema AST.
//!
//! These are the language-agnostic, serde-serializable descriptions of data
//! shapes. Live types in [`crate::type_def`] produce them through
//! `get_schema()`, and [`crate::type_def::TypeBuilder::import`] turns them back
//! into live types.

pub mod common;
#[allow(clippy::module_inception)]
pub mod schema;

pub use common::Display;
pub use schema::*;
