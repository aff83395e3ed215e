//! Native value model produced by unserialization and consumed by
//! serialization and function calls.

pub mod native;
pub mod typed_value;

pub use native::NativeType;
pub use typed_value::{json_kind, Discriminant, ObjectValue, OneOfValue, TypedValue};
