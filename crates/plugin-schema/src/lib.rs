//! `plugin-schema`: runtime type descriptions shared by a host and its plugins.
//!
//! Shapes are declared once as types ([`TypeNode`]) with a wire-level
//! [`Schema`] face. Types turn untyped JSON input into native
//! [`TypedValue`]s and back, with objects grouped into [`Scope`]s so they can
//! reference each other, and [`OneOfType`] selecting an object variant by a
//! discriminator field. [`CallableFunction`] binds a declared signature to a
//! native handler and checks the two agree before the function can be
//! called.
//!
//! ```
//! use plugin_schema::{ObjectType, PropertyType, Scope, TypeBuilder};
//! use serde_json::json;
//!
//! let t = TypeBuilder::new();
//! let scope = Scope::new(
//!     "A",
//!     [
//!         ObjectType::new(
//!             "A",
//!             [("s", PropertyType::required(t.one_of_int("_type", [(1, "B")])?))],
//!         )?,
//!         ObjectType::new("B", [("message", PropertyType::required(t.str()))])?,
//!     ],
//! )?;
//! let value = scope.unserialize(&json!({"s": {"_type": 1, "message": "hi"}}))?;
//! assert_eq!(scope.serialize(&value)?, json!({"s": {"message": "hi", "_type": 1}}));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod function;
pub mod schema;
pub mod type_def;
pub mod value;

// Re-export the most commonly used types at crate root
pub use error::{BoxError, FunctionError, SchemaError, SignatureError, TypeError};
pub use function::{
    CallableFunction, Function, FunctionSchema, Handler, HandlerSignature, IntoHandler,
    OutputResolver, ReturnSlot, Returned,
};
pub use schema::{Display, Schema, ScopeSchema};
pub use type_def::{
    AnyType, BoolType, DiscriminatorKey, FloatType, IntType, ListType, ObjectType, OneOfType,
    PropertyType, RefType, Repr, Scope, StringType, TypeBuilder, TypeNode,
};
pub use value::{Discriminant, NativeType, ObjectValue, OneOfValue, TypedValue};
