//! Type classes.
//!
//! - `TypeNode` enum: the sum type of all type classes
//! - Individual structs: `AnyType`, `ObjectType`, `OneOfType`, etc.
//! - `TypeBuilder`: factory for constructing `TypeNode` values and for
//!   importing them from schemas

pub mod builder;
pub mod classes;
pub mod object;
pub mod one_of;
pub mod repr;
pub mod scope;

pub use builder::TypeBuilder;
pub use classes::*;
pub use object::{ObjectType, PropertyType};
pub use one_of::{DiscriminatorKey, OneOfType};
pub use repr::Repr;
pub use scope::{RefType, Scope};

use serde_json::Value;
use std::fmt;
use std::sync::Weak;

use crate::error::TypeError;
use crate::schema::Schema;
use crate::value::TypedValue;
use scope::ScopeInner;

/// The unified enum covering all type class instances.
#[derive(Debug, Clone)]
pub enum TypeNode {
    Any(AnyType),
    Bool(BoolType),
    Int(IntType),
    Float(FloatType),
    String(StringType),
    List(ListType),
    Object(ObjectType),
    Ref(RefType),
    OneOfInt(OneOfType<i64>),
    OneOfString(OneOfType<String>),
    Scope(Scope),
}

macro_rules! dispatch {
    ($self:expr, $t:ident => $body:expr) => {
        match $self {
            TypeNode::Any($t) => $body,
            TypeNode::Bool($t) => $body,
            TypeNode::Int($t) => $body,
            TypeNode::Float($t) => $body,
            TypeNode::String($t) => $body,
            TypeNode::List($t) => $body,
            TypeNode::Object($t) => $body,
            TypeNode::Ref($t) => $body,
            TypeNode::OneOfInt($t) => $body,
            TypeNode::OneOfString($t) => $body,
            TypeNode::Scope($t) => $body,
        }
    };
}

impl TypeNode {
    /// Returns the kind string; matches the schema's `type_id` tag.
    pub fn kind(&self) -> &'static str {
        dispatch!(self, t => t.kind())
    }

    /// Returns the schema representation of this type node.
    pub fn get_schema(&self) -> Schema {
        match self {
            Self::Any(t) => t.get_schema(),
            Self::Bool(t) => t.get_schema(),
            Self::Int(t) => t.get_schema(),
            Self::Float(t) => t.get_schema(),
            Self::String(t) => t.get_schema(),
            Self::List(t) => t.get_schema(),
            Self::Object(t) => Schema::Object(t.get_schema()),
            Self::Ref(t) => Schema::Ref(t.get_schema()),
            Self::OneOfInt(t) => Schema::OneOfInt(t.get_schema()),
            Self::OneOfString(t) => Schema::OneOfString(t.get_schema()),
            Self::Scope(t) => Schema::Scope(t.get_schema()),
        }
    }

    /// Native representation of values this type produces.
    pub fn repr(&self) -> Repr {
        dispatch!(self, t => t.repr())
    }

    /// Converts untyped input into its native form.
    pub fn unserialize(&self, input: &Value) -> Result<TypedValue, TypeError> {
        dispatch!(self, t => t.unserialize(input))
    }

    /// Converts a native value back into untyped form.
    pub fn serialize(&self, value: &TypedValue) -> Result<Value, TypeError> {
        dispatch!(self, t => t.serialize(value))
    }

    /// Checks that `value` conforms to this type.
    pub fn validate(&self, value: &TypedValue) -> Result<(), TypeError> {
        self.serialize(value).map(|_| ())
    }

    /// Visits this node and every node nested in it, stopping at nested
    /// scopes, which were checked when they were built.
    pub(crate) fn walk(&self, f: &mut dyn FnMut(&TypeNode)) {
        f(self);
        match self {
            Self::List(t) => t.items.walk(f),
            Self::Object(t) => {
                for prop in t.properties().values() {
                    prop.type_.walk(f);
                }
            }
            _ => {}
        }
    }

    /// Binds every reference below this node to `scope`. Nested scopes keep
    /// their own bindings.
    pub(crate) fn bind_scope(&mut self, scope: &Weak<ScopeInner>) {
        match self {
            Self::List(t) => t.items.bind_scope(scope),
            Self::Object(t) => t.bind_scope(scope),
            Self::Ref(t) => t.bind(scope),
            Self::OneOfInt(t) => t.bind_scope(scope),
            Self::OneOfString(t) => t.bind_scope(scope),
            _ => {}
        }
    }
}

macro_rules! impl_from_class {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(impl From<$ty> for TypeNode {
            fn from(t: $ty) -> Self {
                Self::$variant(t)
            }
        })*
    };
}

impl_from_class!(
    Any(AnyType),
    Bool(BoolType),
    Int(IntType),
    Float(FloatType),
    String(StringType),
    List(ListType),
    Object(ObjectType),
    Ref(RefType),
    OneOfInt(OneOfType<i64>),
    OneOfString(OneOfType<String>),
    Scope(Scope),
);

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object(t) => write!(f, "object {:?}", t.id()),
            Self::Ref(t) => write!(f, "ref {:?}", t.id()),
            Self::Scope(t) => write!(f, "scope {:?}", t.root()),
            Self::List(t) => write!(f, "list of {}", t.items),
            other => f.write_str(other.kind()),
        }
    }
}

impl serde::Serialize for TypeNode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&self.get_schema(), serializer)
    }
}

impl<'de> serde::Deserialize<'de> for TypeNode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let schema = <Schema as serde::Deserialize>::deserialize(deserializer)?;
        TypeBuilder::new()
            .import(&schema)
            .map_err(serde::de::Error::custom)
    }
}
