//! Native representation descriptors.

use std::fmt;

/// The native representation a type produces and consumes.
///
/// Signature validation compares these for equality: a handler parameter
/// of `Repr::Int` only binds to a declared type whose repr is `Repr::Int`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Repr {
    Any,
    Bool,
    Int,
    Float,
    String,
    List(Box<Repr>),
    /// An object declared under the given id.
    Object(String),
}

impl Repr {
    pub fn list(item: Repr) -> Self {
        Self::List(Box::new(item))
    }

    pub fn object(id: impl Into<String>) -> Self {
        Self::Object(id.into())
    }
}

impl fmt::Display for Repr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::String => f.write_str("string"),
            Self::List(item) => write!(f, "list<{item}>"),
            Self::Object(id) => write!(f, "object<{id}>"),
        }
    }
}
