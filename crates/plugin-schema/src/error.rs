//! Error types.
//!
//! Construction problems ([`SchemaError`]) are fatal for the value being
//! built. Data problems ([`TypeError`]) and call problems ([`FunctionError`])
//! are reported per operation and never mutate the types involved.

use thiserror::Error;

use crate::type_def::Repr;

/// Boxed error carried by handler failures and dynamic type resolvers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Construction-time errors. A value whose construction failed is never
/// handed out.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("object id {0:?} is declared more than once in the scope")]
    DuplicateObject(String),
    #[error("field {field:?} is declared more than once in object {object:?}")]
    DuplicateField { object: String, field: String },
    #[error("discriminator value {key} is mapped more than once for field {field:?}")]
    DuplicateDiscriminator { field: String, key: String },
    #[error("discriminator value {key:?} for field {field:?} is not a valid integer")]
    InvalidDiscriminatorKey { field: String, key: String },
    #[error("object declared under key {key:?} has id {id:?}")]
    ObjectIdMismatch { key: String, id: String },
    #[error("root object {0:?} is not declared in the scope")]
    UnknownRoot(String),
    #[error("reference to {0:?} does not resolve within its scope")]
    UnresolvedRef(String),
    #[error(
        "object {object:?} declares discriminator field {field:?} as {declared}, \
         but the one-of is keyed by {expected}"
    )]
    DiscriminatorConflict {
        object: String,
        field: String,
        declared: Repr,
        expected: Repr,
    },
    #[error("function {id:?}: {source}")]
    Signature {
        id: String,
        #[source]
        source: SignatureError,
    },
}

/// Mismatch between a declared function signature and the handler bound to it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("handler takes {actual} parameters, declared {expected}")]
    ArityMismatch { expected: usize, actual: usize },
    #[error("parameter {index}: handler takes {handler}, declared {declared}")]
    ParameterMismatch {
        index: usize,
        declared: Repr,
        handler: Repr,
    },
    #[error("handler returns {handler}, declared output is {declared}")]
    OutputMismatch { declared: Repr, handler: Repr },
    #[error("{expected}, but the handler has {actual} return values")]
    UnexpectedReturns { expected: &'static str, actual: usize },
    #[error("return value {index} must be an error return")]
    NonErrorReturn { index: usize },
    #[error("return value {index} must be a data value, the handler returns an error there")]
    NonValueReturn { index: usize },
}

/// Errors raised while unserializing, serializing or validating data.
#[derive(Debug, Error)]
pub enum TypeError {
    #[error("invalid input: expected {expected}, got {found}")]
    InvalidInput { expected: String, found: String },
    #[error("missing discriminator field {field:?}")]
    MissingDiscriminator { field: String },
    #[error("type mismatch: expected {expected}, got {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("unknown variant {key} (valid values: {})", .valid.join(", "))]
    UnknownVariant { key: String, valid: Vec<String> },
    #[error("unknown type {0:?}")]
    UnknownType(String),
    #[error("missing required field {field:?}")]
    MissingField { field: String },
    #[error("unknown field {field:?}")]
    UnknownField { field: String },
    #[error("field {field:?} cannot be set together with {other:?}")]
    Conflict { field: String, other: String },
    #[error("discriminator field {field:?} holds {found}, variant key is {key}")]
    DiscriminatorConflict {
        field: String,
        key: String,
        found: String,
    },
    #[error("field {field:?}: {source}")]
    Field {
        field: String,
        #[source]
        source: Box<TypeError>,
    },
}

impl TypeError {
    /// Wraps this error with the name of the field it occurred in.
    pub fn in_field(self, field: impl Into<String>) -> Self {
        Self::Field {
            field: field.into(),
            source: Box::new(self),
        }
    }

    /// Strips every [`TypeError::Field`] layer and returns the innermost error.
    pub fn root_cause(&self) -> &TypeError {
        match self {
            Self::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Dotted path of the fields the error is nested in, outermost first.
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = self;
        while let Self::Field { field, source } = current {
            path.push(field.as_str());
            current = source;
        }
        path
    }

    pub(crate) fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Errors raised when calling or introspecting a function.
#[derive(Debug, Error)]
pub enum FunctionError {
    #[error("function {id:?} expects {expected} arguments, got {actual}")]
    Arity {
        id: String,
        expected: usize,
        actual: usize,
    },
    #[error("function {id:?}: argument {index}: {source}")]
    Argument {
        id: String,
        index: usize,
        #[source]
        source: TypeError,
    },
    #[error("function {id:?} returned an error: {source}")]
    HandlerExecution {
        id: String,
        #[source]
        source: BoxError,
    },
    #[error("function {id:?}: trailing return value is not an error return")]
    InvalidErrorReturn { id: String },
    #[error("function {id:?}: data return slot holds an error return")]
    InvalidDataReturn { id: String },
    #[error("function {id:?}: expected {expected} return values plus an optional error, got {actual}")]
    UnexpectedReturnCount {
        id: String,
        expected: usize,
        actual: usize,
    },
    #[error("function {id:?}: cannot determine output type: {source}")]
    DynamicTypeResolution {
        id: String,
        #[source]
        source: BoxError,
    },
    #[error("function {id:?} cannot be represented as a function schema because its output type is dynamic")]
    UnrepresentableSchema { id: String },
    #[error("function {id:?}: {source}")]
    Type {
        id: String,
        #[source]
        source: TypeError,
    },
}
