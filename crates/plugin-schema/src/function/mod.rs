//! Typed functions.
//!
//! A [`CallableFunction`] binds a declared parameter/output signature to a
//! native [`Handler`]. The handler's signature is checked against the
//! declaration once, when the function is built; [`CallableFunction::call`]
//! then folds the handler's return list (nothing, an error, a value, or a
//! value and an error) into a single `Result`.

pub mod handler;

pub use handler::{
    ArgumentError, FnHandler, Handler, HandlerSignature, IntoHandler, ReturnShape, ReturnSlot,
    Returned,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::{BoxError, FunctionError, SchemaError, SignatureError};
use crate::schema::Display;
use crate::type_def::TypeNode;
use crate::value::TypedValue;

/// Computes a dynamic function's output type from its parameter types.
pub type OutputResolver =
    Arc<dyn Fn(&[TypeNode]) -> Result<TypeNode, BoxError> + Send + Sync + 'static>;

/// Common introspection surface of declared and callable functions.
pub trait Function {
    fn id(&self) -> &str;
    fn parameters(&self) -> &[TypeNode];
    /// Output type for the given parameter types; `None` for functions that
    /// return nothing.
    fn output(&self, inputs: &[TypeNode]) -> Result<Option<TypeNode>, FunctionError>;
    fn display(&self) -> Option<&Display>;
}

// -------------------------------------------------------------------------
// FunctionSchema

/// Documentation-only projection of a function: its signature without a
/// handler.
///
/// Deserializing one imports every parameter and output type through
/// [`TypeBuilder::import`](crate::TypeBuilder::import).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSchema {
    pub id: String,
    pub inputs: Vec<TypeNode>,
    pub output: Option<TypeNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<Display>,
}

impl Function for FunctionSchema {
    fn id(&self) -> &str {
        &self.id
    }
    fn parameters(&self) -> &[TypeNode] {
        &self.inputs
    }
    fn output(&self, _inputs: &[TypeNode]) -> Result<Option<TypeNode>, FunctionError> {
        Ok(self.output.clone())
    }
    fn display(&self) -> Option<&Display> {
        self.display.as_ref()
    }
}

// -------------------------------------------------------------------------
// CallableFunction

#[derive(Clone)]
enum Output {
    Void,
    Static(TypeNode),
    Dynamic(OutputResolver),
}

impl Output {
    /// Number of data values the handler returns ahead of its optional
    /// error return.
    fn data_returns(&self) -> usize {
        match self {
            Self::Void => 0,
            Self::Static(_) | Self::Dynamic(_) => 1,
        }
    }
}

/// A function bound to a native handler.
#[derive(Clone)]
pub struct CallableFunction {
    id: String,
    inputs: Vec<TypeNode>,
    output: Output,
    display: Option<Display>,
    handler: Arc<dyn Handler>,
}

impl CallableFunction {
    /// Binds `handler` to a static signature. `output` of `None` declares a
    /// function without a data return.
    pub fn new<Args>(
        id: impl Into<String>,
        inputs: Vec<TypeNode>,
        output: Option<TypeNode>,
        display: Option<Display>,
        handler: impl IntoHandler<Args>,
    ) -> Result<Self, SchemaError> {
        Self::from_handler(id, inputs, output, display, handler.into_handler())
    }

    /// Binds `handler` to a signature whose output type is computed per call
    /// by `resolver`. The handler must return a value and an error.
    pub fn new_dynamic<Args, R>(
        id: impl Into<String>,
        inputs: Vec<TypeNode>,
        display: Option<Display>,
        handler: impl IntoHandler<Args>,
        resolver: R,
    ) -> Result<Self, SchemaError>
    where
        R: Fn(&[TypeNode]) -> Result<TypeNode, BoxError> + Send + Sync + 'static,
    {
        Self::dynamic_from_handler(id, inputs, display, handler.into_handler(), Arc::new(resolver))
    }

    /// [`CallableFunction::new`] for a hand-written [`Handler`].
    pub fn from_handler(
        id: impl Into<String>,
        inputs: Vec<TypeNode>,
        output: Option<TypeNode>,
        display: Option<Display>,
        handler: Arc<dyn Handler>,
    ) -> Result<Self, SchemaError> {
        let output = match output {
            Some(t) => Output::Static(t),
            None => Output::Void,
        };
        Self::bind(id.into(), inputs, output, display, handler)
    }

    /// [`CallableFunction::new_dynamic`] for a hand-written [`Handler`].
    pub fn dynamic_from_handler(
        id: impl Into<String>,
        inputs: Vec<TypeNode>,
        display: Option<Display>,
        handler: Arc<dyn Handler>,
        resolver: OutputResolver,
    ) -> Result<Self, SchemaError> {
        Self::bind(id.into(), inputs, Output::Dynamic(resolver), display, handler)
    }

    fn bind(
        id: String,
        inputs: Vec<TypeNode>,
        output: Output,
        display: Option<Display>,
        handler: Arc<dyn Handler>,
    ) -> Result<Self, SchemaError> {
        let signature = handler.signature();
        if let Err(source) = check_signature(&inputs, &output, &signature) {
            return Err(SchemaError::Signature { id, source });
        }
        debug!(
            id = %id,
            inputs = inputs.len(),
            returns = signature.outputs.len(),
            "function bound"
        );
        Ok(Self {
            id,
            inputs,
            output,
            display,
            handler,
        })
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.output, Output::Dynamic(_))
    }

    /// Projects the function onto its documentation-only schema.
    ///
    /// Fails with [`FunctionError::UnrepresentableSchema`] for dynamic
    /// functions, whose output type has no static form.
    pub fn to_function_schema(&self) -> Result<FunctionSchema, FunctionError> {
        let output = match &self.output {
            Output::Void => None,
            Output::Static(t) => Some(t.clone()),
            Output::Dynamic(_) => {
                return Err(FunctionError::UnrepresentableSchema {
                    id: self.id.clone(),
                })
            }
        };
        Ok(FunctionSchema {
            id: self.id.clone(),
            inputs: self.inputs.clone(),
            output,
            display: self.display.clone(),
        })
    }

    /// Calls the handler with already unserialized arguments.
    ///
    /// Returns the handler's data value, `None` for functions without a
    /// data return. A handler error is returned as
    /// [`FunctionError::HandlerExecution`] and its data value is discarded.
    pub fn call(&self, args: Vec<TypedValue>) -> Result<Option<TypedValue>, FunctionError> {
        let expected = self.inputs.len();
        if args.len() != expected {
            return Err(FunctionError::Arity {
                id: self.id.clone(),
                expected,
                actual: args.len(),
            });
        }
        let returns = self
            .handler
            .invoke(args)
            .map_err(|e| FunctionError::Argument {
                id: self.id.clone(),
                index: e.index,
                source: e.source,
            })?;
        self.normalize(returns)
    }

    fn normalize(&self, returns: Vec<Returned>) -> Result<Option<TypedValue>, FunctionError> {
        let data = self.output.data_returns();
        let actual = returns.len();
        if actual != data && actual != data + 1 {
            return Err(FunctionError::UnexpectedReturnCount {
                id: self.id.clone(),
                expected: data,
                actual,
            });
        }
        let mut returns = returns.into_iter();
        let value = if data == 0 {
            None
        } else {
            match returns.next() {
                Some(Returned::Value(v)) => Some(v),
                _ => {
                    return Err(FunctionError::InvalidDataReturn {
                        id: self.id.clone(),
                    })
                }
            }
        };
        match returns.next() {
            None | Some(Returned::Error(None)) => Ok(value),
            Some(Returned::Error(Some(source))) => {
                debug!(id = %self.id, error = %source, "handler returned an error");
                Err(FunctionError::HandlerExecution {
                    id: self.id.clone(),
                    source,
                })
            }
            Some(Returned::Value(_)) => Err(FunctionError::InvalidErrorReturn {
                id: self.id.clone(),
            }),
        }
    }

    /// Unserializes `args` through the declared parameter types, calls the
    /// function and serializes the result through its output type.
    pub fn call_json(&self, args: &[Value]) -> Result<Option<Value>, FunctionError> {
        if args.len() != self.inputs.len() {
            return Err(FunctionError::Arity {
                id: self.id.clone(),
                expected: self.inputs.len(),
                actual: args.len(),
            });
        }
        let typed = self
            .inputs
            .iter()
            .zip(args)
            .enumerate()
            .map(|(index, (t, raw))| {
                t.unserialize(raw).map_err(|source| FunctionError::Argument {
                    id: self.id.clone(),
                    index,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let output = self.output(&self.inputs)?;
        match (self.call(typed)?, output) {
            (Some(value), Some(output)) => {
                output
                    .serialize(&value)
                    .map(Some)
                    .map_err(|source| FunctionError::Type {
                        id: self.id.clone(),
                        source,
                    })
            }
            _ => Ok(None),
        }
    }
}

impl Function for CallableFunction {
    fn id(&self) -> &str {
        &self.id
    }

    fn parameters(&self) -> &[TypeNode] {
        &self.inputs
    }

    fn output(&self, inputs: &[TypeNode]) -> Result<Option<TypeNode>, FunctionError> {
        match &self.output {
            Output::Void => Ok(None),
            Output::Static(t) => Ok(Some(t.clone())),
            Output::Dynamic(resolve) => resolve(inputs).map(Some).map_err(|source| {
                FunctionError::DynamicTypeResolution {
                    id: self.id.clone(),
                    source,
                }
            }),
        }
    }

    fn display(&self) -> Option<&Display> {
        self.display.as_ref()
    }
}

impl fmt::Debug for CallableFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallableFunction")
            .field("id", &self.id)
            .field("inputs", &self.inputs)
            .field("dynamic", &self.is_dynamic())
            .finish()
    }
}

fn check_signature(
    inputs: &[TypeNode],
    output: &Output,
    signature: &HandlerSignature,
) -> Result<(), SignatureError> {
    if signature.inputs.len() != inputs.len() {
        return Err(SignatureError::ArityMismatch {
            expected: inputs.len(),
            actual: signature.inputs.len(),
        });
    }
    for (index, (declared, handler)) in inputs.iter().zip(&signature.inputs).enumerate() {
        let declared = declared.repr();
        if declared != *handler {
            return Err(SignatureError::ParameterMismatch {
                index,
                declared,
                handler: handler.clone(),
            });
        }
    }

    let outputs = signature.outputs.as_slice();
    match output {
        Output::Void => match outputs {
            [] | [ReturnSlot::Error] => Ok(()),
            [ReturnSlot::Value(_)] => Err(SignatureError::NonErrorReturn { index: 0 }),
            _ => Err(SignatureError::UnexpectedReturns {
                expected: "no return value or a single error return",
                actual: outputs.len(),
            }),
        },
        Output::Static(declared) => {
            let declared = declared.repr();
            match outputs {
                [ReturnSlot::Value(handler)] | [ReturnSlot::Value(handler), ReturnSlot::Error]
                    if *handler == declared =>
                {
                    Ok(())
                }
                [ReturnSlot::Value(handler)] | [ReturnSlot::Value(handler), ReturnSlot::Error] => {
                    Err(SignatureError::OutputMismatch {
                        declared,
                        handler: handler.clone(),
                    })
                }
                [ReturnSlot::Value(_), ReturnSlot::Value(_)] => {
                    Err(SignatureError::NonErrorReturn { index: 1 })
                }
                [ReturnSlot::Error] | [ReturnSlot::Error, _] => {
                    Err(SignatureError::NonValueReturn { index: 0 })
                }
                _ => Err(SignatureError::UnexpectedReturns {
                    expected: "one return value, optionally followed by an error return",
                    actual: outputs.len(),
                }),
            }
        }
        Output::Dynamic(_) => match outputs {
            [ReturnSlot::Value(_), ReturnSlot::Error] => Ok(()),
            [ReturnSlot::Error, _] => Err(SignatureError::NonValueReturn { index: 0 }),
            [_, ReturnSlot::Value(_)] => Err(SignatureError::NonErrorReturn { index: 1 }),
            _ => Err(SignatureError::UnexpectedReturns {
                expected: "a value and an error return",
                actual: outputs.len(),
            }),
        },
    }
}
