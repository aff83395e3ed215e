//! Native handlers behind callable functions.
//!
//! A [`Handler`] reports the native signature it was written against and
//! invokes itself with positional [`TypedValue`] arguments. Plain closures
//! become handlers through [`IntoHandler`]; their signature is read off the
//! Rust parameter and return types.

use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;

use crate::error::{BoxError, TypeError};
use crate::type_def::Repr;
use crate::value::{NativeType, TypedValue};

/// One slot of a handler's return list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnSlot {
    Value(Repr),
    Error,
}

/// The native signature a handler was written against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSignature {
    pub inputs: Vec<Repr>,
    pub outputs: Vec<ReturnSlot>,
}

/// One value produced by a handler invocation.
#[derive(Debug)]
pub enum Returned {
    Value(TypedValue),
    /// An error return; `None` means the handler did not fail.
    Error(Option<BoxError>),
}

/// An argument could not be converted into the handler's native parameter
/// type.
#[derive(Debug, Error)]
#[error("argument {index}: {source}")]
pub struct ArgumentError {
    pub index: usize,
    #[source]
    pub source: TypeError,
}

pub trait Handler: Send + Sync {
    fn signature(&self) -> HandlerSignature;

    /// Invokes the handler. `args` holds exactly one value per input of
    /// [`Handler::signature`].
    fn invoke(&self, args: Vec<TypedValue>) -> Result<Vec<Returned>, ArgumentError>;
}

// -------------------------------------------------------------------------
// Return shapes

/// A Rust return type a handler closure may have.
///
/// Implemented for `()`, `Result<(), E>`, every [`NativeType`] `T` and
/// `Result<T, E>`, where `E` converts into [`BoxError`].
pub trait ReturnShape: Send + 'static {
    fn slots() -> Vec<ReturnSlot>;
    fn into_returns(self) -> Vec<Returned>;
}

impl ReturnShape for () {
    fn slots() -> Vec<ReturnSlot> {
        Vec::new()
    }
    fn into_returns(self) -> Vec<Returned> {
        Vec::new()
    }
}

impl<E> ReturnShape for Result<(), E>
where
    E: Into<BoxError> + Send + 'static,
{
    fn slots() -> Vec<ReturnSlot> {
        vec![ReturnSlot::Error]
    }
    fn into_returns(self) -> Vec<Returned> {
        vec![Returned::Error(self.err().map(Into::into))]
    }
}

impl<T: NativeType> ReturnShape for T {
    fn slots() -> Vec<ReturnSlot> {
        vec![ReturnSlot::Value(T::repr())]
    }
    fn into_returns(self) -> Vec<Returned> {
        vec![Returned::Value(self.into_value())]
    }
}

impl<T, E> ReturnShape for Result<T, E>
where
    T: NativeType,
    E: Into<BoxError> + Send + 'static,
{
    fn slots() -> Vec<ReturnSlot> {
        vec![ReturnSlot::Value(T::repr()), ReturnSlot::Error]
    }
    fn into_returns(self) -> Vec<Returned> {
        match self {
            Ok(value) => vec![Returned::Value(value.into_value()), Returned::Error(None)],
            Err(err) => vec![Returned::Value(TypedValue::Null), Returned::Error(Some(err.into()))],
        }
    }
}

// -------------------------------------------------------------------------
// Closure adapter

/// Conversion of a closure into a [`Handler`]. `Args` is the tuple of the
/// closure's parameter types and only serves to select the impl.
pub trait IntoHandler<Args>: Send + Sync + 'static {
    fn into_handler(self) -> Arc<dyn Handler>;
}

/// [`Handler`] wrapping a closure of parameter types `Args` returning `R`.
pub struct FnHandler<F, Args, R> {
    f: F,
    _marker: PhantomData<fn(Args) -> R>,
}

fn convert<T: NativeType>(
    index: usize,
    arg: Option<TypedValue>,
) -> Result<T, ArgumentError> {
    let value = arg.ok_or_else(|| ArgumentError {
        index,
        source: TypeError::InvalidInput {
            expected: T::repr().to_string(),
            found: "no argument".to_string(),
        },
    })?;
    T::from_value(value).map_err(|source| ArgumentError { index, source })
}

macro_rules! impl_handler {
    ($($ty:ident $arg:ident),*) => {
        impl<F, R, $($ty,)*> Handler for FnHandler<F, ($($ty,)*), R>
        where
            F: Fn($($ty),*) -> R + Send + Sync + 'static,
            R: ReturnShape,
            $($ty: NativeType,)*
        {
            fn signature(&self) -> HandlerSignature {
                HandlerSignature {
                    inputs: vec![$($ty::repr()),*],
                    outputs: R::slots(),
                }
            }

            #[allow(unused_mut, unused_variables, unused_assignments)]
            fn invoke(&self, args: Vec<TypedValue>) -> Result<Vec<Returned>, ArgumentError> {
                let mut args = args.into_iter();
                let mut index = 0;
                $(
                    let $arg = convert::<$ty>(index, args.next())?;
                    index += 1;
                )*
                Ok((self.f)($($arg),*).into_returns())
            }
        }

        impl<F, R, $($ty,)*> IntoHandler<($($ty,)*)> for F
        where
            F: Fn($($ty),*) -> R + Send + Sync + 'static,
            R: ReturnShape,
            $($ty: NativeType,)*
        {
            fn into_handler(self) -> Arc<dyn Handler> {
                Arc::new(FnHandler {
                    f: self,
                    _marker: PhantomData::<fn(($($ty,)*)) -> R>,
                })
            }
        }
    };
}

impl_handler!();
impl_handler!(A0 a0);
impl_handler!(A0 a0, A1 a1);
impl_handler!(A0 a0, A1 a1, A2 a2);
impl_handler!(A0 a0, A1 a1, A2 a2, A3 a3);
impl_handler!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4);
impl_handler!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
