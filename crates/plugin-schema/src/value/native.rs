//! Conversion between [`TypedValue`] and plain Rust types.
//!
//! Function handlers are written against Rust types; the [`Repr`] each type
//! reports is what signature validation compares with the declared types.

use super::typed_value::{OneOfValue, TypedValue};
use crate::error::TypeError;
use crate::type_def::Repr;

/// A Rust type that stands for one native representation.
///
/// User structs implement this by hand, usually through
/// [`TypedValue::into_object`] and [`super::ObjectValue::take`]:
///
/// ```
/// use plugin_schema::{NativeType, ObjectValue, Repr, TypeError, TypedValue};
///
/// struct Greeting {
///     message: String,
/// }
///
/// impl NativeType for Greeting {
///     fn repr() -> Repr {
///         Repr::object("B")
///     }
///     fn from_value(value: TypedValue) -> Result<Self, TypeError> {
///         let mut obj = value.into_object("B")?;
///         Ok(Self { message: obj.take("message")? })
///     }
///     fn into_value(self) -> TypedValue {
///         ObjectValue::new("B").with("message", self.message).into()
///     }
/// }
/// ```
pub trait NativeType: Sized + Send + 'static {
    fn repr() -> Repr;
    fn from_value(value: TypedValue) -> Result<Self, TypeError>;
    fn into_value(self) -> TypedValue;
}

macro_rules! impl_native_scalar {
    ($ty:ty, $variant:ident, $repr:expr) => {
        impl NativeType for $ty {
            fn repr() -> Repr {
                $repr
            }
            fn from_value(value: TypedValue) -> Result<Self, TypeError> {
                match value {
                    TypedValue::$variant(v) => Ok(v),
                    other => Err(TypeError::mismatch(Self::repr().to_string(), other.kind())),
                }
            }
            fn into_value(self) -> TypedValue {
                TypedValue::$variant(self)
            }
        }
    };
}

impl_native_scalar!(bool, Bool, Repr::Bool);
impl_native_scalar!(i64, Int, Repr::Int);
impl_native_scalar!(f64, Float, Repr::Float);
impl_native_scalar!(String, String, Repr::String);

impl<T: NativeType> NativeType for Vec<T> {
    fn repr() -> Repr {
        Repr::list(T::repr())
    }
    fn from_value(value: TypedValue) -> Result<Self, TypeError> {
        match value {
            TypedValue::List(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| T::from_value(item).map_err(|e| e.in_field(i.to_string())))
                .collect(),
            other => Err(TypeError::mismatch(Self::repr().to_string(), other.kind())),
        }
    }
    fn into_value(self) -> TypedValue {
        TypedValue::List(self.into_iter().map(T::into_value).collect())
    }
}

impl NativeType for TypedValue {
    fn repr() -> Repr {
        Repr::Any
    }
    fn from_value(value: TypedValue) -> Result<Self, TypeError> {
        Ok(value)
    }
    fn into_value(self) -> TypedValue {
        self
    }
}

impl NativeType for OneOfValue {
    fn repr() -> Repr {
        Repr::Any
    }
    fn from_value(value: TypedValue) -> Result<Self, TypeError> {
        match value {
            TypedValue::OneOf(v) => Ok(v),
            other => Err(TypeError::mismatch("one-of", other.kind())),
        }
    }
    fn into_value(self) -> TypedValue {
        TypedValue::OneOf(self)
    }
}
