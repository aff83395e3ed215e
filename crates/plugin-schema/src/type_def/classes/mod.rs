//! Leaf type implementations.
//!
//! Primitive types carry no constraints; they exist so objects and one-of
//! variants have something to hold.

use serde_json::{Number, Value};

use super::{Repr, TypeNode};
use crate::error::TypeError;
use crate::schema::Schema;
use crate::value::{json_kind, TypedValue};

fn invalid(expected: &str, input: &Value) -> TypeError {
    TypeError::InvalidInput {
        expected: expected.to_string(),
        found: json_kind(input).to_string(),
    }
}

// -------------------------------------------------------------------------
// AnyType

/// Accepts any untyped value and passes it through unchanged.
#[derive(Debug, Clone, Default)]
pub struct AnyType;

impl AnyType {
    pub fn new() -> Self {
        Self
    }
    pub fn get_schema(&self) -> Schema {
        Schema::Any
    }
    pub fn kind(&self) -> &'static str {
        "any"
    }
    pub fn repr(&self) -> Repr {
        Repr::Any
    }
    pub fn unserialize(&self, input: &Value) -> Result<TypedValue, TypeError> {
        Ok(TypedValue::Any(input.clone()))
    }
    pub fn serialize(&self, value: &TypedValue) -> Result<Value, TypeError> {
        Ok(value.to_json())
    }
}

// -------------------------------------------------------------------------
// BoolType

#[derive(Debug, Clone, Default)]
pub struct BoolType;

impl BoolType {
    pub fn new() -> Self {
        Self
    }
    pub fn get_schema(&self) -> Schema {
        Schema::Bool
    }
    pub fn kind(&self) -> &'static str {
        "bool"
    }
    pub fn repr(&self) -> Repr {
        Repr::Bool
    }
    pub fn unserialize(&self, input: &Value) -> Result<TypedValue, TypeError> {
        input
            .as_bool()
            .map(TypedValue::Bool)
            .ok_or_else(|| invalid("boolean", input))
    }
    pub fn serialize(&self, value: &TypedValue) -> Result<Value, TypeError> {
        match value {
            TypedValue::Bool(v) => Ok(Value::Bool(*v)),
            other => Err(TypeError::mismatch("bool", other.kind())),
        }
    }
}

// -------------------------------------------------------------------------
// IntType

/// 64-bit signed integer. Integral floats such as `2.0` are accepted.
#[derive(Debug, Clone, Default)]
pub struct IntType;

impl IntType {
    pub fn new() -> Self {
        Self
    }
    pub fn get_schema(&self) -> Schema {
        Schema::Integer
    }
    pub fn kind(&self) -> &'static str {
        "integer"
    }
    pub fn repr(&self) -> Repr {
        Repr::Int
    }
    pub fn unserialize(&self, input: &Value) -> Result<TypedValue, TypeError> {
        as_integer(input)
            .map(TypedValue::Int)
            .ok_or_else(|| invalid("integer", input))
    }
    pub fn serialize(&self, value: &TypedValue) -> Result<Value, TypeError> {
        match value {
            TypedValue::Int(v) => Ok(Value::from(*v)),
            other => Err(TypeError::mismatch("int", other.kind())),
        }
    }
}

/// Reads a JSON number as `i64`, accepting floats without a fractional part.
pub(crate) fn as_integer(input: &Value) -> Option<i64> {
    if let Some(v) = input.as_i64() {
        return Some(v);
    }
    let f = input.as_f64()?;
    // i64::MAX is not representable as f64; the upper bound is exclusive.
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

// -------------------------------------------------------------------------
// FloatType

#[derive(Debug, Clone, Default)]
pub struct FloatType;

impl FloatType {
    pub fn new() -> Self {
        Self
    }
    pub fn get_schema(&self) -> Schema {
        Schema::Float
    }
    pub fn kind(&self) -> &'static str {
        "float"
    }
    pub fn repr(&self) -> Repr {
        Repr::Float
    }
    pub fn unserialize(&self, input: &Value) -> Result<TypedValue, TypeError> {
        input
            .as_f64()
            .map(TypedValue::Float)
            .ok_or_else(|| invalid("number", input))
    }
    pub fn serialize(&self, value: &TypedValue) -> Result<Value, TypeError> {
        match value {
            TypedValue::Float(v) => Number::from_f64(*v)
                .map(Value::Number)
                .ok_or_else(|| TypeError::mismatch("finite float", v.to_string())),
            other => Err(TypeError::mismatch("float", other.kind())),
        }
    }
}

// -------------------------------------------------------------------------
// StringType

#[derive(Debug, Clone, Default)]
pub struct StringType;

impl StringType {
    pub fn new() -> Self {
        Self
    }
    pub fn get_schema(&self) -> Schema {
        Schema::String
    }
    pub fn kind(&self) -> &'static str {
        "string"
    }
    pub fn repr(&self) -> Repr {
        Repr::String
    }
    pub fn unserialize(&self, input: &Value) -> Result<TypedValue, TypeError> {
        input
            .as_str()
            .map(|s| TypedValue::String(s.to_string()))
            .ok_or_else(|| invalid("string", input))
    }
    pub fn serialize(&self, value: &TypedValue) -> Result<Value, TypeError> {
        match value {
            TypedValue::String(v) => Ok(Value::String(v.clone())),
            other => Err(TypeError::mismatch("string", other.kind())),
        }
    }
}

// -------------------------------------------------------------------------
// ListType

#[derive(Debug, Clone)]
pub struct ListType {
    pub items: Box<TypeNode>,
}

impl ListType {
    pub fn new(items: TypeNode) -> Self {
        Self {
            items: Box::new(items),
        }
    }
    pub fn get_schema(&self) -> Schema {
        Schema::List {
            items: Box::new(self.items.get_schema()),
        }
    }
    pub fn kind(&self) -> &'static str {
        "list"
    }
    pub fn repr(&self) -> Repr {
        Repr::list(self.items.repr())
    }
    pub fn unserialize(&self, input: &Value) -> Result<TypedValue, TypeError> {
        let items = input.as_array().ok_or_else(|| invalid("array", input))?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                self.items
                    .unserialize(item)
                    .map_err(|e| e.in_field(i.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(TypedValue::List)
    }
    pub fn serialize(&self, value: &TypedValue) -> Result<Value, TypeError> {
        let TypedValue::List(items) = value else {
            return Err(TypeError::mismatch("list", value.kind()));
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                self.items
                    .serialize(item)
                    .map_err(|e| e.in_field(i.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn int_accepts_integral_floats_only() {
        let t = IntType::new();
        assert_eq!(t.unserialize(&json!(3)).unwrap(), TypedValue::Int(3));
        assert_eq!(t.unserialize(&json!(3.0)).unwrap(), TypedValue::Int(3));
        assert!(matches!(
            t.unserialize(&json!(3.5)),
            Err(TypeError::InvalidInput { .. })
        ));
        assert!(t.unserialize(&json!("3")).is_err());
    }

    #[test]
    fn float_serialize_rejects_nan() {
        let t = FloatType::new();
        assert_eq!(t.serialize(&TypedValue::Float(1.5)).unwrap(), json!(1.5));
        assert!(t.serialize(&TypedValue::Float(f64::NAN)).is_err());
    }

    #[test]
    fn list_reports_failing_index() {
        let t = ListType::new(TypeNode::String(StringType::new()));
        let err = t.unserialize(&json!(["a", 2])).unwrap_err();
        assert_eq!(err.path(), vec!["1"]);
        assert_eq!(t.repr(), Repr::list(Repr::String));
    }
}
