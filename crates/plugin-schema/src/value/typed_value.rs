//! The native form of data described by a type.

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};
use std::fmt;

use super::native::NativeType;
use crate::error::TypeError;

/// Returns a short name for the JSON kind of `value`, used in diagnostics.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The discriminator value that selected a one-of variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Discriminant {
    Int(i64),
    String(String),
}

impl fmt::Display for Discriminant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<i64> for Discriminant {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for Discriminant {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Discriminant {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// An unserialized object: its declaring object id plus field values in
/// declaration order. Absent optional fields hold [`TypedValue::Null`].
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectValue {
    id: String,
    fields: IndexMap<String, TypedValue>,
}

impl ObjectValue {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: IndexMap::new(),
        }
    }

    /// Builder form of [`ObjectValue::insert`].
    pub fn with(mut self, field: impl Into<String>, value: impl Into<TypedValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fields(&self) -> &IndexMap<String, TypedValue> {
        &self.fields
    }

    pub fn get(&self, field: &str) -> Option<&TypedValue> {
        self.fields.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<TypedValue>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Removes `field` and converts it into a native value.
    pub fn take<T: NativeType>(&mut self, field: &str) -> Result<T, TypeError> {
        let value = self
            .fields
            .shift_remove(field)
            .ok_or_else(|| TypeError::MissingField {
                field: field.to_string(),
            })?;
        T::from_value(value).map_err(|e| e.in_field(field))
    }
}

/// The tagged result of unserializing a one-of: which key matched and the
/// value the matching variant produced.
#[derive(Debug, Clone, PartialEq)]
pub struct OneOfValue {
    pub key: Discriminant,
    pub value: Box<TypedValue>,
}

impl OneOfValue {
    pub fn new(key: impl Into<Discriminant>, value: impl Into<TypedValue>) -> Self {
        Self {
            key: key.into(),
            value: Box::new(value.into()),
        }
    }

    /// Id of the object the variant resolved to, if the value is an object.
    pub fn variant_id(&self) -> Option<&str> {
        match self.value.as_ref() {
            TypedValue::Object(obj) => Some(obj.id()),
            _ => None,
        }
    }
}

/// Native value produced by a type's unserialize and consumed by its
/// serialize.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<TypedValue>),
    Object(ObjectValue),
    OneOf(OneOfValue),
    /// Untyped data passed through an any-type unchanged.
    Any(Value),
}

impl TypedValue {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Object(_) => "object",
            Self::OneOf(_) => "one-of",
            Self::Any(_) => "any",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_one_of(&self) -> Option<&OneOfValue> {
        match self {
            Self::OneOf(v) => Some(v),
            _ => None,
        }
    }

    /// Unwraps an object declared with the given id.
    pub fn into_object(self, id: &str) -> Result<ObjectValue, TypeError> {
        match self {
            Self::Object(obj) if obj.id == id => Ok(obj),
            Self::Object(obj) => Err(TypeError::mismatch(
                format!("object {id:?}"),
                format!("object {:?}", obj.id),
            )),
            other => Err(TypeError::mismatch(format!("object {id:?}"), other.kind())),
        }
    }

    /// Structural JSON rendering that does not consult any type. One-of
    /// values render as their inner value, without a discriminator.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(v) => Value::Bool(*v),
            Self::Int(v) => Value::from(*v),
            Self::Float(v) => Number::from_f64(*v).map_or(Value::Null, Value::Number),
            Self::String(v) => Value::String(v.clone()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(obj) => Value::Object(
                obj.fields
                    .iter()
                    .filter(|(_, v)| !v.is_null())
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<_, _>>(),
            ),
            Self::OneOf(v) => v.value.to_json(),
            Self::Any(v) => v.clone(),
        }
    }
}

impl From<bool> for TypedValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for TypedValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for TypedValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for TypedValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<ObjectValue> for TypedValue {
    fn from(v: ObjectValue) -> Self {
        Self::Object(v)
    }
}

impl From<OneOfValue> for TypedValue {
    fn from(v: OneOfValue) -> Self {
        Self::OneOf(v)
    }
}

impl From<Vec<TypedValue>> for TypedValue {
    fn from(v: Vec<TypedValue>) -> Self {
        Self::List(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn take_converts_and_removes_field() {
        let mut obj = ObjectValue::new("B").with("message", "hi").with("n", 3i64);
        let message: String = obj.take("message").unwrap();
        assert_eq!(message, "hi");
        assert!(obj.get("message").is_none());
        let err = obj.take::<String>("n").unwrap_err();
        assert_eq!(err.path(), vec!["n"]);
        assert!(matches!(
            obj.take::<i64>("missing"),
            Err(TypeError::MissingField { .. })
        ));
    }

    #[test]
    fn into_object_checks_the_id() {
        let value = TypedValue::from(ObjectValue::new("B"));
        assert!(value.clone().into_object("B").is_ok());
        assert!(matches!(
            value.into_object("C"),
            Err(TypeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn to_json_skips_null_fields() {
        let value = TypedValue::from(OneOfValue::new(
            1i64,
            ObjectValue::new("B")
                .with("message", "Hello")
                .with("extra", TypedValue::Null)
                .with("tags", vec![TypedValue::from("a")]),
        ));
        assert_eq!(value.to_json(), json!({"message": "Hello", "tags": ["a"]}));
    }

    #[test]
    fn discriminant_display_quotes_strings() {
        assert_eq!(Discriminant::from(3i64).to_string(), "3");
        assert_eq!(Discriminant::from("b").to_string(), "\"b\"");
    }
}
