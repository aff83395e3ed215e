//! Discriminated union over the objects of one scope.
//!
//! The variant is chosen by a discriminator field read from the input
//! object. The whole input, discriminator included, is handed to the chosen
//! object; the result is tagged with the matched key so callers never need
//! to look at the discriminator again.

use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::hash::Hash;
use std::sync::Weak;
use tracing::trace;

use super::classes::as_integer;
use super::scope::{RefType, ScopeInner};
use super::Repr;
use crate::error::{SchemaError, TypeError};
use crate::schema::OneOfSchema;
use crate::value::{json_kind, Discriminant, OneOfValue, TypedValue};

/// Key type of a one-of: `i64` or `String`.
pub trait DiscriminatorKey:
    Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// Representation a discriminator field must have to hold these keys.
    fn repr() -> Repr;
    /// Kind string of a one-of keyed by this type.
    fn one_of_kind() -> &'static str;
    /// Reads a key from an untyped discriminator value.
    fn coerce(value: &Value) -> Option<Self>;
    fn to_json(&self) -> Value;
    fn to_discriminant(&self) -> Discriminant;
    /// Returns the key held by `d`, or `None` if `d` is of the other kind.
    fn from_discriminant(d: &Discriminant) -> Option<Self>;
}

impl DiscriminatorKey for i64 {
    fn repr() -> Repr {
        Repr::Int
    }
    fn one_of_kind() -> &'static str {
        "one_of_int"
    }
    /// Integers, integral floats and strings holding an integer.
    fn coerce(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => s.trim().parse().ok(),
            other => as_integer(other),
        }
    }
    fn to_json(&self) -> Value {
        Value::from(*self)
    }
    fn to_discriminant(&self) -> Discriminant {
        Discriminant::Int(*self)
    }
    fn from_discriminant(d: &Discriminant) -> Option<Self> {
        match d {
            Discriminant::Int(v) => Some(*v),
            Discriminant::String(_) => None,
        }
    }
}

impl DiscriminatorKey for String {
    fn repr() -> Repr {
        Repr::String
    }
    fn one_of_kind() -> &'static str {
        "one_of_string"
    }
    fn coerce(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
    fn to_json(&self) -> Value {
        Value::String(self.clone())
    }
    fn to_discriminant(&self) -> Discriminant {
        Discriminant::String(self.clone())
    }
    fn from_discriminant(d: &Discriminant) -> Option<Self> {
        match d {
            Discriminant::String(v) => Some(v.clone()),
            Discriminant::Int(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OneOfType<K: DiscriminatorKey> {
    discriminator_field: String,
    types: IndexMap<K, RefType>,
}

impl<K: DiscriminatorKey> OneOfType<K> {
    /// Fails with [`SchemaError::DuplicateDiscriminator`] when a key is
    /// mapped twice.
    pub fn new(
        discriminator_field: impl Into<String>,
        types: impl IntoIterator<Item = (K, RefType)>,
    ) -> Result<Self, SchemaError> {
        let discriminator_field = discriminator_field.into();
        let mut map = IndexMap::new();
        for (key, target) in types {
            if map.contains_key(&key) {
                return Err(SchemaError::DuplicateDiscriminator {
                    field: discriminator_field,
                    key: key.to_string(),
                });
            }
            map.insert(key, target);
        }
        Ok(Self {
            discriminator_field,
            types: map,
        })
    }

    pub fn discriminator_field(&self) -> &str {
        &self.discriminator_field
    }

    pub fn types(&self) -> &IndexMap<K, RefType> {
        &self.types
    }

    pub fn get_schema(&self) -> OneOfSchema {
        OneOfSchema {
            discriminator_field_name: self.discriminator_field.clone(),
            types: self
                .types
                .iter()
                .map(|(k, r)| (k.to_string(), r.get_schema()))
                .collect(),
        }
    }

    pub fn kind(&self) -> &'static str {
        K::one_of_kind()
    }

    pub fn repr(&self) -> Repr {
        Repr::Any
    }

    fn unknown_variant(&self, key: impl fmt::Display) -> TypeError {
        TypeError::UnknownVariant {
            key: key.to_string(),
            valid: self.types.keys().map(ToString::to_string).collect(),
        }
    }

    pub fn unserialize(&self, input: &Value) -> Result<TypedValue, TypeError> {
        let field = self.discriminator_field.as_str();
        let Value::Object(map) = input else {
            return Err(TypeError::InvalidInput {
                expected: format!("object with discriminator field {field:?}"),
                found: json_kind(input).to_string(),
            });
        };
        let raw = map.get(field).ok_or_else(|| TypeError::MissingDiscriminator {
            field: field.to_string(),
        })?;
        let key = K::coerce(raw).ok_or_else(|| {
            TypeError::mismatch(format!("{} discriminator", K::repr()), json_kind(raw))
                .in_field(field)
        })?;
        let target = self
            .types
            .get(&key)
            .ok_or_else(|| self.unknown_variant(&key))?;
        trace!(field, %key, target = target.id(), "one-of dispatch");
        let value = target.unserialize_variant(input, field)?;
        Ok(TypedValue::OneOf(OneOfValue {
            key: key.to_discriminant(),
            value: Box::new(value),
        }))
    }

    /// Serializes the variant value and writes the discriminator into the
    /// resulting object.
    pub fn serialize(&self, value: &TypedValue) -> Result<Value, TypeError> {
        let TypedValue::OneOf(one_of) = value else {
            return Err(TypeError::mismatch("one-of", value.kind()));
        };
        let (key, target) = K::from_discriminant(&one_of.key)
            .and_then(|k| self.types.get_key_value(&k))
            .ok_or_else(|| self.unknown_variant(&one_of.key))?;
        let mut out = target.serialize(&one_of.value)?;
        let map = match &mut out {
            Value::Object(map) => map,
            other => return Err(TypeError::mismatch("object", json_kind(other))),
        };
        match map.get(&self.discriminator_field) {
            Some(existing) if K::coerce(existing).as_ref() != Some(key) => {
                return Err(TypeError::DiscriminatorConflict {
                    field: self.discriminator_field.clone(),
                    key: key.to_string(),
                    found: existing.to_string(),
                });
            }
            Some(_) => {}
            None => {
                map.insert(self.discriminator_field.clone(), key.to_json());
            }
        }
        Ok(out)
    }

    pub(crate) fn bind_scope(&mut self, scope: &Weak<ScopeInner>) {
        for target in self.types.values_mut() {
            target.bind(scope);
        }
    }
}
