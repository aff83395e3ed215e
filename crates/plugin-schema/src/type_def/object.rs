//! Object and property types.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::Weak;

use super::scope::ScopeInner;
use super::{Repr, TypeNode};
use crate::error::{SchemaError, TypeError};
use crate::schema::{Display, ObjectSchema, PropertySchema};
use crate::value::{json_kind, ObjectValue, TypedValue};

// -------------------------------------------------------------------------
// PropertyType

/// One field of an object: its type, whether it must be present, and what
/// stands in for it when it is absent.
#[derive(Debug, Clone)]
pub struct PropertyType {
    pub type_: TypeNode,
    pub required: bool,
    pub default: Option<Value>,
    pub required_if: Vec<String>,
    pub required_if_not: Vec<String>,
    pub conflicts: Vec<String>,
    pub display: Option<Display>,
}

impl PropertyType {
    fn new(type_: TypeNode, required: bool) -> Self {
        Self {
            type_,
            required,
            default: None,
            required_if: Vec::new(),
            required_if_not: Vec::new(),
            conflicts: Vec::new(),
            display: None,
        }
    }

    pub fn required(type_: impl Into<TypeNode>) -> Self {
        Self::new(type_.into(), true)
    }

    pub fn optional(type_: impl Into<TypeNode>) -> Self {
        Self::new(type_.into(), false)
    }

    /// JSON value unserialized through the property type when the field is
    /// absent.
    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Makes the field required whenever `field` is present.
    pub fn required_if(mut self, field: impl Into<String>) -> Self {
        self.required_if.push(field.into());
        self
    }

    /// Makes the field required whenever none of the `required_if_not`
    /// fields is present.
    pub fn required_if_not(mut self, field: impl Into<String>) -> Self {
        self.required_if_not.push(field.into());
        self
    }

    pub fn conflicts(mut self, field: impl Into<String>) -> Self {
        self.conflicts.push(field.into());
        self
    }

    pub fn display(mut self, display: Display) -> Self {
        self.display = Some(display);
        self
    }

    /// Whether the field must be present, given which sibling fields are.
    pub fn is_required(&self, present: impl Fn(&str) -> bool) -> bool {
        self.required
            || self.required_if.iter().any(|f| present(f))
            || (!self.required_if_not.is_empty()
                && !self.required_if_not.iter().any(|f| present(f)))
    }

    pub fn get_schema(&self) -> PropertySchema {
        PropertySchema {
            type_: Box::new(self.type_.get_schema()),
            required: self.required,
            required_if: self.required_if.clone(),
            required_if_not: self.required_if_not.clone(),
            conflicts: self.conflicts.clone(),
            default: self.default.clone(),
            display: self.display.clone(),
        }
    }
}

// -------------------------------------------------------------------------
// ObjectType

/// A named set of fields.
#[derive(Debug, Clone)]
pub struct ObjectType {
    id: String,
    properties: IndexMap<String, PropertyType>,
    allow_unknown_fields: bool,
}

impl ObjectType {
    /// Fails with [`SchemaError::DuplicateField`] when a field name repeats.
    pub fn new<K: Into<String>>(
        id: impl Into<String>,
        properties: impl IntoIterator<Item = (K, PropertyType)>,
    ) -> Result<Self, SchemaError> {
        let id = id.into();
        let mut map = IndexMap::new();
        for (name, prop) in properties {
            let name = name.into();
            if map.contains_key(&name) {
                return Err(SchemaError::DuplicateField { object: id, field: name });
            }
            map.insert(name, prop);
        }
        Ok(Self {
            id,
            properties: map,
            allow_unknown_fields: false,
        })
    }

    /// Ignore input fields that are not declared instead of rejecting them.
    pub fn allow_unknown_fields(mut self, allow: bool) -> Self {
        self.allow_unknown_fields = allow;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn properties(&self) -> &IndexMap<String, PropertyType> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyType> {
        self.properties.get(name)
    }

    pub fn get_schema(&self) -> ObjectSchema {
        ObjectSchema {
            id: self.id.clone(),
            properties: self
                .properties
                .iter()
                .map(|(k, p)| (k.clone(), p.get_schema()))
                .collect(),
            allow_unknown_fields: self.allow_unknown_fields,
        }
    }

    pub fn kind(&self) -> &'static str {
        "object"
    }

    pub fn repr(&self) -> Repr {
        Repr::object(&self.id)
    }

    pub fn unserialize(&self, input: &Value) -> Result<TypedValue, TypeError> {
        self.unserialize_with(input, None)
    }

    /// Unserializes `input`, tolerating the undeclared field `injected`.
    /// One-of variants use this to keep their discriminator in the input.
    pub(crate) fn unserialize_with(
        &self,
        input: &Value,
        injected: Option<&str>,
    ) -> Result<TypedValue, TypeError> {
        let Value::Object(map) = input else {
            return Err(TypeError::InvalidInput {
                expected: format!("object {:?}", self.id),
                found: json_kind(input).to_string(),
            });
        };
        if !self.allow_unknown_fields {
            if let Some(field) = map
                .keys()
                .find(|k| !self.properties.contains_key(*k) && Some(k.as_str()) != injected)
            {
                return Err(TypeError::UnknownField {
                    field: field.clone(),
                });
            }
        }

        let present = |f: &str| map.get(f).is_some_and(|v| !v.is_null());
        let mut value = ObjectValue::new(&self.id);
        for (name, prop) in &self.properties {
            match map.get(name).filter(|v| !v.is_null()) {
                Some(raw) => {
                    check_conflicts(name, prop, present)?;
                    let field = prop.type_.unserialize(raw).map_err(|e| e.in_field(name))?;
                    value.insert(name.clone(), field);
                }
                None if prop.is_required(present) => {
                    return Err(TypeError::MissingField { field: name.clone() });
                }
                None => {
                    let field = match &prop.default {
                        Some(default) => prop
                            .type_
                            .unserialize(default)
                            .map_err(|e| e.in_field(name))?,
                        None => TypedValue::Null,
                    };
                    value.insert(name.clone(), field);
                }
            }
        }
        Ok(TypedValue::Object(value))
    }

    pub fn serialize(&self, value: &TypedValue) -> Result<Value, TypeError> {
        let TypedValue::Object(obj) = value else {
            return Err(TypeError::mismatch(
                format!("object {:?}", self.id),
                value.kind(),
            ));
        };
        if obj.id() != self.id {
            return Err(TypeError::mismatch(
                format!("object {:?}", self.id),
                format!("object {:?}", obj.id()),
            ));
        }
        if let Some(field) = obj.fields().keys().find(|k| !self.properties.contains_key(*k)) {
            return Err(TypeError::UnknownField {
                field: field.clone(),
            });
        }

        let present = |f: &str| obj.get(f).is_some_and(|v| !v.is_null());
        let mut out = Map::new();
        for (name, prop) in &self.properties {
            match obj.get(name).filter(|v| !v.is_null()) {
                Some(field) => {
                    check_conflicts(name, prop, present)?;
                    let raw = prop.type_.serialize(field).map_err(|e| e.in_field(name))?;
                    out.insert(name.clone(), raw);
                }
                None if prop.is_required(present) => {
                    return Err(TypeError::MissingField { field: name.clone() });
                }
                None => {}
            }
        }
        Ok(Value::Object(out))
    }

    pub(crate) fn bind_scope(&mut self, scope: &Weak<ScopeInner>) {
        for prop in self.properties.values_mut() {
            prop.type_.bind_scope(scope);
        }
    }
}

fn check_conflicts(
    name: &str,
    prop: &PropertyType,
    present: impl Fn(&str) -> bool,
) -> Result<(), TypeError> {
    match prop.conflicts.iter().find(|other| present(other)) {
        Some(other) => Err(TypeError::Conflict {
            field: name.to_string(),
            other: other.clone(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_def::TypeBuilder;
    use serde_json::json;

    fn t() -> TypeBuilder {
        TypeBuilder::new()
    }

    fn person() -> ObjectType {
        ObjectType::new(
            "Person",
            [
                ("name", PropertyType::required(t().str())),
                ("nick", PropertyType::optional(t().str())),
                (
                    "age",
                    PropertyType::optional(t().int()).default(json!(18)),
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn duplicate_fields_are_rejected() {
        let err = ObjectType::new(
            "X",
            [
                ("a", PropertyType::required(t().str())),
                ("a", PropertyType::optional(t().int())),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { field, .. } if field == "a"));
    }

    #[test]
    fn absent_optional_fields_are_null_or_default() {
        let value = person().unserialize(&json!({"name": "Ada"})).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.id(), "Person");
        assert_eq!(obj.get("name"), Some(&TypedValue::from("Ada")));
        assert_eq!(obj.get("nick"), Some(&TypedValue::Null));
        assert_eq!(obj.get("age"), Some(&TypedValue::Int(18)));
    }

    #[test]
    fn missing_required_and_unknown_fields_fail() {
        assert!(matches!(
            person().unserialize(&json!({"nick": "a"})),
            Err(TypeError::MissingField { field }) if field == "name"
        ));
        assert!(matches!(
            person().unserialize(&json!({"name": "a", "x": 1})),
            Err(TypeError::UnknownField { field }) if field == "x"
        ));
        let lenient = person().allow_unknown_fields(true);
        assert!(lenient.unserialize(&json!({"name": "a", "x": 1})).is_ok());
    }

    #[test]
    fn nested_errors_name_the_field() {
        let err = person().unserialize(&json!({"name": 5})).unwrap_err();
        assert_eq!(err.path(), vec!["name"]);
        assert!(matches!(err.root_cause(), TypeError::InvalidInput { .. }));
    }

    #[test]
    fn conditional_requirements() {
        let obj = ObjectType::new(
            "Conn",
            [
                ("host", PropertyType::optional(t().str())),
                ("socket", PropertyType::optional(t().str()).conflicts("host")),
                ("port", PropertyType::optional(t().int()).required_if("host")),
                (
                    "fallback",
                    PropertyType::optional(t().str())
                        .required_if_not("host")
                        .required_if_not("socket"),
                ),
            ],
        )
        .unwrap();
        assert!(obj.unserialize(&json!({"host": "h", "port": 1})).is_ok());
        assert!(obj.unserialize(&json!({"socket": "/s"})).is_ok());
        assert!(matches!(
            obj.unserialize(&json!({"host": "h"})),
            Err(TypeError::MissingField { field }) if field == "port"
        ));
        assert!(matches!(
            obj.unserialize(&json!({})),
            Err(TypeError::MissingField { field }) if field == "fallback"
        ));
        assert!(matches!(
            obj.unserialize(&json!({"host": "h", "port": 1, "socket": "/s"})),
            Err(TypeError::Conflict { field, other }) if field == "socket" && other == "host"
        ));
    }

    #[test]
    fn serialize_omits_null_optionals() {
        let obj = person();
        let value = obj.unserialize(&json!({"name": "Ada"})).unwrap();
        assert_eq!(
            obj.serialize(&value).unwrap(),
            json!({"name": "Ada", "age": 18})
        );
        let wrong = TypedValue::from(ObjectValue::new("Robot"));
        assert!(matches!(
            obj.serialize(&wrong),
            Err(TypeError::TypeMismatch { .. })
        ));
    }
}
