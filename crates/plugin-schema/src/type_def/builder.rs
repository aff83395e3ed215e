//! Factory for constructing `TypeNode` instances.

use super::classes::*;
use super::object::{ObjectType, PropertyType};
use super::one_of::OneOfType;
use super::scope::{RefType, Scope};
use super::TypeNode;
use crate::error::SchemaError;
use crate::schema::{ObjectSchema, OneOfSchema, PropertySchema, RefSchema, Schema, ScopeSchema};

/// Factory for constructing TypeNode instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeBuilder;

impl TypeBuilder {
    pub fn new() -> Self {
        Self
    }

    // ------------------------------------------------------------------
    // Shorthand getters

    pub fn any(&self) -> TypeNode {
        TypeNode::Any(AnyType::new())
    }

    pub fn bool(&self) -> TypeNode {
        TypeNode::Bool(BoolType::new())
    }

    pub fn int(&self) -> TypeNode {
        TypeNode::Int(IntType::new())
    }

    pub fn float(&self) -> TypeNode {
        TypeNode::Float(FloatType::new())
    }

    pub fn str(&self) -> TypeNode {
        TypeNode::String(StringType::new())
    }

    pub fn list(&self, items: TypeNode) -> TypeNode {
        TypeNode::List(ListType::new(items))
    }

    pub fn ref_(&self, id: impl Into<String>) -> TypeNode {
        TypeNode::Ref(RefType::new(id))
    }

    // ------------------------------------------------------------------
    // Unions

    pub fn one_of_int<S: Into<String>>(
        &self,
        discriminator_field: impl Into<String>,
        types: impl IntoIterator<Item = (i64, S)>,
    ) -> Result<TypeNode, SchemaError> {
        let types = types.into_iter().map(|(k, id)| (k, RefType::new(id)));
        OneOfType::new(discriminator_field, types).map(TypeNode::OneOfInt)
    }

    pub fn one_of_string<S: Into<String>>(
        &self,
        discriminator_field: impl Into<String>,
        types: impl IntoIterator<Item = (String, S)>,
    ) -> Result<TypeNode, SchemaError> {
        let types = types.into_iter().map(|(k, id)| (k, RefType::new(id)));
        OneOfType::new(discriminator_field, types).map(TypeNode::OneOfString)
    }

    // ------------------------------------------------------------------
    // Schema import

    /// Builds a type from its schema, running every construction check.
    pub fn import(&self, schema: &Schema) -> Result<TypeNode, SchemaError> {
        Ok(match schema {
            Schema::Any => self.any(),
            Schema::Bool => self.bool(),
            Schema::Integer => self.int(),
            Schema::Float => self.float(),
            Schema::String => self.str(),
            Schema::List { items } => self.list(self.import(items)?),
            Schema::Object(s) => TypeNode::Object(self.import_object(s)?),
            Schema::Ref(s) => TypeNode::Ref(import_ref(s)),
            Schema::OneOfInt(s) => {
                let types = s
                    .types
                    .iter()
                    .map(|(key, target)| {
                        let key = key.parse::<i64>().map_err(|_| {
                            SchemaError::InvalidDiscriminatorKey {
                                field: s.discriminator_field_name.clone(),
                                key: key.clone(),
                            }
                        })?;
                        Ok((key, import_ref(target)))
                    })
                    .collect::<Result<Vec<_>, SchemaError>>()?;
                TypeNode::OneOfInt(OneOfType::new(&s.discriminator_field_name, types)?)
            }
            Schema::OneOfString(s) => TypeNode::OneOfString(import_one_of_string(s)?),
            Schema::Scope(s) => TypeNode::Scope(self.import_scope(s)?),
        })
    }

    pub fn import_object(&self, schema: &ObjectSchema) -> Result<ObjectType, SchemaError> {
        let properties = schema
            .properties
            .iter()
            .map(|(name, prop)| Ok((name.clone(), self.import_property(prop)?)))
            .collect::<Result<Vec<_>, SchemaError>>()?;
        Ok(ObjectType::new(&schema.id, properties)?
            .allow_unknown_fields(schema.allow_unknown_fields))
    }

    fn import_property(&self, schema: &PropertySchema) -> Result<PropertyType, SchemaError> {
        let type_ = self.import(&schema.type_)?;
        let mut prop = if schema.required {
            PropertyType::required(type_)
        } else {
            PropertyType::optional(type_)
        };
        prop.default = schema.default.clone();
        prop.required_if = schema.required_if.clone();
        prop.required_if_not = schema.required_if_not.clone();
        prop.conflicts = schema.conflicts.clone();
        prop.display = schema.display.clone();
        Ok(prop)
    }

    /// Builds a scope from its schema. Objects are checked and bound exactly
    /// as [`Scope::new`] does.
    pub fn import_scope(&self, schema: &ScopeSchema) -> Result<Scope, SchemaError> {
        let objects = schema
            .objects
            .iter()
            .map(|(key, obj)| {
                if *key != obj.id {
                    return Err(SchemaError::ObjectIdMismatch {
                        key: key.clone(),
                        id: obj.id.clone(),
                    });
                }
                self.import_object(obj)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Scope::new(&schema.root, objects)
    }
}

fn import_ref(schema: &RefSchema) -> RefType {
    let r = RefType::new(&schema.id);
    match &schema.display {
        Some(display) => r.display(display.clone()),
        None => r,
    }
}

fn import_one_of_string(schema: &OneOfSchema) -> Result<OneOfType<String>, SchemaError> {
    let types = schema
        .types
        .iter()
        .map(|(key, target)| (key.clone(), import_ref(target)));
    OneOfType::new(&schema.discriminator_field_name, types)
}

impl ScopeSchema {
    /// Shorthand for [`TypeBuilder::import_scope`].
    pub fn to_scope(&self) -> Result<Scope, SchemaError> {
        TypeBuilder::new().import_scope(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn import_rejects_non_integer_keys() {
        let schema: Schema = serde_json::from_value(json!({
            "type_id": "one_of_int",
            "discriminator_field_name": "_type",
            "types": {"one": {"id": "B"}}
        }))
        .unwrap();
        assert!(matches!(
            TypeBuilder::new().import(&schema),
            Err(SchemaError::InvalidDiscriminatorKey { key, .. }) if key == "one"
        ));
    }

    #[test]
    fn import_keeps_property_options() {
        let schema: Schema = serde_json::from_value(json!({
            "type_id": "object",
            "id": "Conn",
            "properties": {
                "host": {"type": {"type_id": "string"}},
                "port": {
                    "type": {"type_id": "integer"},
                    "required_if": ["host"],
                    "default": 80
                }
            },
            "allow_unknown_fields": true
        }))
        .unwrap();
        let node = TypeBuilder::new().import(&schema).unwrap();
        let TypeNode::Object(obj) = &node else {
            panic!("expected object, got {}", node.kind());
        };
        let port = obj.property("port").unwrap();
        assert_eq!(port.required_if, vec!["host".to_string()]);
        assert_eq!(port.default, Some(json!(80)));
        assert_eq!(node.get_schema(), schema);
    }

    #[test]
    fn import_scope_rejects_key_id_mismatch() {
        let schema: ScopeSchema = serde_json::from_value(json!({
            "root": "A",
            "objects": {"A": {"id": "Other", "properties": {}}}
        }))
        .unwrap();
        let err = schema.to_scope().unwrap_err();
        assert!(matches!(
            &err,
            SchemaError::ObjectIdMismatch { key, id } if key == "A" && id == "Other"
        ));
        assert_eq!(err.to_string(), "object declared under key \"A\" has id \"Other\"");
    }

    #[test]
    fn import_scope_checks_references() {
        let schema: ScopeSchema = serde_json::from_value(json!({
            "root": "A",
            "objects": {
                "A": {"id": "A", "properties": {
                    "b": {"type": {"type_id": "ref", "id": "B"}}
                }}
            }
        }))
        .unwrap();
        assert!(matches!(
            schema.to_scope(),
            Err(SchemaError::UnresolvedRef(id)) if id == "B"
        ));
    }
}
