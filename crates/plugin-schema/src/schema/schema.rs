use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::Display;

fn is_false(value: &bool) -> bool {
    !*value
}

/// A single field of an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub type_: Box<Schema>,
    #[serde(default)]
    pub required: bool,
    /// Field becomes required when any of these fields is present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_if: Vec<String>,
    /// Field becomes required when none of these fields is present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_if_not: Vec<String>,
    /// Fields that must not be set together with this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<String>,
    /// JSON value used when the field is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<Display>,
}

/// A named set of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSchema {
    pub id: String,
    pub properties: IndexMap<String, PropertySchema>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub allow_unknown_fields: bool,
}

/// Reference to an object declared in the enclosing scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefSchema {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<Display>,
}

/// Discriminated union. Keys are kept in their JSON object-key form; for
/// `one_of_int` schemas they must parse as `i64`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneOfSchema {
    pub discriminator_field_name: String,
    pub types: IndexMap<String, RefSchema>,
}

/// Registry of objects with a designated root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeSchema {
    pub objects: IndexMap<String, ObjectSchema>,
    pub root: String,
}

/// The unified Schema enum covering all schema kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type_id", rename_all = "snake_case")]
pub enum Schema {
    Any,
    Bool,
    Integer,
    Float,
    String,
    List { items: Box<Schema> },
    Object(ObjectSchema),
    Ref(RefSchema),
    OneOfInt(OneOfSchema),
    OneOfString(OneOfSchema),
    Scope(ScopeSchema),
}

impl Schema {
    /// Returns the "kind" string identifier for this schema node, matching
    /// the `type_id` tag it serializes with.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::List { .. } => "list",
            Self::Object(_) => "object",
            Self::Ref(_) => "ref",
            Self::OneOfInt(_) => "one_of_int",
            Self::OneOfString(_) => "one_of_string",
            Self::Scope(_) => "scope",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn one_of_keys_travel_as_json_object_keys() {
        let schema: Schema = serde_json::from_value(json!({
            "type_id": "one_of_int",
            "discriminator_field_name": "_type",
            "types": {
                "1": {"id": "B"},
                "2": {"id": "C"}
            }
        }))
        .unwrap();
        let Schema::OneOfInt(one_of) = &schema else {
            panic!("expected one_of_int, got {}", schema.kind());
        };
        assert_eq!(one_of.types.keys().collect::<Vec<_>>(), vec!["1", "2"]);
        assert_eq!(one_of.types["2"].id, "C");
    }

    #[test]
    fn property_defaults_are_omitted() {
        let prop = PropertySchema {
            type_: Box::new(Schema::String),
            required: true,
            required_if: vec![],
            required_if_not: vec![],
            conflicts: vec![],
            default: None,
            display: None,
        };
        assert_eq!(
            serde_json::to_value(&prop).unwrap(),
            json!({"type": {"type_id": "string"}, "required": true})
        );
    }
}
