use plugin_schema::{
    CallableFunction, Display, Function, FunctionSchema, ObjectType, PropertyType, Repr, Schema,
    Scope, ScopeSchema, TypeBuilder, TypeNode,
};
use serde_json::json;

fn t() -> TypeBuilder {
    TypeBuilder::new()
}

fn message_scope() -> Scope {
    Scope::new(
        "A",
        [
            ObjectType::new(
                "A",
                [(
                    "s",
                    PropertyType::required(t().one_of_int("_type", [(1, "B"), (2, "C")]).unwrap())
                        .display(Display::new("Payload")),
                )],
            )
            .unwrap(),
            ObjectType::new("B", [("message", PropertyType::required(t().str()))]).unwrap(),
            ObjectType::new(
                "C",
                [("m", PropertyType::optional(t().str()).default(json!("none")))],
            )
            .unwrap(),
        ],
    )
    .unwrap()
}

#[test]
fn scope_schema_wire_form() {
    let schema = serde_json::to_value(message_scope().get_schema()).unwrap();
    assert_eq!(
        schema,
        json!({
            "objects": {
                "A": {"id": "A", "properties": {
                    "s": {
                        "type": {
                            "type_id": "one_of_int",
                            "discriminator_field_name": "_type",
                            "types": {"1": {"id": "B"}, "2": {"id": "C"}}
                        },
                        "required": true,
                        "display": {"name": "Payload"}
                    }
                }},
                "B": {"id": "B", "properties": {
                    "message": {"type": {"type_id": "string"}, "required": true}
                }},
                "C": {"id": "C", "properties": {
                    "m": {"type": {"type_id": "string"}, "required": false, "default": "none"}
                }}
            },
            "root": "A"
        })
    );
}

#[test]
fn imported_scope_behaves_like_the_declared_one() {
    let declared = message_scope();
    let wire = serde_json::to_string(&declared.get_schema()).unwrap();
    let schema: ScopeSchema = serde_json::from_str(&wire).unwrap();
    let imported = schema.to_scope().unwrap();
    assert_eq!(imported.get_schema(), declared.get_schema());

    let input = json!({"s": {"_type": 2}});
    let a = declared.unserialize(&input).unwrap();
    let b = imported.unserialize(&input).unwrap();
    assert_eq!(a, b);
    assert_eq!(imported.serialize(&b).unwrap(), json!({"s": {"m": "none", "_type": 2}}));
}

#[test]
fn nested_scope_round_trips_through_schema() {
    let node = TypeNode::from(message_scope());
    let schema = node.get_schema();
    assert_eq!(schema.kind(), "scope");
    let imported = t().import(&schema).unwrap();
    assert_eq!(imported.get_schema(), schema);
    assert!(imported
        .unserialize(&json!({"s": {"_type": 1, "message": "hi"}}))
        .is_ok());
}

#[test]
fn function_schema_serializes_types_as_schemas() {
    let f = CallableFunction::new(
        "concat",
        vec![t().str(), t().list(t().str())],
        Some(t().str()),
        Some(Display::new("Concat").description("Joins strings")),
        |head: String, tail: Vec<String>| -> String {
            std::iter::once(head).chain(tail).collect()
        },
    )
    .unwrap();
    let schema = serde_json::to_value(f.to_function_schema().unwrap()).unwrap();
    assert_eq!(
        schema,
        json!({
            "id": "concat",
            "inputs": [
                {"type_id": "string"},
                {"type_id": "list", "items": {"type_id": "string"}}
            ],
            "output": {"type_id": "string"},
            "display": {"name": "Concat", "description": "Joins strings"}
        })
    );

    let void = CallableFunction::new("noop", vec![], None, None, || {}).unwrap();
    assert_eq!(
        serde_json::to_value(void.to_function_schema().unwrap()).unwrap(),
        json!({"id": "noop", "inputs": [], "output": null})
    );
}

#[test]
fn schema_parses_from_json() {
    let schema: Schema = serde_json::from_value(json!({
        "type_id": "list",
        "items": {"type_id": "one_of_string", "discriminator_field_name": "kind", "types": {
            "a": {"id": "A"}
        }}
    }))
    .unwrap();
    let node = t().import(&schema).unwrap();
    assert_eq!(node.kind(), "list");
    assert_eq!(node.get_schema(), schema);
}

#[test]
fn function_schema_imports_from_json() {
    let f = CallableFunction::new(
        "concat",
        vec![t().str(), t().list(t().str())],
        Some(t().str()),
        Some(Display::new("Concat")),
        |head: String, tail: Vec<String>| -> String {
            std::iter::once(head).chain(tail).collect()
        },
    )
    .unwrap();
    let wire = serde_json::to_string(&f.to_function_schema().unwrap()).unwrap();
    let imported: FunctionSchema = serde_json::from_str(&wire).unwrap();
    assert_eq!(imported.id(), "concat");
    assert_eq!(
        imported.parameters().iter().map(TypeNode::repr).collect::<Vec<_>>(),
        vec![Repr::String, Repr::list(Repr::String)]
    );
    assert_eq!(imported.output(&[]).unwrap().map(|o| o.repr()), Some(Repr::String));
    assert_eq!(imported.display().and_then(|d| d.name.as_deref()), Some("Concat"));
    assert_eq!(serde_json::to_string(&imported).unwrap(), wire);

    let void: FunctionSchema =
        serde_json::from_value(json!({"id": "noop", "inputs": [], "output": null})).unwrap();
    assert!(void.output(&[]).unwrap().is_none());
    assert!(void.display().is_none());

    let err = serde_json::from_value::<FunctionSchema>(json!({
        "id": "bad",
        "inputs": [{"type_id": "one_of_int", "discriminator_field_name": "k", "types": {"x": {"id": "A"}}}],
        "output": null
    }))
    .unwrap_err();
    assert!(err.to_string().contains("not a valid integer"));
}
