//! A frozen registry of named objects, and the references into it.
//!
//! Objects may reference each other (and themselves) through [`RefType`].
//! References are plain ids until [`Scope::new`] binds them to the scope
//! with a non-owning handle, so cyclic definitions never recurse during
//! construction and the scope does not keep itself alive.

use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

use super::object::ObjectType;
use super::one_of::{DiscriminatorKey, OneOfType};
use super::{Repr, TypeNode};
use crate::error::{SchemaError, TypeError};
use crate::schema::{Display, RefSchema, ScopeSchema};
use crate::value::TypedValue;

/// Shared state of a scope; references hold a `Weak` to it.
#[derive(Debug)]
pub(crate) struct ScopeInner {
    root: String,
    objects: IndexMap<String, Arc<ObjectType>>,
}

impl ScopeInner {
    fn resolve(&self, id: &str) -> Result<Arc<ObjectType>, TypeError> {
        self.objects
            .get(id)
            .cloned()
            .ok_or_else(|| TypeError::UnknownType(id.to_string()))
    }
}

// -------------------------------------------------------------------------
// Scope

/// Immutable registry of objects with a designated root object.
///
/// Cloning is cheap and clones share the same registry.
#[derive(Clone)]
pub struct Scope {
    inner: Arc<ScopeInner>,
}

impl Scope {
    /// Builds and freezes a scope.
    ///
    /// Fails when an object id repeats, when `root` is not declared, when a
    /// reference anywhere in the object graph names an undeclared object, or
    /// when a one-of variant declares its discriminator field with a type
    /// that cannot hold the one-of's keys.
    pub fn new(
        root: impl Into<String>,
        objects: impl IntoIterator<Item = ObjectType>,
    ) -> Result<Self, SchemaError> {
        let root = root.into();
        let mut map: IndexMap<String, ObjectType> = IndexMap::new();
        for obj in objects {
            if map.contains_key(obj.id()) {
                return Err(SchemaError::DuplicateObject(obj.id().to_string()));
            }
            map.insert(obj.id().to_string(), obj);
        }
        if !map.contains_key(&root) {
            return Err(SchemaError::UnknownRoot(root));
        }
        for obj in map.values() {
            for prop in obj.properties().values() {
                let mut checked = Ok(());
                prop.type_.walk(&mut |node| {
                    if checked.is_ok() {
                        checked = check_references(node, &map);
                    }
                });
                checked?;
            }
        }

        let inner = Arc::new_cyclic(|scope| {
            let objects = map
                .into_iter()
                .map(|(id, mut obj)| {
                    obj.bind_scope(scope);
                    (id, Arc::new(obj))
                })
                .collect();
            ScopeInner { root, objects }
        });
        debug!(
            root = %inner.root,
            objects = inner.objects.len(),
            "scope frozen"
        );
        Ok(Self { inner })
    }

    pub fn root(&self) -> &str {
        &self.inner.root
    }

    pub fn root_object(&self) -> &ObjectType {
        // Presence of the root is checked in `Scope::new`.
        &self.inner.objects[&self.inner.root]
    }

    pub fn object(&self, id: &str) -> Option<&ObjectType> {
        self.inner.objects.get(id).map(|obj| &**obj)
    }

    pub fn object_ids(&self) -> impl Iterator<Item = &str> {
        self.inner.objects.keys().map(String::as_str)
    }

    /// Returns the object registered under `id`.
    pub fn resolve(&self, id: &str) -> Result<Arc<ObjectType>, TypeError> {
        self.inner.resolve(id)
    }

    pub fn get_schema(&self) -> ScopeSchema {
        ScopeSchema {
            objects: self
                .inner
                .objects
                .iter()
                .map(|(id, obj)| (id.clone(), obj.get_schema()))
                .collect(),
            root: self.inner.root.clone(),
        }
    }

    pub fn kind(&self) -> &'static str {
        "scope"
    }

    pub fn repr(&self) -> Repr {
        Repr::object(&self.inner.root)
    }

    /// Unserializes `input` as the root object.
    pub fn unserialize(&self, input: &Value) -> Result<TypedValue, TypeError> {
        self.root_object().unserialize(input)
    }

    pub fn serialize(&self, value: &TypedValue) -> Result<Value, TypeError> {
        self.root_object().serialize(value)
    }

    pub fn validate(&self, value: &TypedValue) -> Result<(), TypeError> {
        self.serialize(value).map(|_| ())
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("root", &self.inner.root)
            .field("objects", &self.inner.objects.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn check_references(
    node: &TypeNode,
    objects: &IndexMap<String, ObjectType>,
) -> Result<(), SchemaError> {
    match node {
        TypeNode::Ref(r) if !objects.contains_key(r.id()) => {
            Err(SchemaError::UnresolvedRef(r.id().to_string()))
        }
        TypeNode::OneOfInt(o) => check_one_of(o, objects),
        TypeNode::OneOfString(o) => check_one_of(o, objects),
        _ => Ok(()),
    }
}

fn check_one_of<K: DiscriminatorKey>(
    one_of: &OneOfType<K>,
    objects: &IndexMap<String, ObjectType>,
) -> Result<(), SchemaError> {
    let field = one_of.discriminator_field();
    for target in one_of.types().values() {
        let obj = objects
            .get(target.id())
            .ok_or_else(|| SchemaError::UnresolvedRef(target.id().to_string()))?;
        if let Some(prop) = obj.property(field) {
            let declared = prop.type_.repr();
            if declared != K::repr() && declared != Repr::Any {
                return Err(SchemaError::DiscriminatorConflict {
                    object: obj.id().to_string(),
                    field: field.to_string(),
                    declared,
                    expected: K::repr(),
                });
            }
        }
    }
    Ok(())
}

// -------------------------------------------------------------------------
// RefType

/// Reference to an object in the enclosing scope, resolved on every use.
#[derive(Clone)]
pub struct RefType {
    id: String,
    display: Option<Display>,
    scope: Weak<ScopeInner>,
}

impl RefType {
    /// Creates an unbound reference; [`Scope::new`] binds it.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display: None,
            scope: Weak::new(),
        }
    }

    pub fn display(mut self, display: Display) -> Self {
        self.display = Some(display);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Looks the target up in the scope this reference was bound to.
    ///
    /// Fails with [`TypeError::UnknownType`] when the reference was never
    /// bound or its scope has been dropped.
    pub fn resolve(&self) -> Result<Arc<ObjectType>, TypeError> {
        let scope = self
            .scope
            .upgrade()
            .ok_or_else(|| TypeError::UnknownType(self.id.clone()))?;
        trace!(id = %self.id, "resolving reference");
        scope.resolve(&self.id)
    }

    pub fn get_schema(&self) -> RefSchema {
        RefSchema {
            id: self.id.clone(),
            display: self.display.clone(),
        }
    }

    pub fn kind(&self) -> &'static str {
        "ref"
    }

    pub fn repr(&self) -> Repr {
        Repr::object(&self.id)
    }

    pub fn unserialize(&self, input: &Value) -> Result<TypedValue, TypeError> {
        self.resolve()?.unserialize(input)
    }

    pub(crate) fn unserialize_variant(
        &self,
        input: &Value,
        discriminator_field: &str,
    ) -> Result<TypedValue, TypeError> {
        self.resolve()?.unserialize_with(input, Some(discriminator_field))
    }

    pub fn serialize(&self, value: &TypedValue) -> Result<Value, TypeError> {
        self.resolve()?.serialize(value)
    }

    pub(crate) fn bind(&mut self, scope: &Weak<ScopeInner>) {
        self.scope = scope.clone();
    }
}

impl fmt::Debug for RefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefType")
            .field("id", &self.id)
            .field("bound", &(self.scope.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_def::{PropertyType, TypeBuilder};
    use serde_json::json;

    fn t() -> TypeBuilder {
        TypeBuilder::new()
    }

    /// `Node { value: int, next: optional Node }`
    fn linked_list() -> Scope {
        Scope::new(
            "Node",
            [ObjectType::new(
                "Node",
                [
                    ("value", PropertyType::required(t().int())),
                    ("next", PropertyType::optional(t().ref_("Node"))),
                ],
            )
            .unwrap()],
        )
        .unwrap()
    }

    #[test]
    fn self_reference_resolves_lazily() {
        let scope = linked_list();
        let input = json!({"value": 1, "next": {"value": 2, "next": {"value": 3}}});
        let value = scope.unserialize(&input).unwrap();
        let second = value.as_object().unwrap().get("next").unwrap();
        let third = second.as_object().unwrap().get("next").unwrap();
        assert_eq!(third.as_object().unwrap().get("value"), Some(&TypedValue::Int(3)));
        assert_eq!(scope.serialize(&value).unwrap(), input);
    }

    #[test]
    fn mutual_references() {
        let a = ObjectType::new("A", [("b", PropertyType::optional(t().ref_("B")))]).unwrap();
        let b = ObjectType::new("B", [("a", PropertyType::optional(t().ref_("A")))]).unwrap();
        let scope = Scope::new("A", [a, b]).unwrap();
        let value = scope.unserialize(&json!({"b": {"a": {"b": {}}}})).unwrap();
        assert_eq!(value.as_object().unwrap().id(), "A");
        assert_eq!(scope.resolve("B").unwrap().id(), "B");
        assert!(matches!(scope.resolve("Z"), Err(TypeError::UnknownType(id)) if id == "Z"));
    }

    #[test]
    fn construction_checks() {
        let obj = || ObjectType::new("A", [("x", PropertyType::required(t().str()))]).unwrap();
        assert!(matches!(
            Scope::new("A", [obj(), obj()]),
            Err(SchemaError::DuplicateObject(id)) if id == "A"
        ));
        assert!(matches!(
            Scope::new("Missing", [obj()]),
            Err(SchemaError::UnknownRoot(id)) if id == "Missing"
        ));
        let dangling = ObjectType::new(
            "A",
            [("items", PropertyType::required(t().list(t().ref_("Ghost"))))],
        )
        .unwrap();
        assert!(matches!(
            Scope::new("A", [dangling]),
            Err(SchemaError::UnresolvedRef(id)) if id == "Ghost"
        ));
    }

    #[test]
    fn unbound_and_orphaned_refs_fail_at_use() {
        let unbound = t().ref_("Node");
        assert!(matches!(
            unbound.unserialize(&json!({})),
            Err(TypeError::UnknownType(_))
        ));

        let scope = linked_list();
        let next = scope.root_object().property("next").unwrap().type_.clone();
        assert!(next.unserialize(&json!({"value": 1})).is_ok());
        drop(scope);
        assert!(matches!(
            next.unserialize(&json!({"value": 1})),
            Err(TypeError::UnknownType(id)) if id == "Node"
        ));
    }

    #[test]
    fn nested_scope_keeps_its_own_bindings() {
        let inner = linked_list();
        let outer = Scope::new(
            "Holder",
            [ObjectType::new("Holder", [("list", PropertyType::required(inner))]).unwrap()],
        )
        .unwrap();
        let value = outer
            .unserialize(&json!({"list": {"value": 1, "next": {"value": 2}}}))
            .unwrap();
        let list = value.as_object().unwrap().get("list").unwrap();
        assert_eq!(list.as_object().unwrap().id(), "Node");
    }
}
