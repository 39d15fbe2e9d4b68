use implscope_api::models::{
    ClassDef, ClassId, ConstructorDef, MethodDef, Type, TypeParamDef, TypeVarId, WellKnownTypes,
};
use implscope_api::{InheritanceProvider, MemberProvider, TypeProvider};
use std::collections::HashMap;
use std::path::Path;

use crate::description::{ClassDescription, TypeUniverseDescription};
use crate::error::Result;
use crate::loader::{self, Resolver, Scope};
use crate::syntax;

const MINIMAL_JDK: &str = include_str!("../resources/minimal_jdk.json");

/// An immutable, fully resolved type universe.
///
/// Classes and type variables live in arenas addressed by [`ClassId`] and
/// [`TypeVarId`]. The store is built once and then only read, so a shared
/// reference can be handed to any number of analyses.
#[derive(Debug, Clone)]
pub struct TypeStore {
    classes: Vec<ClassDef>,
    by_name: HashMap<String, ClassId>,
    type_params: Vec<TypeParamDef>,
    well_known: WellKnownTypes,
}

impl TypeStore {
    pub fn builder() -> TypeStoreBuilder {
        TypeStoreBuilder::default()
    }

    /// The bundled subset of `java.lang`, `java.util` and `java.io`.
    pub fn with_minimal_jdk() -> Result<Self> {
        Self::builder().with_minimal_jdk()?.build()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &ClassDef)> {
        self.classes
            .iter()
            .enumerate()
            .map(|(i, c)| (ClassId(i as u32), c))
    }

    /// Resolve a type written in Java syntax against top-level names only.
    pub fn parse_type(&self, text: &str) -> Result<Type> {
        let resolver = Resolver {
            classes: &self.classes,
            by_name: &self.by_name,
            type_params: &self.type_params,
            object: self.well_known.object,
        };
        resolver.resolve(&syntax::parse_type(text)?, &Scope::default(), text)
    }
}

impl TypeProvider for TypeStore {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.index())
    }

    fn class_by_name(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        id.declared_index().and_then(|i| self.type_params.get(i))
    }

    fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }
}

impl InheritanceProvider for TypeStore {
    fn superclass(&self, id: ClassId) -> Option<&Type> {
        self.class(id).and_then(|c| c.super_class.as_ref())
    }

    fn interfaces(&self, id: ClassId) -> &[Type] {
        self.class(id).map(|c| c.interfaces.as_slice()).unwrap_or(&[])
    }

    fn enclosing_class(&self, id: ClassId) -> Option<ClassId> {
        self.class(id).and_then(|c| c.enclosing)
    }
}

impl MemberProvider for TypeStore {
    fn declared_methods(&self, id: ClassId) -> &[MethodDef] {
        self.class(id).map(|c| c.methods.as_slice()).unwrap_or(&[])
    }

    fn declared_constructors(&self, id: ClassId) -> &[ConstructorDef] {
        self.class(id)
            .map(|c| c.constructors.as_slice())
            .unwrap_or(&[])
    }
}

/// Collects class descriptions and resolves them into a [`TypeStore`].
#[derive(Debug, Clone, Default)]
pub struct TypeStoreBuilder {
    descriptions: Vec<ClassDescription>,
}

impl TypeStoreBuilder {
    pub fn with_minimal_jdk(self) -> Result<Self> {
        Ok(self.universe(TypeUniverseDescription::from_json(MINIMAL_JDK)?))
    }

    pub fn class(mut self, description: ClassDescription) -> Self {
        self.descriptions.push(description);
        self
    }

    pub fn universe(mut self, universe: TypeUniverseDescription) -> Self {
        self.descriptions.extend(universe.classes);
        self
    }

    pub fn load_file(self, path: &Path) -> Result<Self> {
        Ok(self.universe(TypeUniverseDescription::load(path)?))
    }

    pub fn build(self) -> Result<TypeStore> {
        let universe = loader::load(&self.descriptions)?;
        tracing::debug!(
            classes = universe.classes.len(),
            type_params = universe.type_params.len(),
            "Type universe loaded"
        );
        Ok(TypeStore {
            classes: universe.classes,
            by_name: universe.by_name,
            type_params: universe.type_params,
            well_known: universe.well_known,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::MethodDescription;
    use implscope_api::TypeSystem;
    use implscope_api::models::Access;

    fn jdk() -> TypeStore {
        TypeStore::with_minimal_jdk().unwrap()
    }

    #[test]
    fn minimal_jdk_has_well_known_types() {
        let store = jdk();
        let wk = store.well_known();
        assert_eq!(store.class_name(wk.object), "java.lang.Object");
        assert_eq!(store.class_name(wk.serializable), "java.io.Serializable");
        assert!(store.is_primitive(wk.void));
        assert!(store.superclass(wk.object).is_none());
    }

    #[test]
    fn resolves_nested_generic_types() {
        let store = jdk();
        let ty = store
            .parse_type("java.util.Map<String, java.util.List<? extends Number>>")
            .unwrap();
        let map = store.class_by_name("java.util.Map").unwrap();
        let Type::Parameterized { raw, args } = ty else {
            panic!("expected parameterized type");
        };
        assert_eq!(raw, map);
        assert_eq!(args[0], Type::Class(store.class_by_name("java.lang.String").unwrap()));
    }

    #[test]
    fn member_types_resolve_through_their_owner() {
        let store = jdk();
        let entry = store.class_by_name("java.util.Map.Entry").unwrap();
        let class = store.class(entry).unwrap();
        assert_eq!(class.package, "java.util");
        assert_eq!(class.simple_name, "Entry");
        assert!(class.is_static);
        assert_eq!(class.access, Access::Public);
        assert_eq!(
            store.parse_type("java.util.Map.Entry<String, Integer>").unwrap(),
            store.parse_type("java.util.Map.Entry<java.lang.String, Integer>").unwrap()
        );
    }

    #[test]
    fn sibling_type_parameters_see_each_other() {
        let store = TypeStore::builder()
            .with_minimal_jdk()
            .unwrap()
            .class(
                ClassDescription::class("demo.Pair")
                    .modifiers(&["public"])
                    .type_parameters("<A extends Comparable<B>, B extends A>"),
            )
            .build()
            .unwrap();
        let pair = store.class(store.class_by_name("demo.Pair").unwrap()).unwrap();
        let (a, b) = (pair.type_params[0], pair.type_params[1]);
        assert_eq!(store.type_param(b).unwrap().bounds, vec![Type::TypeVar(a)]);
        let comparable = store.class_by_name("java.lang.Comparable").unwrap();
        assert_eq!(
            store.type_param(a).unwrap().bounds,
            vec![Type::parameterized(comparable, vec![Type::TypeVar(b)])]
        );
    }

    #[test]
    fn interface_methods_default_to_public_abstract() {
        let store = TypeStore::builder()
            .with_minimal_jdk()
            .unwrap()
            .class(
                ClassDescription::interface("demo.Source")
                    .method(MethodDescription::new("next", "int"))
                    .method(MethodDescription::new("skip", "void").modifiers(&["default"])),
            )
            .build()
            .unwrap();
        let source = store.class_by_name("demo.Source").unwrap();
        let methods = store.declared_methods(source);
        assert!(methods[0].is_abstract);
        assert_eq!(methods[0].access, Access::Public);
        assert!(!methods[1].is_abstract);
        assert!(methods[1].is_default);
    }

    #[test]
    fn classes_without_constructors_get_an_implicit_one() {
        let store = jdk();
        let object = store.well_known().object;
        assert_eq!(store.declared_constructors(object).len(), 1);
        let runnable = store.class_by_name("java.lang.Runnable").unwrap();
        assert!(store.declared_constructors(runnable).is_empty());
    }

    #[test]
    fn inner_class_by_simple_name_carries_its_owner_arguments() {
        let store = TypeStore::builder()
            .with_minimal_jdk()
            .unwrap()
            .class(
                ClassDescription::class("demo.Outer")
                    .modifiers(&["public"])
                    .type_parameters("<T>")
                    .method(MethodDescription::new("make", "Inner"))
                    .method(MethodDescription::new("qualified", "demo.Outer.Inner")),
            )
            .class(
                ClassDescription::class("demo.Outer.Inner")
                    .modifiers(&["public"])
                    .enclosed_in("demo.Outer"),
            )
            .class(
                ClassDescription::class("demo.Outer.Nested")
                    .modifiers(&["public", "static"])
                    .enclosed_in("demo.Outer"),
            )
            .build()
            .unwrap();
        let outer = store.class_by_name("demo.Outer").unwrap();
        let inner = store.class_by_name("demo.Outer.Inner").unwrap();
        let methods = store.declared_methods(outer);
        assert_eq!(methods[0].return_type, Type::parameterized(inner, vec![]));
        assert_eq!(methods[1].return_type, Type::Class(inner));

        let nested = store.class_by_name("demo.Outer.Nested").unwrap();
        let scope = Scope {
            class: Some(outer),
            locals: Vec::new(),
        };
        let resolver = Resolver {
            classes: &store.classes,
            by_name: &store.by_name,
            type_params: &store.type_params,
            object: store.well_known.object,
        };
        let resolved = resolver
            .resolve(&syntax::parse_type("Nested").unwrap(), &scope, "test")
            .unwrap();
        assert_eq!(resolved, Type::Class(nested));
    }

    #[test]
    fn rejects_duplicate_classes() {
        let err = TypeStore::builder()
            .with_minimal_jdk()
            .unwrap()
            .class(ClassDescription::class("java.lang.String"))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn rejects_unknown_types() {
        let err = TypeStore::builder()
            .with_minimal_jdk()
            .unwrap()
            .class(ClassDescription::class("demo.Broken").extends("demo.Missing"))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("demo.Missing"));
    }

    #[test]
    fn requires_object() {
        let err = TypeStore::builder().build().unwrap_err();
        assert!(err.to_string().contains("java.lang.Object"));
    }
}
